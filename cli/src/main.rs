//! presdata CLI - PPTX data extraction and write-back tool
//!
//! Extracts presentation data to JSON, and writes text edits back into
//! the original package.

use clap::{Parser, Subcommand};
use colored::*;
use presdata::{PptxPackage, PresentationData, SlideContent};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// PPTX presentation data extraction and write-back
#[derive(Parser)]
#[command(
    name = "presdata",
    version,
    about = "Extract and edit PowerPoint presentation data",
    long_about = "presdata - PPTX presentation data extraction and write-back.\n\n\
                  Extracts slides, masters, themes and metadata to JSON, and\n\
                  applies text edits back onto the original package."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract presentation data to JSON
    Json {
        /// Input .pptx file
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Show presentation information
    Info {
        /// Input .pptx file
        input: PathBuf,
    },

    /// Replace every text run exactly matching OLD with NEW
    Replace {
        /// Input .pptx file
        input: PathBuf,

        /// Text to find (whole-run match)
        old: String,

        /// Replacement text
        new: String,

        /// Write the result to a copy instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply an edited JSON data file back onto the presentation
    Apply {
        /// Input .pptx file
        input: PathBuf,

        /// JSON file with the edited presentation data
        data: PathBuf,

        /// Write the result to a copy instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Json {
            input,
            output,
            compact,
        } => {
            let data = presdata::extract(&input)?;
            let json = if compact {
                serde_json::to_string(&data)?
            } else {
                data.to_json_pretty()?
            };
            write_output(output.as_ref(), &json)?;
            if let Some(path) = output {
                println!("{} Extracted to {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Info { input } => {
            let data = presdata::extract(&input)?;
            print_info(&input, &data);
        }

        Commands::Replace {
            input,
            old,
            new,
            output,
        } => {
            let mut package = PptxPackage::open_writable(&input)?;
            let replaced = presdata::replace_text_exact(&mut package, &old, &new)?;
            if replaced {
                save(&package, output.as_ref())?;
                println!(
                    "{} Replaced {:?} with {:?}",
                    "✓".green().bold(),
                    old,
                    new
                );
            } else {
                println!("{} No text run matched {:?}", "!".yellow().bold(), old);
            }
        }

        Commands::Apply {
            input,
            data,
            output,
        } => {
            let json = fs::read_to_string(&data)?;
            let edited = PresentationData::from_json(&json)?;

            let mut package = PptxPackage::open_writable(&input)?;
            presdata::apply_presentation_data(&mut package, &edited)?;
            save(&package, output.as_ref())?;
            println!(
                "{} Applied {} onto {}",
                "✓".green().bold(),
                data.display(),
                input.display()
            );
        }
    }

    Ok(())
}

fn save(
    package: &PptxPackage,
    output: Option<&PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => package.save_as(path)?,
        None => package.save()?,
    }
    Ok(())
}

fn print_info(input: &PathBuf, data: &PresentationData) {
    println!("{}", "Presentation Information".cyan().bold());
    println!("{}", "─".repeat(40));
    println!(
        "{}: {}",
        "File".bold(),
        input.file_name().unwrap_or_default().to_string_lossy()
    );
    if !data.title.is_empty() {
        println!("{}: {}", "Title".bold(), data.title);
    }
    if !data.subject.is_empty() {
        println!("{}: {}", "Subject".bold(), data.subject);
    }
    println!("{}: {}", "Creator".bold(), data.creator);
    if !data.created.is_empty() {
        println!("{}: {}", "Created".bold(), data.created);
    }
    if !data.modified.is_empty() {
        println!("{}: {}", "Modified".bold(), data.modified);
    }
    println!(
        "{}: {} x {} EMU ({})",
        "Slide size".bold(),
        data.slide_size.width,
        data.slide_size.height,
        if data.slide_size.size_type.is_empty() {
            "unspecified"
        } else {
            &data.slide_size.size_type
        }
    );
    println!("{}: {}", "Masters".bold(), data.slide_masters.len());
    println!("{}: {}", "Slides".bold(), data.slides.len());

    let (mut texts, mut images, mut tables) = (0usize, 0usize, 0usize);
    for slide in &data.slides {
        for content in &slide.contents {
            match content {
                SlideContent::Text { .. } => texts += 1,
                SlideContent::Image { .. } => images += 1,
                SlideContent::Table { .. } => tables += 1,
            }
        }
    }
    println!("\n{}", "Content".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Text entries".bold(), texts);
    println!("{}: {}", "Images".bold(), images);
    println!("{}: {}", "Tables".bold(), tables);

    if !data.global_theme.is_empty() {
        println!("\n{}", "Theme accents".cyan().bold());
        println!("{}", "─".repeat(40));
        for (slot, value) in [
            ("Accent1", &data.global_theme.accent1),
            ("Accent2", &data.global_theme.accent2),
            ("Accent3", &data.global_theme.accent3),
        ] {
            if !value.is_empty() {
                println!("{}: #{}", slot.bold(), value);
            }
        }
    }
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
