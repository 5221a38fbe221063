//! Theme color scheme model.

use serde::{Deserialize, Serialize};

/// A resolved 12-slot color scheme.
///
/// Each slot holds a hex color string (e.g. `"1F4E79"`) or the empty
/// string when the slot could not be resolved. A theme with every slot
/// empty means "no theme resolvable"; there is deliberately no
/// `Option<Theme>` anywhere in the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Theme {
    pub dark1: String,
    pub light1: String,
    pub dark2: String,
    pub light2: String,
    pub accent1: String,
    pub accent2: String,
    pub accent3: String,
    pub accent4: String,
    pub accent5: String,
    pub accent6: String,
    pub hyperlink: String,
    pub followed_hyperlink: String,
}

impl Theme {
    /// The all-empty theme.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether every slot is unresolved.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_theme() {
        let theme = Theme::empty();
        assert!(theme.is_empty());
        assert_eq!(theme.dark1, "");
    }

    #[test]
    fn test_serde_field_names() {
        let mut theme = Theme::empty();
        theme.followed_hyperlink = "954F72".to_string();
        let json = serde_json::to_string(&theme).unwrap();
        assert!(json.contains("\"FollowedHyperlink\":\"954F72\""));
        assert!(json.contains("\"Accent1\":\"\""));
    }
}
