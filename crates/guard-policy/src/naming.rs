//! File naming conventions
//!
//! Two generations exist: the older one only rejects spaces, the current one
//! also rejects upper-case letters and lower-cases the proposed name.

use serde::{Deserialize, Serialize};

/// Which asset paths are considered well-formed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingConvention {
    /// Spaces are rejected and replaced with underscores
    Underscore,
    /// Spaces and upper-case letters are rejected; names are lower-cased
    #[default]
    Lowercase,
}

impl NamingConvention {
    /// Check whether a relative asset path breaks the convention
    #[must_use]
    pub fn violates(self, relative: &str) -> bool {
        match self {
            Self::Underscore => relative.contains(' '),
            Self::Lowercase => relative.chars().any(|c| c == ' ' || c.is_uppercase()),
        }
    }

    /// Rewrite a relative asset path so that it follows the convention
    #[must_use]
    pub fn normalize(self, relative: &str) -> String {
        let underscored = relative.replace(' ', "_");
        match self {
            Self::Underscore => underscored,
            Self::Lowercase => underscored.to_lowercase(),
        }
    }

    /// Human-readable description used in violation messages
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::Underscore => "no spaces",
            Self::Lowercase => "lower-case, no spaces",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn underscore_only_flags_spaces() {
        assert!(NamingConvention::Underscore.violates("images/my photo.png"));
        assert!(!NamingConvention::Underscore.violates("images/MyPhoto.png"));
    }

    #[test]
    fn lowercase_flags_capitals() {
        assert!(NamingConvention::Lowercase.violates("images/MyPhoto.png"));
        assert!(NamingConvention::Lowercase.violates("images/my photo.png"));
        assert!(!NamingConvention::Lowercase.violates("images/my_photo.png"));
    }

    #[test]
    fn normalize_generations() {
        assert_eq!(
            NamingConvention::Underscore.normalize("Photos/My Photo.JPG"),
            "Photos/My_Photo.JPG"
        );
        assert_eq!(
            NamingConvention::Lowercase.normalize("Photos/My Photo.JPG"),
            "photos/my_photo.jpg"
        );
    }

    #[test]
    fn deserializes_lowercase_names() {
        let parsed: NamingConvention = serde_json::from_str("\"underscore\"").unwrap();
        assert_eq!(parsed, NamingConvention::Underscore);
    }

    proptest! {
        #[test]
        fn normalized_paths_never_violate(path in "[a-zA-Z0-9 _/.-]{1,40}") {
            for convention in [NamingConvention::Underscore, NamingConvention::Lowercase] {
                let fixed = convention.normalize(&path);
                prop_assert!(!convention.violates(&fixed));
                prop_assert!(!fixed.contains(' '));
            }
        }

        #[test]
        fn lowercase_target_is_lowercase(path in "[A-Za-z ]{1,30}") {
            let fixed = NamingConvention::Lowercase.normalize(&path);
            prop_assert_eq!(fixed.to_lowercase(), fixed);
        }
    }
}
