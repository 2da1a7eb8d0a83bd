//! Macro for implementing Display and FromStr for wire-named enums
//!
//! Board columns and remote task statuses travel as camelCase strings
//! (`"inProgress"`, `"needsAction"`). This macro keeps the string table in one
//! place and parses case-insensitively so `"INPROGRESS"` and `"inprogress"`
//! resolve to the same variant.
//!
//! # Example
//!
//! ```rust
//! use taskboard_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Lane {
//!     Backlog,
//!     InReview,
//! }
//!
//! impl_domain_status_conversions!(Lane {
//!     Backlog => "backlog",
//!     InReview => "inReview",
//! });
//!
//! assert_eq!(Lane::InReview.to_string(), "inReview");
//! assert_eq!("INREVIEW".parse::<Lane>(), Ok(Lane::InReview));
//! ```

/// Implements Display and FromStr traits for wire-named enums
///
/// This macro generates:
/// - Display trait: writes the declared string for each variant
/// - FromStr trait: parses case-insensitively against the declared strings
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestLane {
        Backlog,
        InReview,
        Shipped,
    }

    impl_domain_status_conversions!(TestLane {
        Backlog => "backlog",
        InReview => "inReview",
        Shipped => "shipped",
    });

    #[test]
    fn display_keeps_declared_casing() {
        assert_eq!(TestLane::Backlog.to_string(), "backlog");
        assert_eq!(TestLane::InReview.to_string(), "inReview");
    }

    #[test]
    fn fromstr_ignores_case_and_whitespace() {
        assert_eq!(TestLane::from_str("inReview").unwrap(), TestLane::InReview);
        assert_eq!(TestLane::from_str("INREVIEW").unwrap(), TestLane::InReview);
        assert_eq!(TestLane::from_str(" shipped ").unwrap(), TestLane::Shipped);
    }

    #[test]
    fn fromstr_invalid() {
        let result = TestLane::from_str("archived");
        assert!(result.unwrap_err().contains("Invalid TestLane: archived"));
        assert!(TestLane::from_str("").is_err());
    }
}
