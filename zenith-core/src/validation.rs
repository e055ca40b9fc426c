use crate::CoreError;

/// Trimmed and validated monitor fields, ready for the store.
///
/// The only way to build one is [`MonitorDraft::parse`], so anything holding a draft
/// holds a subreddit name that is non-empty and made of `[A-Za-z0-9_]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorDraft {
    subreddit: String,
    keywords: String,
}

impl MonitorDraft {
    pub fn parse(subreddit: Option<&str>, keywords: Option<&str>) -> Result<Self, CoreError> {
        let subreddit = subreddit.map(str::trim).unwrap_or_default();
        if subreddit.is_empty() {
            return Err(CoreError::InvalidInput {
                message: "subreddit is required".to_string(),
            });
        }
        if !is_valid_subreddit_name(subreddit) {
            return Err(CoreError::InvalidInput {
                message: "Invalid subreddit name".to_string(),
            });
        }

        Ok(Self {
            subreddit: subreddit.to_string(),
            keywords: keywords.map(str::trim).unwrap_or_default().to_string(),
        })
    }

    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    pub fn keywords(&self) -> &str {
        &self.keywords
    }
}

pub fn is_valid_subreddit_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_fields() {
        let draft = MonitorDraft::parse(Some("  reactjs "), Some(" hooks  ")).unwrap();
        assert_eq!(draft.subreddit(), "reactjs");
        assert_eq!(draft.keywords(), "hooks");
    }

    #[test]
    fn test_missing_keywords_become_empty() {
        let draft = MonitorDraft::parse(Some("rust"), None).unwrap();
        assert_eq!(draft.keywords(), "");
    }

    #[test]
    fn test_rejects_missing_subreddit() {
        for input in [None, Some(""), Some("   ")] {
            let err = MonitorDraft::parse(input, Some("x")).unwrap_err();
            assert!(matches!(
                err,
                CoreError::InvalidInput { ref message } if message == "subreddit is required"
            ));
        }
    }

    #[test]
    fn test_rejects_bad_characters() {
        for name in ["r/rust", "rust lang", "rust-lang", "ünicode"] {
            let err = MonitorDraft::parse(Some(name), None).unwrap_err();
            assert!(matches!(
                err,
                CoreError::InvalidInput { ref message } if message == "Invalid subreddit name"
            ));
        }
        assert!(is_valid_subreddit_name("Rust_Lang2"));
    }
}
