use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

/// A monitored domain as stored by the domain registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub id: String,
    /// Display name, also matched against a log record's `agent_name`
    pub name: String,
    pub url: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Body of the add-domain call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDomain {
    pub name: String,
    pub url: String,
}

/// Rejections raised before a domain is sent to the registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainInputError {
    #[error("Domain URL is required")]
    Empty,
}

fn scheme_prefix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^https?://").expect("scheme pattern is valid"))
}

impl NewDomain {
    /// Derive the registry payload from what the user typed.
    ///
    /// The name drops a leading `http://` or `https://` and one trailing
    /// slash. The url keeps the input untouched when it already starts with
    /// `http`, otherwise `https://` is prepended.
    pub fn from_input(input: &str) -> Result<Self, DomainInputError> {
        if input.trim().is_empty() {
            return Err(DomainInputError::Empty);
        }

        let without_scheme = scheme_prefix().replace(input, "");
        let name = without_scheme
            .strip_suffix('/')
            .unwrap_or(&*without_scheme)
            .to_string();

        let url = if input.starts_with("http") {
            input.to_string()
        } else {
            format!("https://{}", input)
        };

        Ok(NewDomain { name, url })
    }
}
