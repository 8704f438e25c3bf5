use std::fmt;
use std::str::FromStr;

use regex::Regex;

use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};

const MAX_LEN: usize = 256;

/// A validated, normalized email-address identifying a user
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parse an owner string, appending `default_domain` when it has no domain part.
    ///
    /// `"test01"` becomes `"test01@<default_domain>"`, a full address is parsed as-is.
    pub fn canonicalize(value: &str, default_domain: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() || value.contains('@') {
            return value.parse();
        }
        format!("{}@{}", value, default_domain).parse()
    }
}

impl FromStr for EmailAddress {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        lazy_static::lazy_static! {
            static ref EMAIL_REGEX: Regex =
                Regex::new(r"^[\w.+-]+@[\w-]+(\.[\w-]+)*\.\w+$").unwrap();
        }

        let value = value.trim();

        if value.is_empty() {
            return Err(Error::ParsingError("Email address cannot be empty".into()));
        }
        if value.graphemes(true).count() > MAX_LEN {
            return Err(Error::ParsingError("Email address too long".into()));
        }
        if !EMAIL_REGEX.is_match(value) {
            return Err(Error::ParsingError(format!(
                "Email address of incorrect format: {}",
                value
            )));
        }

        // Normalize
        Ok(Self(value.to_lowercase()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
