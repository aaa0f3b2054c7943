//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not contain exactly one @ symbol.
    #[error("email must contain exactly one @ symbol")]
    MissingAtSymbol,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The domain part (after @) is empty.
    #[error("email domain cannot be empty")]
    EmptyDomain,
}

/// An email address captured by a lead form, a booking or a signup.
///
/// [`parse`](Self::parse) checks the shape of addresses typed in locally and
/// only trims surrounding whitespace; case is kept as entered. Addresses
/// read back from the store arrive through
/// [`from_stored`](Self::from_stored) or deserialization and are taken as
/// they are, since the store already accepted them.
///
/// ## Constraints checked by `parse`
///
/// - Length: 1-254 characters (RFC 5321 limit)
/// - Exactly one @ symbol with non-empty parts on both sides
///
/// ## Examples
///
/// ```
/// use bread_core::Email;
///
/// let email = Email::parse(" Baker@Example.COM ").unwrap();
/// assert_eq!(email.as_str(), "Baker@Example.COM");
///
/// let walk_in = Email::from_stored("walk-in customer".to_string());
/// assert_eq!(walk_in.as_str(), "walk-in customer");
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("a@b@c").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, longer than 254
    /// characters, or does not split into a non-empty local part and domain.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let (local, domain) = s.split_once('@').ok_or(EmailError::MissingAtSymbol)?;
        if domain.contains('@') {
            return Err(EmailError::MissingAtSymbol);
        }
        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }
        if domain.is_empty() {
            return Err(EmailError::EmptyDomain);
        }

        Ok(Self(s.to_string()))
    }

    /// Wrap an address the store already holds, without checking it.
    #[must_use]
    pub const fn from_stored(value: String) -> Self {
        Self(value)
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_emails() {
        assert!(Email::parse("baker@example.com").is_ok());
        assert!(Email::parse("baker+sourdough@example.com").is_ok());
        assert!(Email::parse("baker@shop.example.co.uk").is_ok());
        assert!(Email::parse("a@b.c").is_ok());
    }

    #[test]
    fn test_parse_trims_but_keeps_case() {
        let email = Email::parse(" Jane@Example.COM").unwrap();
        assert_eq!(email.as_str(), "Jane@Example.COM");

        let email = Email::parse("  Jane.Doe@Bread.IO\n").unwrap();
        assert_eq!(email.as_str(), "Jane.Doe@Bread.IO");
        assert_ne!(email, Email::parse("Jane.Doe@bread.io").unwrap());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_at_symbol_count() {
        assert_eq!(Email::parse("no-at"), Err(EmailError::MissingAtSymbol));
        assert_eq!(Email::parse("a@b@c"), Err(EmailError::MissingAtSymbol));
    }

    #[test]
    fn test_parse_empty_parts() {
        assert_eq!(Email::parse("@bread.io"), Err(EmailError::EmptyLocalPart));
        assert_eq!(Email::parse("baker@"), Err(EmailError::EmptyDomain));
    }

    #[test]
    fn test_stored_addresses_are_kept_verbatim() {
        let stored = Email::from_stored(" walk-in customer".to_string());
        assert_eq!(stored.as_str(), " walk-in customer");

        let parsed: Email = serde_json::from_str("\"Baker@EXAMPLE.com\"").unwrap();
        assert_eq!(parsed.as_str(), "Baker@EXAMPLE.com");

        let parsed: Email = serde_json::from_str("\"nope\"").unwrap();
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"nope\"");
    }
}
