use crate::{Result, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Primary key of a stored identity.
pub type IdentityId = i64;

/// Shared secret presented at the door.
///
/// Matching is exact: no trimming, no case folding. The value is kept out of
/// `Debug` output so it never reaches the logs.
///
/// # Security
/// Equality is evaluated in constant time.
#[derive(Clone, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wrap a secret.
    ///
    /// # Errors
    /// Returns `Error::InvalidIdentity` if the secret is empty.
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(Error::InvalidIdentity(
                "Credential must not be empty".to_string(),
            ));
        }
        Ok(Self(secret))
    }

    /// Get the secret as a string slice.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Constant-time comparison against a presented secret.
    #[must_use]
    pub fn matches(&self, presented: &str) -> bool {
        self.0.as_bytes().ct_eq(presented.as_bytes()).into()
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl std::str::FromStr for Credential {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Credential::new(s)
    }
}

/// Person name as entered at enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonName(String);

impl PersonName {
    /// Create a name, trimming surrounding whitespace.
    ///
    /// # Errors
    /// Returns `Error::InvalidIdentity` if nothing but whitespace was given.
    pub fn new(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidIdentity("Name must not be empty".to_string()));
        }
        Ok(Self(name.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First whitespace-delimited token, used for photo filenames.
    #[must_use]
    pub fn first_token(&self) -> &str {
        self.0.split_whitespace().next().unwrap_or_default()
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_credential_exact_match() {
        let credential = Credential::new("1234").unwrap();
        assert!(credential.matches("1234"));
        assert!(!credential.matches("12345"));
        assert!(!credential.matches(""));
    }

    #[rstest]
    #[case("abc", "ABC")]
    #[case("abc", " abc")]
    #[case("abc", "abc ")]
    fn test_credential_is_case_and_whitespace_sensitive(
        #[case] stored: &str,
        #[case] presented: &str,
    ) {
        let credential = Credential::new(stored).unwrap();
        assert!(!credential.matches(presented));
    }

    #[test]
    fn test_credential_rejects_empty() {
        assert!(Credential::new("").is_err());
        assert!(Credential::new(" ").is_ok());
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("s3cret").unwrap();
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_person_name_trims_and_tokenizes() {
        let name = PersonName::new("  Ana Maria  Souza ").unwrap();
        assert_eq!(name.as_str(), "Ana Maria  Souza");
        assert_eq!(name.first_token(), "Ana");
    }

    #[test]
    fn test_person_name_rejects_blank() {
        assert!(PersonName::new("   ").is_err());
    }
}
