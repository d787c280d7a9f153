//! Credential wrapper that zeroizes its memory on drop.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

/// A string holding a credential (API key, bearer token).
///
/// The buffer is wiped when the value is dropped, and `Debug` / `Display`
/// never print the contents.
///
/// # Example
///
/// ```
/// use ak_connectors::SecureString;
///
/// let key = SecureString::new("inventory-api-key".to_string());
/// assert_eq!(key.expose_secret(), "inventory-api-key");
/// assert_eq!(format!("{:?}", key), "SecureString([REDACTED])");
/// ```
#[derive(Clone, Default)]
pub struct SecureString(Zeroizing<String>);

impl SecureString {
    pub fn new(s: String) -> Self {
        Self(Zeroizing::new(s))
    }

    /// Exposes the secret for use in a request header.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureString([REDACTED])")
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl PartialEq for SecureString {
    fn eq(&self, other: &Self) -> bool {
        // Constant-time to avoid leaking key prefixes through timing.
        use subtle::ConstantTimeEq;
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl Eq for SecureString {}

impl Serialize for SecureString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecureString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecureString::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_not_printed() {
        let key = SecureString::from("k-123");
        assert_eq!(key.expose_secret(), "k-123");
        assert_eq!(format!("{}", key), "[REDACTED]");
        assert!(!format!("{:?}", key).contains("k-123"));
    }

    #[test]
    fn test_equality() {
        assert_eq!(SecureString::from("a"), SecureString::from("a"));
        assert_ne!(SecureString::from("a"), SecureString::from("b"));
    }

    #[test]
    fn test_serde_round_trip_keeps_value() {
        let key = SecureString::from("k-456");
        let json = serde_json::to_string(&key).unwrap();
        let back: SecureString = serde_json::from_str(&json).unwrap();
        assert_eq!(back.expose_secret(), "k-456");
    }
}
