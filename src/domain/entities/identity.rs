//! Identity hashing.

use md5::Md5;
use sha2::{Digest, Sha256};

/// Lowercase hexadecimal digest of a normalized identity (e-mail address).
///
/// Used both as a content-cache key component and as the seed for icon
/// generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityHash(String);

impl IdentityHash {
    /// Wraps an already computed digest.
    ///
    /// The value is lowercased so that externally supplied hashes compare
    /// equal to locally computed ones.
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into().to_ascii_lowercase())
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the sharding sub-directory for this hash (`a/b` for `ab...`).
    ///
    /// Hashes shorter than two characters are padded with `0`.
    #[must_use]
    pub fn shard(&self) -> String {
        let mut chars = self.0.chars();
        let first = chars.next().unwrap_or('0');
        let second = chars.next().unwrap_or('0');
        format!("{first}/{second}")
    }
}

impl std::fmt::Display for IdentityHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IdentityHash {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for IdentityHash {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Hashing scheme applied to identity strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdentityHasher {
    /// MD5 of the normalized identity, the addressing scheme of the remote
    /// avatar service.
    #[default]
    Remote,
    /// SHA-256 of `salt + normalized identity`, used for local cache keys.
    Salted(String),
}

impl IdentityHasher {
    /// Creates a salted hasher.
    #[must_use]
    pub fn salted(salt: impl Into<String>) -> Self {
        Self::Salted(salt.into())
    }

    /// Trims and lowercases an identity.
    #[must_use]
    pub fn normalize(identity: &str) -> String {
        identity.trim().to_lowercase()
    }

    /// Hashes an identity. Never fails, the empty string included.
    #[must_use]
    pub fn hash(&self, identity: &str) -> IdentityHash {
        let normalized = Self::normalize(identity);
        let digest = match self {
            Self::Remote => hex::encode(Md5::digest(normalized.as_bytes())),
            Self::Salted(salt) => {
                let mut hasher = Sha256::new();
                hasher.update(salt.as_bytes());
                hasher.update(normalized.as_bytes());
                hex::encode(hasher.finalize())
            }
        };
        IdentityHash(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_hash_normalizes_identity() {
        let hasher = IdentityHasher::Remote;
        assert_eq!(hasher.hash(" Foo@Bar.com "), hasher.hash("foo@bar.com"));
    }

    #[test]
    fn test_remote_hash_is_md5() {
        let hash = IdentityHasher::Remote.hash("MyEmailAddress@example.com ");
        assert_eq!(hash.as_str(), "0bc83cb571cd1c50ba6f3e8a78ef1346");
    }

    #[test]
    fn test_empty_identity_hashes() {
        let hash = IdentityHasher::Remote.hash("");
        assert_eq!(hash.as_str(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_salted_hash() {
        let hasher = IdentityHasher::salted("pepper");
        let hash = hasher.hash(" Foo@Bar.com");

        assert_eq!(hash.as_str().len(), 64);
        assert_eq!(hash, hasher.hash("foo@bar.com"));
        assert_ne!(hash, IdentityHasher::salted("salt").hash("foo@bar.com"));
        assert!(hash.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_shard() {
        assert_eq!(IdentityHash::new("AbCdef").shard(), "a/b");
        assert_eq!(IdentityHash::new("f").shard(), "f/0");
    }
}
