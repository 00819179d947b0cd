//! Content identifier (SHA-1 hash)
//!
//! Every captured file is identified by the SHA-1 of `blob <size>\0<bytes>`,
//! the same framing git uses for blobs, so ids are comparable with
//! `git hash-object` output. A whole tree is identified by hashing its sorted
//! `(path, content id)` listing.

use sha1::{Digest, Sha1};
use std::path::Path;

/// Length of a SHA-1 hash in hexadecimal format
pub const CONTENT_ID_LENGTH: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ContentId(String);

impl ContentId {
    /// Hash raw file bytes with the blob framing
    pub fn of_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(format!("blob {}\0", data.len()).as_bytes());
        hasher.update(data);

        Self(format!("{:x}", hasher.finalize()))
    }

    /// Hash a sorted listing of `(path, content id)` pairs
    pub fn of_listing<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a Path, &'a ContentId)>,
    {
        let mut hasher = Sha1::new();
        for (path, id) in entries {
            hasher.update(path.to_string_lossy().as_bytes());
            hasher.update([0u8]);
            hasher.update(id.0.as_bytes());
            hasher.update(b"\n");
        }

        Self(format!("{:x}", hasher.finalize()))
    }

    /// First 7 characters of the hash
    pub fn to_short_id(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl AsRef<str> for ContentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(b"", "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391")]
    #[case(b"hello\n", "ce013625030ba8dba906f756967f9e9ca394464a")]
    fn hashes_bytes_like_git_blobs(#[case] data: &[u8], #[case] expected: &str) {
        assert_eq!(ContentId::of_bytes(data).as_ref(), expected);
    }

    #[test]
    fn short_id_is_seven_chars() {
        let id = ContentId::of_bytes(b"hello\n");
        assert_eq!(id.as_ref().len(), CONTENT_ID_LENGTH);
        assert_eq!(id.to_short_id(), "ce01362");
    }
}
