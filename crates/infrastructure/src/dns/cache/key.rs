use localdns_domain::Question;
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 digest of a question's canonical form.
///
/// Fixed size and `Copy`, so it hashes and moves cheaply through the stores
/// no matter how long the queried name is.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    #[inline]
    pub fn for_question(question: &Question) -> Self {
        let digest = Sha256::digest(question.canonical().as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({})", self)
    }
}
