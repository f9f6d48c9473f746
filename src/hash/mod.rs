//! Content hash strategies
//!
//! Hashes fingerprint group inputs (cache keys), outputs (`ETag`) and, through the
//! hash-encoding naming strategies, output file names. All digests are lowercase hex.
//!
//! | alias | digest |
//! |---|---|
//! | `SHA-256` (default) | SHA-256 |
//! | `SHA-512` | SHA-512 |
//! | `BLAKE3` | BLAKE3 |

use std::sync::Arc;

use sha2::{Digest, Sha256, Sha512};

use crate::registry::{StrategyProvider, StrategyRegistry};

/// Configuration key selecting the hash strategy.
pub const HASH_STRATEGY: &str = "hash-strategy";

/// Computes a stable hex digest of content.
pub trait HashStrategy: Send + Sync {
    fn alias(&self) -> &str;

    fn get_hash(&self, content: &[u8]) -> String;
}

#[derive(Debug, Default)]
pub struct Sha256Hash;

impl Sha256Hash {
    pub const ALIAS: &'static str = "SHA-256";
}

impl HashStrategy for Sha256Hash {
    fn alias(&self) -> &str {
        Self::ALIAS
    }

    fn get_hash(&self, content: &[u8]) -> String {
        hex::encode(Sha256::digest(content))
    }
}

#[derive(Debug, Default)]
pub struct Sha512Hash;

impl Sha512Hash {
    pub const ALIAS: &'static str = "SHA-512";
}

impl HashStrategy for Sha512Hash {
    fn alias(&self) -> &str {
        Self::ALIAS
    }

    fn get_hash(&self, content: &[u8]) -> String {
        hex::encode(Sha512::digest(content))
    }
}

#[derive(Debug, Default)]
pub struct Blake3Hash;

impl Blake3Hash {
    pub const ALIAS: &'static str = "BLAKE3";
}

impl HashStrategy for Blake3Hash {
    fn alias(&self) -> &str {
        Self::ALIAS
    }

    fn get_hash(&self, content: &[u8]) -> String {
        blake3::hash(content).to_hex().to_string()
    }
}

/// Provider registering the built-in hash strategies.
#[must_use]
pub fn builtin_provider() -> StrategyProvider<Arc<dyn HashStrategy>> {
    StrategyProvider::new("builtin")
        .with(Sha256Hash::ALIAS, || Arc::new(Sha256Hash) as Arc<dyn HashStrategy>)
        .with(Sha512Hash::ALIAS, || Arc::new(Sha512Hash) as Arc<dyn HashStrategy>)
        .with(Blake3Hash::ALIAS, || Arc::new(Blake3Hash) as Arc<dyn HashStrategy>)
}

/// Strategy used when `hash-strategy` is not configured.
#[must_use]
pub fn default_strategy() -> Arc<dyn HashStrategy> {
    Arc::new(Sha256Hash)
}

/// Registry for `hash-strategy` over the built-in provider and `extra` providers.
#[must_use]
pub fn registry(
    extra: impl IntoIterator<Item = StrategyProvider<Arc<dyn HashStrategy>>>,
) -> StrategyRegistry<Arc<dyn HashStrategy>> {
    StrategyRegistry::from_providers(HASH_STRATEGY, std::iter::once(builtin_provider()).chain(extra))
}
