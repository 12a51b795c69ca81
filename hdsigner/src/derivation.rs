use crate::config::{DerivationConfig, InvalidChildPolicy};
use crate::error::{HdError, Result};
use crate::extended_key::{DerivationStep, ExtendedKey};
use crate::path::{ChildIndex, DerivationPath};
use crate::seed::Seed;
use tracing::debug;

impl ExtendedKey {
    /// Walk `path` starting from this key.
    pub fn derive_path(
        &self,
        path: &DerivationPath,
        config: &DerivationConfig,
    ) -> Result<ExtendedKey> {
        walk(self.duplicate()?, path, config, |key, child| {
            key.derive_child(child)
        })
    }
}

/// Drive `step` over every segment of `path`, applying the configured
/// invalid-child policy. The previous key is dropped (and wiped) as soon as
/// its successor exists.
fn walk<F>(
    start: ExtendedKey,
    path: &DerivationPath,
    config: &DerivationConfig,
    mut step: F,
) -> Result<ExtendedKey>
where
    F: FnMut(&ExtendedKey, ChildIndex) -> Result<DerivationStep>,
{
    let mut current = start;
    for &child in path {
        current = match config.invalid_child {
            InvalidChildPolicy::Skip => match step(&current, child)? {
                DerivationStep::Valid(next) => next,
                DerivationStep::Skipped => {
                    current.record_skipped(child);
                    current
                }
            },
            InvalidChildPolicy::Retry => {
                let mut candidate = child;
                loop {
                    match step(&current, candidate)? {
                        DerivationStep::Valid(next) => break next,
                        DerivationStep::Skipped => {
                            candidate = candidate
                                .successor()
                                .ok_or(HdError::IndexExhausted(candidate.raw()))?;
                            debug!(index = %candidate, "retrying with next child index");
                        }
                    }
                }
            }
        };
    }
    Ok(current)
}

/// Master key from `seed`, then every segment of `path`.
///
/// The path is parsed first so a malformed path fails before any key
/// material exists.
pub fn derive_full_path(seed: &Seed, path: &str, config: &DerivationConfig) -> Result<ExtendedKey> {
    let path: DerivationPath = path.parse()?;
    let master = ExtendedKey::new_master(seed)?;
    let key = walk(master, &path, config, |key, child| key.derive_child(child))?;
    debug!(path = %key.path(), "key derived");
    Ok(key)
}

/// Derive the key at `path` from raw seed bytes with the default policy.
pub fn derive_key(seed: &[u8], path: &str) -> Result<ExtendedKey> {
    derive_full_path(&Seed::from(seed), path, &DerivationConfig::default())
}
