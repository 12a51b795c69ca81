//! BIP-32 key derivation over secp256k1 with explicit secret lifecycles.
//!
//! Keys are derived from a [`Seed`] along a [`DerivationPath`] into an
//! [`ExtendedKey`], turned into a [`SigningKey`], and wiped with
//! [`Dispose::dispose`] (or on drop) when no longer needed.

pub mod account;
pub mod config;
pub mod curve;
pub mod derivation;
pub mod error;
pub mod extended_key;
pub mod path;
pub mod secret;
pub mod seed;
pub mod signing;

pub use account::Account;
pub use config::{DerivationConfig, InvalidChildPolicy};
pub use curve::{CurveParameters, SECP256K1_PARAMS};
pub use derivation::{derive_full_path, derive_key};
pub use error::{HdError, Result};
pub use extended_key::{DerivationStep, ExtendedKey};
pub use path::{ChildIndex, DerivationPath, HARDENED_OFFSET};
pub use secret::{Dispose, SecretBuffer};
pub use seed::Seed;
pub use signing::{KeyPairSnapshot, Signature, SigningKey, verify};
