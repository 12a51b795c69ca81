use crate::config::DerivationConfig;
use crate::derivation::derive_full_path;
use crate::error::Result;
use crate::path::DerivationPath;
use crate::secret::Dispose;
use crate::seed::Seed;
use crate::signing::{Signature, SigningKey};
use secp256k1::PublicKey;
use tracing::info;

/// One signing account at a fixed path.
///
/// Holds only the leaf signing key; the intermediate extended keys are wiped
/// as soon as derivation finishes. Disposing the account disposes its key.
#[derive(Debug)]
pub struct Account {
    path: DerivationPath,
    signing_key: SigningKey,
}

impl Account {
    pub fn derive(seed: &Seed, path: &str, config: &DerivationConfig) -> Result<Self> {
        let mut key = derive_full_path(seed, path, config)?;
        let signing_key = SigningKey::from_extended_key(&key)?;
        let path = key.path().clone();
        key.dispose();
        let account = Account { path, signing_key };
        info!(path = %account.path, "account opened");
        Ok(account)
    }

    pub fn path(&self) -> &DerivationPath {
        &self.path
    }

    pub fn public_key(&self) -> Result<PublicKey> {
        self.signing_key.public_key()
    }

    pub fn sign_digest(&self, digest: &[u8]) -> Result<Signature> {
        self.signing_key.sign(digest)
    }

    pub fn sign_message(&self, message: &[u8]) -> Result<Signature> {
        self.signing_key.sign_message(message)
    }
}

impl Dispose for Account {
    fn dispose(&mut self) {
        if !self.signing_key.is_disposed() {
            info!(path = %self.path, "account closed");
        }
        self.signing_key.dispose();
    }

    fn is_disposed(&self) -> bool {
        self.signing_key.is_disposed()
    }
}
