/// What the engine does when a child step yields `IL >= n` or a zero scalar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidChildPolicy {
    /// Leave the key and chain code untouched and move on to the next path
    /// segment. Keeps keys identical to those already derived by wallets that
    /// walked paths this way.
    #[default]
    Skip,
    /// BIP-32 behaviour: try `index + 1` in the same (hardened or normal) range.
    Retry,
}

/// Options for walking a derivation path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DerivationConfig {
    pub invalid_child: InvalidChildPolicy,
}

impl DerivationConfig {
    pub fn canonical() -> Self {
        DerivationConfig {
            invalid_child: InvalidChildPolicy::Retry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reproduces_fallthrough() {
        assert_eq!(
            DerivationConfig::default().invalid_child,
            InvalidChildPolicy::Skip
        );
        assert_eq!(
            DerivationConfig::canonical().invalid_child,
            InvalidChildPolicy::Retry
        );
    }
}
