use crate::error::HdError;
use std::fmt;
use std::str::FromStr;

/// Index offset for hardened children, 2^31.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// One path segment. `index` is always below 2^31; the hardened offset is
/// applied by [`ChildIndex::raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildIndex {
    pub index: u32,
    pub hardened: bool,
}

impl ChildIndex {
    pub fn normal(index: u32) -> Result<Self, HdError> {
        Self::checked(index, false)
    }

    pub fn hardened(index: u32) -> Result<Self, HdError> {
        Self::checked(index, true)
    }

    fn checked(index: u32, hardened: bool) -> Result<Self, HdError> {
        if index >= HARDENED_OFFSET {
            return Err(HdError::InvalidIndex(index.to_string()));
        }
        Ok(ChildIndex { index, hardened })
    }

    /// The 32-bit index fed to HMAC, hardened offset included.
    pub fn raw(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED_OFFSET
        } else {
            self.index
        }
    }

    /// Next index in the same range, or `None` past 2^31 - 1.
    pub(crate) fn successor(&self) -> Option<Self> {
        let next = self.index.checked_add(1)?;
        Self::checked(next, self.hardened).ok()
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

/// A parsed path such as `m/44'/60'/0'/0/0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<ChildIndex>);

impl DerivationPath {
    pub fn master() -> Self {
        DerivationPath(Vec::new())
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn push(&mut self, child: ChildIndex) {
        self.0.push(child);
    }

    /// Raw indices with the hardened offset applied.
    pub fn to_raw(&self) -> Vec<u32> {
        self.0.iter().map(ChildIndex::raw).collect()
    }
}

impl FromStr for DerivationPath {
    type Err = HdError;

    /// Accepts exactly `m` / `M`, optionally followed by `/<digits>['?]`
    /// segments. Anything else is a format error; a well-formed segment whose
    /// number does not fit in 31 bits is an index error.
    fn from_str(s: &str) -> Result<Self, HdError> {
        let format_err = || HdError::InvalidPathFormat(s.to_string());

        let rest = match s.as_bytes().first() {
            Some(b'm') | Some(b'M') => &s[1..],
            _ => return Err(format_err()),
        };
        if rest.is_empty() {
            return Ok(DerivationPath::master());
        }
        let rest = rest.strip_prefix('/').ok_or_else(format_err)?;

        let mut indices = Vec::new();
        for part in rest.split('/') {
            let (digits, hardened) = match part.strip_suffix('\'') {
                Some(d) => (d, true),
                None => (part, false),
            };
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(format_err());
            }
            let index: u32 = digits
                .parse()
                .map_err(|_| HdError::InvalidIndex(part.to_string()))?;
            let child = ChildIndex::checked(index, hardened)
                .map_err(|_| HdError::InvalidIndex(part.to_string()))?;
            indices.push(child);
        }
        Ok(DerivationPath(indices))
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for child in &self.0 {
            write!(f, "/{child}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a DerivationPath {
    type Item = &'a ChildIndex;
    type IntoIter = std::slice::Iter<'a, ChildIndex>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Parse a path string into raw indices, hardened offset applied.
pub fn parse(path: &str) -> Result<Vec<u32>, HdError> {
    Ok(path.parse::<DerivationPath>()?.to_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_display_round_trip() {
        let dp: DerivationPath = "m/0'/1/2'/2/1000000000".parse().unwrap();
        let seq = vec![HARDENED_OFFSET, 1, HARDENED_OFFSET + 2, 2, 1000000000];
        assert_eq!(dp.to_raw(), seq);
        assert_eq!(dp.to_string(), "m/0'/1/2'/2/1000000000");
        assert_eq!(dp.depth(), 5);
    }

    #[test]
    fn master_only() {
        assert_eq!("m".parse::<DerivationPath>().unwrap().depth(), 0);
        assert_eq!("M".parse::<DerivationPath>().unwrap().depth(), 0);
        assert_eq!(DerivationPath::master().to_string(), "m");
        assert_eq!(parse("M/44'/60'").unwrap(), vec![HARDENED_OFFSET + 44, HARDENED_OFFSET + 60]);
    }

    #[test]
    fn malformed_paths() {
        for bad in [
            "m/abc", "0/0", "", "m/", "m//1", "m/1/", "/0", "x/0", "m0", "m/1''", "m/'1", "m/1h",
            "m/-1", "m/+1", " m/0", "m/0 ", "mm/0",
        ] {
            assert!(
                matches!(
                    bad.parse::<DerivationPath>(),
                    Err(HdError::InvalidPathFormat(_))
                ),
                "{bad:?} should be a format error"
            );
        }
    }

    #[test]
    fn index_bounds() {
        let max: DerivationPath = "m/2147483647'".parse().unwrap();
        assert_eq!(max.to_raw(), vec![u32::MAX]);

        let max_normal: DerivationPath = "m/2147483647".parse().unwrap();
        assert_eq!(max_normal.to_raw(), vec![HARDENED_OFFSET - 1]);

        assert_eq!(
            "m/2147483648".parse::<DerivationPath>().unwrap_err(),
            HdError::InvalidIndex("2147483648".into())
        );
        assert_eq!(
            "m/2147483648'".parse::<DerivationPath>().unwrap_err(),
            HdError::InvalidIndex("2147483648'".into())
        );
        assert!(matches!(
            "m/0/99999999999".parse::<DerivationPath>(),
            Err(HdError::InvalidIndex(_))
        ));
    }

    #[test]
    fn raw_index_conversions() {
        let c = ChildIndex::hardened(7).unwrap();
        assert_eq!(c.raw(), HARDENED_OFFSET + 7);
        assert_eq!(c.to_string(), "7'");
        assert!(ChildIndex::normal(HARDENED_OFFSET).is_err());
        assert_eq!(ChildIndex::normal(HARDENED_OFFSET - 1).unwrap().successor(), None);
        assert_eq!(
            ChildIndex::normal(3).unwrap().successor(),
            Some(ChildIndex::normal(4).unwrap())
        );
    }
}
