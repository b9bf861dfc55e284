//! Zero-based page index parsing.

use serde::{Deserialize, Serialize};

/// Zero-based page index requested by a client.
///
/// Parsing is lenient: a missing, malformed, or negative value selects the
/// first page rather than failing the request.
///
/// # Examples
/// ```
/// use pagination::PageIndex;
///
/// assert_eq!(PageIndex::parse_lenient(Some("3")).get(), 3);
/// assert_eq!(PageIndex::parse_lenient(Some("three")).get(), 0);
/// assert_eq!(PageIndex::parse_lenient(None).get(), 0);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageIndex(u32);

impl PageIndex {
    /// The first page.
    pub const FIRST: Self = Self(0);

    /// Wrap an already validated index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Parse a raw query value, falling back to the first page.
    #[must_use]
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.trim().parse::<u32>().ok())
            .map_or(Self::FIRST, Self)
    }

    /// Numeric index value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for PageIndex {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("0"), 0)]
    #[case(Some("7"), 7)]
    #[case(Some(" 4 "), 4)]
    #[case(Some("-1"), 0)]
    #[case(Some("1.5"), 0)]
    #[case(Some("abc"), 0)]
    #[case(Some(""), 0)]
    #[case(None, 0)]
    fn parse_lenient_falls_back_to_first_page(#[case] raw: Option<&str>, #[case] expected: u32) {
        assert_eq!(PageIndex::parse_lenient(raw).get(), expected);
    }

    #[rstest]
    fn serialises_as_bare_number() {
        let json = serde_json::to_string(&PageIndex::new(2)).expect("serialise index");
        assert_eq!(json, "2");
    }
}
