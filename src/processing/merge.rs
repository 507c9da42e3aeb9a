//! Interval merging into a canonical [`MergedSet`].

use super::decompose::decompose_all;
use crate::error::Error;
use crate::models::{Address, AddressFamily, CidrBlock, Range};
use itertools::Itertools;
use serde::Serialize;

/// Sorted, non-overlapping, non-adjacent ranges of a single family.
///
/// For consecutive ranges `a`, `b`: `a.last + 1 < b.first`. The family is
/// `None` only for the empty set, which is compatible with either family.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MergedSet {
    family: Option<AddressFamily>,
    ranges: Vec<Range>,
}

impl MergedSet {
    pub fn empty() -> MergedSet {
        MergedSet::default()
    }

    /// Wrap ranges already known to satisfy the set invariant.
    pub(crate) fn from_sorted(family: AddressFamily, ranges: Vec<Range>) -> MergedSet {
        debug_assert!(ranges.iter().all(|r| r.family() == family));
        debug_assert!(ranges
            .windows(2)
            .all(|w| w[0].last_value().saturating_add(1) < w[1].first_value()));
        MergedSet {
            family: (!ranges.is_empty()).then_some(family),
            ranges,
        }
    }

    pub fn family(&self) -> Option<AddressFamily> {
        self.family
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Range> {
        self.ranges.iter()
    }

    /// The range holding `address`, found by binary search.
    pub fn find(&self, address: &Address) -> Option<&Range> {
        if self.family != Some(address.family()) {
            return None;
        }
        let value = address.value();
        let idx = self.ranges.partition_point(|r| r.last_value() < value);
        self.ranges
            .get(idx)
            .filter(|r| r.first_value() <= value)
    }

    pub fn contains_address(&self, address: &Address) -> bool {
        self.find(address).is_some()
    }

    /// Total number of addresses, `None` only for the whole IPv6 space.
    pub fn address_count(&self) -> Option<u128> {
        self.ranges
            .iter()
            .try_fold(0u128, |acc, r| acc.checked_add(r.address_count()?))
    }

    /// Exact CIDR decomposition of every range, in address order.
    pub fn to_cidrs(&self) -> Vec<CidrBlock> {
        decompose_all(&self.ranges)
    }

    /// Family shared with `other`, failing when both are non-empty and differ.
    pub fn common_family(&self, other: &MergedSet) -> Result<Option<AddressFamily>, Error> {
        match (self.family, other.family) {
            (Some(a), Some(b)) => {
                a.ensure(b)?;
                Ok(Some(a))
            }
            (a, b) => Ok(a.or(b)),
        }
    }
}

impl<'a> IntoIterator for &'a MergedSet {
    type Item = &'a Range;
    type IntoIter = std::slice::Iter<'a, Range>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

/// Merge ranges of one family into a [`MergedSet`].
///
/// Overlapping and directly adjacent ranges are fused. The result does not
/// depend on input order, and merging a merged set changes nothing.
///
/// # Returns
/// * `Ok(MergedSet)` - The merged ranges
/// * `Err(Error::FamilyMismatch)` - The input mixes IPv4 and IPv6
pub fn merge(ranges: &[Range]) -> Result<MergedSet, Error> {
    let Some(family) = ranges.first().map(|r| r.family()) else {
        return Ok(MergedSet::empty());
    };
    for r in ranges {
        family.ensure(r.family())?;
    }
    Ok(merge_family(family, ranges.iter().copied()))
}

/// Merge ranges the caller has already grouped by family.
pub(crate) fn merge_family<I>(family: AddressFamily, ranges: I) -> MergedSet
where
    I: IntoIterator<Item = Range>,
{
    let merged: Vec<Range> = ranges
        .into_iter()
        .sorted_by_key(|r| (r.first_value(), r.last_value()))
        .coalesce(|acc, next| {
            if acc.touches(&next) {
                let last = acc.last_value().max(next.last_value());
                Ok(Range::from_parts(family, acc.first_value(), last))
            } else {
                Err((acc, next))
            }
        })
        .collect();
    log::debug!("merged into {} {family} range(s)", merged.len());
    MergedSet::from_sorted(family, merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_address;
    use pretty_assertions::assert_eq;

    fn range(a: &str, b: &str) -> Range {
        Range::new(parse_address(a).unwrap(), parse_address(b).unwrap()).unwrap()
    }

    fn strings(set: &MergedSet) -> Vec<String> {
        set.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_merge_overlap_and_adjacent() {
        let ranges = vec![
            range("10.0.0.50", "10.0.0.150"),
            range("10.0.0.0", "10.0.0.99"),
            range("10.0.0.151", "10.0.0.160"),
            range("10.0.1.0", "10.0.1.9"),
        ];
        let merged = merge(&ranges).unwrap();
        assert_eq!(
            strings(&merged),
            vec!["10.0.0.0-10.0.0.160", "10.0.1.0-10.0.1.9"]
        );
        assert_eq!(merged.family(), Some(AddressFamily::V4));
    }

    #[test]
    fn test_merge_adjacent_at_top_of_space() {
        let ranges = vec![
            range("255.255.255.255", "255.255.255.255"),
            range("255.255.255.0", "255.255.255.254"),
            range("ffff:ffff:ffff:ffff:ffff:ffff:ffff:ff00", "ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff"),
        ];
        assert_eq!(strings(&merge(&ranges[..2]).unwrap()), vec!["255.255.255.0-255.255.255.255"]);
        let v6 = vec![ranges[2], ranges[2]];
        assert_eq!(merge(&v6).unwrap().len(), 1, "identical ranges at the maximum fuse");
    }

    #[test]
    fn test_merge_contained_and_duplicates() {
        let ranges = vec![
            range("10.0.0.0", "10.0.0.255"),
            range("10.0.0.10", "10.0.0.20"),
            range("10.0.0.0", "10.0.0.255"),
        ];
        assert_eq!(strings(&merge(&ranges).unwrap()), vec!["10.0.0.0-10.0.0.255"]);
    }

    #[test]
    fn test_merge_idempotent_and_order_independent() {
        let ranges = vec![
            range("10.0.0.64", "10.0.0.127"),
            range("10.0.0.200", "10.0.0.210"),
            range("10.0.0.0", "10.0.0.63"),
            range("10.0.0.128", "10.0.0.128"),
            range("10.0.0.205", "10.0.0.220"),
        ];
        let once = merge(&ranges).unwrap();
        let twice = merge(once.ranges()).unwrap();
        assert_eq!(once, twice);

        let mut reversed = ranges.clone();
        reversed.reverse();
        assert_eq!(merge(&reversed).unwrap(), once);
        assert_eq!(
            strings(&once),
            vec!["10.0.0.0-10.0.0.128", "10.0.0.200-10.0.0.220"]
        );
    }

    #[test]
    fn test_merge_top_of_ipv6_space() {
        let ranges = vec![
            range("ffff:ffff:ffff:ffff:ffff:ffff:ffff:fff0", "ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff"),
            range("ffff:ffff:ffff:ffff:ffff:ffff:ffff:ff00", "ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff"),
        ];
        let merged = merge(&ranges).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.address_count(), Some(256));
    }

    #[test]
    fn test_merge_rejects_mixed_families() {
        let ranges = vec![range("10.0.0.1", "10.0.0.1"), range("::1", "::1")];
        assert_eq!(
            merge(&ranges),
            Err(Error::FamilyMismatch {
                expected: AddressFamily::V4,
                found: AddressFamily::V6
            })
        );
    }

    #[test]
    fn test_merge_empty() {
        let merged = merge(&[]).unwrap();
        assert!(merged.is_empty());
        assert_eq!(merged.family(), None);
        assert_eq!(merged.address_count(), Some(0));
    }

    #[test]
    fn test_find() {
        let merged = merge(&[
            range("10.0.0.0", "10.0.0.9"),
            range("10.0.0.20", "10.0.0.29"),
        ])
        .unwrap();
        let hit = merged.find(&parse_address("10.0.0.25").unwrap());
        assert_eq!(hit, Some(&range("10.0.0.20", "10.0.0.29")));
        assert!(!merged.contains_address(&parse_address("10.0.0.15").unwrap()));
        assert!(!merged.contains_address(&parse_address("10.0.0.30").unwrap()));
        assert!(!merged.contains_address(&parse_address("::a").unwrap()));
    }

    #[test]
    fn test_common_family() {
        let v4 = merge(&[range("10.0.0.0", "10.0.0.9")]).unwrap();
        let v6 = merge(&[range("::1", "::2")]).unwrap();
        assert_eq!(v4.common_family(&MergedSet::empty()), Ok(Some(AddressFamily::V4)));
        assert_eq!(MergedSet::empty().common_family(&v6), Ok(Some(AddressFamily::V6)));
        assert!(v4.common_family(&v6).is_err());
    }

    #[test]
    fn test_to_cidrs() {
        let merged = merge(&[
            range("10.0.0.0", "10.0.0.127"),
            range("10.0.0.128", "10.0.0.255"),
        ])
        .unwrap();
        let blocks: Vec<String> = merged.to_cidrs().iter().map(|b| b.to_string()).collect();
        assert_eq!(blocks, vec!["10.0.0.0/24"]);
    }
}
