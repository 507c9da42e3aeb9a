//! Splitting a CIDR block into equal-sized children.

use crate::error::{Error, PrefixError};
use crate::models::{AddressFamily, CidrBlock};

/// Split `parent` into at least `count` equal children.
///
/// `count` is rounded up to the next power of two, so asking for 3 parts of
/// a /24 yields four /26 blocks. A count of 1 returns the parent itself.
///
/// # Returns
/// * `Ok(children)` - Lazy iterator over the children in ascending address order
/// * `Err(Error::InvalidSplitCount)` - `count` is zero
/// * `Err(Error::UnrepresentableSplit)` - The children would be smaller than one address
pub fn split_by_count(parent: &CidrBlock, count: usize) -> Result<Subnets, Error> {
    if count == 0 {
        return Err(Error::InvalidSplitCount);
    }
    // ceil(log2(count)) without rounding count itself up, which could overflow
    let extra_bits = usize::BITS - (count - 1).leading_zeros();
    let child_prefix = parent.prefix() as u16 + extra_bits as u16;
    log::debug!("split {parent} into {count} part(s): /{child_prefix}");
    check_representable(parent, child_prefix)?;
    Ok(Subnets::new(parent, child_prefix as u8))
}

/// Split `parent` into every child block of length `child_prefix`.
///
/// # Returns
/// * `Ok(children)` - Lazy iterator over the children in ascending address order
/// * `Err(Error::InvalidPrefix)` - `child_prefix` is not longer than the parent's
/// * `Err(Error::UnrepresentableSplit)` - `child_prefix` exceeds the family width
pub fn split_by_prefix(parent: &CidrBlock, child_prefix: u16) -> Result<Subnets, Error> {
    if child_prefix <= parent.prefix() as u16 {
        return Err(PrefixError::NotLongerThanParent {
            parent: *parent,
            child: child_prefix,
        }
        .into());
    }
    check_representable(parent, child_prefix)?;
    Ok(Subnets::new(parent, child_prefix as u8))
}

fn check_representable(parent: &CidrBlock, child_prefix: u16) -> Result<(), Error> {
    if child_prefix > parent.family().bits() as u16 {
        return Err(Error::UnrepresentableSplit {
            parent: *parent,
            child_prefix,
        });
    }
    Ok(())
}

/// The equal-sized children of a block, produced one at a time.
///
/// Nothing is allocated up front, so even `::/0` split into `/128` blocks is
/// a valid (if endless in practice) iteration.
#[derive(Debug, Clone)]
pub struct Subnets {
    family: AddressFamily,
    prefix: u8,
    /// Base of the next child, `None` once the parent is exhausted.
    next: Option<u128>,
    /// Base of the last child.
    last_base: u128,
    /// `child_size - 1`; the size itself is 2^128 for a `/0` child.
    host_mask: u128,
}

impl Subnets {
    fn new(parent: &CidrBlock, child_prefix: u8) -> Subnets {
        let family = parent.family();
        let host_bits = family.bits() - child_prefix;
        let host_mask = if host_bits == 128 {
            u128::MAX
        } else {
            (1u128 << host_bits) - 1
        };
        Subnets {
            family,
            prefix: child_prefix,
            next: Some(parent.first_value()),
            last_base: parent.last_value() & !host_mask,
            host_mask,
        }
    }

    /// Prefix length of every child.
    pub fn child_prefix(&self) -> u8 {
        self.prefix
    }

    /// Children not yet produced, `None` when the count is 2^128.
    pub fn remaining(&self) -> Option<u128> {
        let Some(base) = self.next else {
            return Some(0);
        };
        let steps = (self.last_base - base)
            .checked_shr(self.host_mask.count_ones())
            .unwrap_or(0);
        steps.checked_add(1)
    }
}

impl Iterator for Subnets {
    type Item = CidrBlock;

    fn next(&mut self) -> Option<CidrBlock> {
        let base = self.next?;
        self.next = if base == self.last_base {
            None
        } else {
            Some(base + self.host_mask + 1)
        };
        Some(CidrBlock::from_parts(self.family, base, self.prefix))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining().and_then(|n| usize::try_from(n).ok()) {
            Some(n) => (n, Some(n)),
            None => (usize::MAX, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(s: &str) -> CidrBlock {
        s.parse().unwrap()
    }

    fn strings(blocks: &[CidrBlock]) -> Vec<String> {
        blocks.iter().map(|b| b.to_string()).collect()
    }

    fn by_count(parent: &CidrBlock, count: usize) -> Vec<CidrBlock> {
        split_by_count(parent, count).unwrap().collect()
    }

    fn by_prefix(parent: &CidrBlock, prefix: u16) -> Vec<CidrBlock> {
        split_by_prefix(parent, prefix).unwrap().collect()
    }

    /// Children are contiguous, equal-sized and tile the parent exactly.
    fn assert_tiles(parent: &CidrBlock, children: &[CidrBlock]) {
        assert_eq!(children.first().unwrap().first(), parent.first());
        assert_eq!(children.last().unwrap().last(), parent.last());
        for pair in children.windows(2) {
            assert_eq!(pair[0].prefix(), pair[1].prefix());
            assert_eq!(pair[0].last_value() + 1, pair[1].first_value());
        }
        assert!(children.iter().all(|c| parent.contains_block(c)));
    }

    #[test]
    fn test_split_by_count_four() {
        let parent = block("192.168.1.0/24");
        let children = by_count(&parent, 4);
        assert_eq!(
            strings(&children),
            vec![
                "192.168.1.0/26",
                "192.168.1.64/26",
                "192.168.1.128/26",
                "192.168.1.192/26"
            ]
        );
        assert_tiles(&parent, &children);
    }

    #[test]
    fn test_split_by_count_rounds_up() {
        let parent = block("10.0.0.0/16");
        let children = by_count(&parent, 5);
        assert_eq!(children.len(), 8);
        assert_eq!(children[0].prefix(), 19);
        assert_tiles(&parent, &children);

        assert_eq!(by_count(&parent, 1), vec![parent]);
        assert!(matches!(
            split_by_count(&parent, 0),
            Err(Error::InvalidSplitCount)
        ));
    }

    #[test]
    fn test_split_by_count_unrepresentable() {
        let parent = block("10.0.0.0/31");
        let err = split_by_count(&parent, 4).unwrap_err();
        assert_eq!(
            err,
            Error::UnrepresentableSplit {
                parent,
                child_prefix: 33
            }
        );
        assert_eq!(by_count(&parent, 2).len(), 2);
        assert!(matches!(
            split_by_count(&block("10.0.0.0/8"), usize::MAX),
            Err(Error::UnrepresentableSplit { .. })
        ));
    }

    #[test]
    fn test_split_by_prefix() {
        let parent = block("10.0.0.0/22");
        let children = by_prefix(&parent, 24);
        assert_eq!(
            strings(&children),
            vec!["10.0.0.0/24", "10.0.1.0/24", "10.0.2.0/24", "10.0.3.0/24"]
        );
        assert_tiles(&parent, &children);

        let parent = block("2001:db8::/48");
        let children = by_prefix(&parent, 52);
        assert_eq!(children.len(), 16);
        assert_eq!(children[1].to_string(), "2001:db8:0:1000::/52");
        assert_tiles(&parent, &children);
    }

    #[test]
    fn test_split_by_prefix_invalid() {
        let parent = block("10.0.0.0/24");
        assert_eq!(
            split_by_prefix(&parent, 24).unwrap_err(),
            Error::InvalidPrefix(PrefixError::NotLongerThanParent {
                parent,
                child: 24
            })
        );
        assert!(matches!(
            split_by_prefix(&parent, 33),
            Err(Error::UnrepresentableSplit { child_prefix: 33, .. })
        ));
    }

    #[test]
    fn test_split_large_count_is_not_capped() {
        let parent = block("10.0.0.0/8");
        let children = by_count(&parent, 131_072);
        assert_eq!(children.len(), 131_072, "Expected every /25 of the /8");
        assert_eq!(children[0].to_string(), "10.0.0.0/25");
        assert_eq!(children[131_071].to_string(), "10.255.255.128/25");
        assert_tiles(&parent, &children);

        let v6 = split_by_prefix(&block("2001:db8::/32"), 49).unwrap();
        assert_eq!(v6.remaining(), Some(131_072));
        assert_eq!(v6.child_prefix(), 49);
    }

    #[test]
    fn test_split_whole_space_is_lazy() {
        let mut children = split_by_prefix(&block("::/0"), 128).unwrap();
        assert_eq!(children.remaining(), None, "2^128 children do not fit u128");
        assert_eq!(children.size_hint(), (usize::MAX, None));
        assert_eq!(children.next().unwrap().to_string(), "::/128");
        assert_eq!(children.next().unwrap().to_string(), "::1/128");
        assert_eq!(children.remaining(), Some(u128::MAX - 1));

        let top: Vec<CidrBlock> = split_by_prefix(&block("255.255.255.252/30"), 32)
            .unwrap()
            .collect();
        assert_eq!(top.last().unwrap().to_string(), "255.255.255.255/32");
        assert_eq!(top.len(), 4);
        assert_eq!(by_count(&block("::/0"), 1), vec![block("::/0")]);
    }
}
