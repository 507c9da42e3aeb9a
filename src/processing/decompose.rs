//! Range to CIDR decomposition.
//!
//! Covers one contiguous range with the fewest CIDR blocks, exactly.

use crate::models::{alignment, CidrBlock, Range};

/// Decompose a range into the minimal ordered list of CIDR blocks covering it.
///
/// Each step emits the biggest block that both starts aligned at the current
/// address and does not run past the end of the range.
///
/// # Examples
/// ```
/// use cidr_algebra::models::{parse_address, Range};
/// use cidr_algebra::processing::decompose;
///
/// let range = Range::new(
///     parse_address("10.0.0.0").unwrap(),
///     parse_address("10.0.0.255").unwrap(),
/// )
/// .unwrap();
/// let blocks = decompose(&range);
/// assert_eq!(blocks.len(), 1);
/// assert_eq!(blocks[0].to_string(), "10.0.0.0/24");
/// ```
pub fn decompose(range: &Range) -> Vec<CidrBlock> {
    let family = range.family();
    let width = family.bits();
    let last = range.last_value();
    let mut next = range.first_value();
    let mut blocks = Vec::new();

    loop {
        let host_bits = alignment(family, next).min(biggest_fit(last - next));
        let prefix = width - host_bits;
        let block = CidrBlock::from_parts(family, next, prefix);
        let block_last = block.last_value();
        log::trace!("decompose {range}: emit {block}");
        blocks.push(block);

        if block_last >= last {
            break;
        }
        // block_last < last <= family max, so this cannot overflow
        next = block_last + 1;
    }

    blocks
}

/// Host bits of the largest power-of-two block that fits `span + 1` addresses.
///
/// Takes the span (`last - first`) so the whole IPv6 space needs no 129-bit count.
fn biggest_fit(span: u128) -> u8 {
    match span.checked_add(1) {
        Some(count) => (127 - count.leading_zeros()) as u8,
        None => 128,
    }
}

/// Decompose every range in order.
pub fn decompose_all<'a, I>(ranges: I) -> Vec<CidrBlock>
where
    I: IntoIterator<Item = &'a Range>,
{
    ranges.into_iter().flat_map(decompose).collect()
}
