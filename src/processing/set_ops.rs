//! Set algebra over merged address sets.
//!
//! Difference and intersection are two-pointer sweeps over the sorted ranges
//! of both sets. Containment classifies individual items against a merged set
//! by binary search.

use super::merge::MergedSet;
use crate::error::Error;
use crate::models::{AddressFamily, CidrBlock, Range};
use serde::Serialize;

/// Addresses of `a` that are not in `b`.
///
/// # Returns
/// * `Ok(MergedSet)` - The residual ranges in address order
/// * `Err(Error::FamilyMismatch)` - `a` and `b` are non-empty sets of different families
pub fn difference(a: &MergedSet, b: &MergedSet) -> Result<MergedSet, Error> {
    let Some(family) = a.common_family(b)? else {
        return Ok(MergedSet::empty());
    };

    let subtrahend = b.ranges();
    let mut residuals = Vec::new();
    let mut j = 0;

    for range in a {
        // skip B ranges that end before this A range starts
        while j < subtrahend.len() && subtrahend[j].last_value() < range.first_value() {
            j += 1;
        }

        let mut next = range.first_value();
        let mut exhausted = false;
        for cut in subtrahend[j..]
            .iter()
            .take_while(|cut| cut.first_value() <= range.last_value())
        {
            if cut.first_value() > next {
                residuals.push(Range::from_parts(family, next, cut.first_value() - 1));
            }
            if cut.last_value() >= range.last_value() {
                exhausted = true;
                break;
            }
            next = cut.last_value() + 1;
        }
        if !exhausted {
            residuals.push(Range::from_parts(family, next, range.last_value()));
        }
    }

    log::debug!(
        "difference of {} and {} {family} range(s) left {} range(s)",
        a.len(),
        b.len(),
        residuals.len()
    );
    Ok(MergedSet::from_sorted(family, residuals))
}

/// Addresses present in both `a` and `b`.
///
/// # Returns
/// * `Err(Error::FamilyMismatch)` - `a` and `b` are non-empty sets of different families
pub fn intersection(a: &MergedSet, b: &MergedSet) -> Result<MergedSet, Error> {
    let Some(family) = a.common_family(b)? else {
        return Ok(MergedSet::empty());
    };

    let (left, right) = (a.ranges(), b.ranges());
    let (mut i, mut j) = (0, 0);
    let mut overlaps = Vec::new();

    while i < left.len() && j < right.len() {
        let (l, r) = (&left[i], &right[j]);
        if l.intersects(r) {
            let first = l.first_value().max(r.first_value());
            let last = l.last_value().min(r.last_value());
            overlaps.push(Range::from_parts(family, first, last));
        }
        if l.last_value() < r.last_value() {
            i += 1;
        } else {
            j += 1;
        }
    }

    log::debug!("intersection has {} {family} range(s)", overlaps.len());
    Ok(MergedSet::from_sorted(family, overlaps))
}

/// [`difference`] decomposed into exact CIDR blocks.
pub fn difference_cidrs(a: &MergedSet, b: &MergedSet) -> Result<Vec<CidrBlock>, Error> {
    Ok(difference(a, b)?.to_cidrs())
}

/// [`intersection`] decomposed into exact CIDR blocks.
pub fn intersection_cidrs(a: &MergedSet, b: &MergedSet) -> Result<Vec<CidrBlock>, Error> {
    Ok(intersection(a, b)?.to_cidrs())
}

/// How one item relates to a merged set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum ContainmentStatus {
    FullyContained,
    PartiallyOverlapping,
    Disjoint,
}

/// Classification of one original item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Containment {
    pub item: Range,
    pub status: ContainmentStatus,
    /// Number of the item's addresses inside the set, `None` if it overflows `u128`.
    pub covered: Option<u128>,
}

/// Classify every item against the merged set `a`.
///
/// Items keep their original order and granularity, so overlapping or
/// duplicated items each get their own entry.
///
/// # Returns
/// * `Ok(report)` - One [`Containment`] per item
/// * `Err(Error::FamilyMismatch)` - An item's family differs from `a` or from the other items
pub fn containment(a: &MergedSet, items: &[Range]) -> Result<Vec<Containment>, Error> {
    let family: Option<AddressFamily> = a.family().or(items.first().map(|r| r.family()));
    if let Some(family) = family {
        for item in items {
            family.ensure(item.family())?;
        }
    }

    let report: Vec<Containment> = items.iter().map(|item| classify(a.ranges(), item)).collect();
    log::debug!(
        "classified {} item(s) against {} range(s)",
        report.len(),
        a.len()
    );
    Ok(report)
}

fn classify(ranges: &[Range], item: &Range) -> Containment {
    let start = ranges.partition_point(|r| r.last_value() < item.first_value());
    let overlapping = ranges[start..]
        .iter()
        .take_while(|r| r.first_value() <= item.last_value());

    let mut covered: Option<u128> = Some(0);
    let mut hits = 0usize;
    for r in overlapping {
        hits += 1;
        let first = r.first_value().max(item.first_value());
        let last = r.last_value().min(item.last_value());
        covered = covered.and_then(|c| c.checked_add((last - first).checked_add(1)?));
    }

    // ranges are non-adjacent, so full containment means a single range holds the item
    let status = match ranges.get(start) {
        Some(r) if hits == 1 && r.contains(item) => ContainmentStatus::FullyContained,
        _ if hits > 0 => ContainmentStatus::PartiallyOverlapping,
        _ => ContainmentStatus::Disjoint,
    };
    Containment {
        item: *item,
        status,
        covered,
    }
}
