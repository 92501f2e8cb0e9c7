//! Smallest-position-value (SPV) decoding of continuous positions.
//!
//! The mapping is one-way and many-to-one: every position vector decodes to a
//! valid permutation, many position vectors decode to the same one.

use std::cmp::Ordering;

/// Decode a position vector into an ordering of its indices.
///
/// Indices are sorted by ascending `position[i]`. The sort is stable, so equal
/// values keep their original index order. NaN components of either sign sort
/// after every number and tie with each other, which keeps the output a bijection.
pub fn spv_permutation(position: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..position.len()).collect();
    order.sort_by(|&a, &b| compare_positions(position[a], position[b]));
    order
}

fn compare_positions(a: f64, b: f64) -> Ordering {
    // total_cmp separates -0.0 and 0.0; treat them as equal so the tie rule applies
    if a == b {
        return Ordering::Equal;
    }
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}

/// True when `order` contains every index in `0..n` exactly once.
pub fn is_permutation(order: &[usize], n: usize) -> bool {
    if order.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &idx in order {
        if idx >= n || seen[idx] {
            return false;
        }
        seen[idx] = true;
    }
    true
}
