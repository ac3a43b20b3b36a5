// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Distance vector arithmetic.
//!
//! A distance vector holds one counter per filter ("filter space"). Every
//! operation takes a `horizon`: entries at or past it belong to hopeless
//! filters and are never touched. [`project_at`] works on an explicit index
//! subset instead, for sparse multi-filter refreshes.

use smallvec::SmallVec;
use smallvec::smallvec;

/// Per-filter counters. Eight filters fit inline.
pub type Distance = SmallVec<[i32; 8]>;

/// A zeroed vector of the given width.
pub fn zero(width: usize) -> Distance {
    return smallvec![0; width];
}

pub fn add(target: &mut [i32], source: &[i32], horizon: usize) {
    for filter in 0..horizon {
        target[filter] += source[filter];
    }
}

pub fn sub(target: &mut [i32], source: &[i32], horizon: usize) {
    for filter in 0..horizon {
        target[filter] -= source[filter];
    }
}

/// `target += multiplier * source`. A zero multiplier is a no-op.
pub fn add_scaled(target: &mut [i32], multiplier: i32, source: &[i32], horizon: usize) {
    if multiplier == 0 {
        return;
    }
    for filter in 0..horizon {
        target[filter] += multiplier * source[filter];
    }
}

pub fn set(target: &mut [i32], source: &[i32], horizon: usize) {
    target[..horizon].copy_from_slice(&source[..horizon]);
}

/// True when no filter below the horizon is affected.
pub fn is_zero(vector: &[i32], horizon: usize) -> bool {
    return vector[..horizon].iter().all(|&count| count == 0);
}

/// Evaluate filters `0..horizon` in increasing order, writing 1 or 0 per
/// filter. `accept` receives the target itself as the precomputed vector, so
/// a filter may read the already-written entries of lower index.
pub fn project<F>(target: &mut [i32], horizon: usize, mut accept: F)
where
    F: FnMut(usize, &[i32]) -> bool,
{
    for filter in 0..horizon {
        let passed = accept(filter, target);
        target[filter] = passed as i32;
    }
}

/// Like [`project`] but only for the listed filters, which must be sorted.
pub fn project_at<F>(target: &mut [i32], indices: &[usize], mut accept: F)
where
    F: FnMut(usize, &[i32]) -> bool,
{
    for &filter in indices {
        let passed = accept(filter, target);
        target[filter] = passed as i32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_respects_horizon() {
        let mut target = [1, 2, 3, 4];
        add(&mut target, &[1, 1, 1, 1], 3);
        assert_eq!(target, [2, 3, 4, 4]);
        sub(&mut target, &[2, 2, 2, 2], 2);
        assert_eq!(target, [0, 1, 4, 4]);
        set(&mut target, &[9, 9, 9, 9], 1);
        assert_eq!(target, [9, 1, 4, 4]);
    }

    #[test]
    fn scaled_addition() {
        let mut target = [5, 5, 5];
        add_scaled(&mut target, -1, &[1, 0, 2], 3);
        assert_eq!(target, [4, 5, 3]);
        add_scaled(&mut target, 0, &[100, 100, 100], 3);
        assert_eq!(target, [4, 5, 3]);
    }

    #[test]
    fn zero_check_ignores_hopeless_tail() {
        assert!(is_zero(&[0, 0, 5], 2));
        assert!(!is_zero(&[0, 1, 0], 2));
        assert!(is_zero(&[3], 0));
    }

    #[test]
    fn projection_sees_lower_entries() {
        // filter 2 passes when filters 0 and 1 both passed
        let mut target = zero(3);
        project(&mut target, 3, |filter, precomputed| match filter {
            0 => true,
            1 => true,
            _ => precomputed[0] == 1 && precomputed[1] == 1,
        });
        assert_eq!(target.as_slice(), &[1, 1, 1]);

        let mut target = zero(3);
        project(&mut target, 3, |filter, precomputed| match filter {
            0 => true,
            1 => false,
            _ => precomputed[0] == 1 && precomputed[1] == 1,
        });
        assert_eq!(target.as_slice(), &[1, 0, 0]);
    }

    #[test]
    fn sparse_projection_keeps_other_entries() {
        let mut target: Distance = smallvec![1, 1, 1, 1];
        project_at(&mut target, &[2], |_, _| false);
        assert_eq!(target.as_slice(), &[1, 1, 0, 1]);
    }
}
