//! Semimajor-axis shells.
//!
//! Bodies are binned into uniform bands over the LEO range so collision
//! checks only compare bodies that could plausibly be near each other
//! radially. The margin deliberately overlaps adjacent bands: a body near a
//! boundary is compared against neighbors on both sides.

use crate::units::Length;

#[derive(Debug, Clone)]
pub struct ShellIndex {
    r_min: Length,
    r_max: Length,
    count: usize,
    /// Band width [m]; uniform linear spacing over `[r_min, r_max]`.
    width_m: f64,
    /// Overlap margin [m], `width * margin_fraction`.
    margin_m: f64,
}

impl ShellIndex {
    pub fn new(count: usize, r_min: Length, r_max: Length, margin_fraction: f64) -> Self {
        assert!(count >= 1, "need at least one shell");
        assert!(
            r_min < r_max,
            "degenerate shell range [{:?}, {:?}]",
            r_min,
            r_max
        );
        let width_m = (r_max.as_meters() - r_min.as_meters()) / count as f64;
        ShellIndex {
            r_min,
            r_max,
            count,
            width_m,
            margin_m: width_m * margin_fraction,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn r_min(&self) -> Length {
        self.r_min
    }

    pub fn r_max(&self) -> Length {
        self.r_max
    }

    /// Whether `semimajor_axis` lies inside the configured LEO bounds.
    pub fn in_range(&self, semimajor_axis: Length) -> bool {
        self.r_min <= semimajor_axis && semimajor_axis <= self.r_max
    }

    /// The set of shell indices whose (margin-widened) band contains
    /// `semimajor_axis`. Zero, one, or two adjacent indices.
    ///
    /// Computed once at body creation; a surviving body's semimajor axis
    /// never changes, so this is never re-evaluated per tick.
    pub fn membership(&self, semimajor_axis: Length) -> Vec<usize> {
        let a = semimajor_axis.as_meters();
        let r0 = self.r_min.as_meters();

        let mut out = Vec::with_capacity(2);
        for k in 0..self.count {
            let lo = r0 + k as f64 * self.width_m - self.margin_m;
            let hi = r0 + (k + 1) as f64 * self.width_m + self.margin_m;
            // Half-open: with zero margin a body exactly on a boundary
            // belongs to exactly one band.
            if a >= lo && a < hi {
                out.push(k);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn km(v: f64) -> Length {
        Length::from_kilometers(v)
    }

    #[test]
    fn interior_body_is_in_one_shell() {
        let shells = ShellIndex::new(4, km(6_000.0), km(8_000.0), 0.0);
        // Band width 500 km; 6 250 km sits mid-band 0.
        assert_eq!(shells.membership(km(6_250.0)), vec![0]);
        assert_eq!(shells.membership(km(7_750.0)), vec![3]);
    }

    #[test]
    fn boundary_body_with_margin_is_in_both_adjacent_shells() {
        let shells = ShellIndex::new(4, km(6_000.0), km(8_000.0), 0.1);
        assert_eq!(shells.membership(km(6_500.0)), vec![0, 1]);
    }

    #[test]
    fn boundary_body_without_margin_is_in_exactly_one_shell() {
        let shells = ShellIndex::new(4, km(6_000.0), km(8_000.0), 0.0);
        assert_eq!(shells.membership(km(6_500.0)), vec![1]);
    }

    #[test]
    fn outside_range_is_no_shell() {
        let shells = ShellIndex::new(4, km(6_000.0), km(8_000.0), 0.0);
        assert!(shells.membership(km(9_000.0)).is_empty());
        assert!(!shells.in_range(km(9_000.0)));
        assert!(shells.in_range(km(6_000.0)));
    }

    #[test]
    fn near_boundary_within_margin_overlaps() {
        let shells = ShellIndex::new(4, km(6_000.0), km(8_000.0), 0.1);
        // Margin is 50 km; 6 540 km is within it, below the 6 500 boundary.
        assert_eq!(shells.membership(km(6_460.0)), vec![0, 1]);
        // Well clear of the boundary: one band only.
        assert_eq!(shells.membership(km(6_250.0)), vec![0]);
    }
}
