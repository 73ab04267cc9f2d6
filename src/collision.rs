//! Close-encounter detection.
//!
//! Bodies are grouped by shell membership and only within-shell pairs are
//! compared, so the scan is O(Σ_shell k²) instead of O(n²) over the whole
//! population. The detector never mutates anything; it reports candidate
//! pairs and the debris generator does all the population surgery.

use std::collections::BTreeMap;

use crate::{
    body::{BodyId, OrbitingBody},
    units::Length,
};

/// An unordered pair of colliding bodies, reported with the smaller id
/// first. Indices refer to the population slice the detector was given.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CandidatePair {
    pub first_id: BodyId,
    pub second_id: BodyId,
    pub first_idx: usize,
    pub second_idx: usize,
}

#[derive(Debug, Clone)]
pub struct CollisionDetector {
    margin: Length,
    shell_count: usize,
}

impl CollisionDetector {
    pub fn new(margin: Length, shell_count: usize) -> Self {
        CollisionDetector {
            margin,
            shell_count,
        }
    }

    /// All pairs whose cached positions are strictly closer than the margin.
    ///
    /// Pairs come back in ascending (smaller id, larger id) order so that
    /// fragmentation is reproducible across runs with the same seed. A body
    /// sitting in two shells is scanned in each, but a pair is reported once.
    /// An empty population is a valid no-op.
    pub fn detect(&self, population: &[OrbitingBody]) -> Vec<CandidatePair> {
        let mut by_shell: Vec<Vec<usize>> = vec![Vec::new(); self.shell_count];
        for (idx, body) in population.iter().enumerate() {
            // Bodies with no position yet (injected this tick) are skipped;
            // they get compared from their first propagated tick onward.
            if body.last_position.is_none() {
                continue;
            }
            for &shell in &body.shell_ids {
                by_shell[shell].push(idx);
            }
        }

        let margin_m = self.margin.as_meters();
        // BTreeMap keyed on the id pair dedupes shared-shell duplicates and
        // yields the deterministic ordering in one go.
        let mut hits: BTreeMap<(BodyId, BodyId), (usize, usize)> = BTreeMap::new();

        for members in &by_shell {
            for (n, &i) in members.iter().enumerate() {
                for &j in &members[n + 1..] {
                    let a = &population[i];
                    let b = &population[j];
                    let (pa, pb) = match (a.last_position, b.last_position) {
                        (Some(pa), Some(pb)) => (pa, pb),
                        _ => continue,
                    };
                    if (pa - pb).norm() < margin_m {
                        let (key, val) = if a.id < b.id {
                            ((a.id, b.id), (i, j))
                        } else {
                            ((b.id, a.id), (j, i))
                        };
                        hits.insert(key, val);
                    }
                }
            }
        }

        hits.into_iter()
            .map(|((first_id, second_id), (first_idx, second_idx))| CandidatePair {
                first_id,
                second_id,
                first_idx,
                second_idx,
            })
            .collect()
    }
}
