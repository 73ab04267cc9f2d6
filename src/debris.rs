//! Debris synthesis.
//!
//! Two entry points, both append-only with respect to the population:
//! collision fragmentation and the periodic stochastic background injection.
//! Fragment orbits are a stylized stand-in, not a physics model; see the
//! project non-goals.

use oorandom::Rand64;

use crate::{
    body::{Elements, IdAllocator, ObjectClass, OrbitingBody, SizeClass},
    errors::InvalidBodyError,
    propagator,
    shells::ShellIndex,
    units::{Angle, Length, Timestamp},
};

use std::f64::consts::{PI, TAU};

#[derive(Debug, Clone)]
pub struct DebrisConfig {
    /// New DEBRIS bodies created per detected collision.
    pub fragments_per_collision: usize,
    /// Max |offset| applied to the parents' midpoint semimajor axis.
    pub axis_offset_max: Length,
    /// Max whole-degree inclination perturbation for fragments.
    pub inclination_offset_max_deg: u64,
}

#[derive(Debug, Clone)]
pub struct DebrisGenerator {
    config: DebrisConfig,
}

impl DebrisGenerator {
    pub fn new(config: DebrisConfig) -> Self {
        DebrisGenerator { config }
    }

    /// Reclassify a collision participant in place: it stays in the
    /// population as DEBRIS, one size-class smaller. Its orbit is untouched,
    /// so shell membership and the cached rotation remain valid.
    pub fn reclassify_parent(&self, parent: &mut OrbitingBody) {
        parent.object_class = ObjectClass::Debris;
        parent.size_class = parent.size_class.downgraded();
    }

    /// Synthesize the fragments for one collision.
    ///
    /// Each fragment orbits at the parents' midpoint axis perturbed by a
    /// bounded random offset, with its mean anomaly 180° from one parent's
    /// phase at the collision time and its seed position at the negated
    /// collision point. The fragment's epoch is the collision time, so its
    /// anomaly is advanced to `now` before the offset is applied; the
    /// parent's raw anomaly is referenced to the parent's own epoch.
    /// Fragments alternate which parent they inherit from.
    pub fn fragments(
        &self,
        parent_a: &OrbitingBody,
        parent_b: &OrbitingBody,
        now: Timestamp,
        shells: &ShellIndex,
        prng: &mut Rand64,
        ids: &mut IdAllocator,
    ) -> Result<Vec<OrbitingBody>, InvalidBodyError> {
        let midpoint_m =
            (parent_a.semimajor_axis.as_meters() + parent_b.semimajor_axis.as_meters()) / 2.0;

        let mut out = Vec::with_capacity(self.config.fragments_per_collision);
        for k in 0..self.config.fragments_per_collision {
            let parent = if k % 2 == 0 { parent_a } else { parent_b };

            let offset = (prng.rand_float() * 2.0 - 1.0) * self.config.axis_offset_max.as_meters();
            let axis_m = (midpoint_m + offset).clamp(
                shells.r_min().as_meters(),
                shells.r_max().as_meters(),
            );

            let phase_at_now = propagator::anomaly_at(
                now,
                parent.epoch,
                parent.mean_anomaly,
                parent.semimajor_axis,
            );
            let mean_anomaly = (phase_at_now + Angle::from_radians(PI)).normalized();
            let inclination = perturbed_inclination(
                parent.inclination,
                self.config.inclination_offset_max_deg,
                prng,
            );

            let mut fragment = OrbitingBody::new(
                ids.allocate(),
                Elements {
                    epoch: now,
                    semimajor_axis: Length::from_meters(axis_m),
                    inclination,
                    ra_of_ascending_node: parent.ra_of_ascending_node,
                    argument_of_pericenter: parent.argument_of_pericenter,
                    mean_anomaly,
                },
                ObjectClass::Debris,
                SizeClass::Small,
                now,
                shells,
            )?;
            // Crude seed: opposite side of the Earth from the collision.
            // Overwritten by the propagator on the next tick.
            fragment.last_position = parent.last_position.map(|p| -p);
            out.push(fragment);
        }
        Ok(out)
    }

    /// Background injection: `ceil(len * percentage / 100)` new DEBRIS
    /// bodies with uniformly random angles, each orbiting at the semimajor
    /// axis of some existing body so new debris stays inside the occupied
    /// orbital regime.
    pub fn inject(
        &self,
        population: &[OrbitingBody],
        now: Timestamp,
        percentage: f64,
        shells: &ShellIndex,
        prng: &mut Rand64,
        ids: &mut IdAllocator,
    ) -> Result<Vec<OrbitingBody>, InvalidBodyError> {
        if population.is_empty() {
            return Ok(Vec::new());
        }
        let count = (population.len() as f64 * percentage / 100.0).ceil() as usize;

        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let template = &population[prng.rand_range(0..population.len() as u64) as usize];
            let body = OrbitingBody::new(
                ids.allocate(),
                Elements {
                    epoch: now,
                    semimajor_axis: template.semimajor_axis,
                    inclination: Angle::from_radians(prng.rand_float() * PI),
                    ra_of_ascending_node: Angle::from_radians(prng.rand_float() * TAU),
                    argument_of_pericenter: Angle::from_radians(prng.rand_float() * TAU),
                    mean_anomaly: Angle::from_radians(prng.rand_float() * TAU),
                },
                ObjectClass::Debris,
                SizeClass::Small,
                now,
                shells,
            )?;
            out.push(body);
        }
        Ok(out)
    }
}

/// Parent inclination nudged by a whole number of degrees in
/// `±1..=max_deg`, folded back into `[0°, 180°]`.
fn perturbed_inclination(parent: Angle, max_deg: u64, prng: &mut Rand64) -> Angle {
    if max_deg == 0 {
        return parent;
    }
    let magnitude = prng.rand_range(1..max_deg + 1) as f64;
    let sign = if prng.rand_range(0..2) == 0 { -1.0 } else { 1.0 };

    let mut deg = parent.as_degrees() + sign * magnitude;
    if deg > 180.0 {
        deg -= 180.0;
    }
    if deg < 0.0 {
        deg += 180.0;
    }
    Angle::from_degrees(deg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyId;
    use approx::assert_relative_eq;
    use na::Vector3;

    fn shells() -> ShellIndex {
        ShellIndex::new(
            8,
            Length::from_kilometers(6_550.0),
            Length::from_kilometers(8_371.0),
            0.1,
        )
    }

    fn generator() -> DebrisGenerator {
        DebrisGenerator::new(DebrisConfig {
            fragments_per_collision: 2,
            axis_offset_max: Length::from_kilometers(10.0),
            inclination_offset_max_deg: 3,
        })
    }

    fn parent(id: u64, a_km: f64, anomaly_deg: f64, size: SizeClass) -> OrbitingBody {
        let shells = shells();
        let mut b = OrbitingBody::new(
            BodyId::new(id),
            Elements {
                epoch: Timestamp::epoch(),
                semimajor_axis: Length::from_kilometers(a_km),
                inclination: Angle::from_degrees(51.6),
                ra_of_ascending_node: Angle::from_degrees(0.0),
                argument_of_pericenter: Angle::from_degrees(0.0),
                mean_anomaly: Angle::from_degrees(anomaly_deg),
            },
            ObjectClass::Satellite,
            size,
            Timestamp::epoch(),
            &shells,
        )
        .unwrap();
        b.last_position = Some(Vector3::new(a_km * 1000.0, 0.0, 0.0));
        b
    }

    #[test]
    fn parents_are_reclassified_and_downgraded() {
        let gen = generator();
        let mut a = parent(1, 7_000.0, 0.0, SizeClass::Large);
        let mut b = parent(2, 7_000.0, 180.0, SizeClass::Small);
        gen.reclassify_parent(&mut a);
        gen.reclassify_parent(&mut b);
        assert_eq!(a.object_class, ObjectClass::Debris);
        assert_eq!(a.size_class, SizeClass::Medium);
        // SMALL stays SMALL.
        assert_eq!(b.size_class, SizeClass::Small);
    }

    #[test]
    fn fragments_offset_anomaly_and_negate_position() {
        let gen = generator();
        let now = Timestamp::from_secs(500.0);
        let mut a = parent(1, 7_000.0, 30.0, SizeClass::Large);
        let mut b = parent(2, 7_100.0, 200.0, SizeClass::Medium);
        // Anomalies referenced to the collision time itself, so the phase
        // advance below is zero and the 180° offset shows up exactly.
        a.epoch = now;
        b.epoch = now;
        let mut prng = Rand64::new(7);
        let mut ids = IdAllocator::starting_at(100);

        let frags = gen
            .fragments(&a, &b, now, &shells(), &mut prng, &mut ids)
            .unwrap();
        assert_eq!(frags.len(), 2);

        // First fragment inherits from parent a, second from parent b.
        assert_relative_eq!(frags[0].mean_anomaly.as_degrees(), 210.0, epsilon = 1e-9);
        assert_relative_eq!(frags[1].mean_anomaly.as_degrees(), 20.0, epsilon = 1e-9);

        for (frag, p) in frags.iter().zip([&a, &b]) {
            assert_eq!(frag.object_class, ObjectClass::Debris);
            assert_eq!(frag.size_class, SizeClass::Small);
            assert_eq!(frag.last_position, p.last_position.map(|v| -v));
            // Midpoint axis (7 050 km) ± 10 km.
            let axis_km = frag.semimajor_axis.as_kilometers();
            assert!((axis_km - 7_050.0).abs() <= 10.0, "axis {axis_km} km");
            assert_eq!(frag.epoch.as_secs(), 500.0);
        }

        // Fresh ids, both above the allocator floor.
        assert_eq!(frags[0].id, BodyId::new(100));
        assert_eq!(frags[1].id, BodyId::new(101));
    }

    #[test]
    fn unperturbed_fragment_propagates_to_its_seed_position() {
        // With zero axis and inclination perturbation, a fragment of two
        // co-orbital parents shares its parent's orbit exactly; propagating
        // it at the collision time must land on the seeded position (the
        // negated collision point), with no phase jump on the first tick.
        let gen = DebrisGenerator::new(DebrisConfig {
            fragments_per_collision: 2,
            axis_offset_max: Length::from_meters(0.0),
            inclination_offset_max_deg: 0,
        });
        let now = Timestamp::from_secs(1_000.0);
        let mut a = parent(1, 7_000.0, 30.0, SizeClass::Large);
        let mut b = parent(2, 7_000.0, 210.0, SizeClass::Large);
        // Parents keep their catalog epoch (t = 0); the collision point is
        // wherever propagation puts them at the collision time.
        a.last_position = Some(propagator::propagate(&a, now).unwrap());
        b.last_position = Some(propagator::propagate(&b, now).unwrap());

        let mut prng = Rand64::new(11);
        let mut ids = IdAllocator::starting_at(100);
        let frags = gen
            .fragments(&a, &b, now, &shells(), &mut prng, &mut ids)
            .unwrap();
        assert_eq!(frags.len(), 2);

        for (frag, p) in frags.iter().zip([&a, &b]) {
            let seeded = frag.last_position.unwrap();
            assert_eq!(Some(seeded), p.last_position.map(|v| -v));
            let first = propagator::propagate(frag, now).unwrap();
            assert!(
                (first - seeded).norm() < 1e-3,
                "fragment moved {} m between seed and first propagation",
                (first - seeded).norm()
            );
        }
    }

    #[test]
    fn injection_count_follows_ceil_rule() {
        let gen = generator();
        let population = vec![
            parent(1, 7_000.0, 0.0, SizeClass::Large),
            parent(2, 7_100.0, 10.0, SizeClass::Medium),
            parent(3, 7_200.0, 20.0, SizeClass::Small),
        ];
        let mut prng = Rand64::new(1);
        let mut ids = IdAllocator::starting_at(50);

        // ceil(3 * 50 / 100) = 2
        let injected = gen
            .inject(
                &population,
                Timestamp::from_secs(0.0),
                50.0,
                &shells(),
                &mut prng,
                &mut ids,
            )
            .unwrap();
        assert_eq!(injected.len(), 2);
        for body in &injected {
            assert_eq!(body.object_class, ObjectClass::Debris);
            // Axis sampled from the existing population.
            assert!(population
                .iter()
                .any(|p| p.semimajor_axis == body.semimajor_axis));
            assert!(body.last_position.is_none());
        }
    }

    #[test]
    fn injection_into_empty_population_is_a_no_op() {
        let gen = generator();
        let mut prng = Rand64::new(1);
        let mut ids = IdAllocator::starting_at(0);
        let injected = gen
            .inject(
                &[],
                Timestamp::epoch(),
                50.0,
                &shells(),
                &mut prng,
                &mut ids,
            )
            .unwrap();
        assert!(injected.is_empty());
    }

    #[test]
    fn inclination_perturbation_folds_into_range() {
        let mut prng = Rand64::new(3);
        for _ in 0..200 {
            let i = perturbed_inclination(Angle::from_degrees(179.5), 3, &mut prng);
            assert!((0.0..=180.0).contains(&i.as_degrees()));
            let j = perturbed_inclination(Angle::from_degrees(0.5), 3, &mut prng);
            assert!((0.0..=180.0).contains(&j.as_degrees()));
        }
    }
}
