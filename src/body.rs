//! The one entity in the simulation: an orbiting body, satellite or debris.

use na::{Rotation3, Vector3};

use crate::{
    errors::InvalidBodyError,
    propagator,
    shells::ShellIndex,
    units::{Angle, Length, Time, Timestamp},
};

/// Catalog-style body id. Monotonically allocated, never reused, not even
/// for retired bodies.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct BodyId(u64);

impl BodyId {
    pub fn new(id: u64) -> Self {
        BodyId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BodyId {
    fn from(id: u64) -> Self {
        BodyId(id)
    }
}

/// The single source of new ids. Every creation path (ingestion, collision
/// fragments, periodic injection, launches) allocates here.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn starting_at(next: u64) -> Self {
        IdAllocator { next }
    }

    /// Continue after the largest id seen in the ingested catalog.
    pub fn after(max_seen: BodyId) -> Self {
        IdAllocator {
            next: max_seen.as_u64() + 1,
        }
    }

    pub fn allocate(&mut self) -> BodyId {
        let id = BodyId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ObjectClass {
    Satellite,
    Debris,
}

impl ObjectClass {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectClass::Satellite => "SATELLITE",
            ObjectClass::Debris => "DEBRIS",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    /// One step down the size ladder; SMALL stays SMALL.
    pub fn downgraded(&self) -> SizeClass {
        match self {
            SizeClass::Large => SizeClass::Medium,
            SizeClass::Medium => SizeClass::Small,
            SizeClass::Small => SizeClass::Small,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SizeClass::Small => "SMALL",
            SizeClass::Medium => "MEDIUM",
            SizeClass::Large => "LARGE",
        }
    }
}

/// Keplerian elements for a circular orbit (eccentricity fixed at 0).
/// `mean_anomaly` is referenced to `epoch`.
#[derive(Copy, Clone, Debug)]
pub struct Elements {
    pub epoch: Timestamp,
    pub semimajor_axis: Length,
    pub inclination: Angle,
    pub ra_of_ascending_node: Angle,
    pub argument_of_pericenter: Angle,
    pub mean_anomaly: Angle,
}

#[derive(Clone, Debug)]
pub struct OrbitingBody {
    pub id: BodyId,
    pub epoch: Timestamp,
    pub semimajor_axis: Length,
    pub inclination: Angle,
    pub ra_of_ascending_node: Angle,
    pub argument_of_pericenter: Angle,
    pub mean_anomaly: Angle,
    pub object_class: ObjectClass,
    pub size_class: SizeClass,
    pub launch_time: Timestamp,

    /// Position at the most recent tick; only valid for the timestamp it
    /// was computed at.
    pub last_position: Option<Vector3<f64>>,

    /// Shell membership, fixed at creation (the semimajor axis of a
    /// surviving body never changes; fragmentation creates new bodies).
    pub shell_ids: Vec<usize>,

    /// Orbit-frame to Earth-frame rotation, composed once at creation.
    /// Recomputing this per tick is the dominant cost in the naive version.
    pub rotation: Rotation3<f64>,
}

impl OrbitingBody {
    pub fn new(
        id: BodyId,
        elements: Elements,
        object_class: ObjectClass,
        size_class: SizeClass,
        launch_time: Timestamp,
        shells: &ShellIndex,
    ) -> Result<OrbitingBody, InvalidBodyError> {
        let axis_m = elements.semimajor_axis.as_meters();
        if !axis_m.is_finite() {
            return Err(InvalidBodyError::NonFinite {
                field: "semimajor_axis",
            });
        }
        if axis_m <= 0.0 {
            return Err(InvalidBodyError::NonPositiveSemimajorAxis { axis_m });
        }
        if !shells.in_range(elements.semimajor_axis) {
            return Err(InvalidBodyError::SemimajorAxisOutOfRange {
                axis_m,
                min_m: shells.r_min().as_meters(),
                max_m: shells.r_max().as_meters(),
            });
        }
        for (field, angle) in [
            ("inclination", elements.inclination),
            ("ra_of_ascending_node", elements.ra_of_ascending_node),
            ("argument_of_pericenter", elements.argument_of_pericenter),
            ("mean_anomaly", elements.mean_anomaly),
        ] {
            if !angle.is_finite() {
                return Err(InvalidBodyError::NonFinite { field });
            }
        }
        if !elements.epoch.as_secs().is_finite() {
            return Err(InvalidBodyError::NonFinite { field: "epoch" });
        }

        let rotation = propagator::earth_frame_rotation(
            elements.argument_of_pericenter,
            elements.ra_of_ascending_node,
            elements.inclination,
        );

        Ok(OrbitingBody {
            id,
            epoch: elements.epoch,
            semimajor_axis: elements.semimajor_axis,
            inclination: elements.inclination,
            ra_of_ascending_node: elements.ra_of_ascending_node,
            argument_of_pericenter: elements.argument_of_pericenter,
            mean_anomaly: elements.mean_anomaly,
            object_class,
            size_class,
            launch_time,
            last_position: None,
            shell_ids: shells.membership(elements.semimajor_axis),
            rotation,
        })
    }

    pub fn elements(&self) -> Elements {
        Elements {
            epoch: self.epoch,
            semimajor_axis: self.semimajor_axis,
            inclination: self.inclination,
            ra_of_ascending_node: self.ra_of_ascending_node,
            argument_of_pericenter: self.argument_of_pericenter,
            mean_anomaly: self.mean_anomaly,
        }
    }

    pub fn age(&self, now: Timestamp) -> Time {
        now - self.launch_time
    }

    /// Orbital period `T = 2π/n` for the circular orbit.
    pub fn period(&self) -> Time {
        propagator::period(self.semimajor_axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shells::ShellIndex;

    fn leo_shells() -> ShellIndex {
        ShellIndex::new(
            8,
            Length::from_kilometers(6_550.0),
            Length::from_kilometers(8_371.0),
            0.1,
        )
    }

    fn elements(axis: Length) -> Elements {
        Elements {
            epoch: Timestamp::epoch(),
            semimajor_axis: axis,
            inclination: Angle::from_degrees(51.6),
            ra_of_ascending_node: Angle::from_degrees(120.0),
            argument_of_pericenter: Angle::from_degrees(30.0),
            mean_anomaly: Angle::from_degrees(0.0),
        }
    }

    #[test]
    fn rejects_non_positive_axis() {
        let shells = leo_shells();
        let err = OrbitingBody::new(
            BodyId::new(1),
            elements(Length::from_meters(-1.0)),
            ObjectClass::Satellite,
            SizeClass::Large,
            Timestamp::epoch(),
            &shells,
        )
        .unwrap_err();
        assert_eq!(
            err,
            InvalidBodyError::NonPositiveSemimajorAxis { axis_m: -1.0 }
        );
    }

    #[test]
    fn rejects_axis_outside_leo_range() {
        let shells = leo_shells();
        let err = OrbitingBody::new(
            BodyId::new(1),
            elements(Length::from_kilometers(42_164.0)),
            ObjectClass::Satellite,
            SizeClass::Large,
            Timestamp::epoch(),
            &shells,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            InvalidBodyError::SemimajorAxisOutOfRange { .. }
        ));
    }

    #[test]
    fn rejects_non_finite_angles() {
        let shells = leo_shells();
        let mut e = elements(Length::from_kilometers(7_000.0));
        e.inclination = Angle::from_radians(f64::NAN);
        let err = OrbitingBody::new(
            BodyId::new(1),
            e,
            ObjectClass::Satellite,
            SizeClass::Large,
            Timestamp::epoch(),
            &shells,
        )
        .unwrap_err();
        assert_eq!(
            err,
            InvalidBodyError::NonFinite {
                field: "inclination"
            }
        );
    }

    #[test]
    fn valid_body_gets_shells_and_rotation() {
        let shells = leo_shells();
        let body = OrbitingBody::new(
            BodyId::new(7),
            elements(Length::from_kilometers(7_000.0)),
            ObjectClass::Satellite,
            SizeClass::Large,
            Timestamp::epoch(),
            &shells,
        )
        .unwrap();
        assert!(!body.shell_ids.is_empty());
        assert!(body.last_position.is_none());
    }

    #[test]
    fn size_downgrade_ladder() {
        assert_eq!(SizeClass::Large.downgraded(), SizeClass::Medium);
        assert_eq!(SizeClass::Medium.downgraded(), SizeClass::Small);
        assert_eq!(SizeClass::Small.downgraded(), SizeClass::Small);
    }

    #[test]
    fn id_allocation_is_monotonic() {
        let mut ids = IdAllocator::after(BodyId::new(270_288));
        let a = ids.allocate();
        let b = ids.allocate();
        assert_eq!(a.as_u64(), 270_289);
        assert!(b > a);
    }
}
