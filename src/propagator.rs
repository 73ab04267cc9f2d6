//! Circular-orbit Kepler propagation.
//!
//! Eccentricity is fixed at 0, so the mean anomaly advances linearly with
//! the two-body mean motion and doubles as the true anomaly. Positions come
//! out in the Earth-centered frame via each body's cached rotation.

use na::{Rotation3, Vector3};

use crate::{
    body::OrbitingBody,
    errors::SimError,
    units::{Angle, Length, Time, Timestamp},
};

/// Standard gravitational parameter G·M for Earth [m³/s²].
pub const MU: f64 = 6.674_30e-11 * 5.972e24;

/// Two-body mean motion `n = sqrt(mu / a³)` [rad/s].
pub fn mean_motion(semimajor_axis: Length) -> f64 {
    (MU / semimajor_axis.as_meters().powi(3)).sqrt()
}

/// Orbital period `T = 2π/n`.
pub fn period(semimajor_axis: Length) -> Time {
    Time::from_secs(std::f64::consts::TAU / mean_motion(semimajor_axis))
}

/// Mean anomaly advanced from `epoch` to `time`.
///
/// Also used by the one-time initialize-to-common-epoch pass at simulation
/// start, which re-anchors every body so `time - epoch` stays small for the
/// rest of the run.
pub fn anomaly_at(
    time: Timestamp,
    epoch: Timestamp,
    mean_anomaly: Angle,
    semimajor_axis: Length,
) -> Angle {
    let time_delta = time - epoch;
    Angle::from_radians(
        mean_anomaly.as_radians() + time_delta.as_secs() * mean_motion(semimajor_axis),
    )
}

/// Orbit-frame to Earth-frame rotation, `Z(-Ω)·X(-i)·Z(-ω)`.
///
/// A pure function of the fixed orbital angles; computed once per body at
/// creation and cached, never per tick.
pub fn earth_frame_rotation(
    argument_of_pericenter: Angle,
    ra_of_ascending_node: Angle,
    inclination: Angle,
) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), -ra_of_ascending_node.as_radians())
        * Rotation3::from_axis_angle(&Vector3::x_axis(), -inclination.as_radians())
        * Rotation3::from_axis_angle(&Vector3::z_axis(), -argument_of_pericenter.as_radians())
}

/// Earth-frame position of `body` at `time`, using its cached rotation.
///
/// A non-finite result aborts the run: letting a NaN into the collision
/// checks would silently mask hits.
pub fn propagate(body: &OrbitingBody, time: Timestamp) -> Result<Vector3<f64>, SimError> {
    let true_anomaly = anomaly_at(time, body.epoch, body.mean_anomaly, body.semimajor_axis);
    let (sin_nu, cos_nu) = true_anomaly.as_radians().sin_cos();

    let a = body.semimajor_axis.as_meters();
    let pos_orbit_frame = Vector3::new(cos_nu * a, sin_nu * a, 0.0);
    let pos = body.rotation * pos_orbit_frame;

    if pos.iter().all(|c| c.is_finite()) {
        Ok(pos)
    } else {
        Err(SimError::Propagation {
            id: body.id,
            timestamp_secs: time.as_secs(),
        })
    }
}
