//! Small unit newtypes so seconds, meters and radians can't be mixed up.
//!
//! Angles are radians everywhere inside the simulation; `Angle::from_degrees`
//! is the single conversion point for catalog data that arrives in degrees.

use std::ops::{Add, AddAssign, Mul, Sub};

use std::f64::consts::TAU;

#[derive(Copy, Clone, PartialEq, PartialOrd)]
pub struct Time {
    secs: f64,
}

impl std::fmt::Debug for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} s", self.secs)
    }
}

impl Time {
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    /// Sidereal year, as used by the population churn cadence.
    pub const SECONDS_PER_YEAR: f64 = 31_556_926.0;

    pub fn from_secs(secs: f64) -> Time {
        Time { secs }
    }

    pub fn from_days(days: f64) -> Time {
        Time {
            secs: days * Self::SECONDS_PER_DAY,
        }
    }

    pub fn from_years(years: f64) -> Time {
        Time {
            secs: years * Self::SECONDS_PER_YEAR,
        }
    }

    pub fn as_secs(&self) -> f64 {
        self.secs
    }
}

impl Add<Time> for Time {
    type Output = Time;

    fn add(self, rhs: Time) -> Self::Output {
        Time::from_secs(self.secs + rhs.secs)
    }
}

impl AddAssign<Time> for Time {
    fn add_assign(&mut self, rhs: Time) {
        self.secs += rhs.secs;
    }
}

impl Sub<Time> for Time {
    type Output = Time;

    fn sub(self, rhs: Time) -> Self::Output {
        Time::from_secs(self.secs - rhs.secs)
    }
}

impl Mul<f64> for Time {
    type Output = Time;

    fn mul(self, rhs: f64) -> Self::Output {
        Time::from_secs(self.secs * rhs)
    }
}

/// Absolute simulation time, in seconds (the catalog epochs are Unix-style
/// second counts, so this is just a tagged f64).
#[derive(Copy, Clone, PartialEq, PartialOrd)]
pub struct Timestamp {
    secs: f64,
}

impl std::fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t={} s", self.secs)
    }
}

impl Timestamp {
    pub fn epoch() -> Timestamp {
        Timestamp { secs: 0.0 }
    }

    pub fn from_secs(secs: f64) -> Timestamp {
        Timestamp { secs }
    }

    pub fn as_secs(&self) -> f64 {
        self.secs
    }
}

impl Add<Time> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Time) -> Self::Output {
        Timestamp::from_secs(self.secs + rhs.as_secs())
    }
}

impl AddAssign<Time> for Timestamp {
    fn add_assign(&mut self, rhs: Time) {
        self.secs += rhs.as_secs();
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = Time;

    fn sub(self, rhs: Timestamp) -> Self::Output {
        Time::from_secs(self.secs - rhs.secs)
    }
}

#[derive(Copy, Clone, PartialEq, PartialOrd)]
pub struct Angle {
    radians: f64,
}

impl std::fmt::Debug for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} rad", self.radians)
    }
}

impl Angle {
    pub fn from_radians(radians: f64) -> Angle {
        Angle { radians }
    }

    pub fn from_degrees(degrees: f64) -> Angle {
        Angle {
            radians: degrees.to_radians(),
        }
    }

    pub fn as_radians(&self) -> f64 {
        self.radians
    }

    pub fn as_degrees(&self) -> f64 {
        self.radians.to_degrees()
    }

    /// Folded into `[0, 2π)`.
    pub fn normalized(&self) -> Angle {
        Angle {
            radians: self.radians.rem_euclid(TAU),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.radians.is_finite()
    }
}

impl Add<Angle> for Angle {
    type Output = Angle;

    fn add(self, rhs: Angle) -> Self::Output {
        Angle::from_radians(self.radians + rhs.radians)
    }
}

impl Sub<Angle> for Angle {
    type Output = Angle;

    fn sub(self, rhs: Angle) -> Self::Output {
        Angle::from_radians(self.radians - rhs.radians)
    }
}

#[derive(Copy, Clone, PartialEq, PartialOrd)]
pub struct Length {
    meters: f64,
}

impl std::fmt::Debug for Length {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} m", self.meters)
    }
}

impl Length {
    pub fn from_meters(meters: f64) -> Length {
        Length { meters }
    }

    pub fn from_kilometers(km: f64) -> Length {
        Length {
            meters: km * 1000.0,
        }
    }

    pub fn as_meters(&self) -> f64 {
        self.meters
    }

    pub fn as_kilometers(&self) -> f64 {
        self.meters / 1000.0
    }
}

impl Add<Length> for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Self::Output {
        Length::from_meters(self.meters + rhs.meters)
    }
}

impl Sub<Length> for Length {
    type Output = Length;

    fn sub(self, rhs: Length) -> Self::Output {
        Length::from_meters(self.meters - rhs.meters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn angle_conversion_and_normalization() {
        let a = Angle::from_degrees(540.0);
        assert_relative_eq!(a.as_radians(), 3.0 * std::f64::consts::PI);
        assert_relative_eq!(a.normalized().as_degrees(), 180.0, epsilon = 1e-9);

        let b = Angle::from_degrees(-90.0).normalized();
        assert_relative_eq!(b.as_degrees(), 270.0, epsilon = 1e-9);
    }

    #[test]
    fn timestamp_arithmetic() {
        let t0 = Timestamp::from_secs(100.0);
        let t1 = t0 + Time::from_secs(50.0);
        assert_relative_eq!((t1 - t0).as_secs(), 50.0);
    }

    #[test]
    fn day_and_year_constructors() {
        assert_relative_eq!(Time::from_days(7.0).as_secs(), 604_800.0);
        assert_relative_eq!(Time::from_years(1.0).as_secs(), Time::SECONDS_PER_YEAR);
    }
}
