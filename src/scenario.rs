//! Scenario configuration.
//!
//! Everything tunable about a run is an explicit parameter here, loaded from
//! a kebab-case TOML file over the nominal defaults. Angles in the config
//! and in the catalog are degrees (that is what the data ships with); they
//! are converted to radians exactly once, at ingestion.

use serde::Deserialize;
use std::{fs, path::Path};

use crate::{
    collision::CollisionDetector,
    debris::{DebrisConfig, DebrisGenerator},
    shells::ShellIndex,
    units::{Length, Time, Timestamp},
};

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub name: Option<String>,
    /// Seed for the one PRNG threaded through every randomized path.
    pub seed: u64,
    /// Common epoch all bodies are re-anchored to at simulation start [s].
    pub start_epoch: f64,
    /// Absolute end of the run [s].
    pub end_time: f64,
    /// Tick length [s].
    pub timestep: f64,
    /// Hard cap on population size; injection and launches stop at the cap.
    pub max_population: Option<usize>,
    pub shells: Shells,
    pub collision: Collision,
    pub injection: Injection,
    pub churn: Churn,
}

impl Default for Config {
    fn default() -> Self {
        Self::nominal()
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Shells {
    pub count: usize,
    pub r_min_km: f64,
    pub r_max_km: f64,
    pub margin_fraction: f64,
}

impl Default for Shells {
    fn default() -> Self {
        Shells {
            count: 8,
            // LEO range of the cleaned catalog.
            r_min_km: 6_550.0,
            r_max_km: 8_371.0,
            margin_fraction: 0.1,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Collision {
    pub margin_m: f64,
    pub fragments_per_collision: usize,
    pub axis_offset_km: f64,
    pub inclination_offset_max_deg: u64,
}

impl Default for Collision {
    fn default() -> Self {
        Collision {
            margin_m: 100.0,
            fragments_per_collision: 1,
            axis_offset_km: 10.0,
            inclination_offset_max_deg: 3,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Injection {
    pub cadence_secs: f64,
    /// New debris per boundary, as a percentage of the population
    /// (`ceil(len * percentage / 100)` bodies).
    pub percentage: f64,
}

impl Default for Injection {
    fn default() -> Self {
        Injection {
            cadence_secs: Time::SECONDS_PER_YEAR,
            percentage: 1.0,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Churn {
    pub cadence_secs: f64,
    /// LARGE bodies older than this get retired.
    pub lifespan_years: f64,
    /// Max retirements per boundary.
    pub retire_cap: usize,
    /// Mean of the normally-distributed launch batch size (σ = 0.2·mean).
    pub launch_mean: f64,
}

impl Default for Churn {
    fn default() -> Self {
        Churn {
            cadence_secs: Time::SECONDS_PER_YEAR,
            lifespan_years: 20.0,
            retire_cap: 10,
            launch_mean: 50.0,
        }
    }
}

impl Config {
    pub fn nominal() -> Self {
        Config {
            name: None,
            seed: 0,
            // Monday 1 November 2021 13:00:01.
            start_epoch: 1_635_771_601.0,
            end_time: 1_635_771_601.0 + Time::from_days(7.0).as_secs(),
            timestep: 100.0,
            max_population: None,
            shells: Shells::default(),
            collision: Collision::default(),
            injection: Injection::default(),
            churn: Churn::default(),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let content = fs::read_to_string(path).expect("Failed to read scenario file");
        Self::from_str_checked(&content)
    }

    pub fn from_str_checked(s: &str) -> Self {
        let cfg: Config = toml::from_str(s).expect("Failed to parse scenario file");

        assert!(cfg.shells.count >= 1, "need at least one shell");
        assert!(
            cfg.shells.r_min_km < cfg.shells.r_max_km,
            "shell range is degenerate"
        );
        assert!(
            cfg.shells.margin_fraction >= 0.0,
            "shell margin fraction must be non-negative"
        );
        assert!(cfg.timestep > 0.0, "timestep must be positive");
        assert!(
            cfg.end_time >= cfg.start_epoch,
            "end time precedes the start epoch"
        );
        assert!(
            cfg.collision.margin_m > 0.0,
            "collision margin must be positive"
        );
        assert!(
            cfg.collision.fragments_per_collision >= 1,
            "a collision must produce at least one fragment"
        );
        assert!(
            cfg.injection.cadence_secs > 0.0 && cfg.churn.cadence_secs > 0.0,
            "cadences must be positive"
        );
        assert!(
            cfg.injection.percentage >= 0.0,
            "injection percentage must be non-negative"
        );

        cfg
    }

    pub fn shell_index(&self) -> ShellIndex {
        ShellIndex::new(
            self.shells.count,
            Length::from_kilometers(self.shells.r_min_km),
            Length::from_kilometers(self.shells.r_max_km),
            self.shells.margin_fraction,
        )
    }

    pub fn detector(&self) -> CollisionDetector {
        CollisionDetector::new(Length::from_meters(self.collision.margin_m), self.shells.count)
    }

    pub fn debris_generator(&self) -> DebrisGenerator {
        DebrisGenerator::new(DebrisConfig {
            fragments_per_collision: self.collision.fragments_per_collision,
            axis_offset_max: Length::from_kilometers(self.collision.axis_offset_km),
            inclination_offset_max_deg: self.collision.inclination_offset_max_deg,
        })
    }

    pub fn start(&self) -> Timestamp {
        Timestamp::from_secs(self.start_epoch)
    }

    pub fn end(&self) -> Timestamp {
        Timestamp::from_secs(self.end_time)
    }

    pub fn dt(&self) -> Time {
        Time::from_secs(self.timestep)
    }

    pub fn retirement_lifespan(&self) -> Time {
        Time::from_years(self.churn.lifespan_years)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn nominal_config_is_valid() {
        let cfg = Config::nominal();
        assert_eq!(cfg.shells.count, 8);
        let shells = cfg.shell_index();
        assert!(shells.in_range(Length::from_kilometers(7_000.0)));
    }

    #[test]
    fn full_config_round_trip() {
        let cfg = Config::from_str_checked(indoc! {r#"
            name = 'cascade study'
            seed = 42
            start-epoch = 1635771601.0
            end-time = 1635858001.0
            timestep = 10.0
            max-population = 100000

            [shells]
            count = 16
            r-min-km = 6600.0
            r-max-km = 8000.0
            margin-fraction = 0.05

            [collision]
            margin-m = 50000.0
            fragments-per-collision = 3
            axis-offset-km = 5.0
            inclination-offset-max-deg = 2

            [injection]
            cadence-secs = 86400.0
            percentage = 2.5

            [churn]
            cadence-secs = 31556926.0
            lifespan-years = 15.0
            retire-cap = 5
            launch-mean = 40.0
        "#});

        assert_eq!(cfg.name.as_deref(), Some("cascade study"));
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.shells.count, 16);
        assert_eq!(cfg.collision.fragments_per_collision, 3);
        assert_eq!(cfg.injection.percentage, 2.5);
        assert_eq!(cfg.churn.retire_cap, 5);
        assert_eq!(cfg.max_population, Some(100_000));
        assert_eq!((cfg.end() - cfg.start()).as_secs(), 86_400.0);
    }

    #[test]
    fn partial_config_falls_back_to_nominal() {
        let cfg = Config::from_str_checked(indoc! {r#"
            seed = 7

            [collision]
            margin-m = 250.0
        "#});
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.collision.margin_m, 250.0);
        // Untouched sections keep their nominal values.
        assert_eq!(cfg.collision.fragments_per_collision, 1);
        assert_eq!(cfg.shells.count, 8);
    }

    #[test]
    #[should_panic(expected = "timestep must be positive")]
    fn zero_timestep_is_rejected() {
        Config::from_str_checked("timestep = 0.0");
    }

    #[test]
    #[should_panic(expected = "shell range is degenerate")]
    fn inverted_shell_range_is_rejected() {
        Config::from_str_checked(indoc! {r#"
            [shells]
            r-min-km = 8000.0
            r-max-km = 7000.0
        "#});
    }
}
