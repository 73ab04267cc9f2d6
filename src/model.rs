//! The population manager and simulation loop.
//!
//! One tick: advance the clock, propagate every body, detect close pairs,
//! fragment collisions, fire the periodic cadences, then apply all
//! population surgery as a batch and emit positions. Decisions about what
//! to add or remove are made against the population as it stood at the
//! start of the tick; the live collection is never mutated while it is
//! being scanned.

use oorandom::Rand64;
use tracing::{debug, info, warn};

use crate::{
    body::{BodyId, IdAllocator, ObjectClass, OrbitingBody, SizeClass},
    collision::CollisionDetector,
    debris::DebrisGenerator,
    errors::SimError,
    ingest,
    output::TickSink,
    propagator,
    scenario::Config,
    shells::ShellIndex,
    sim_info::SimulationInfo,
    units::{Angle, Time, Timestamp},
};

use std::f64::consts::{PI, TAU};

pub struct Model {
    population: Vec<OrbitingBody>,
    shells: ShellIndex,
    detector: CollisionDetector,
    debris: DebrisGenerator,
    ids: IdAllocator,
    prng: Rand64,
    sim_info: SimulationInfo,

    start: Timestamp,
    end: Timestamp,
    dt: Time,

    injection_cadence: Time,
    injection_percentage: f64,
    next_injection: Timestamp,

    churn_cadence: Time,
    retirement_lifespan: Time,
    retire_cap: usize,
    launch_mean: f64,
    next_churn: Timestamp,

    max_population: Option<usize>,

    /// Largest id currently in the population; appending anything at or
    /// below it is an allocator invariant violation.
    max_id: BodyId,
}

impl Model {
    pub fn new(population: Vec<OrbitingBody>, config: &Config) -> Self {
        let max_id = ingest::max_id(&population).unwrap_or(BodyId::new(0));
        let start = config.start();

        Model {
            shells: config.shell_index(),
            detector: config.detector(),
            debris: config.debris_generator(),
            ids: IdAllocator::after(max_id),
            prng: Rand64::new(config.seed as u128),
            sim_info: SimulationInfo::new(),
            start,
            end: config.end(),
            dt: config.dt(),
            injection_cadence: Time::from_secs(config.injection.cadence_secs),
            injection_percentage: config.injection.percentage,
            next_injection: start + Time::from_secs(config.injection.cadence_secs),
            churn_cadence: Time::from_secs(config.churn.cadence_secs),
            retirement_lifespan: config.retirement_lifespan(),
            retire_cap: config.churn.retire_cap,
            launch_mean: config.churn.launch_mean,
            next_churn: start + Time::from_secs(config.churn.cadence_secs),
            max_population: config.max_population,
            max_id,
            population,
        }
    }

    pub fn population(&self) -> &[OrbitingBody] {
        &self.population
    }

    pub fn sim_info(&self) -> &SimulationInfo {
        &self.sim_info
    }

    /// One-time pass re-anchoring every body's mean anomaly to the common
    /// start epoch, so `time - epoch` stays small for the whole run and the
    /// anomaly arithmetic never grows unbounded.
    pub fn initialize_to_epoch(&mut self) {
        for body in &mut self.population {
            let anomaly =
                propagator::anomaly_at(self.start, body.epoch, body.mean_anomaly, body.semimajor_axis);
            body.mean_anomaly = anomaly.normalized();
            body.epoch = self.start;
        }
        info!(
            population = self.population.len(),
            epoch_secs = self.start.as_secs(),
            "initialized population to common epoch"
        );
    }

    /// Run to the configured end time.
    pub fn run(&mut self, sink: &mut dyn TickSink) -> Result<(), SimError> {
        self.run_with(sink, || false)
    }

    /// Run to the configured end time, checking `cancelled` at tick
    /// boundaries only; a tick always completes once started.
    pub fn run_with(
        &mut self,
        sink: &mut dyn TickSink,
        mut cancelled: impl FnMut() -> bool,
    ) -> Result<(), SimError> {
        let mut k: u64 = 0;
        loop {
            let t = self.start + self.dt * k as f64;
            if t > self.end || cancelled() {
                break;
            }
            self.tick(t, sink)?;
            k += 1;
        }
        Ok(())
    }

    fn tick(&mut self, t: Timestamp, sink: &mut dyn TickSink) -> Result<(), SimError> {
        // 1. Propagate every body to the tick timestamp. Each body keeps its
        // own reference epoch; bodies injected mid-run are not re-anchored.
        for i in 0..self.population.len() {
            let pos = propagator::propagate(&self.population[i], t)?;
            self.population[i].last_position = Some(pos);
        }

        let mut additions: Vec<OrbitingBody> = Vec::new();
        let mut keep = vec![true; self.population.len()];

        // 2. Collision scan over the frozen population. The detector only
        // reports; all mutation happens here.
        let pairs = self.detector.detect(&self.population);
        for pair in &pairs {
            let fragments = self.debris.fragments(
                &self.population[pair.first_idx],
                &self.population[pair.second_idx],
                t,
                &self.shells,
                &mut self.prng,
                &mut self.ids,
            )?;
            info!(
                first = %pair.first_id,
                second = %pair.second_id,
                fragments = fragments.len(),
                t_secs = t.as_secs(),
                "collision"
            );
            sink.collision(t, pair.first_id, pair.second_id)?;
            additions.extend(fragments);

            self.debris.reclassify_parent(&mut self.population[pair.first_idx]);
            self.debris.reclassify_parent(&mut self.population[pair.second_idx]);
        }

        let at_capacity = |len: usize, cap: Option<usize>| cap.map(|c| len >= c).unwrap_or(false);

        // 3. Periodic background injection.
        if t >= self.next_injection {
            if at_capacity(self.population.len(), self.max_population) {
                warn!(
                    population = self.population.len(),
                    "population cap reached, skipping background injection"
                );
            } else {
                let injected = self.debris.inject(
                    &self.population,
                    t,
                    self.injection_percentage,
                    &self.shells,
                    &mut self.prng,
                    &mut self.ids,
                )?;
                info!(count = injected.len(), t_secs = t.as_secs(), "background debris injection");
                sink.injection(t, injected.len())?;
                additions.extend(injected);
            }
            while self.next_injection <= t {
                self.next_injection += self.injection_cadence;
            }
        }

        // 4. Yearly churn: retire aged LARGE bodies, launch replacements.
        if t >= self.next_churn {
            let retired = self.mark_retirements(t, &mut keep);
            if !at_capacity(self.population.len() - retired, self.max_population) {
                self.launch_replacements(t, &keep, &mut additions);
            }
            while self.next_churn <= t {
                self.next_churn += self.churn_cadence;
            }
        }

        // 5. Apply the batch: removals first, then the appends, with the id
        // monotonicity check for everything new.
        if keep.iter().any(|k| !k) {
            let mut it = keep.iter();
            self.population.retain(|_| *it.next().unwrap());
        }
        for body in additions {
            self.admit(body)?;
        }

        // 6. Emit positions. Bodies created this tick without a seeded
        // position show up from their first propagated tick onward.
        let rows: Vec<(BodyId, na::Vector3<f64>)> = self
            .population
            .iter()
            .filter_map(|b| b.last_position.map(|p| (b.id, p)))
            .collect();
        sink.positions(t, &rows)?;

        self.sim_info.tick_step(t, self.dt);
        debug!(
            tick = self.sim_info.tick,
            t_secs = t.as_secs(),
            population = self.population.len(),
            "tick complete"
        );
        Ok(())
    }

    /// Append one new body, enforcing that its id is above every id already
    /// in the population. Every creation path allocates from the one
    /// monotonic allocator, so a regression here means the allocator state
    /// was corrupted and the run must stop.
    fn admit(&mut self, body: OrbitingBody) -> Result<(), SimError> {
        if body.id <= self.max_id {
            return Err(SimError::IdAllocation { id: body.id });
        }
        self.max_id = body.id;
        self.population.push(body);
        Ok(())
    }

    /// Flag aged LARGE bodies for removal, in population order, up to the
    /// per-boundary cap. Returns how many were flagged.
    fn mark_retirements(&mut self, t: Timestamp, keep: &mut [bool]) -> usize {
        let mut retired = 0;
        for (idx, body) in self.population.iter().enumerate() {
            if retired >= self.retire_cap {
                break;
            }
            if body.size_class == SizeClass::Large
                && body.age(t) > self.retirement_lifespan
                && keep[idx]
            {
                keep[idx] = false;
                retired += 1;
                info!(id = %body.id, age_secs = body.age(t).as_secs(), "retiring aged body");
            }
        }
        retired
    }

    /// Launch a normally-distributed batch of new satellites, each cloned
    /// from a random surviving body with its mean anomaly offset 180°.
    fn launch_replacements(
        &mut self,
        t: Timestamp,
        keep: &[bool],
        additions: &mut Vec<OrbitingBody>,
    ) {
        let survivors: Vec<usize> = (0..self.population.len()).filter(|&i| keep[i]).collect();
        if survivors.is_empty() {
            return;
        }

        let sigma = self.launch_mean * 0.2;
        let count = normal_sample(&mut self.prng, self.launch_mean, sigma)
            .round()
            .max(0.0) as usize;

        for _ in 0..count {
            let pick = self.prng.rand_range(0..survivors.len() as u64) as usize;
            let template = &self.population[survivors[pick]];
            let mut launched = template.clone();
            launched.id = self.ids.allocate();
            launched.mean_anomaly = (template.mean_anomaly + Angle::from_radians(PI)).normalized();
            launched.object_class = ObjectClass::Satellite;
            launched.launch_time = t;
            launched.last_position = None;
            additions.push(launched);
        }
        if count > 0 {
            info!(count, t_secs = t.as_secs(), "launched replacement satellites");
        }
    }
}

/// Box-Muller draw from N(mean, sigma²) over the threaded `Rand64`.
fn normal_sample(prng: &mut Rand64, mean: f64, sigma: f64) -> f64 {
    let u1 = 1.0 - prng.rand_float();
    let u2 = prng.rand_float();
    let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
    mean + sigma * z
}
