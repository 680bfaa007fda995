use crate::game::config::SimConfig;
use crate::game::geometry::Point;
use serde::Serialize;
use std::time::Duration;

/// Distances used as divisors never drop below this.
pub const MIN_DISTANCE: f64 = 1e-3;

const STAR_TEMPERATURE: i32 = 27_000_000;
const PLANET_TEMPERATURE: i32 = 72;
const CLOSE_HEAT: f64 = 90_000.0;
const FAR_HEAT: f64 = 5_000.0;
const FAR_FALLOFF: f64 = 1.4;
const ROTATION_MS_PER_UNIT: f64 = 100.0;

const STAR_FRAME_STEP: Duration = Duration::from_millis(100);
const PLANET_FRAME_STEP: Duration = Duration::from_millis(200);

const STAR_FRAMES: &[u32] = &[0, 1, 2, 3];
const FERTILE_FRAMES: &[u32] = &[8, 9, 10, 11, 12, 13, 14, 15];
const TOO_CLOSE_FRAMES: &[u32] = &[16, 17, 18, 19, 20, 21, 22, 23];
const TOO_FAR_FRAMES: &[u32] = &[24, 25, 26, 27, 28, 29, 30, 31];
const PHANTOM_FRAMES: &[u32] = &[32];
const DYING_FRAMES: &[u32] = &[0, 1, 2, 3];
const DEAD_FRAMES: &[u32] = &[0];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BodyId(pub u32);

/// Habitability of a planet, from its distance to the star.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Zone {
    Fertile,
    TooClose,
    TooFar,
}

impl Zone {
    pub fn classify(distance: f64, near: f64, far: f64) -> Zone {
        if distance < near {
            Zone::TooClose
        } else if distance > far {
            Zone::TooFar
        } else {
            Zone::Fertile
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// Fell into the star.
    Exploding,
    /// Hit another planet.
    Colliding,
}

/// Where a body is in its life. Zones only exist while alive and a dying
/// body always carries exactly one cause.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Lifecycle {
    Sun,
    /// Drag preview, not yet part of a simulation.
    Phantom,
    Alive(Zone),
    Dying { cause: DeathCause, remaining: Duration },
    Dead,
}

#[derive(Clone, Debug)]
pub struct CelestialBody {
    pub id: BodyId,
    pub name: String,
    /// Units.
    pub position: Point,
    /// Units per millisecond.
    pub velocity: Point,
    pub mass: f64,
    pub radius: f64,
    pub scale: f64,
    pub rotation: f64,
    population: f64,
    max_population: f64,
    growth_rate: f64,
    temperature: i32,
    distance_to_sun: f64,
    lifecycle: Lifecycle,
    age: Duration,
    anim_clock: Duration,
}

impl CelestialBody {
    pub fn star(id: BodyId, config: &SimConfig) -> Self {
        let area = config.play_area;
        let center = (area.min + area.max).scale(0.5);
        Self {
            id,
            name: "SOL".to_string(),
            position: center,
            velocity: Point::ZERO,
            mass: config.star_mass,
            radius: config.unit_radius * config.star_scale,
            scale: config.star_scale,
            rotation: 0.0,
            population: 0.0,
            max_population: 0.0,
            growth_rate: 0.0,
            temperature: STAR_TEMPERATURE,
            distance_to_sun: 0.0,
            lifecycle: Lifecycle::Sun,
            age: Duration::ZERO,
            anim_clock: Duration::ZERO,
        }
    }

    /// A fresh planet preview. It stays a phantom until [`confirm`](Self::confirm).
    pub fn planet(
        id: BodyId,
        name: String,
        position: Point,
        scale: f64,
        rotation: f64,
        config: &SimConfig,
    ) -> Self {
        let mass = config.planet_mass_factor * scale * scale;
        Self {
            id,
            name,
            position,
            velocity: Point::ZERO,
            mass,
            radius: config.unit_radius * scale,
            scale,
            rotation,
            population: config.starting_population,
            max_population: mass * config.population_per_mass,
            growth_rate: config.growth_rate,
            temperature: PLANET_TEMPERATURE,
            distance_to_sun: 0.0,
            lifecycle: Lifecycle::Phantom,
            age: Duration::ZERO,
            anim_clock: Duration::ZERO,
        }
    }

    /// Commit a phantom with its launch velocity. Returns false for anything
    /// that is not a phantom.
    pub fn confirm(&mut self, velocity: Point) -> bool {
        if self.lifecycle != Lifecycle::Phantom {
            return false;
        }
        self.velocity = velocity;
        self.set_lifecycle(Lifecycle::Alive(Zone::Fertile));
        true
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_sun(&self) -> bool {
        self.lifecycle == Lifecycle::Sun
    }

    pub fn is_phantom(&self) -> bool {
        self.lifecycle == Lifecycle::Phantom
    }

    /// Alive and not yet destroyed.
    pub fn is_live(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Alive(_))
    }

    pub fn is_dying(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Dying { .. })
    }

    pub fn is_dead(&self) -> bool {
        self.lifecycle == Lifecycle::Dead
    }

    pub fn zone(&self) -> Option<Zone> {
        match self.lifecycle {
            Lifecycle::Alive(zone) => Some(zone),
            _ => None,
        }
    }

    pub fn death_cause(&self) -> Option<DeathCause> {
        match self.lifecycle {
            Lifecycle::Dying { cause, .. } => Some(cause),
            _ => None,
        }
    }

    /// Extinct: nothing left for the logistic model to grow.
    pub fn is_barren(&self) -> bool {
        !self.is_sun() && self.population <= 0.0
    }

    pub fn population(&self) -> u64 {
        self.population as u64
    }

    pub fn raw_population(&self) -> f64 {
        self.population
    }

    pub fn max_population(&self) -> f64 {
        self.max_population
    }

    pub fn temperature(&self) -> i32 {
        self.temperature
    }

    pub fn distance_to_sun(&self) -> f64 {
        self.distance_to_sun
    }

    pub fn age(&self) -> Duration {
        self.age
    }

    /// `v += a * t`, with `accel` in units/ms².
    pub fn accelerate(&mut self, accel: Point, elapsed: Duration) {
        self.velocity += accel * millis(elapsed);
    }

    /// Per-tick bookkeeping: drift, spin, population and the dying countdown.
    pub fn advance(&mut self, elapsed: Duration) {
        if self.is_dead() {
            return;
        }
        let ms = millis(elapsed);
        self.age += elapsed;
        self.anim_clock += elapsed;
        if self.is_sun() {
            return;
        }

        self.rotation += ms / ROTATION_MS_PER_UNIT;
        self.position += self.velocity * ms;
        self.update_population(ms);

        if let Lifecycle::Dying { cause, remaining } = self.lifecycle {
            let remaining = remaining.saturating_sub(elapsed);
            if remaining.is_zero() {
                self.set_lifecycle(Lifecycle::Dead);
            } else {
                self.lifecycle = Lifecycle::Dying { cause, remaining };
            }
        }
    }

    /// Record the distance to the star, re-zone if alive and refresh the
    /// temperature.
    pub fn classify(&mut self, distance: f64, near: f64, far: f64) {
        if self.is_dead() || self.is_sun() {
            return;
        }
        self.distance_to_sun = distance;
        if self.is_live() {
            self.set_lifecycle(Lifecycle::Alive(Zone::classify(distance, near, far)));
        }
        self.update_temperature();
    }

    fn update_temperature(&mut self) {
        let d = self.distance_to_sun.max(MIN_DISTANCE);
        let t = if self.zone() == Some(Zone::TooClose) {
            CLOSE_HEAT / d.powi(2)
        } else {
            FAR_HEAT / d.powf(FAR_FALLOFF)
        };
        self.temperature = t as i32;
    }

    fn update_population(&mut self, ms: f64) {
        if self.max_population <= 0.0 {
            return;
        }
        if !self.population.is_finite() || self.population <= 0.0 {
            if self.population != 0.0 {
                log::debug!("{} went barren", self.name);
            }
            self.population = 0.0;
            return;
        }

        let k = self.max_population;
        let exponent = if self.zone() == Some(Zone::Fertile) {
            -self.growth_rate * ms
        } else {
            self.growth_rate * ms
        };
        let next = k / (1.0 + (k / self.population - 1.0) * exponent.exp());
        self.population = if next.is_finite() {
            next.clamp(0.0, k)
        } else {
            0.0
        };
    }

    /// Start the dying animation. A body that is already dying, dead, a
    /// phantom or the star is left alone and `false` is returned.
    pub fn destroy(&mut self, cause: DeathCause, duration: Duration) -> bool {
        if !self.is_live() {
            return false;
        }
        self.set_lifecycle(Lifecycle::Dying {
            cause,
            remaining: duration,
        });
        true
    }

    /// Dead right away, skipping the dying phase.
    pub fn kill(&mut self) -> bool {
        if self.is_dead() || self.is_sun() {
            return false;
        }
        self.set_lifecycle(Lifecycle::Dead);
        true
    }

    pub fn collides_with(&self, other: &CelestialBody, overlap: f64) -> bool {
        self.position.distance_to(other.position) < (self.radius + other.radius) * overlap
    }

    pub fn state_label(&self) -> &'static str {
        match self.lifecycle {
            Lifecycle::Sun => "sun",
            Lifecycle::Phantom => "phantom",
            Lifecycle::Alive(Zone::Fertile) => "fertile",
            Lifecycle::Alive(Zone::TooClose) => "too_close",
            Lifecycle::Alive(Zone::TooFar) => "too_far",
            Lifecycle::Dying {
                cause: DeathCause::Exploding,
                ..
            } => "exploding",
            Lifecycle::Dying {
                cause: DeathCause::Colliding,
                ..
            } => "colliding",
            Lifecycle::Dead => "dead",
        }
    }

    fn frames(&self) -> &'static [u32] {
        match self.lifecycle {
            Lifecycle::Sun => STAR_FRAMES,
            Lifecycle::Phantom => PHANTOM_FRAMES,
            Lifecycle::Alive(Zone::Fertile) => FERTILE_FRAMES,
            Lifecycle::Alive(Zone::TooClose) => TOO_CLOSE_FRAMES,
            Lifecycle::Alive(Zone::TooFar) => TOO_FAR_FRAMES,
            Lifecycle::Dying { .. } => DYING_FRAMES,
            Lifecycle::Dead => DEAD_FRAMES,
        }
    }

    /// Tile index to draw for the current state. Dying strips play once.
    pub fn frame(&self) -> u32 {
        let frames = self.frames();
        let step = if self.is_sun() {
            STAR_FRAME_STEP
        } else {
            PLANET_FRAME_STEP
        };
        let ticks = (self.anim_clock.as_millis() / step.as_millis()) as usize;
        let idx = if self.is_dying() {
            ticks.min(frames.len() - 1)
        } else {
            ticks % frames.len()
        };
        frames[idx]
    }

    fn set_lifecycle(&mut self, next: Lifecycle) {
        let before = self.state_label();
        self.lifecycle = next;
        if self.state_label() != before {
            self.anim_clock = Duration::ZERO;
        }
    }
}

fn millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1e3
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    const TICK: Duration = Duration::from_millis(16);

    fn live_planet(position: Point) -> CelestialBody {
        let config = SimConfig::default();
        let mut p = CelestialBody::planet(
            BodyId(1),
            "HOTH".to_string(),
            position,
            0.5,
            0.0,
            &config,
        );
        assert!(p.confirm(Point::ZERO));
        p
    }

    #[test]
    fn planet_starts_as_phantom_and_confirms_into_fertile() {
        let config = SimConfig::default();
        let mut p = CelestialBody::planet(
            BodyId(7),
            "PERN".to_string(),
            Point::new(12.0, 0.0),
            0.4,
            0.0,
            &config,
        );
        assert!(p.is_phantom());
        assert_eq!(p.frame(), 32);
        assert_relative_eq!(p.mass, 800.0, epsilon = 1e-9);
        assert_relative_eq!(p.radius, 1.6, epsilon = 1e-12);
        assert_relative_eq!(p.max_population(), p.mass * 1_000.0, epsilon = 1e-6);

        assert!(p.confirm(Point::new(0.0, 0.01)));
        assert_eq!(p.lifecycle(), Lifecycle::Alive(Zone::Fertile));
        assert_eq!(p.velocity, Point::new(0.0, 0.01));
        assert!(!p.confirm(Point::ZERO), "only phantoms can be confirmed");
    }

    #[test]
    fn fertile_population_grows_towards_capacity() {
        let mut p = live_planet(Point::new(12.0, 0.0));
        let start = p.raw_population();
        for _ in 0..1_000 {
            p.advance(TICK);
        }
        assert!(p.raw_population() > start);
        assert!(p.raw_population() <= p.max_population());
    }

    #[test]
    fn hostile_population_decays() {
        let mut p = live_planet(Point::new(30.0, 0.0));
        p.classify(30.0, 10.0, 15.0);
        assert_eq!(p.zone(), Some(Zone::TooFar));
        let start = p.raw_population();
        p.advance(Duration::from_millis(500));
        assert!(p.raw_population() < start);
        assert!(p.raw_population() > 0.0);
    }

    #[test]
    fn zero_population_turns_barren_without_nan() {
        let mut p = live_planet(Point::new(12.0, 0.0));
        p.population = 0.0;
        p.advance(TICK);
        assert!(p.is_barren());
        assert_eq!(p.raw_population(), 0.0);
        assert_eq!(p.population(), 0);

        p.population = f64::NAN;
        p.advance(TICK);
        assert_eq!(p.raw_population(), 0.0);
    }

    #[test]
    fn temperature_follows_zone_model() {
        let mut p = live_planet(Point::new(5.0, 0.0));
        p.classify(5.0, 10.0, 15.0);
        assert_eq!(p.zone(), Some(Zone::TooClose));
        assert_eq!(p.temperature(), 3_600);

        p.classify(12.0, 10.0, 15.0);
        assert_eq!(p.zone(), Some(Zone::Fertile));
        assert_eq!(p.temperature(), (5_000.0 / 12f64.powf(1.4)) as i32);

        p.classify(0.0, 10.0, 15.0);
        assert!(p.temperature() > 0, "clamped distance keeps the value finite");
    }

    #[test]
    fn zone_boundaries_are_inclusive_of_fertile() {
        assert_eq!(Zone::classify(9.99, 10.0, 15.0), Zone::TooClose);
        assert_eq!(Zone::classify(10.0, 10.0, 15.0), Zone::Fertile);
        assert_eq!(Zone::classify(15.0, 10.0, 15.0), Zone::Fertile);
        assert_eq!(Zone::classify(15.01, 10.0, 15.0), Zone::TooFar);
    }

    #[test]
    fn motion_is_semi_implicit_euler() {
        let mut p = live_planet(Point::ZERO);
        p.accelerate(Point::new(0.001, 0.0), Duration::from_millis(10));
        assert_relative_eq!(p.velocity.x, 0.01, epsilon = 1e-12);
        p.advance(Duration::from_millis(10));
        assert_relative_eq!(p.position.x, 0.1, epsilon = 1e-12);
        assert_relative_eq!(p.rotation, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn destroy_counts_down_to_dead_once() {
        let mut p = live_planet(Point::new(12.0, 0.0));
        assert!(p.destroy(DeathCause::Colliding, Duration::from_millis(800)));
        assert_eq!(p.death_cause(), Some(DeathCause::Colliding));
        assert_eq!(p.zone(), None);

        assert!(!p.destroy(DeathCause::Exploding, Duration::from_millis(800)));
        assert_eq!(p.death_cause(), Some(DeathCause::Colliding));

        p.advance(Duration::from_millis(400));
        assert!(p.is_dying());
        assert_eq!(p.frame(), 2);
        p.advance(Duration::from_millis(400));
        assert!(p.is_dead());
        assert!(!p.destroy(DeathCause::Colliding, Duration::from_millis(800)));
    }

    #[test]
    fn dying_bodies_are_not_rezoned() {
        let mut p = live_planet(Point::new(12.0, 0.0));
        p.destroy(DeathCause::Exploding, Duration::from_millis(800));
        p.classify(3.0, 10.0, 15.0);
        assert_eq!(p.zone(), None);
        assert_eq!(p.death_cause(), Some(DeathCause::Exploding));
    }

    #[test]
    fn kill_skips_dying_phase() {
        let mut p = live_planet(Point::new(100.0, 0.0));
        assert!(p.kill());
        assert!(p.is_dead());
        assert!(!p.kill());

        let mut sun = CelestialBody::star(BodyId(0), &SimConfig::default());
        assert!(!sun.kill());
        assert!(!sun.destroy(DeathCause::Exploding, Duration::from_millis(1)));
    }

    #[test]
    fn collision_uses_overlap_factor() {
        let a = live_planet(Point::ZERO);
        let b = live_planet(Point::new(3.1, 0.0));
        // radii 2.0 + 2.0 scaled by 0.8 = 3.2
        assert!(a.collides_with(&b, 0.8));
        let c = live_planet(Point::new(3.3, 0.0));
        assert!(!a.collides_with(&c, 0.8));
    }

    #[test]
    fn zone_frames_loop() {
        let mut p = live_planet(Point::new(12.0, 0.0));
        assert_eq!(p.frame(), 8);
        p.advance(Duration::from_millis(200 * 9));
        assert_eq!(p.frame(), 9);

        let mut sun = CelestialBody::star(BodyId(0), &SimConfig::default());
        sun.advance(Duration::from_millis(250));
        assert_eq!(sun.frame(), 2);
    }

    proptest! {
        #[test]
        fn prop_population_stays_within_capacity(
            ticks in 1usize..400,
            step_ms in 1u64..100,
            far in proptest::bool::ANY,
        ) {
            let mut p = live_planet(Point::new(12.0, 0.0));
            if far {
                p.classify(40.0, 10.0, 15.0);
            }
            for _ in 0..ticks {
                p.advance(Duration::from_millis(step_ms));
                prop_assert!(p.raw_population() >= 0.0);
                prop_assert!(p.raw_population() <= p.max_population());
            }
        }
    }
}
