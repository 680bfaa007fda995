use crate::game::body::{BodyId, CelestialBody, DeathCause, MIN_DISTANCE};
use crate::game::config::SimConfig;
use crate::game::event::SimEvent;
use crate::game::geometry::{Point, Rect};
use crate::game::naming::NamePool;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::time::Duration;

/// Population records smaller than this step over the last announced one
/// are not queued as events.
const RECORD_EVENT_STEP: u64 = 10_000;

/// One fixed star and the planets the player has launched around it.
///
/// Each [`update`](Self::update) runs, in order: gravity, motion, zoning,
/// collisions, bounds, aggregation, removal. Later phases read what the
/// earlier ones wrote, so the order is part of the contract.
pub struct Simulation {
    config: SimConfig,
    bounds: Rect,
    star: CelestialBody,
    planets: Vec<CelestialBody>,
    names: NamePool,
    rng: ChaCha8Rng,
    next_id: u32,
    population: u64,
    max_population: u64,
    announced_record: u64,
    clock: Duration,
    events: Vec<SimEvent>,
}

impl Simulation {
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, SimConfig::default())
    }

    /// `config` is expected to have passed [`SimConfig::validate`]; an
    /// unvalidated one never panics but may behave oddly.
    pub fn with_config(seed: u64, config: SimConfig) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("simulation started with an invalid config: {}", e);
        }
        let star = CelestialBody::star(BodyId(0), &config);
        Self {
            bounds: config.world_bounds(),
            config,
            star,
            planets: Vec::new(),
            names: NamePool::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_id: 1,
            population: 0,
            max_population: 0,
            announced_record: 0,
            clock: Duration::ZERO,
            events: Vec::new(),
        }
    }

    pub fn with_names(mut self, names: NamePool) -> Self {
        self.names = names;
        self
    }

    fn alloc_id(&mut self) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        id
    }

    /// A phantom planet at `at` with a random scale, spin and name. It is
    /// not part of the simulation until confirmed and passed to
    /// [`add_planet`](Self::add_planet).
    pub fn spawn_phantom(&mut self, at: Point) -> CelestialBody {
        let (lo, hi) = (*self.config.planet_scale.start(), *self.config.planet_scale.end());
        // max/min rather than clamp: an unvalidated range must not panic.
        let scale = self.rng.gen::<f64>().max(lo).min(hi);
        let rotation = self.rng.gen::<f64>();
        let name = self.names.draw(&mut self.rng);
        let id = self.alloc_id();
        CelestialBody::planet(id, name, at, scale, rotation, &self.config)
    }

    /// Spawn, confirm and add in one go.
    pub fn launch(&mut self, at: Point, velocity: Point) -> BodyId {
        let mut body = self.spawn_phantom(at);
        body.confirm(velocity);
        let id = body.id;
        self.add_planet(body);
        id
    }

    pub fn add_planet(&mut self, body: CelestialBody) {
        debug_assert!(!body.is_phantom(), "phantom {} added to simulation", body.name);
        log::debug!(
            "planet {} ({:?}) added at ({:.2}, {:.2}) mass={:.1}",
            body.name,
            body.id,
            body.position.x,
            body.position.y,
            body.mass
        );
        self.events.push(SimEvent::PlanetAdded {
            id: body.id,
            name: body.name.clone(),
        });
        self.planets.push(body);
    }

    /// Advance everything by `elapsed`. A zero step changes nothing.
    pub fn update(&mut self, elapsed: Duration) {
        if elapsed.is_zero() {
            return;
        }
        self.clock += elapsed;
        log::trace!(
            "sim update: elapsed={:?} planets={} clock={:?}",
            elapsed,
            self.planets.len(),
            self.clock
        );

        self.apply_gravity(elapsed);
        self.advance_bodies(elapsed);
        self.classify_zones();
        self.resolve_collisions();
        self.cull_out_of_bounds();
        self.aggregate_population();
        self.remove_dead();
    }

    /// Pairwise Newtonian attraction from the star and every other live
    /// planet, using start-of-tick positions. O(n²).
    fn apply_gravity(&mut self, elapsed: Duration) {
        let snapshot: Vec<(Point, f64, bool)> = self
            .planets
            .iter()
            .map(|p| (p.position, p.mass, p.is_live()))
            .collect();
        let g = self.config.gravitational_constant;
        let (star_pos, star_mass) = (self.star.position, self.star.mass);

        for (i, planet) in self.planets.iter_mut().enumerate() {
            if !snapshot[i].2 {
                continue;
            }
            let (pos, mass, _) = snapshot[i];
            let mut force = pull(pos, mass, star_pos, star_mass);
            for (j, &(other_pos, other_mass, live)) in snapshot.iter().enumerate() {
                if j == i || !live {
                    continue;
                }
                force += pull(pos, mass, other_pos, other_mass);
            }

            let accel = force.scale(g / mass);
            if !accel.is_finite() {
                log::warn!("non-finite acceleration on {}, skipping", planet.name);
                continue;
            }
            planet.accelerate(accel, elapsed);
        }
    }

    fn advance_bodies(&mut self, elapsed: Duration) {
        self.star.advance(elapsed);
        for planet in self.planets.iter_mut() {
            let was_dying = planet.is_dying();
            planet.advance(elapsed);
            if was_dying && planet.is_dead() {
                log::debug!("planet {} finished dying", planet.name);
                self.events.push(SimEvent::PlanetDied { id: planet.id });
            }
        }
    }

    fn classify_zones(&mut self) {
        let star_pos = self.star.position;
        let (near, far) = (self.config.near_threshold, self.config.far_threshold);
        for planet in self.planets.iter_mut() {
            let distance = planet.position.distance_to(star_pos);
            planet.classify(distance, near, far);
        }
    }

    /// Planet pairs first, then the star. A planet destroyed earlier in the
    /// pass keeps its first cause, but still takes its partner down with it.
    fn resolve_collisions(&mut self) {
        let overlap = self.config.overlap_factor;
        let dying = Duration::from_millis(self.config.dying_duration_ms);
        let live: Vec<bool> = self.planets.iter().map(CelestialBody::is_live).collect();

        for j in 1..self.planets.len() {
            if !live[j] {
                continue;
            }
            let (head, tail) = self.planets.split_at_mut(j);
            let b = &mut tail[0];
            for (i, a) in head.iter_mut().enumerate() {
                if !live[i] || !a.collides_with(b, overlap) {
                    continue;
                }
                let hit_a = a.destroy(DeathCause::Colliding, dying);
                let hit_b = b.destroy(DeathCause::Colliding, dying);
                if hit_a || hit_b {
                    log::info!("planets {} and {} collided", a.name, b.name);
                    self.events.push(SimEvent::PlanetsCollided { a: a.id, b: b.id });
                }
            }
        }

        for planet in self.planets.iter_mut() {
            if planet.is_live()
                && planet.collides_with(&self.star, overlap)
                && planet.destroy(DeathCause::Exploding, dying)
            {
                log::info!("planet {} fell into the star", planet.name);
                self.events.push(SimEvent::PlanetExploded { id: planet.id });
            }
        }
    }

    fn cull_out_of_bounds(&mut self) {
        for planet in self.planets.iter_mut() {
            if !self.bounds.contains(planet.position) && planet.kill() {
                log::info!(
                    "planet {} left the world at ({:.1}, {:.1})",
                    planet.name,
                    planet.position.x,
                    planet.position.y
                );
                self.events.push(SimEvent::PlanetLost { id: planet.id });
            }
        }
    }

    /// Everything still in the collection counts, including bodies that
    /// started dying or died this tick.
    fn aggregate_population(&mut self) {
        self.population = self.planets.iter().map(CelestialBody::population).sum();
        if self.population > self.max_population {
            self.max_population = self.population;
            if self.max_population >= self.announced_record + RECORD_EVENT_STEP {
                self.announced_record = self.max_population;
                log::info!("population record: {}", self.max_population);
                self.events.push(SimEvent::PopulationRecord {
                    population: self.max_population,
                });
            }
        }
    }

    fn remove_dead(&mut self) {
        let before = self.planets.len();
        self.planets.retain(|p| !p.is_dead());
        let removed = before - self.planets.len();
        if removed > 0 {
            log::debug!("removed {} dead planets, {} remain", removed, self.planets.len());
        }
    }

    pub fn population(&self) -> u64 {
        self.population
    }

    pub fn max_population(&self) -> u64 {
        self.max_population
    }

    pub fn star(&self) -> &CelestialBody {
        &self.star
    }

    pub fn planets(&self) -> &[CelestialBody] {
        &self.planets
    }

    pub fn planet(&self, id: BodyId) -> Option<&CelestialBody> {
        self.planets.iter().find(|p| p.id == id)
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Total simulated time.
    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn view(&self) -> SimulationView {
        SimulationView::from(self)
    }

    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.view()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// `(other - this) * m1*m2 / d^3`: direction and inverse-square magnitude
/// in one term. `d` is clamped so coincident bodies stay finite.
fn pull(this: Point, this_mass: f64, other: Point, other_mass: f64) -> Point {
    let d = this.distance_to(other).max(MIN_DISTANCE);
    (other - this).scale(this_mass * other_mass / (d * d * d))
}

#[derive(Serialize, Debug, Clone)]
pub struct BodyView {
    pub id: BodyId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub rotation: f64,
    pub frame: u32,
    pub state: &'static str,
    pub population: u64,
    pub temperature: i32,
    pub barren: bool,
}

#[derive(Serialize, Debug, Clone)]
pub struct SimulationView {
    pub star: BodyView,
    pub planets: Vec<BodyView>,
    pub population: u64,
    pub max_population: u64,
}

impl From<&CelestialBody> for BodyView {
    fn from(body: &CelestialBody) -> Self {
        Self {
            id: body.id,
            name: body.name.clone(),
            x: body.position.x,
            y: body.position.y,
            scale: body.scale,
            rotation: body.rotation,
            frame: body.frame(),
            state: body.state_label(),
            population: body.population(),
            temperature: body.temperature(),
            barren: body.is_barren(),
        }
    }
}

impl From<&Simulation> for SimulationView {
    fn from(sim: &Simulation) -> Self {
        Self {
            star: BodyView::from(sim.star()),
            planets: sim.planets().iter().map(BodyView::from).collect(),
            population: sim.population(),
            max_population: sim.max_population(),
        }
    }
}
