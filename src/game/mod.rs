pub mod body;
pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod naming;
pub mod simulation;

use body::{BodyId, CelestialBody};
use config::SimConfig;
use error::GameError;
use geometry::Point;
use serde::Serialize;
use simulation::{BodyView, Simulation, SimulationView};
use std::time::Duration;

/// Fixed 60 Hz step.
pub const TICK: Duration = Duration::from_micros(16_667);

/// A round of play: the simulation plus the placement gesture and the
/// round clock.
pub struct Game {
    turn: u32,
    sim: Simulation,
    placement: Option<CelestialBody>,
    time_left: Duration,
    paused: bool,
}

impl Game {
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, SimConfig::default())
    }

    pub fn with_config(seed: u64, config: SimConfig) -> Self {
        let time_left = Duration::from_millis(config.round_ms);
        Self {
            turn: 0,
            sim: Simulation::with_config(seed, config),
            placement: None,
            time_left,
            paused: false,
        }
    }

    pub fn from_json(seed: u64, json: &str) -> Result<Self, GameError> {
        Ok(Self::with_config(seed, SimConfig::from_json(json)?))
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.sim
    }

    /// The phantom currently being dragged, if any.
    pub fn placement(&self) -> Option<&CelestialBody> {
        self.placement.as_ref()
    }

    /// Mouse down: start placing a phantom planet. Replaces any earlier one.
    pub fn drop_planet(&mut self, x: f64, y: f64) -> BodyId {
        let phantom = self.sim.spawn_phantom(Point::new(x, y));
        let id = phantom.id;
        log::debug!("placing {} at ({:.2}, {:.2})", phantom.name, x, y);
        self.placement = Some(phantom);
        id
    }

    /// Mouse up: launch the phantom along the drag vector.
    pub fn release_planet(&mut self, x: f64, y: f64) -> Result<BodyId, GameError> {
        let mut body = self.placement.take().ok_or(GameError::NoPlacement)?;
        let drag = Point::new(x, y) - body.position;
        body.confirm(drag.scale(self.sim.config().launch_scale));
        let id = body.id;
        self.sim.add_planet(body);
        Ok(id)
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_over(&self) -> bool {
        self.time_left.is_zero()
    }

    pub fn time_left(&self) -> Duration {
        self.time_left
    }

    /// Advance one fixed step unless paused or over. Returns the number of
    /// steps taken so far.
    pub fn tick(&mut self) -> u32 {
        if self.paused || self.is_over() {
            return self.turn;
        }
        self.turn += 1;
        self.sim.update(TICK);
        self.time_left = self.time_left.saturating_sub(TICK);
        if self.is_over() {
            log::info!(
                "round over after {} ticks, best population {}",
                self.turn,
                self.sim.max_population()
            );
        }
        self.turn
    }

    pub fn view(&self) -> GameView {
        GameView {
            world: self.sim.view(),
            placement: self.placement.as_ref().map(BodyView::from),
            time_left_ms: self.time_left.as_millis() as u64,
            paused: self.paused,
            over: self.is_over(),
        }
    }

    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.view()).unwrap_or_else(|_| "{}".to_string())
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct GameView {
    #[serde(flatten)]
    pub world: SimulationView,
    pub placement: Option<BodyView>,
    pub time_left_ms: u64,
    pub paused: bool,
    pub over: bool,
}
