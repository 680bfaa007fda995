use crate::game::error::ConfigError;
use crate::game::geometry::Rect;
use serde::Deserialize;
use std::ops::RangeInclusive;

/// Tunables for a [`Simulation`](crate::game::simulation::Simulation).
///
/// Distances are world units, masses are dimensionless, times are
/// milliseconds. Every field has a default, so a JSON config only needs
/// to name what it overrides.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Scales accumulated `m1*m2/d^2` forces into units/ms².
    pub gravitational_constant: f64,
    /// Below this distance to the star a planet is too close.
    pub near_threshold: f64,
    /// Above this distance to the star a planet is too far.
    pub far_threshold: f64,
    /// Fraction of the summed radii two bodies may approach before colliding.
    pub overlap_factor: f64,
    /// Visible play area; bodies are lost once they leave it plus `bounds_buffer`.
    pub play_area: Rect,
    pub bounds_buffer: f64,
    /// How long a destroyed planet animates before it is dead.
    pub dying_duration_ms: u64,
    pub star_mass: f64,
    pub star_scale: f64,
    /// Body radius at scale 1.0.
    pub unit_radius: f64,
    pub planet_scale: RangeInclusive<f64>,
    /// Planet mass is `planet_mass_factor * scale^2`.
    pub planet_mass_factor: f64,
    pub starting_population: f64,
    /// Population capacity per unit of mass.
    pub population_per_mass: f64,
    /// Logistic rate per millisecond.
    pub growth_rate: f64,
    /// Release drag vector to initial velocity (units/ms per unit dragged).
    pub launch_scale: f64,
    /// Length of a round driven by [`Game`](crate::game::Game).
    pub round_ms: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: 5e-8,
            near_threshold: 10.0,
            far_threshold: 15.0,
            overlap_factor: 0.8,
            play_area: Rect::new(-48.0, -36.0, 48.0, 36.0),
            bounds_buffer: 16.0,
            dying_duration_ms: 800,
            star_mass: 50_000.0,
            star_scale: 1.0,
            unit_radius: 4.0,
            planet_scale: 0.2..=0.7,
            planet_mass_factor: 5_000.0,
            starting_population: 100.0,
            population_per_mass: 1_000.0,
            growth_rate: 1e-4,
            launch_scale: 1e-3,
            round_ms: 5 * 60 * 1000,
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, crate::game::error::GameError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("gravitational_constant", self.gravitational_constant)?;
        positive("near_threshold", self.near_threshold)?;
        positive("overlap_factor", self.overlap_factor)?;
        positive("star_mass", self.star_mass)?;
        positive("star_scale", self.star_scale)?;
        positive("unit_radius", self.unit_radius)?;
        positive("planet_mass_factor", self.planet_mass_factor)?;
        positive("starting_population", self.starting_population)?;
        positive("population_per_mass", self.population_per_mass)?;
        positive("dying_duration_ms", self.dying_duration_ms as f64)?;

        if self.near_threshold >= self.far_threshold {
            return Err(ConfigError::ThresholdOrder {
                near: self.near_threshold,
                far: self.far_threshold,
            });
        }

        let (lo, hi) = (*self.planet_scale.start(), *self.planet_scale.end());
        if !(lo > 0.0 && lo <= hi && hi.is_finite()) {
            return Err(ConfigError::ScaleRange { min: lo, max: hi });
        }

        if !(self.bounds_buffer >= 0.0) {
            return Err(ConfigError::Negative {
                field: "bounds_buffer",
                value: self.bounds_buffer,
            });
        }
        if !(self.growth_rate >= 0.0) {
            return Err(ConfigError::Negative {
                field: "growth_rate",
                value: self.growth_rate,
            });
        }

        if self.play_area.width() <= 0.0 || self.play_area.height() <= 0.0 {
            return Err(ConfigError::EmptyPlayArea);
        }

        Ok(())
    }

    /// The box outside of which planets are lost.
    pub fn world_bounds(&self) -> Rect {
        self.play_area.expanded(self.bounds_buffer)
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}
