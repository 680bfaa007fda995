use crate::game::body::BodyId;
use serde::Serialize;

/// Something that happened during a tick, queued for collaborators (audio,
/// achievements, HUD) to drain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    PlanetAdded { id: BodyId, name: String },
    PlanetsCollided { a: BodyId, b: BodyId },
    PlanetExploded { id: BodyId },
    /// The dying animation finished.
    PlanetDied { id: BodyId },
    /// Left the world bounds.
    PlanetLost { id: BodyId },
    /// The aggregate population passed its previous best.
    PopulationRecord { population: u64 },
}
