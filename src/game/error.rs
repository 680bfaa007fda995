use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive and finite (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("near threshold {near} must be below far threshold {far}")]
    ThresholdOrder { near: f64, far: f64 },

    #[error("invalid planet scale range {min}..={max}")]
    ScaleRange { min: f64, max: f64 },

    #[error("play area must have a positive width and height")]
    EmptyPlayArea,
}

#[derive(Error, Debug)]
pub enum GameError {
    #[error("game not initialized")]
    NotInitialized,

    #[error("no planet is being placed")]
    NoPlacement,

    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),

    #[error("malformed config json: {0}")]
    Json(#[from] serde_json::Error),
}
