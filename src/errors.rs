use thiserror::Error;

/// Top-level error for a simulation run. Every variant is fatal to the run
/// that raised it: the engine never returns partial load figures for inputs
/// it could not fully validate or integrate.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    NumericalInstability(#[from] NumericalInstabilityError),
}

/// A non-physical envelope, air-handling, setpoint or solver parameter.
#[derive(Clone, Debug, Error)]
#[error("invalid {field} for {subject}: {value} ({constraint})")]
pub struct ConfigurationError {
    /// What carries the bad value, e.g. an element name or "air handling".
    pub subject: String,
    pub field: &'static str,
    pub value: f64,
    pub constraint: &'static str,
}

impl ConfigurationError {
    pub(crate) fn new(
        subject: impl Into<String>,
        field: &'static str,
        value: f64,
        constraint: &'static str,
    ) -> Self {
        Self {
            subject: subject.into(),
            field,
            value,
            constraint,
        }
    }
}

/// A malformed or incomplete weather series.
#[derive(Clone, Debug, Error)]
pub enum DataError {
    #[error("expected a complete year of hourly weather records (8760 or 8784), got {actual}")]
    IncompleteYear { actual: usize },
    #[error("weather series {field} has {actual} entries where {expected} were expected")]
    MismatchedSeries {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("weather timestamps must be strictly chronological with one record per hour: found a step of {step_minutes} minute(s) at record {position}")]
    NonChronological { position: usize, step_minutes: i64 },
    #[error("ground-contact element '{element}' requires monthly ground temperatures in the weather data")]
    MissingGroundTemperatures { element: String },
}

/// The requested timestep violates the explicit integration scheme's
/// documented stability bound for at least one thermal node.
#[derive(Clone, Debug, Error)]
#[error("timestep of {timestep} s violates the stability bound 2*C/sum(G) = {bound:.1} s for node '{node}'")]
pub struct NumericalInstabilityError {
    pub node: String,
    /// Requested timestep, in seconds.
    pub timestep: f64,
    /// Largest stable timestep for the offending node, in seconds.
    pub bound: f64,
}
