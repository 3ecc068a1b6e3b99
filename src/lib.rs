#![allow(clippy::too_many_arguments)]

pub mod core;
pub mod errors;
pub mod external_conditions;
pub mod input;
pub mod scenario;
mod simulation_time;
mod statistics;

#[macro_use]
extern crate is_close;

pub use crate::core::space_heat_demand::design_day::{
    select_design_day, select_design_days, DesignDay,
};
pub use crate::core::space_heat_demand::thermal_network::{DynamicResults, ThermalNetwork};
pub use crate::core::space_heat_demand::zone::{
    design_day_loads, hourly_load, DesignDayLoads, LoadBreakdown,
};
pub use crate::core::space_heat_demand::DemandMode;
pub use crate::errors::{
    ConfigurationError, DataError, EngineError, NumericalInstabilityError,
};
pub use crate::external_conditions::ExternalConditions;
pub use crate::input::{ingest_building_input, BuildingInput};
pub use crate::scenario::{sweep_annual, AnnualSummary, DesignLoads, Scenario};

use std::io::Read;
use tracing::info;

/// Results of one full run: design-day peaks from the steady-state path and
/// the annual trajectory from the dynamic path.
#[derive(Clone, Debug)]
pub struct RunResults {
    pub design: DesignLoads,
    pub dynamic: DynamicResults,
}

/// Run both solver paths for a building model supplied as JSON against one
/// year of external conditions.
pub fn run_project(
    input: impl Read,
    external_conditions: &ExternalConditions,
    timestep_hours: f64,
) -> anyhow::Result<RunResults> {
    let building = ingest_building_input(input)?;
    let scenario = Scenario::new(building, external_conditions)?;

    let design = scenario.design_loads()?;
    let dynamic = scenario.annual_demand(timestep_hours)?;
    info!(
        peak_heating_w = design.heating.peak_demand(),
        peak_cooling_w = design.cooling.peak_demand(),
        annual_heating_kwh = dynamic.annual_heating_energy_kwh(),
        "run complete"
    );

    Ok(RunResults { design, dynamic })
}
