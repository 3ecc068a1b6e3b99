use crate::core::space_heat_demand::design_day::select_design_days;
use crate::core::space_heat_demand::thermal_network::{DynamicResults, ThermalNetwork};
use crate::core::space_heat_demand::zone::{design_day_loads, DesignDayLoads};
use crate::errors::EngineError;
use crate::external_conditions::ExternalConditions;
use crate::input::BuildingInput;
use rayon::prelude::*;
use tracing::info;

/// Peak design loads from the steady-state path, one design day per mode.
#[derive(Clone, Debug)]
pub struct DesignLoads {
    pub heating: DesignDayLoads,
    pub cooling: DesignDayLoads,
}

/// One validated building model paired with one year of weather. Both solver
/// paths run off this pair; the configuration is immutable once the scenario
/// is built, so independent scenarios never interfere.
pub struct Scenario<'a> {
    input: BuildingInput,
    external_conditions: &'a ExternalConditions,
}

impl<'a> Scenario<'a> {
    pub fn new(
        input: BuildingInput,
        external_conditions: &'a ExternalConditions,
    ) -> Result<Self, EngineError> {
        input.validate()?;
        Ok(Self {
            input,
            external_conditions,
        })
    }

    pub fn input(&self) -> &BuildingInput {
        &self.input
    }

    /// Select both design days and run the steady-state balance over them.
    pub fn design_loads(&self) -> Result<DesignLoads, EngineError> {
        let (heating_day, cooling_day) = select_design_days(self.external_conditions)?;
        info!(
            heating_design_temp = heating_day.design_temp,
            cooling_design_temp = cooling_day.design_temp,
            "selected design days"
        );

        let heating = design_day_loads(&self.input, self.external_conditions, &heating_day)?;
        let cooling = design_day_loads(&self.input, self.external_conditions, &cooling_day)?;
        info!(
            peak_heating_w = heating.peak_demand(),
            peak_cooling_w = cooling.peak_demand(),
            "design-day loads computed"
        );

        Ok(DesignLoads { heating, cooling })
    }

    /// Run the dynamic model across the whole weather year.
    pub fn annual_demand(&self, timestep_hours: f64) -> Result<DynamicResults, EngineError> {
        let network = ThermalNetwork::from_input(&self.input)?;
        let results = network.run(self.external_conditions, timestep_hours)?;
        info!(
            annual_heating_kwh = results.annual_heating_energy_kwh(),
            annual_cooling_kwh = results.annual_cooling_energy_kwh(),
            "annual demand computed"
        );

        Ok(results)
    }
}

/// Aggregate figures for one sweep variant.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnualSummary {
    pub heating_kwh: f64,
    pub cooling_kwh: f64,
    pub peak_heating_w: f64,
    pub peak_cooling_w: f64,
}

impl From<&DynamicResults> for AnnualSummary {
    fn from(results: &DynamicResults) -> Self {
        Self {
            heating_kwh: results.annual_heating_energy_kwh(),
            cooling_kwh: results.annual_cooling_energy_kwh(),
            peak_heating_w: results.peak_heating_power(),
            peak_cooling_w: results.peak_cooling_power(),
        }
    }
}

/// Sensitivity sweep: run the dynamic model for each labelled variant of the
/// building configuration. Variants are independent, so they map across the
/// thread pool; results come back in input order. A variant that fails
/// validation reports its own error without sinking the rest of the sweep.
pub fn sweep_annual(
    variants: Vec<(String, BuildingInput)>,
    external_conditions: &ExternalConditions,
    timestep_hours: f64,
) -> Vec<(String, Result<AnnualSummary, EngineError>)> {
    variants
        .into_par_iter()
        .map(|(label, input)| {
            let summary = Scenario::new(input, external_conditions)
                .and_then(|scenario| scenario.annual_demand(timestep_hours))
                .map(|results| AnnualSummary::from(&results));
            (label, summary)
        })
        .collect()
}
