use crate::core::material_properties::AIR;
use crate::core::space_heat_demand::building_element::OpaqueBoundary;
use crate::core::space_heat_demand::internal_gains::InternalGains;
use crate::core::space_heat_demand::ventilation::ventilation_heat_transfer_coefficient;
use crate::core::units::{power_series_to_energy_kwh, SECONDS_PER_HOUR};
use crate::errors::{ConfigurationError, EngineError, NumericalInstabilityError};
use crate::external_conditions::ExternalConditions;
use crate::input::{BuildingElement, BuildingInput, Setpoints};
use crate::simulation_time::SimulationTime;
use chrono::Timelike;
use indexmap::IndexMap;
use tracing::debug;

/// A capacitive 2R1C branch: the element's lumped mass sits between a
/// conductance to the room air and a conductance to its external boundary.
#[derive(Clone, Debug)]
struct MassBranch {
    name: String,
    element: BuildingElement,
    /// Lumped heat capacity, in J/K
    capacitance: f64,
    /// Conductance between mass and room air, in W/K
    g_internal: f64,
    /// Conductance between mass and the external boundary, in W/K
    g_external: f64,
}

/// A purely resistive branch between the room air and an external boundary
/// (glazing, massless opaque elements, ground-contact elements).
#[derive(Clone, Debug)]
struct DirectBranch {
    name: String,
    element: BuildingElement,
    /// Conductance U * A, in W/K
    g: f64,
}

/// Lumped-capacitance network for one thermal zone: an air node, one mass
/// node per element that carries a thermal-mass block, resistive branches
/// for everything else and a ventilation conductance to outdoor air. Solar
/// transmitted through glazing and internal gains inject into the air node.
///
/// Integration is first-order explicit (forward) Euler. The scheme is only
/// stable for dt < 2*C/sum(G) at every capacitive node; `run` enforces that
/// bound up front and refuses to simulate past it.
#[derive(Clone, Debug)]
pub struct ThermalNetwork {
    mass_branches: Vec<MassBranch>,
    direct_branches: Vec<DirectBranch>,
    /// Ventilation/infiltration conductance to outdoor air, in W/K
    h_ve: f64,
    /// Air node capacitance, in J/K; zero makes the air node quasi-steady
    air_capacitance: f64,
    external_surface_coefficient: f64,
    setpoints: Setpoints,
    gains: InternalGains,
    initial_temperature: Option<f64>,
}

/// Per-step trajectory of the network over the simulated timeline.
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicResults {
    /// Step length, in hours
    pub timestep: f64,
    /// Room air temperature per step, in deg C
    pub air_temperatures: Vec<f64>,
    /// Mass node temperature series per element, in configuration order
    pub node_temperatures: IndexMap<String, Vec<f64>>,
    /// Heat injection required to hold the heating setpoint, in W (>= 0)
    pub heating_power: Vec<f64>,
    /// Heat extraction required to hold the cooling setpoint, in W (>= 0)
    pub cooling_power: Vec<f64>,
}

impl DynamicResults {
    pub fn annual_heating_energy_kwh(&self) -> f64 {
        power_series_to_energy_kwh(&self.heating_power, self.timestep)
    }

    pub fn annual_cooling_energy_kwh(&self) -> f64 {
        power_series_to_energy_kwh(&self.cooling_power, self.timestep)
    }

    pub fn peak_heating_power(&self) -> f64 {
        self.heating_power.iter().cloned().fold(0.0, f64::max)
    }

    pub fn peak_cooling_power(&self) -> f64 {
        self.cooling_power.iter().cloned().fold(0.0, f64::max)
    }
}

impl ThermalNetwork {
    pub fn from_input(input: &BuildingInput) -> Result<Self, EngineError> {
        input.validate()?;

        let mut mass_branches = vec![];
        let mut direct_branches = vec![];
        for (name, element) in &input.elements {
            match element {
                BuildingElement::Opaque {
                    area,
                    u_value,
                    thermal_mass: Some(mass),
                    ..
                } => {
                    // default split puts the mass at the midpoint of the
                    // element's resistance chain
                    let half_resistance = 1.0 / u_value / 2.0;
                    let interior_resistance = mass.interior_resistance.unwrap_or(half_resistance);
                    let exterior_resistance = mass.exterior_resistance.unwrap_or(half_resistance);
                    mass_branches.push(MassBranch {
                        name: name.clone(),
                        element: element.clone(),
                        capacitance: element.heat_capacity(),
                        g_internal: area / interior_resistance,
                        g_external: area / exterior_resistance,
                    });
                }
                _ => direct_branches.push(DirectBranch {
                    name: name.clone(),
                    element: element.clone(),
                    g: element.fabric_heat_loss(),
                }),
            }
        }

        let h_ve = ventilation_heat_transfer_coefficient(&input.air);
        let air_coupling: f64 = mass_branches.iter().map(|b| b.g_internal).sum::<f64>()
            + direct_branches.iter().map(|b| b.g).sum::<f64>()
            + h_ve;
        if is_close!(air_coupling, 0.0) {
            return Err(ConfigurationError::new(
                "thermal network",
                "total air node conductance",
                air_coupling,
                "must be > 0; the zone needs at least one envelope element or air exchange",
            )
            .into());
        }

        let air_capacitance = input
            .air_node_capacitance
            .unwrap_or_else(|| AIR.volumetric_heat_capacity() * input.air.volume);

        Ok(Self {
            mass_branches,
            direct_branches,
            h_ve,
            air_capacitance,
            external_surface_coefficient: input.external_surface_coefficient,
            setpoints: input.setpoints,
            gains: InternalGains::from_input(&input.gains)?,
            initial_temperature: input.initial_temperature,
        })
    }

    /// The largest timestep, in seconds, the explicit scheme tolerates for
    /// this network: min over capacitive nodes of 2*C/sum(G).
    pub fn stability_bound_seconds(&self) -> f64 {
        let mut bound = f64::INFINITY;
        for branch in &self.mass_branches {
            bound = bound.min(2.0 * branch.capacitance / (branch.g_internal + branch.g_external));
        }
        if self.air_capacitance > 0.0 {
            bound = bound.min(2.0 * self.air_capacitance / self.air_coupling_conductance());
        }
        bound
    }

    fn air_coupling_conductance(&self) -> f64 {
        self.mass_branches.iter().map(|b| b.g_internal).sum::<f64>()
            + self.direct_branches.iter().map(|b| b.g).sum::<f64>()
            + self.h_ve
    }

    fn check_stability(&self, dt_seconds: f64) -> Result<(), NumericalInstabilityError> {
        for branch in &self.mass_branches {
            let bound = 2.0 * branch.capacitance / (branch.g_internal + branch.g_external);
            if dt_seconds >= bound {
                return Err(NumericalInstabilityError {
                    node: branch.name.clone(),
                    timestep: dt_seconds,
                    bound,
                });
            }
        }
        if self.air_capacitance > 0.0 {
            let bound = 2.0 * self.air_capacitance / self.air_coupling_conductance();
            if dt_seconds >= bound {
                return Err(NumericalInstabilityError {
                    node: "air".to_string(),
                    timestep: dt_seconds,
                    bound,
                });
            }
        }
        Ok(())
    }

    /// Advance the network across the whole weather timeline at the given
    /// timestep (hours; must divide one hour evenly). Hourly forcing series
    /// are interpolated linearly for sub-hourly steps. Given identical
    /// inputs the trajectory is bit-identical between runs.
    pub fn run(
        &self,
        external_conditions: &ExternalConditions,
        timestep_hours: f64,
    ) -> Result<DynamicResults, EngineError> {
        let steps_per_hour = (1.0 / timestep_hours).round();
        if timestep_hours <= 0.0
            || !is_close!(steps_per_hour * timestep_hours, 1.0, rel_tol = 1e-9)
        {
            return Err(ConfigurationError::new(
                "dynamic run",
                "timestep",
                timestep_hours,
                "must divide one hour evenly",
            )
            .into());
        }
        let dt_seconds = timestep_hours * SECONDS_PER_HOUR as f64;
        self.check_stability(dt_seconds)?;

        let hours = external_conditions.hours();

        // hourly forcing, sampled per step below
        let mass_boundaries = self
            .mass_branches
            .iter()
            .map(|branch| self.hourly_boundaries(branch.name.as_str(), &branch.element, external_conditions))
            .collect::<Result<Vec<_>, _>>()?;
        let direct_boundaries = self
            .direct_branches
            .iter()
            .map(|branch| self.hourly_boundaries(branch.name.as_str(), &branch.element, external_conditions))
            .collect::<Result<Vec<_>, _>>()?;
        let gains: Vec<f64> = (0..hours)
            .map(|hour| {
                let solar: f64 = self
                    .direct_branches
                    .iter()
                    .map(|branch| branch.element.solar_gains(external_conditions, hour))
                    .sum();
                solar
                    + self
                        .gains
                        .total_internal_gain_in_w(external_conditions.timestamp(hour).hour())
            })
            .collect();
        let outdoor = external_conditions.air_temps();

        let simulation_time = SimulationTime::new(0.0, hours as f64, timestep_hours);
        let total_steps = simulation_time.total_steps();
        debug!(
            total_steps,
            timestep_hours,
            mass_nodes = self.mass_branches.len(),
            "starting dynamic simulation"
        );

        // starting state: steady state with the air node held at the heating
        // setpoint, unless an explicit uniform start temperature is given
        let mut air_temp = self
            .initial_temperature
            .unwrap_or(self.setpoints.heating);
        let mut node_temps: Vec<f64> = self
            .mass_branches
            .iter()
            .zip(&mass_boundaries)
            .map(|(branch, boundaries)| match self.initial_temperature {
                Some(temp) => temp,
                None => (branch.g_internal * air_temp + branch.g_external * boundaries[0])
                    / (branch.g_internal + branch.g_external),
            })
            .collect();

        let mut results = DynamicResults {
            timestep: timestep_hours,
            air_temperatures: Vec::with_capacity(total_steps),
            node_temperatures: self
                .mass_branches
                .iter()
                .map(|branch| (branch.name.clone(), Vec::with_capacity(total_steps)))
                .collect(),
            heating_power: Vec::with_capacity(total_steps),
            cooling_power: Vec::with_capacity(total_steps),
        };

        for iteration in simulation_time.iter() {
            let time = iteration.time;

            if iteration.index > 0 {
                // forward Euler on the mass nodes, forcing taken at the
                // previous step
                let previous_time = time - timestep_hours;
                for (i, branch) in self.mass_branches.iter().enumerate() {
                    let boundary = sample_hourly(&mass_boundaries[i], previous_time);
                    node_temps[i] += dt_seconds / branch.capacitance
                        * (branch.g_internal * (air_temp - node_temps[i])
                            + branch.g_external * (boundary - node_temps[i]));
                }
            }

            // air node balance at the current step
            let mut coupled = 0.0;
            let mut driven = 0.0;
            for (i, branch) in self.mass_branches.iter().enumerate() {
                coupled += branch.g_internal;
                driven += branch.g_internal * node_temps[i];
            }
            for (j, branch) in self.direct_branches.iter().enumerate() {
                coupled += branch.g;
                driven += branch.g * sample_hourly(&direct_boundaries[j], time);
            }
            coupled += self.h_ve;
            driven += self.h_ve * sample_hourly(outdoor, time);
            driven += sample_hourly(&gains, time);

            let free_float = if self.air_capacitance == 0.0 {
                driven / coupled
            } else {
                air_temp + dt_seconds / self.air_capacitance * (driven - coupled * air_temp)
            };

            // ideal thermostat with a deadband: hold the nearer setpoint
            // when the projection leaves the band, free-float inside it
            let (next_air_temp, heating, cooling) = if free_float < self.setpoints.heating {
                let injection = self.holding_power(self.setpoints.heating, air_temp, coupled, driven, dt_seconds);
                (self.setpoints.heating, injection.max(0.0), 0.0)
            } else if free_float > self.setpoints.cooling {
                let injection = self.holding_power(self.setpoints.cooling, air_temp, coupled, driven, dt_seconds);
                (self.setpoints.cooling, 0.0, (-injection).max(0.0))
            } else {
                (free_float, 0.0, 0.0)
            };
            air_temp = next_air_temp;

            results.air_temperatures.push(air_temp);
            for (i, series) in results.node_temperatures.values_mut().enumerate() {
                series.push(node_temps[i]);
            }
            results.heating_power.push(heating);
            results.cooling_power.push(cooling);
        }

        Ok(results)
    }

    /// Injection (positive) or extraction (negative) needed at the air node
    /// to land on `setpoint` at the end of the step.
    fn holding_power(
        &self,
        setpoint: f64,
        previous_air_temp: f64,
        coupled: f64,
        driven: f64,
        dt_seconds: f64,
    ) -> f64 {
        if self.air_capacitance == 0.0 {
            coupled * setpoint - driven
        } else {
            self.air_capacitance * (setpoint - previous_air_temp) / dt_seconds
                + coupled * previous_air_temp
                - driven
        }
    }

    fn hourly_boundaries(
        &self,
        name: &str,
        element: &BuildingElement,
        external_conditions: &ExternalConditions,
    ) -> Result<Vec<f64>, EngineError> {
        (0..external_conditions.hours())
            .map(|hour| {
                element.external_boundary_temp(
                    name,
                    external_conditions,
                    hour,
                    self.external_surface_coefficient,
                    OpaqueBoundary::SolAir,
                )
            })
            .collect()
    }
}

/// Linear interpolation into an hourly series at a fractional hour; the
/// final record extends to the end of its hour.
fn sample_hourly(series: &[f64], time_hours: f64) -> f64 {
    let base = time_hours.floor() as usize;
    let fraction = time_hours - time_hours.floor();
    if fraction == 0.0 || base + 1 >= series.len() {
        series[base.min(series.len() - 1)]
    } else {
        series[base] * (1.0 - fraction) + series[base + 1] * fraction
    }
}
