use crate::core::schedule::OnPeriod;
use crate::errors::ConfigurationError;
use anyhow::Context;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_valid::Validate;
use std::io::Read;

pub(crate) fn default_shading_factor() -> f64 {
    1.0
}

/// The original tooling kept this as a process-wide constant; here it is a
/// per-model value so scenario variants can disagree about it.
pub(crate) fn default_external_surface_coefficient() -> f64 {
    23.0
}

/// A planar envelope element. `pitch` is the tilt from horizontal in degrees
/// (0 flat roof, 90 wall); `orientation` is degrees clockwise from North.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum BuildingElement {
    Opaque {
        /// Surface area, in m2
        area: f64,
        /// Thermal transmittance, in W/m2K
        u_value: f64,
        /// Solar absorptance of the external surface, 0 to 1
        solar_absorptance: f64,
        pitch: f64,
        orientation: f64,
        /// Lumped thermal mass, present only for elements that should form a
        /// capacitive branch in the dynamic model
        #[serde(default)]
        thermal_mass: Option<ElementThermalMass>,
    },
    /// Below-grade or slab element, driven by the ground temperature
    /// boundary rather than sol-air.
    Ground {
        area: f64,
        u_value: f64,
    },
    Transparent {
        area: f64,
        u_value: f64,
        /// Total solar energy transmittance, 0 to 1
        g_value: f64,
        /// External shading reduction factor, 0 to 1 (1 = unshaded)
        #[serde(default = "default_shading_factor")]
        shading_factor: f64,
        pitch: f64,
        orientation: f64,
    },
}

/// Parameters of one 2R1C branch: the element's capacitance sits between an
/// interior and an exterior resistance. When the explicit split is omitted,
/// the element's total resistance (1/U) is divided equally.
#[derive(Clone, Copy, Debug, Deserialize, Validate)]
pub struct ElementThermalMass {
    /// Areal heat capacity, in J/(m2.K)
    #[validate(exclusive_minimum = 0.0)]
    pub areal_heat_capacity: f64,
    /// Resistance between room air and the mass layer, in m2K/W
    #[validate(exclusive_minimum = 0.0)]
    pub interior_resistance: Option<f64>,
    /// Resistance between the mass layer and the external boundary, in m2K/W
    #[validate(exclusive_minimum = 0.0)]
    pub exterior_resistance: Option<f64>,
}

#[derive(Clone, Copy, Debug, Deserialize, Validate)]
pub struct AirHandling {
    /// Zone air volume, in m3
    #[validate(exclusive_minimum = 0.0)]
    pub volume: f64,
    /// Mechanical supply flow, in m3/s
    #[validate(minimum = 0.0)]
    pub mechanical_ventilation_flow: f64,
    /// Fraction of exhaust heat recovered onto the supply flow, 0 to 1
    #[validate(minimum = 0.0)]
    #[validate(maximum = 1.0)]
    pub heat_recovery_effectiveness: f64,
    /// Uncontrolled infiltration, in air changes per hour
    #[validate(minimum = 0.0)]
    pub infiltration_air_changes: f64,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Setpoints {
    /// Heating setpoint, in deg C
    pub heating: f64,
    /// Cooling setpoint, in deg C; the band between the two free-floats
    pub cooling: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ScheduledGain {
    /// Heat emitted while the schedule is on, in W
    pub load: f64,
    pub periods: Vec<OnPeriod>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct InternalGainsInput {
    /// Equipment heat, in W, present every hour
    #[serde(default)]
    pub equipment: f64,
    /// Occupancy heat, in W, present every hour
    #[serde(default)]
    pub occupancy: f64,
    /// Lighting heat, in W, present every hour
    #[serde(default)]
    pub lighting: f64,
    /// Additional loads active only during their daily on-periods
    #[serde(default)]
    pub scheduled: Vec<ScheduledGain>,
}

/// The complete building model handed to the solvers. Immutable once
/// validated; scenario sweeps clone and modify before validation.
#[derive(Clone, Debug, Deserialize)]
pub struct BuildingInput {
    pub elements: IndexMap<String, BuildingElement>,
    pub air: AirHandling,
    #[serde(default)]
    pub gains: InternalGainsInput,
    pub setpoints: Setpoints,
    /// External surface heat transfer coefficient h_e, in W/m2K
    #[serde(default = "default_external_surface_coefficient")]
    pub external_surface_coefficient: f64,
    /// Air node capacitance for the dynamic model, in J/K. Omitted means the
    /// volumetric capacity of the zone air; zero makes the air node
    /// quasi-steady.
    #[serde(default)]
    pub air_node_capacitance: Option<f64>,
    /// Uniform starting temperature for the dynamic model, in deg C.
    /// Omitted means nodes start at their steady state.
    #[serde(default)]
    pub initial_temperature: Option<f64>,
}

impl BuildingInput {
    /// Re-validate every numeric invariant, failing on the first violation.
    /// Collaborators are expected to hand over validated data, but the
    /// solvers never trust that: a non-physical parameter must fail loudly
    /// before any load figure is produced.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (name, element) in &self.elements {
            element.validate(name)?;
        }

        let air = &self.air;
        if air.volume <= 0.0 {
            return Err(ConfigurationError::new(
                "air handling",
                "volume",
                air.volume,
                "must be > 0",
            ));
        }
        if air.mechanical_ventilation_flow < 0.0 {
            return Err(ConfigurationError::new(
                "air handling",
                "mechanical_ventilation_flow",
                air.mechanical_ventilation_flow,
                "must be >= 0",
            ));
        }
        if !(0.0..=1.0).contains(&air.heat_recovery_effectiveness) {
            return Err(ConfigurationError::new(
                "air handling",
                "heat_recovery_effectiveness",
                air.heat_recovery_effectiveness,
                "must be within [0, 1]",
            ));
        }
        if air.infiltration_air_changes < 0.0 {
            return Err(ConfigurationError::new(
                "air handling",
                "infiltration_air_changes",
                air.infiltration_air_changes,
                "must be >= 0",
            ));
        }

        if self.setpoints.cooling < self.setpoints.heating {
            return Err(ConfigurationError::new(
                "setpoints",
                "cooling",
                self.setpoints.cooling,
                "must be at or above the heating setpoint",
            ));
        }

        if self.external_surface_coefficient <= 0.0 {
            return Err(ConfigurationError::new(
                "building",
                "external_surface_coefficient",
                self.external_surface_coefficient,
                "must be > 0",
            ));
        }
        if let Some(capacitance) = self.air_node_capacitance {
            if capacitance < 0.0 {
                return Err(ConfigurationError::new(
                    "air node",
                    "air_node_capacitance",
                    capacitance,
                    "must be >= 0",
                ));
            }
        }

        for (i, gain) in self.gains.scheduled.iter().enumerate() {
            if gain.load < 0.0 {
                return Err(ConfigurationError::new(
                    format!("scheduled gain {i}"),
                    "load",
                    gain.load,
                    "must be >= 0",
                ));
            }
            crate::core::schedule::DailySchedule::from_periods(
                &format!("scheduled gain {i}"),
                &gain.periods,
            )?;
        }
        for (field, value) in [
            ("equipment", self.gains.equipment),
            ("occupancy", self.gains.occupancy),
            ("lighting", self.gains.lighting),
        ] {
            if value < 0.0 {
                return Err(ConfigurationError::new(
                    "internal gains",
                    field,
                    value,
                    "must be >= 0",
                ));
            }
        }

        Ok(())
    }
}

/// Deserialize and validate a building model from JSON.
pub fn ingest_building_input(input: impl Read) -> anyhow::Result<BuildingInput> {
    let building: BuildingInput =
        serde_json::from_reader(input).context("building input is not valid JSON")?;

    // range guards declared on the input structs, then the physical checks
    building
        .air
        .validate()
        .context("air handling failed range validation")?;
    for (name, element) in &building.elements {
        if let BuildingElement::Opaque {
            thermal_mass: Some(mass),
            ..
        } = element
        {
            mass.validate()
                .with_context(|| format!("thermal mass of '{name}' failed range validation"))?;
        }
    }
    BuildingInput::validate(&building)?;

    Ok(building)
}
