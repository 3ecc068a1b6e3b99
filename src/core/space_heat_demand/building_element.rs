use crate::errors::{ConfigurationError, DataError, EngineError};
use crate::external_conditions::ExternalConditions;
use crate::input::BuildingElement;

/// Which external temperature drives the transmission through opaque
/// elements. Heating design ignores solar on opaque surfaces (the air
/// temperature is the conservative choice); cooling design and the dynamic
/// model use sol-air.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum OpaqueBoundary {
    AirTemperature,
    SolAir,
}

impl BuildingElement {
    pub fn area(&self) -> f64 {
        match *self {
            BuildingElement::Opaque { area, .. } => area,
            BuildingElement::Ground { area, .. } => area,
            BuildingElement::Transparent { area, .. } => area,
        }
    }

    pub fn u_value(&self) -> f64 {
        match *self {
            BuildingElement::Opaque { u_value, .. } => u_value,
            BuildingElement::Ground { u_value, .. } => u_value,
            BuildingElement::Transparent { u_value, .. } => u_value,
        }
    }

    /// Fabric heat loss coefficient U * A, in W/K.
    pub fn fabric_heat_loss(&self) -> f64 {
        self.u_value() * self.area()
    }

    /// Lumped heat capacity, in J/K. Zero for anything without a
    /// thermal-mass block; such elements are purely resistive.
    pub fn heat_capacity(&self) -> f64 {
        match *self {
            BuildingElement::Opaque {
                area,
                thermal_mass: Some(ref mass),
                ..
            } => area * mass.areal_heat_capacity,
            _ => 0.0,
        }
    }

    pub fn is_ground_contact(&self) -> bool {
        matches!(self, BuildingElement::Ground { .. })
    }

    /// Solar gains transmitted into the zone, in W. Only transparent
    /// elements transmit; opaque surfaces influence the balance through
    /// their sol-air boundary instead.
    pub fn solar_gains(&self, external_conditions: &ExternalConditions, hour: usize) -> f64 {
        match *self {
            BuildingElement::Transparent {
                area,
                g_value,
                shading_factor,
                pitch,
                orientation,
                ..
            } => {
                g_value
                    * shading_factor
                    * area
                    * external_conditions.plane_irradiance(hour, pitch, orientation)
            }
            _ => 0.0,
        }
    }

    /// The driving temperature on the outside of this element for the given
    /// hour, in deg C.
    pub(crate) fn external_boundary_temp(
        &self,
        name: &str,
        external_conditions: &ExternalConditions,
        hour: usize,
        external_surface_coefficient: f64,
        opaque_boundary: OpaqueBoundary,
    ) -> Result<f64, EngineError> {
        match *self {
            BuildingElement::Opaque {
                solar_absorptance,
                pitch,
                orientation,
                ..
            } => Ok(match opaque_boundary {
                OpaqueBoundary::AirTemperature => external_conditions.air_temp(hour),
                OpaqueBoundary::SolAir => external_conditions.sol_air_temp(
                    hour,
                    pitch,
                    orientation,
                    solar_absorptance,
                    external_surface_coefficient,
                )?,
            }),
            BuildingElement::Ground { .. } => external_conditions.ground_temp(hour).ok_or_else(|| {
                DataError::MissingGroundTemperatures {
                    element: name.to_string(),
                }
                .into()
            }),
            BuildingElement::Transparent { .. } => Ok(external_conditions.air_temp(hour)),
        }
    }

    pub(crate) fn validate(&self, name: &str) -> Result<(), ConfigurationError> {
        let check_positive = |field: &'static str, value: f64| {
            if value <= 0.0 {
                Err(ConfigurationError::new(name, field, value, "must be > 0"))
            } else {
                Ok(())
            }
        };
        let check_fraction = |field: &'static str, value: f64| {
            if !(0.0..=1.0).contains(&value) {
                Err(ConfigurationError::new(
                    name,
                    field,
                    value,
                    "must be within [0, 1]",
                ))
            } else {
                Ok(())
            }
        };
        let check_angles = |pitch: f64, orientation: f64| {
            if !(0.0..=180.0).contains(&pitch) {
                return Err(ConfigurationError::new(
                    name,
                    "pitch",
                    pitch,
                    "must be within [0, 180] degrees",
                ));
            }
            if !(0.0..=360.0).contains(&orientation) {
                return Err(ConfigurationError::new(
                    name,
                    "orientation",
                    orientation,
                    "must be within [0, 360] degrees",
                ));
            }
            Ok(())
        };

        check_positive("area", self.area())?;
        check_positive("u_value", self.u_value())?;

        match *self {
            BuildingElement::Opaque {
                solar_absorptance,
                pitch,
                orientation,
                ref thermal_mass,
                ..
            } => {
                check_fraction("solar_absorptance", solar_absorptance)?;
                check_angles(pitch, orientation)?;
                if let Some(mass) = thermal_mass {
                    check_positive("areal_heat_capacity", mass.areal_heat_capacity)?;
                    if let Some(resistance) = mass.interior_resistance {
                        check_positive("interior_resistance", resistance)?;
                    }
                    if let Some(resistance) = mass.exterior_resistance {
                        check_positive("exterior_resistance", resistance)?;
                    }
                }
            }
            BuildingElement::Ground { .. } => {}
            BuildingElement::Transparent {
                g_value,
                shading_factor,
                pitch,
                orientation,
                ..
            } => {
                check_fraction("g_value", g_value)?;
                check_fraction("shading_factor", shading_factor)?;
                check_angles(pitch, orientation)?;
            }
        }

        Ok(())
    }
}
