/// This module contains data on the properties of materials involved in the
/// zone heat balance. Only dry air is needed at present.

#[derive(Clone, Copy, Debug)]
pub struct MaterialProperties {
    density: f64,               // kg/m3
    specific_heat_capacity: f64, // J/(kg.K)
}

impl MaterialProperties {
    pub const fn new(density: f64, specific_heat_capacity: f64) -> Self {
        Self {
            density,
            specific_heat_capacity,
        }
    }

    pub fn density_kg_per_m3(&self) -> f64 {
        self.density
    }

    pub fn specific_heat_capacity(&self) -> f64 {
        self.specific_heat_capacity
    }

    /// Volumetric heat capacity, in J/(m3.K)
    pub fn volumetric_heat_capacity(&self) -> f64 {
        self.density * self.specific_heat_capacity
    }
}

/// Dry air at around 20 degC
pub const AIR: MaterialProperties = MaterialProperties::new(1.204, 1_006.0);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    #[rstest]
    fn should_have_correct_air_properties() {
        assert_relative_eq!(AIR.density_kg_per_m3(), 1.204);
        assert_relative_eq!(AIR.specific_heat_capacity(), 1_006.0);
        assert_relative_eq!(AIR.volumetric_heat_capacity(), 1.204 * 1_006.0);
    }
}
