// Ventilation and infiltration heat transfer for a single zone. Mechanical
// supply is reduced by the heat-recovery effectiveness; infiltration is not.

use crate::core::material_properties::AIR;
use crate::core::units::SECONDS_PER_HOUR;
use crate::input::AirHandling;

/// Convert an air change rate (1/h) to a flow rate in m3/s.
pub(crate) fn air_change_rate_to_flow_rate(air_change_rate: f64, zone_volume: f64) -> f64 {
    air_change_rate * zone_volume / SECONDS_PER_HOUR as f64
}

/// Ventilation heat transfer coefficient h_ve, in W/K:
///
///   rho * c_p * (V_mech * (1 - eta_hrv) + V_inf)
///
/// Multiplying by (T_out - T_indoor) gives the ventilation heat flow.
pub fn ventilation_heat_transfer_coefficient(air: &AirHandling) -> f64 {
    let infiltration_flow =
        air_change_rate_to_flow_rate(air.infiltration_air_changes, air.volume);
    let effective_mechanical_flow =
        air.mechanical_ventilation_flow * (1.0 - air.heat_recovery_effectiveness);

    AIR.volumetric_heat_capacity() * (effective_mechanical_flow + infiltration_flow)
}
