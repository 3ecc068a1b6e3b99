pub mod building_element;
pub mod design_day;
pub mod internal_gains;
pub mod thermal_network;
pub mod ventilation;
pub mod zone;

/// Whether a demand figure is for heating or cooling. The two modes differ
/// in setpoint, in the opaque-surface boundary temperature and in whether
/// solar and internal gains are credited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DemandMode {
    Heating,
    Cooling,
}
