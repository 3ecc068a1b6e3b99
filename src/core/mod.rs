pub mod material_properties;
pub mod schedule;
pub mod space_heat_demand;
pub mod units;
