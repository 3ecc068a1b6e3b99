use crate::core::space_heat_demand::building_element::OpaqueBoundary;
use crate::core::space_heat_demand::design_day::DesignDay;
use crate::core::space_heat_demand::internal_gains::InternalGains;
use crate::core::space_heat_demand::ventilation::ventilation_heat_transfer_coefficient;
use crate::core::space_heat_demand::DemandMode;
use crate::errors::EngineError;
use crate::external_conditions::ExternalConditions;
use crate::input::BuildingInput;
use chrono::Timelike;
use indexmap::IndexMap;

/// Steady-state heat balance of the zone for one hour. Flows are signed
/// (positive into the zone); `demand` is the clamped non-negative power the
/// plant must supply (heating) or remove (cooling).
#[derive(Clone, Debug)]
pub struct LoadBreakdown {
    /// Transmission through each envelope element, in W, keyed by element
    /// name in configuration order.
    pub transmission: IndexMap<String, f64>,
    /// Ventilation and infiltration heat flow, in W.
    pub ventilation: f64,
    /// Solar gain transmitted through glazing, in W (zero in heating mode).
    pub solar: f64,
    /// Internal gains, in W (zero in heating mode).
    pub internal: f64,
    /// Net demand, in W, always >= 0.
    pub demand: f64,
}

impl LoadBreakdown {
    pub fn transmission_total(&self) -> f64 {
        self.transmission.values().sum()
    }
}

/// Hourly loads over one design day, with the peak identified.
#[derive(Clone, Debug)]
pub struct DesignDayLoads {
    pub day: DesignDay,
    /// One entry per hour of the design day, in day order.
    pub hourly: Vec<LoadBreakdown>,
    /// Hour-of-year index of the peak-demand hour (earliest on ties).
    pub peak_hour: usize,
}

impl DesignDayLoads {
    pub fn peak_demand(&self) -> f64 {
        self.hourly[self.peak_hour - self.day.hours.start].demand
    }

    pub fn peak_breakdown(&self) -> &LoadBreakdown {
        &self.hourly[self.peak_hour - self.day.hours.start]
    }
}

/// Compute the steady-state load for one hour of the weather series,
/// validating the configuration first.
pub fn hourly_load(
    input: &BuildingInput,
    external_conditions: &ExternalConditions,
    hour: usize,
    mode: DemandMode,
) -> Result<LoadBreakdown, EngineError> {
    input.validate()?;
    let gains = InternalGains::from_input(&input.gains)?;
    hourly_load_unchecked(input, &gains, external_conditions, hour, mode)
}

/// The balance itself; callers have validated `input` already.
///
/// Heating is the conservative design balance: opaque surfaces are driven by
/// the outdoor air temperature and no solar or internal gains are credited.
/// Cooling drives opaque surfaces at sol-air temperature and includes all
/// gains; the ground-contact term is clamped at >= 0 so a cool slab never
/// offsets the load.
fn hourly_load_unchecked(
    input: &BuildingInput,
    gains: &InternalGains,
    external_conditions: &ExternalConditions,
    hour: usize,
    mode: DemandMode,
) -> Result<LoadBreakdown, EngineError> {
    let setpoint = match mode {
        DemandMode::Heating => input.setpoints.heating,
        DemandMode::Cooling => input.setpoints.cooling,
    };
    let opaque_boundary = match mode {
        DemandMode::Heating => OpaqueBoundary::AirTemperature,
        DemandMode::Cooling => OpaqueBoundary::SolAir,
    };

    let mut transmission = IndexMap::new();
    for (name, element) in &input.elements {
        let boundary = element.external_boundary_temp(
            name,
            external_conditions,
            hour,
            input.external_surface_coefficient,
            opaque_boundary,
        )?;
        let mut flow = element.fabric_heat_loss() * (boundary - setpoint);
        if mode == DemandMode::Cooling && element.is_ground_contact() {
            flow = flow.max(0.0);
        }
        transmission.insert(name.clone(), flow);
    }

    let ventilation = ventilation_heat_transfer_coefficient(&input.air)
        * (external_conditions.air_temp(hour) - setpoint);

    let (solar, internal) = match mode {
        DemandMode::Heating => (0.0, 0.0),
        DemandMode::Cooling => {
            let solar = input
                .elements
                .values()
                .map(|element| element.solar_gains(external_conditions, hour))
                .sum();
            let hour_of_day = external_conditions.timestamp(hour).hour();
            (solar, gains.total_internal_gain_in_w(hour_of_day))
        }
    };

    let transmission_total: f64 = transmission.values().sum();
    let demand = match mode {
        DemandMode::Heating => (-(transmission_total + ventilation)).max(0.0),
        DemandMode::Cooling => (transmission_total + ventilation + solar + internal).max(0.0),
    };

    Ok(LoadBreakdown {
        transmission,
        ventilation,
        solar,
        internal,
        demand,
    })
}

/// Run the steady-state balance over every hour of a design day and pick
/// the peak.
pub fn design_day_loads(
    input: &BuildingInput,
    external_conditions: &ExternalConditions,
    day: &DesignDay,
) -> Result<DesignDayLoads, EngineError> {
    input.validate()?;
    let gains = InternalGains::from_input(&input.gains)?;

    let hourly = day
        .hours
        .clone()
        .map(|hour| hourly_load_unchecked(input, &gains, external_conditions, hour, day.mode))
        .collect::<Result<Vec<_>, _>>()?;

    // strict comparison keeps the earliest hour on ties
    let mut peak_offset = 0;
    for (offset, load) in hourly.iter().enumerate().skip(1) {
        if load.demand > hourly[peak_offset].demand {
            peak_offset = offset;
        }
    }

    Ok(DesignDayLoads {
        day: day.clone(),
        hourly,
        peak_hour: day.hours.start + peak_offset,
    })
}
