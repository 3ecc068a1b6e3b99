use crate::core::space_heat_demand::DemandMode;
use crate::core::units::{HOURS_IN_NON_LEAP_YEAR, HOURS_PER_DAY};
use crate::errors::DataError;
use crate::external_conditions::ExternalConditions;
use crate::statistics;
use std::ops::Range;

/// The 24-hour slice of the annual series bounding expected extreme demand,
/// following the ASHRAE-style 0.4% / 99.6% annual design conditions.
/// Recomputed per run from the weather series, never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct DesignDay {
    pub mode: DemandMode,
    /// Percentile design temperature over the whole year, in deg C
    /// (0.4th percentile for heating, 99.6th for cooling).
    pub design_temp: f64,
    /// Hour-of-year index of the selected extreme hour.
    pub extreme_hour: usize,
    /// Hour-of-year range of the calendar day containing the extreme hour.
    pub hours: Range<usize>,
}

/// Select the design day for one demand mode from a full year of hourly
/// temperatures. The design temperature is the percentile value (linear
/// interpolation between order statistics); the day is the calendar day
/// holding the most extreme hour at-or-beyond that threshold, which for a
/// complete series is the annual extreme. Ties resolve to the earliest hour.
pub fn select_design_day(
    air_temps: &[f64],
    mode: DemandMode,
) -> Result<DesignDay, DataError> {
    if air_temps.len() < HOURS_IN_NON_LEAP_YEAR {
        return Err(DataError::IncompleteYear {
            actual: air_temps.len(),
        });
    }

    let design_temp = match mode {
        DemandMode::Heating => statistics::quantile(air_temps, 0.004),
        DemandMode::Cooling => statistics::quantile(air_temps, 0.996),
    };

    let mut extreme_hour = 0;
    let mut extreme = air_temps[0];
    for (hour, &temp) in air_temps.iter().enumerate().skip(1) {
        // strict comparison keeps the earliest hour on ties
        let more_extreme = match mode {
            DemandMode::Heating => temp < extreme,
            DemandMode::Cooling => temp > extreme,
        };
        if more_extreme {
            extreme = temp;
            extreme_hour = hour;
        }
    }

    let day_start = extreme_hour / HOURS_PER_DAY as usize * HOURS_PER_DAY as usize;

    Ok(DesignDay {
        mode,
        design_temp,
        extreme_hour,
        hours: day_start..day_start + HOURS_PER_DAY as usize,
    })
}

/// Convenience selector for both design days at once.
pub fn select_design_days(
    external_conditions: &ExternalConditions,
) -> Result<(DesignDay, DesignDay), DataError> {
    let temps = external_conditions.air_temps();
    Ok((
        select_design_day(temps, DemandMode::Heating)?,
        select_design_day(temps, DemandMode::Cooling)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn year_with_extremes(min_hour: usize, max_hour: usize) -> Vec<f64> {
        let mut temps = vec![10.0; 8760];
        temps[min_hour] = -12.0;
        temps[max_hour] = 31.0;
        temps
    }

    #[rstest]
    fn should_reject_short_series() {
        let err = select_design_day(&vec![0.0; 5000], DemandMode::Heating).unwrap_err();
        assert!(matches!(err, DataError::IncompleteYear { actual: 5000 }));
    }

    #[rstest]
    fn should_find_day_containing_the_coldest_hour() {
        let temps = year_with_extremes(5003, 6010);
        let day = select_design_day(&temps, DemandMode::Heating).unwrap();
        assert_eq!(day.extreme_hour, 5003);
        assert_eq!(day.hours, 4992..5016);
        assert!(day.hours.contains(&day.extreme_hour));
    }

    #[rstest]
    fn should_find_day_containing_the_hottest_hour() {
        let temps = year_with_extremes(5003, 6010);
        let day = select_design_day(&temps, DemandMode::Cooling).unwrap();
        assert_eq!(day.extreme_hour, 6010);
        assert_eq!(day.hours, 6000..6024);
    }

    #[rstest]
    fn should_resolve_ties_to_the_earliest_hour() {
        let mut temps = vec![10.0; 8760];
        temps[2500] = -12.0;
        temps[7100] = -12.0;
        let day = select_design_day(&temps, DemandMode::Heating).unwrap();
        assert_eq!(day.extreme_hour, 2500);
    }

    #[rstest]
    fn should_report_percentile_design_temperature_within_range() {
        let temps: Vec<f64> = (0..8760)
            .map(|h| 10.0 - 15.0 * ((h as f64) * std::f64::consts::TAU / 8760.0).cos())
            .collect();
        let heating = select_design_day(&temps, DemandMode::Heating).unwrap();
        let cooling = select_design_day(&temps, DemandMode::Cooling).unwrap();
        assert!(heating.design_temp < cooling.design_temp);
        assert!(heating.design_temp >= -5.0 && heating.design_temp < 0.0);
        assert!(cooling.design_temp > 20.0 && cooling.design_temp <= 25.0);
    }

    #[rstest]
    fn should_select_both_days_from_external_conditions() {
        let conditions = crate::external_conditions::test_support::year_from_temps(
            year_with_extremes(100, 8000),
        );
        let (heating, cooling) = select_design_days(&conditions).unwrap();
        assert_eq!(heating.extreme_hour, 100);
        assert_eq!(cooling.extreme_hour, 8000);
        assert_eq!(heating.mode, DemandMode::Heating);
        assert_eq!(cooling.mode, DemandMode::Cooling);
    }
}
