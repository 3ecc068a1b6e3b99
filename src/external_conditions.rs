use crate::core::units::{HOURS_IN_LEAP_YEAR, HOURS_IN_NON_LEAP_YEAR};
use crate::errors::{ConfigurationError, DataError};
use chrono::{Datelike, NaiveDateTime, Timelike};
use itertools::Itertools;

/// Validated hourly outdoor conditions for one year, plus the solar geometry
/// derived from them. This is the single entry point through which
/// collaborator-parsed weather data reaches the solvers; everything is
/// checked here once so the solvers can index freely.
///
/// Arguments to [`ExternalConditions::new`]:
/// * `timestamps` - naive local time, one per hour, strictly chronological
/// * `air_temps` - dry-bulb temperature, in deg C (one entry per hour)
/// * `direct_normal_radiations` - direct beam normal irradiance, in W/m2
/// * `diffuse_horizontal_radiations` - diffuse horizontal irradiance, in W/m2
/// * `wind_speeds` - wind speed in m/s, if the source provides it
/// * `ground_temps_monthly` - ground temperature per calendar month, in deg C,
///   typically from the weather file header; required only when the building
///   has ground-contact elements
/// * `latitude` - latitude of the weather station, in degrees, north positive
#[derive(Clone, Debug)]
pub struct ExternalConditions {
    timestamps: Vec<NaiveDateTime>,
    air_temps: Vec<f64>,
    direct_normal_radiations: Vec<f64>,
    diffuse_horizontal_radiations: Vec<f64>,
    wind_speeds: Option<Vec<f64>>,
    ground_temps_monthly: Option<[f64; 12]>,
    pub latitude: f64,
    solar_altitudes: Vec<f64>,
    solar_azimuth_angles: Vec<f64>,
}

impl ExternalConditions {
    pub fn new(
        timestamps: Vec<NaiveDateTime>,
        air_temps: Vec<f64>,
        direct_normal_radiations: Vec<f64>,
        diffuse_horizontal_radiations: Vec<f64>,
        wind_speeds: Option<Vec<f64>>,
        ground_temps_monthly: Option<[f64; 12]>,
        latitude: f64,
    ) -> Result<Self, DataError> {
        let hours = timestamps.len();
        if hours != HOURS_IN_NON_LEAP_YEAR && hours != HOURS_IN_LEAP_YEAR {
            return Err(DataError::IncompleteYear { actual: hours });
        }
        for (field, len) in [
            ("air_temps", air_temps.len()),
            ("direct_normal_radiations", direct_normal_radiations.len()),
            (
                "diffuse_horizontal_radiations",
                diffuse_horizontal_radiations.len(),
            ),
        ] {
            if len != hours {
                return Err(DataError::MismatchedSeries {
                    field,
                    expected: hours,
                    actual: len,
                });
            }
        }
        if let Some(ref speeds) = wind_speeds {
            if speeds.len() != hours {
                return Err(DataError::MismatchedSeries {
                    field: "wind_speeds",
                    expected: hours,
                    actual: speeds.len(),
                });
            }
        }

        // One record per hour, no gaps and no repeats. A broken sequence is a
        // data-quality error, never interpolated over.
        for (position, (earlier, later)) in timestamps.iter().tuple_windows().enumerate() {
            let step_minutes = (*later - *earlier).num_minutes();
            if step_minutes != 60 {
                return Err(DataError::NonChronological {
                    position: position + 1,
                    step_minutes,
                });
            }
        }

        let solar_positions = timestamps
            .iter()
            .map(|ts| {
                solar_position(
                    latitude,
                    ts.ordinal(),
                    // evaluated mid-hour, as the record covers the whole hour
                    ts.hour() as f64 + 0.5,
                )
            })
            .collect::<Vec<_>>();
        let (solar_altitudes, solar_azimuth_angles): (Vec<f64>, Vec<f64>) =
            solar_positions.into_iter().unzip();

        Ok(Self {
            timestamps,
            air_temps,
            direct_normal_radiations,
            diffuse_horizontal_radiations,
            wind_speeds,
            ground_temps_monthly,
            latitude,
            solar_altitudes,
            solar_azimuth_angles,
        })
    }

    /// Number of hourly records (8760 or 8784).
    pub fn hours(&self) -> usize {
        self.timestamps.len()
    }

    pub fn timestamp(&self, hour: usize) -> NaiveDateTime {
        self.timestamps[hour]
    }

    pub fn air_temp(&self, hour: usize) -> f64 {
        self.air_temps[hour]
    }

    pub fn air_temps(&self) -> &[f64] {
        &self.air_temps
    }

    /// Wind speed in m/s, if the source provided the series. Not consumed
    /// by the solvers (the external surface coefficient is a fixed
    /// configuration value) but part of the weather contract for
    /// downstream consumers.
    pub fn wind_speed(&self, hour: usize) -> Option<f64> {
        self.wind_speeds.as_ref().map(|speeds| speeds[hour])
    }

    /// Ground temperature for the calendar month the given hour falls in.
    pub fn ground_temp(&self, hour: usize) -> Option<f64> {
        self.ground_temps_monthly
            .map(|monthly| monthly[self.timestamps[hour].month0() as usize])
    }

    /// Cosine of the angle of incidence of the solar beam on a plane of the
    /// given pitch (tilt from horizontal, degrees) and orientation (degrees
    /// clockwise from North). May be negative when the sun is behind the
    /// plane.
    fn cos_incidence(&self, hour: usize, pitch: f64, orientation: f64) -> f64 {
        let zenith = (90.0 - self.solar_altitudes[hour]).to_radians();
        let azimuth = self.solar_azimuth_angles[hour].to_radians();
        let pitch = pitch.to_radians();
        let orientation = orientation.to_radians();

        zenith.sin() * pitch.sin() * (azimuth - orientation).cos() + zenith.cos() * pitch.cos()
    }

    /// Total irradiance on a tilted plane, in W/m2: beam projected through
    /// the incidence angle plus diffuse weighted by the isotropic sky view
    /// factor (1 + cos(pitch)) / 2.
    pub fn plane_irradiance(&self, hour: usize, pitch: f64, orientation: f64) -> f64 {
        let direct = if self.solar_altitudes[hour] > 0.0 {
            self.direct_normal_radiations[hour] * self.cos_incidence(hour, pitch, orientation).max(0.0)
        } else {
            0.0
        };
        let f_sky = (1.0 + pitch.to_radians().cos()) / 2.0;

        direct + self.diffuse_horizontal_radiations[hour] * f_sky
    }

    /// Sol-air temperature for an opaque surface of the given pitch,
    /// orientation and solar absorptance:
    ///
    ///   T_sol = T_out + alpha * I / h_e
    ///
    /// where h_e is the external surface heat transfer coefficient in
    /// W/m2K. Since I >= 0 this never falls below the air temperature.
    pub fn sol_air_temp(
        &self,
        hour: usize,
        pitch: f64,
        orientation: f64,
        absorptance: f64,
        external_surface_coefficient: f64,
    ) -> Result<f64, ConfigurationError> {
        if external_surface_coefficient <= 0.0 {
            return Err(ConfigurationError::new(
                "external surface",
                "external_surface_coefficient",
                external_surface_coefficient,
                "must be > 0",
            ));
        }
        let irradiance = self.plane_irradiance(hour, pitch, orientation);

        Ok(self.air_temps[hour] + absorptance * irradiance / external_surface_coefficient)
    }
}

/// Solar altitude and azimuth (both degrees, azimuth clockwise from North)
/// for the given latitude, day of year and local solar hour.
fn solar_position(latitude: f64, day_of_year: u32, hour: f64) -> (f64, f64) {
    let declination = 23.45 * (360.0 * (284.0 + day_of_year as f64) / 365.0).to_radians().sin();
    let hour_angle = (15.0 * (hour - 12.0)).to_radians();
    let latitude = latitude.to_radians();
    let declination = declination.to_radians();

    let altitude = (latitude.sin() * declination.sin()
        + latitude.cos() * declination.cos() * hour_angle.cos())
    .asin()
    .to_degrees();

    // atan2 form gives azimuth from South, positive towards West; shift to
    // the clockwise-from-North convention used for surface orientations
    let azimuth_from_south = hour_angle
        .sin()
        .atan2(hour_angle.cos() * latitude.sin() - declination.tan() * latitude.cos())
        .to_degrees();
    let azimuth = (azimuth_from_south + 180.0).rem_euclid(360.0);

    (altitude, azimuth)
}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use super::test_support::hourly_timestamps;

    #[fixture]
    fn conditions() -> ExternalConditions {
        let hours = 8760;
        let mut dni = vec![0.0; hours];
        let mut dhi = vec![0.0; hours];
        // a sunny midsummer midday (1 July, 12:00)
        let noon = (181 * 24) + 12;
        dni[noon] = 800.0;
        dhi[noon] = 100.0;
        ExternalConditions::new(
            hourly_timestamps(2021, hours),
            vec![15.0; hours],
            dni,
            dhi,
            None,
            Some([4.0, 4.0, 5.0, 7.0, 9.0, 11.0, 13.0, 13.0, 12.0, 10.0, 7.0, 5.0]),
            51.5,
        )
        .unwrap()
    }

    #[rstest]
    fn should_reject_partial_year() {
        let err = ExternalConditions::new(
            hourly_timestamps(2021, 100),
            vec![0.0; 100],
            vec![0.0; 100],
            vec![0.0; 100],
            None,
            None,
            51.5,
        )
        .unwrap_err();
        assert!(matches!(err, DataError::IncompleteYear { actual: 100 }));
    }

    #[rstest]
    fn should_reject_mismatched_series_lengths() {
        let err = ExternalConditions::new(
            hourly_timestamps(2021, 8760),
            vec![0.0; 8760],
            vec![0.0; 8759],
            vec![0.0; 8760],
            None,
            None,
            51.5,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DataError::MismatchedSeries {
                field: "direct_normal_radiations",
                ..
            }
        ));
    }

    #[rstest]
    fn should_reject_gapped_timestamps() {
        let mut timestamps = hourly_timestamps(2021, 8760);
        // open up a two-hour gap partway through
        for ts in timestamps.iter_mut().skip(1000) {
            *ts += Duration::hours(1);
        }
        let err = ExternalConditions::new(
            timestamps,
            vec![0.0; 8760],
            vec![0.0; 8760],
            vec![0.0; 8760],
            None,
            None,
            51.5,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DataError::NonChronological {
                position: 1000,
                step_minutes: 120
            }
        ));
    }

    #[rstest]
    fn should_accept_leap_year_series() {
        let conditions = ExternalConditions::new(
            hourly_timestamps(2020, 8784),
            vec![5.0; 8784],
            vec![0.0; 8784],
            vec![0.0; 8784],
            None,
            None,
            51.5,
        )
        .unwrap();
        assert_eq!(conditions.hours(), 8784);
    }

    #[rstest]
    fn should_carry_wind_speeds_when_provided(conditions: ExternalConditions) {
        let mut wind_speeds = vec![3.0; 8760];
        wind_speeds[10] = 7.5;
        let with_wind = ExternalConditions::new(
            hourly_timestamps(2021, 8760),
            vec![15.0; 8760],
            vec![0.0; 8760],
            vec![0.0; 8760],
            Some(wind_speeds),
            None,
            51.5,
        )
        .unwrap();
        assert_eq!(with_wind.wind_speed(10), Some(7.5));
        assert_eq!(with_wind.wind_speed(11), Some(3.0));
        // the fixture series carries no wind data
        assert_eq!(conditions.wind_speed(10), None);
    }

    #[rstest]
    fn should_reject_short_wind_speed_series() {
        let err = ExternalConditions::new(
            hourly_timestamps(2021, 8760),
            vec![0.0; 8760],
            vec![0.0; 8760],
            vec![0.0; 8760],
            Some(vec![0.0; 8000]),
            None,
            51.5,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DataError::MismatchedSeries {
                field: "wind_speeds",
                ..
            }
        ));
    }

    #[rstest]
    fn should_look_up_ground_temp_by_month(conditions: ExternalConditions) {
        assert_eq!(conditions.ground_temp(0), Some(4.0)); // January
        assert_eq!(conditions.ground_temp(8759), Some(5.0)); // December
    }

    #[rstest]
    fn should_return_air_temp_for_sol_air_when_absorptance_is_zero(conditions: ExternalConditions) {
        let noon = (181 * 24) + 12;
        assert_relative_eq!(
            conditions.sol_air_temp(noon, 90.0, 180.0, 0.0, 23.0).unwrap(),
            15.0
        );
    }

    #[rstest]
    fn should_return_air_temp_for_sol_air_when_dark(conditions: ExternalConditions) {
        // midnight on 1 July, full absorptance
        let midnight = 181 * 24;
        assert_relative_eq!(
            conditions
                .sol_air_temp(midnight, 90.0, 180.0, 0.9, 23.0)
                .unwrap(),
            15.0
        );
    }

    #[rstest]
    fn should_raise_sol_air_above_air_temp_in_sunshine(conditions: ExternalConditions) {
        let noon = (181 * 24) + 12;
        // south-facing vertical wall at midday
        let t_sol = conditions.sol_air_temp(noon, 90.0, 180.0, 0.6, 23.0).unwrap();
        assert!(t_sol > 15.0);
    }

    #[rstest]
    fn should_reject_non_positive_surface_coefficient(conditions: ExternalConditions) {
        let err = conditions.sol_air_temp(0, 90.0, 180.0, 0.5, 0.0).unwrap_err();
        assert_eq!(err.field, "external_surface_coefficient");
    }

    #[rstest]
    fn should_see_only_diffuse_on_north_wall_at_noon(conditions: ExternalConditions) {
        let noon = (181 * 24) + 12;
        let north = conditions.plane_irradiance(noon, 90.0, 0.0);
        let south = conditions.plane_irradiance(noon, 90.0, 180.0);
        // vertical plane sky view factor is 1/2
        assert_relative_eq!(north, 50.0, epsilon = 1e-9);
        assert!(south > north);
    }

    #[rstest]
    fn should_compute_solar_position_at_equator_noon() {
        // around the March equinox the midday sun sits near the zenith at
        // the equator
        let (altitude, _) = solar_position(0.0, 81, 12.0);
        assert!(altitude > 85.0);
    }
}
