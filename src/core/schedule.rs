use crate::core::units::HOURS_PER_DAY;
use crate::errors::ConfigurationError;
use serde::Deserialize;

/// A half-open daily on-period, in whole hours: `{ "start": 7, "end": 9 }`
/// covers 07:00 to 09:00.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct OnPeriod {
    pub start: u32,
    pub end: u32,
}

/// A daily schedule expanded from on-periods into one boolean per hour of
/// the day, repeated identically every day of the run.
#[derive(Clone, Debug, PartialEq)]
pub struct DailySchedule {
    on: [bool; HOURS_PER_DAY as usize],
}

impl DailySchedule {
    pub fn from_periods(
        subject: &str,
        periods: &[OnPeriod],
    ) -> Result<Self, ConfigurationError> {
        let mut on = [false; HOURS_PER_DAY as usize];
        for period in periods {
            if period.start >= period.end {
                return Err(ConfigurationError::new(
                    subject,
                    "schedule period start",
                    period.start as f64,
                    "must be before period end",
                ));
            }
            if period.end > HOURS_PER_DAY {
                return Err(ConfigurationError::new(
                    subject,
                    "schedule period end",
                    period.end as f64,
                    "must be at most 24",
                ));
            }
            for hour in period.start..period.end {
                on[hour as usize] = true;
            }
        }
        Ok(Self { on })
    }

    pub fn is_on(&self, hour_of_day: u32) -> bool {
        self.on[(hour_of_day % HOURS_PER_DAY) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_expand_periods_into_hours() {
        let schedule = DailySchedule::from_periods(
            "kitchen",
            &[OnPeriod { start: 7, end: 9 }, OnPeriod { start: 18, end: 20 }],
        )
        .unwrap();
        let on_hours: Vec<u32> = (0..24).filter(|h| schedule.is_on(*h)).collect();
        assert_eq!(on_hours, vec![7, 8, 18, 19]);
    }

    #[rstest]
    #[case(OnPeriod { start: 9, end: 9 })]
    #[case(OnPeriod { start: 12, end: 7 })]
    #[case(OnPeriod { start: 20, end: 25 })]
    fn should_reject_invalid_periods(#[case] period: OnPeriod) {
        assert!(DailySchedule::from_periods("kitchen", &[period]).is_err());
    }

    #[rstest]
    fn should_be_all_off_without_periods() {
        let schedule = DailySchedule::from_periods("unused", &[]).unwrap();
        assert!((0..24).all(|h| !schedule.is_on(h)));
    }
}
