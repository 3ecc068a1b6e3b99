use crate::core::schedule::DailySchedule;
use crate::errors::ConfigurationError;
use crate::input::InternalGainsInput;

/// Internal heat sources for the zone: a constant base load from equipment,
/// occupancy and lighting, plus any schedule-driven loads.
#[derive(Clone, Debug)]
pub struct InternalGains {
    base: f64,
    scheduled: Vec<(f64, DailySchedule)>,
}

impl InternalGains {
    pub fn from_input(input: &InternalGainsInput) -> Result<Self, ConfigurationError> {
        let scheduled = input
            .scheduled
            .iter()
            .enumerate()
            .map(|(i, gain)| {
                DailySchedule::from_periods(&format!("scheduled gain {i}"), &gain.periods)
                    .map(|schedule| (gain.load, schedule))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            base: input.equipment + input.occupancy + input.lighting,
            scheduled,
        })
    }

    /// Return the total internal gain for the given hour of the day, in W.
    pub fn total_internal_gain_in_w(&self, hour_of_day: u32) -> f64 {
        let scheduled: f64 = self
            .scheduled
            .iter()
            .filter(|(_, schedule)| schedule.is_on(hour_of_day))
            .map(|(load, _)| load)
            .sum();

        self.base + scheduled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schedule::OnPeriod;
    use crate::input::ScheduledGain;
    use approx::assert_relative_eq;
    use rstest::*;

    #[fixture]
    fn gains() -> InternalGains {
        InternalGains::from_input(&InternalGainsInput {
            equipment: 200.0,
            occupancy: 150.0,
            lighting: 50.0,
            scheduled: vec![ScheduledGain {
                load: 1_500.0,
                periods: vec![OnPeriod { start: 12, end: 14 }],
            }],
        })
        .unwrap()
    }

    #[rstest]
    fn should_sum_base_gains_every_hour(gains: InternalGains) {
        assert_relative_eq!(gains.total_internal_gain_in_w(3), 400.0);
    }

    #[rstest]
    fn should_add_scheduled_gains_during_on_periods(gains: InternalGains) {
        assert_relative_eq!(gains.total_internal_gain_in_w(12), 1_900.0);
        assert_relative_eq!(gains.total_internal_gain_in_w(14), 400.0);
    }
}
