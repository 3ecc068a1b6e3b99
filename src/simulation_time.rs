use crate::core::units::HOURS_PER_DAY;

/// A simulation timeline expressed in hours from the start of the weather
/// series. `step` may be a whole hour or an even sub-hourly division of one.
#[derive(Clone, Copy, Debug)]
pub struct SimulationTime {
    start_time: f64,
    end_time: f64,
    step: f64,
}

impl SimulationTime {
    pub fn new(start_time: f64, end_time: f64, step: f64) -> Self {
        Self {
            start_time,
            end_time,
            step,
        }
    }

    pub fn total_steps(&self) -> usize {
        ((self.end_time - self.start_time) / self.step).ceil() as usize
    }

    pub(crate) fn iter(&self) -> SimulationTimeIterator {
        SimulationTimeIterator::from(*self)
    }
}

#[derive(Clone)]
pub struct SimulationTimeIterator {
    current_index: usize,
    current_time: f64,
    started: bool,
    simulation_time: SimulationTime,
}

impl SimulationTimeIterator {
    fn from(simulation_time: SimulationTime) -> Self {
        SimulationTimeIterator {
            current_index: 0,
            current_time: simulation_time.start_time,
            started: false,
            simulation_time,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SimulationTimeIteration {
    pub index: usize,
    pub time: f64,
    pub timestep: f64,
}

impl SimulationTimeIteration {
    pub fn current_hour(&self) -> u32 {
        self.time.floor() as u32
    }

    pub fn hour_of_day(&self) -> u32 {
        self.current_hour() % HOURS_PER_DAY
    }

    pub fn current_day(&self) -> u32 {
        self.time as u32 / HOURS_PER_DAY
    }
}

impl Iterator for SimulationTimeIterator {
    type Item = SimulationTimeIteration;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started && self.simulation_time.start_time != self.simulation_time.end_time {
            self.started = true;
            return Some(SimulationTimeIteration {
                index: 0,
                time: self.simulation_time.start_time,
                timestep: self.simulation_time.step,
            });
        }
        match self.current_time < (self.simulation_time.end_time - self.simulation_time.step) {
            true => {
                self.current_index += 1;
                self.current_time += self.simulation_time.step;
                Some(SimulationTimeIteration {
                    index: self.current_index,
                    time: self.current_time,
                    timestep: self.simulation_time.step,
                })
            }
            false => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[fixture]
    pub fn timestep() -> f64 {
        0.5
    }

    #[fixture]
    pub fn simtime(timestep: f64) -> SimulationTime {
        SimulationTime::new(742.0, 746.0, timestep)
    }

    #[rstest]
    fn should_have_correct_total_steps(simtime: SimulationTime) {
        assert_eq!(simtime.total_steps(), 8)
    }

    #[rstest]
    fn should_iterate_correctly(simtime: SimulationTime, timestep: f64) {
        let hours = [742, 742, 743, 743, 744, 744, 745, 745];
        let hours_of_day = [22, 22, 23, 23, 0, 0, 1, 1];
        let current_days = [30, 30, 30, 30, 31, 31, 31, 31];
        for (i, item) in simtime.iter().enumerate() {
            assert_eq!(
                item.index, i,
                "current index is {0} with time {1}, but test iterator is {i}",
                item.index, item.time
            );
            assert_eq!(item.time, i as f64 * timestep + 742.0);
            assert_eq!(item.timestep, timestep);
            assert_eq!(item.current_hour(), hours[i]);
            assert_eq!(item.hour_of_day(), hours_of_day[i]);
            assert_eq!(item.current_day(), current_days[i]);
        }
    }

}
