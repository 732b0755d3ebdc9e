use bon::Builder;
use chrono::{DateTime, Local};

use crate::{
    core::{
        excess::ExcessProfile,
        parameters::SystemParameters,
        schedule::Schedule,
        series::{ForecastSeries, SeriesError},
    },
    quantity::{energy::KilowattHours, interval::Interval},
};

/// Plans the battery schedule around the next upcoming excess window.
#[derive(Builder)]
#[builder(finish_fn(vis = ""))]
pub struct Planner<'a> {
    series: &'a ForecastSeries,
    parameters: &'a SystemParameters,

    /// Windows that have already ended by this time are ignored.
    now: DateTime<Local>,
}

/// Planned schedule along with the figures it was derived from.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Plan {
    pub schedule: Schedule,

    /// The excess window being prepared for.
    pub window: Interval,

    /// Total excess energy forecast over the window.
    pub window_excess: KilowattHours,

    /// Energy the battery can absorb between the discharge target and the target maximum.
    pub headroom: KilowattHours,
}

impl<S: planner_builder::IsComplete> PlannerBuilder<'_, S> {
    pub fn plan(self) -> Result<Option<Plan>, SeriesError> {
        self.build().plan()
    }
}

impl Planner<'_> {
    fn plan(self) -> Result<Option<Plan>, SeriesError> {
        self.series.validate()?;

        let profile = ExcessProfile::new(self.series, self.parameters.inverter_capacity_dc());
        let Some(window) = profile.next_window(self.now) else {
            return Ok(None);
        };

        let discharge_target = self.parameters.discharge_target();
        let headroom = self.parameters.headroom();
        let window_interval = window.interval();

        // The battery is full once the accumulated excess covers the headroom,
        // or the window ends before that.
        let recovery_start = window.find_crossing(headroom).unwrap_or(window_interval.end);
        let discharge_start = window_interval.start;
        if recovery_start <= discharge_start {
            return Ok(None);
        }

        Ok(Some(Plan {
            schedule: Schedule {
                discharge_start,
                discharge_target,
                recovery_start,
                recovery_target: self.parameters.min_reserve(),
            },
            window: window_interval,
            window_excess: window.total(),
            headroom,
        }))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};

    use super::*;
    use crate::{
        core::parameters::{ParameterError, tests::parameters},
        quantity::percent::Percent,
    };

    fn morning() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 21, 9, 0, 0).unwrap()
    }

    fn half_hour() -> TimeDelta {
        TimeDelta::minutes(30)
    }

    /// Two quiet hours, then the specified powers, then a quiet hour.
    fn series(excess_powers: &[f64]) -> ForecastSeries {
        let powers = [&[2.0, 4.0, 6.0, 8.0][..], excess_powers, &[6.0, 3.0][..]].concat();
        ForecastSeries::from_powers(morning(), half_hour(), &powers)
    }

    fn window_start() -> DateTime<Local> {
        morning() + TimeDelta::hours(2)
    }

    fn plan(series: &ForecastSeries, parameters: &SystemParameters) -> Option<Plan> {
        Planner::builder()
            .series(series)
            .parameters(parameters)
            .now(morning())
            .plan()
            .unwrap()
    }

    #[test]
    fn test_no_excess() {
        let series = ForecastSeries::from_powers(morning(), half_hour(), &[1.0, 8.3, 5.0, 8.3]);
        assert_eq!(plan(&series, &parameters()), None);
        assert_eq!(plan(&ForecastSeries::default(), &parameters()), None);
    }

    #[test]
    fn test_headroom_never_reached() {
        let plan = plan(&series(&[10.0; 6]), &parameters()).unwrap();
        assert_eq!(plan.schedule.discharge_start, window_start());
        assert_eq!(plan.schedule.recovery_start, window_start() + TimeDelta::hours(3));
        assert_eq!(plan.schedule.recovery_start, plan.window.end);
        assert_eq!(plan.schedule.discharge_target, Percent::ZERO);
        assert_eq!(plan.schedule.recovery_target, Percent(10.0));
        approx::assert_abs_diff_eq!(plan.window_excess.0, 5.1, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(plan.headroom.0, 15.39, epsilon = 1e-9);
    }

    #[test]
    fn test_headroom_reached_within_window() {
        let plan = plan(&series(&[20.0; 6]), &parameters()).unwrap();
        assert_eq!(plan.schedule.discharge_start, window_start());
        assert_eq!(plan.schedule.recovery_start, window_start() + TimeDelta::hours(1));
        assert_eq!(plan.window.end, window_start() + TimeDelta::hours(3));
    }

    #[test]
    fn test_degenerate_schedule_is_discarded() {
        // The very first interval fills up the headroom:
        assert_eq!(plan(&series(&[50.0, 20.0]), &parameters()), None);
    }

    #[test]
    fn test_plans_next_upcoming_window_only() {
        let series =
            ForecastSeries::from_powers(morning(), half_hour(), &[10.0, 10.0, 5.0, 12.0, 12.0, 1.0]);
        let parameters = parameters();

        let first = plan(&series, &parameters).unwrap();
        assert_eq!(first.window, Interval::new(morning(), morning() + TimeDelta::hours(1)));

        let second = Planner::builder()
            .series(&series)
            .parameters(&parameters)
            .now(morning() + TimeDelta::hours(1))
            .plan()
            .unwrap()
            .unwrap();
        assert_eq!(
            second.window,
            Interval::new(morning() + TimeDelta::minutes(90), morning() + TimeDelta::minutes(150)),
        );

        let none = Planner::builder()
            .series(&series)
            .parameters(&parameters)
            .now(morning() + TimeDelta::hours(3))
            .plan()
            .unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn test_invalid_series_is_rejected() {
        let mut points = series(&[10.0; 3]).to_vec();
        points.remove(3);
        let result = Planner::builder()
            .series(&ForecastSeries::from(points))
            .parameters(&parameters())
            .now(morning())
            .plan();
        assert!(matches!(result, Err(SeriesError::NonContiguous { .. })));
    }

    #[test]
    fn test_idempotent() {
        let series = series(&[9.0, 14.0, 20.0, 18.0, 11.0]);
        let parameters = parameters();
        assert_eq!(plan(&series, &parameters), plan(&series, &parameters));
    }

    #[test]
    fn test_schedule_invariants() {
        let parameters = parameters();
        for excess_powers in [&[8.4][..], &[9.0, 30.0], &[12.0; 10], &[20.0, 9.0, 25.0, 9.0, 40.0]] {
            let series = series(excess_powers);
            let span = series.span().unwrap();
            let Some(plan) = plan(&series, &parameters) else {
                continue;
            };
            let schedule = plan.schedule;
            assert!(schedule.recovery_start > schedule.discharge_start);
            assert!(schedule.recovery_start <= plan.window.end);
            assert!(span.contains(schedule.discharge_start));
            assert!(schedule.recovery_start <= span.end);
            assert!(schedule.discharge_target >= Percent::ZERO);
            assert!(schedule.discharge_target <= parameters.min_reserve());
            assert_eq!(schedule.recovery_target, parameters.min_reserve());
        }
    }

    #[test]
    fn test_larger_battery_never_recovers_earlier() -> Result<(), ParameterError> {
        let small = parameters();
        let large = SystemParameters::builder()
            .inverter_capacity_dc(small.inverter_capacity_dc())
            .battery_capacity(small.battery_capacity() * 2.0)
            .min_reserve(small.min_reserve())
            .target_max(small.target_max())
            .charge_buffer(small.charge_buffer())
            .build()?;
        for excess_powers in [&[10.0; 6][..], &[20.0; 6], &[15.0, 30.0, 9.0, 25.0], &[40.0; 8]] {
            let series = series(excess_powers);
            let lead_time = |parameters: &SystemParameters| {
                plan(&series, parameters).map(|plan| {
                    plan.schedule.recovery_start - plan.schedule.discharge_start
                })
            };
            if let Some(small_lead_time) = lead_time(&small) {
                let large_lead_time = lead_time(&large).unwrap();
                assert!(large_lead_time >= small_lead_time);
            }
        }
        Ok(())
    }

    #[test]
    fn test_inverter_capacity_is_respected() {
        assert_eq!(plan(&series(&[8.3, 8.3]), &parameters()), None);
        assert!(plan(&series(&[8.31; 4]), &parameters()).is_some());
    }
}
