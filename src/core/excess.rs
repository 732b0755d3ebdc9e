use chrono::{DateTime, Local};

use crate::{
    core::series::ForecastSeries,
    quantity::{energy::KilowattHours, interval::Interval, power::Kilowatts},
};

/// Energy beyond the inverter capacity, one entry per forecast interval.
#[must_use]
#[derive(Clone, Debug, derive_more::Deref)]
pub struct ExcessProfile(Vec<(Interval, KilowattHours)>);

impl ExcessProfile {
    pub fn new(series: &ForecastSeries, inverter_capacity: Kilowatts) -> Self {
        Self(
            series
                .iter()
                .map(|point| (point.interval, point.excess_energy(inverter_capacity)))
                .collect(),
        )
    }

    /// Maximal contiguous runs of intervals with non-zero excess.
    pub fn windows(&self) -> impl Iterator<Item = ExcessWindow<'_>> {
        self.0
            .split(|(_, excess)| *excess <= KilowattHours::ZERO)
            .filter(|entries| !entries.is_empty())
            .map(ExcessWindow)
    }

    /// The first window that has not ended yet.
    pub fn next_window(&self, now: DateTime<Local>) -> Option<ExcessWindow<'_>> {
        self.windows().find(|window| window.interval().end > now)
    }
}

/// Non-empty run of consecutive intervals with excess energy.
#[derive(Copy, Clone, Debug)]
pub struct ExcessWindow<'a>(&'a [(Interval, KilowattHours)]);

impl ExcessWindow<'_> {
    pub fn interval(&self) -> Interval {
        Interval::new(self.0[0].0.start, self.0[self.0.len() - 1].0.end)
    }

    pub fn total(&self) -> KilowattHours {
        self.0.iter().map(|(_, excess)| *excess).sum()
    }

    /// Start of the interval during which the accumulated excess reaches the threshold.
    pub fn find_crossing(&self, threshold: KilowattHours) -> Option<DateTime<Local>> {
        let mut accumulated = KilowattHours::ZERO;
        self.0.iter().find_map(|(interval, excess)| {
            accumulated += *excess;
            (accumulated >= threshold).then_some(interval.start)
        })
    }
}
