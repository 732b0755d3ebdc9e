use std::collections::{BTreeMap, btree_map::Entry};

use chrono::{DateTime, Local, TimeDelta};
use itertools::Itertools;

use crate::quantity::{energy::KilowattHours, interval::Interval, power::Kilowatts};

/// Estimated solar power over a single forecast interval.
#[derive(Copy, Clone, Debug, PartialEq, Eq, derive_more::Constructor)]
pub struct ForecastPoint {
    pub interval: Interval,
    pub power: Kilowatts,
}

impl ForecastPoint {
    /// Energy that the inverter cannot convert during the interval.
    pub fn excess_energy(&self, inverter_capacity: Kilowatts) -> KilowattHours {
        (self.power - inverter_capacity).max(Kilowatts::ZERO) * self.interval.duration()
    }
}

/// Data-quality problems that make a forecast unusable for planning.
#[derive(Debug, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SeriesError {
    #[display("forecast interval at {at} is empty")]
    EmptyInterval { at: DateTime<Local> },

    #[display("forecast interval at {at} is out of order")]
    OutOfOrder { at: DateTime<Local> },

    #[display("forecast interval at {at} lasts {actual}, expected {expected}")]
    UnequalIntervals { at: DateTime<Local>, actual: TimeDelta, expected: TimeDelta },

    #[display("forecast has a gap or an overlap at {at}")]
    NonContiguous { at: DateTime<Local> },

    #[display("forecast intervals starting at {at} have different widths and cannot be merged")]
    MismatchedIntervals { at: DateTime<Local> },
}

#[must_use]
#[derive(Clone, Debug, Default, PartialEq, Eq, derive_more::Deref, derive_more::From)]
pub struct ForecastSeries(Vec<ForecastPoint>);

impl ForecastSeries {
    /// Check that the points are ordered, equally wide and contiguous.
    pub fn validate(&self) -> Result<(), SeriesError> {
        let Some(first) = self.0.first() else {
            return Ok(());
        };
        let width = first.interval.duration();
        if width <= TimeDelta::zero() {
            return Err(SeriesError::EmptyInterval { at: first.interval.start });
        }
        for (previous, point) in self.0.iter().tuple_windows() {
            let at = point.interval.start;
            if at <= previous.interval.start {
                return Err(SeriesError::OutOfOrder { at });
            }
            if point.interval.duration() != width {
                return Err(SeriesError::UnequalIntervals {
                    at,
                    actual: point.interval.duration(),
                    expected: width,
                });
            }
            if at != previous.interval.end {
                return Err(SeriesError::NonContiguous { at });
            }
        }
        Ok(())
    }

    /// Sum the series pointwise, aligning them by interval start.
    ///
    /// A point present in only one of the series is taken as is.
    pub fn try_merge(series: impl IntoIterator<Item = Self>) -> Result<Self, SeriesError> {
        let mut merged = BTreeMap::<DateTime<Local>, ForecastPoint>::new();
        for series in series {
            series.validate()?;
            for point in series.0 {
                match merged.entry(point.interval.start) {
                    Entry::Vacant(entry) => {
                        entry.insert(point);
                    }
                    Entry::Occupied(mut entry) => {
                        let existing = entry.get_mut();
                        if existing.interval != point.interval {
                            return Err(SeriesError::MismatchedIntervals {
                                at: point.interval.start,
                            });
                        }
                        existing.power += point.power;
                    }
                }
            }
        }
        Ok(Self(merged.into_values().collect()))
    }

    /// Time span covered by the series.
    pub fn span(&self) -> Option<Interval> {
        Some(Interval::new(self.0.first()?.interval.start, self.0.last()?.interval.end))
    }
}

#[cfg(test)]
impl ForecastSeries {
    /// Build a contiguous series of equally wide intervals.
    pub fn from_powers(start: DateTime<Local>, width: TimeDelta, powers: &[f64]) -> Self {
        powers
            .iter()
            .enumerate()
            .map(|(index, power)| {
                let start = start + width * i32::try_from(index).unwrap();
                ForecastPoint::new(Interval::with_duration(start, width), Kilowatts(*power))
            })
            .collect_vec()
            .into()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    use super::*;

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 21, 12, 0, 0).unwrap()
    }

    fn half_hour() -> TimeDelta {
        TimeDelta::minutes(30)
    }

    #[test]
    fn test_excess_energy() {
        let point =
            ForecastPoint::new(Interval::with_duration(noon(), half_hour()), Kilowatts(10.0));
        assert_abs_diff_eq!(point.excess_energy(Kilowatts(8.3)).0, 0.85, epsilon = 1e-9);
        assert_eq!(point.excess_energy(Kilowatts(12.0)), KilowattHours::ZERO);
    }

    #[test]
    fn test_validate_ok() {
        let series = ForecastSeries::from_powers(noon(), half_hour(), &[1.0, 2.0, 3.0]);
        assert_eq!(series.validate(), Ok(()));
        assert_eq!(ForecastSeries::default().validate(), Ok(()));
    }

    #[test]
    fn test_validate_out_of_order() {
        let mut points = ForecastSeries::from_powers(noon(), half_hour(), &[1.0, 2.0, 3.0]).0;
        points.swap(1, 2);
        let at = points[1].interval.start;
        assert_eq!(ForecastSeries(points).validate(), Err(SeriesError::OutOfOrder { at }));
    }

    #[test]
    fn test_validate_duplicate() {
        let mut points = ForecastSeries::from_powers(noon(), half_hour(), &[1.0, 2.0]).0;
        points[1] = points[0];
        let at = points[1].interval.start;
        assert_eq!(ForecastSeries(points).validate(), Err(SeriesError::OutOfOrder { at }));
    }

    #[test]
    fn test_validate_gap() {
        let mut points = ForecastSeries::from_powers(noon(), half_hour(), &[1.0, 2.0, 3.0]).0;
        points.remove(1);
        let at = points[1].interval.start;
        assert_eq!(ForecastSeries(points).validate(), Err(SeriesError::NonContiguous { at }));
    }

    #[test]
    fn test_validate_unequal_intervals() {
        let mut points = ForecastSeries::from_powers(noon(), half_hour(), &[1.0, 2.0]).0;
        points[1].interval.end += half_hour();
        let series = ForecastSeries(points);
        assert!(matches!(series.validate(), Err(SeriesError::UnequalIntervals { .. })));
    }

    #[test]
    fn test_merge_sums_aligned_points() -> Result<(), SeriesError> {
        let lhs = ForecastSeries::from_powers(noon(), half_hour(), &[1.0, 2.0]);
        let rhs = ForecastSeries::from_powers(noon() + half_hour(), half_hour(), &[3.0, 4.0]);
        let merged = ForecastSeries::try_merge([lhs, rhs])?;
        let powers = merged.iter().map(|point| point.power).collect_vec();
        assert_eq!(powers, [Kilowatts(1.0), Kilowatts(5.0), Kilowatts(4.0)]);
        assert_eq!(merged.validate(), Ok(()));
        Ok(())
    }

    #[test]
    fn test_merge_disjoint_excess_is_union() -> Result<(), SeriesError> {
        let inverter_capacity = Kilowatts(8.3);
        let lhs = ForecastSeries::from_powers(noon(), half_hour(), &[10.0, 0.0, 0.0, 0.0]);
        let rhs = ForecastSeries::from_powers(noon(), half_hour(), &[0.0, 0.0, 12.0, 0.0]);
        let expected = lhs
            .iter()
            .zip(rhs.iter())
            .map(|(lhs, rhs)| {
                lhs.excess_energy(inverter_capacity) + rhs.excess_energy(inverter_capacity)
            })
            .collect_vec();
        let merged = ForecastSeries::try_merge([lhs, rhs])?;
        let actual =
            merged.iter().map(|point| point.excess_energy(inverter_capacity)).collect_vec();
        assert_eq!(actual, expected);
        Ok(())
    }

    #[test]
    fn test_merge_mismatched_widths() {
        let lhs = ForecastSeries::from_powers(noon(), half_hour(), &[1.0]);
        let rhs = ForecastSeries::from_powers(noon(), TimeDelta::hours(1), &[1.0]);
        assert_eq!(
            ForecastSeries::try_merge([lhs, rhs]),
            Err(SeriesError::MismatchedIntervals { at: noon() }),
        );
    }

    #[test]
    fn test_span() {
        let series = ForecastSeries::from_powers(noon(), half_hour(), &[1.0, 2.0]);
        assert_eq!(series.span(), Some(Interval::new(noon(), noon() + TimeDelta::hours(1))));
        assert_eq!(ForecastSeries::default().span(), None);
    }
}
