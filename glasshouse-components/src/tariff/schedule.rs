use std::convert::Infallible;

use glasshouse_core::Component;
use jiff::civil::Time;
use serde::{Deserialize, Serialize};

use super::TariffError;

/// A value that applies over the half-open time-of-day range `[start, end)`.
///
/// A segment whose `end` is earlier than its `start` wraps past midnight, so
/// `23:00..07:00` covers the night.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment<V> {
    pub start: Time,
    pub end: Time,
    pub value: V,
}

impl<V> Segment<V> {
    /// Returns `true` if `time` falls within this segment.
    pub fn contains(&self, time: Time) -> bool {
        if self.start < self.end {
            self.start <= time && time < self.end
        } else {
            time >= self.start || time < self.end
        }
    }

    /// Two non-empty arcs of the day overlap iff one contains the other's start.
    fn overlaps<W>(&self, other: &Segment<W>) -> bool {
        self.contains(other.start) || other.contains(self.start)
    }
}

/// Values assigned to non-overlapping ranges of the time of day.
///
/// # Examples
///
/// ```
/// use glasshouse_components::tariff::{DailySchedule, Segment};
/// use jiff::civil::time;
///
/// let schedule = DailySchedule::new(vec![
///     Segment { start: time(22, 0, 0, 0), end: time(6, 0, 0, 0), value: "night" },
///     Segment { start: time(9, 0, 0, 0), end: time(17, 0, 0, 0), value: "work" },
/// ]).unwrap();
///
/// assert_eq!(schedule.value_at(time(23, 30, 0, 0)), Some(&"night"));
/// assert_eq!(schedule.value_at(time(3, 0, 0, 0)), Some(&"night"));
/// assert_eq!(schedule.value_at(time(12, 0, 0, 0)), Some(&"work"));
/// assert_eq!(schedule.value_at(time(7, 0, 0, 0)), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DailySchedule<V> {
    segments: Vec<Segment<V>>,
}

impl<V> Default for DailySchedule<V> {
    fn default() -> Self {
        Self {
            segments: Vec::new(),
        }
    }
}

impl<V> DailySchedule<V> {
    /// Validates and sorts `segments` by start time.
    ///
    /// # Errors
    ///
    /// Returns a [`TariffError`] if a segment is empty or two segments overlap.
    pub fn new(mut segments: Vec<Segment<V>>) -> Result<Self, TariffError> {
        for (index, segment) in segments.iter().enumerate() {
            if segment.start == segment.end {
                return Err(TariffError::EmptySegment {
                    index,
                    start: segment.start,
                });
            }
        }

        segments.sort_by_key(|segment| segment.start);

        for (i, first) in segments.iter().enumerate() {
            for (j, second) in segments.iter().enumerate().skip(i + 1) {
                if first.overlaps(second) {
                    return Err(TariffError::OverlappingSegments {
                        first: i,
                        first_start: first.start,
                        first_end: first.end,
                        second: j,
                        second_start: second.start,
                        second_end: second.end,
                    });
                }
            }
        }

        Ok(Self { segments })
    }

    /// Builds a schedule from segments known to be valid.
    pub(crate) fn from_sorted_unchecked(segments: Vec<Segment<V>>) -> Self {
        Self { segments }
    }

    /// Segments in order of increasing start time.
    #[must_use]
    pub fn segments(&self) -> &[Segment<V>] {
        &self.segments
    }

    /// The value in force at `time`, if any segment covers it.
    #[must_use]
    pub fn value_at(&self, time: Time) -> Option<&V> {
        self.segments
            .iter()
            .find(|segment| segment.contains(time))
            .map(|segment| &segment.value)
    }
}

impl<V: Clone> Component for DailySchedule<V> {
    type Input = Time;
    type Output = Option<V>;
    type Error = Infallible;

    fn call(&self, input: Self::Input) -> Result<Self::Output, Self::Error> {
        Ok(self.value_at(input).cloned())
    }
}
