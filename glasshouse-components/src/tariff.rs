//! Time-of-use electricity pricing.

mod error;
mod schedule;

use jiff::civil::{DateTime, Weekday, time};
use serde::{Deserialize, Serialize};
use uom::si::{energy::kilowatt_hour, f64::Energy};

pub use error::TariffError;
pub use schedule::{DailySchedule, Segment};

/// A named price band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffPeriod {
    pub name: String,
    /// Price of one kilowatt-hour, in the tariff's currency.
    pub price_per_kwh: f64,
}

impl TariffPeriod {
    #[must_use]
    pub fn new(name: impl Into<String>, price_per_kwh: f64) -> Self {
        Self {
            name: name.into(),
            price_per_kwh,
        }
    }

    /// Cost of `energy` at this period's price.
    #[must_use]
    pub fn cost(&self, energy: Energy) -> f64 {
        energy.get::<kilowatt_hour>() * self.price_per_kwh
    }
}

/// Prices that vary with time of day and with weekdays versus weekends.
///
/// Any time not covered by the day's schedule is billed at `fallback`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeOfUseTariff {
    weekday: DailySchedule<TariffPeriod>,
    weekend: DailySchedule<TariffPeriod>,
    fallback: TariffPeriod,
}

impl TimeOfUseTariff {
    /// Creates a tariff.
    ///
    /// # Errors
    ///
    /// Returns [`TariffError::InvalidPrice`] if any price is negative or not
    /// finite.
    pub fn new(
        weekday: DailySchedule<TariffPeriod>,
        weekend: DailySchedule<TariffPeriod>,
        fallback: TariffPeriod,
    ) -> Result<Self, TariffError> {
        let periods = weekday
            .segments()
            .iter()
            .chain(weekend.segments())
            .map(|segment| &segment.value)
            .chain(std::iter::once(&fallback));
        for period in periods {
            if !period.price_per_kwh.is_finite() || period.price_per_kwh < 0.0 {
                return Err(TariffError::InvalidPrice {
                    name: period.name.clone(),
                    price: period.price_per_kwh,
                });
            }
        }
        Ok(Self {
            weekday,
            weekend,
            fallback,
        })
    }

    /// The period in force at `at`.
    #[must_use]
    pub fn period_at(&self, at: DateTime) -> &TariffPeriod {
        let schedule = match at.weekday() {
            Weekday::Saturday | Weekday::Sunday => &self.weekend,
            _ => &self.weekday,
        };
        schedule.value_at(at.time()).unwrap_or(&self.fallback)
    }

    /// Cost of `energy` consumed during the period in force at `at`.
    #[must_use]
    pub fn cost(&self, energy: Energy, at: DateTime) -> f64 {
        self.period_at(at).cost(energy)
    }
}

impl Default for TimeOfUseTariff {
    /// Weekday peak 15:00 to 22:00, super off-peak 23:00 to 07:00 every day,
    /// off-peak otherwise.
    fn default() -> Self {
        let peak = TariffPeriod::new("peak", 0.3065);
        let super_off_peak = TariffPeriod::new("super_off_peak", 0.0787);
        let off_peak = TariffPeriod::new("off_peak", 0.1243);

        let night = Segment {
            start: time(23, 0, 0, 0),
            end: time(7, 0, 0, 0),
            value: super_off_peak,
        };
        let evening = Segment {
            start: time(15, 0, 0, 0),
            end: time(22, 0, 0, 0),
            value: peak,
        };

        Self {
            weekday: DailySchedule::from_sorted_unchecked(vec![evening, night.clone()]),
            weekend: DailySchedule::from_sorted_unchecked(vec![night]),
            fallback: off_peak,
        }
    }
}
