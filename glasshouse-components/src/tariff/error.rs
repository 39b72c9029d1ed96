use jiff::civil::Time;
use thiserror::Error;

/// Errors raised while building a schedule or tariff.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TariffError {
    #[error("segment {index} is empty: start ({start}) equals end")]
    EmptySegment { index: usize, start: Time },

    #[error("segment {first} ({first_start}..{first_end}) overlaps segment {second} ({second_start}..{second_end})")]
    OverlappingSegments {
        first: usize,
        first_start: Time,
        first_end: Time,
        second: usize,
        second_start: Time,
        second_end: Time,
    },

    #[error("period `{name}` has an invalid price {price}")]
    InvalidPrice { name: String, price: f64 },
}
