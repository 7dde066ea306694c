//! Higher-timeframe bucket definitions.

/// A higher timeframe the aggregator rolls base-interval bars up into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum Timeframe {
    M1,
    M5,
    M15,
    H1,
    D1,
}

impl Timeframe {
    pub fn seconds(self) -> i64 {
        match self {
            Timeframe::M1 => 60,
            Timeframe::M5 => 5 * 60,
            Timeframe::M15 => 15 * 60,
            Timeframe::H1 => 60 * 60,
            Timeframe::D1 => 24 * 60 * 60,
        }
    }

    /// The start-of-bucket epoch second for `epoch_seconds` at this
    /// timeframe's granularity.
    pub fn bucket_start(self, epoch_seconds: i64) -> i64 {
        let width = self.seconds();
        epoch_seconds - epoch_seconds.rem_euclid(width)
    }
}
