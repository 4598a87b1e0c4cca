//! Storm alert classification from WMO weather codes and precipitation.

use std::fmt;

use serde::{Serialize, Serializer};

/// Severity of a storm alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StormAlert {
    /// Thunderstorm codes.
    Severe,
    /// Heavy rain codes or more than 15 mm of precipitation.
    Moderate,
    /// Light rain codes or more than 10 mm of precipitation.
    Minor,
    /// Nothing to report.
    NoRisk,
}

impl StormAlert {
    /// Classify a weather code and precipitation amount.
    #[must_use]
    pub fn classify(weather_code: i32, precipitation: f64) -> Self {
        match weather_code {
            95 | 96 | 99 => Self::Severe,
            63..=65 => Self::Moderate,
            _ if precipitation > 15.0 => Self::Moderate,
            61 | 62 => Self::Minor,
            _ if precipitation > 10.0 => Self::Minor,
            _ => Self::NoRisk,
        }
    }

    /// The human readable alert text.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Severe => "Severe Storm Alert: Thunderstorm possible!",
            Self::Moderate => "Moderate Storm Warning: Heavy rain expected.",
            Self::Minor => "Minor Storm Risk: Light rain possible.",
            Self::NoRisk => "No storm risk.",
        }
    }
}

impl fmt::Display for StormAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Serialize for StormAlert {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

/// Alert text for a weather code and precipitation amount.
#[must_use]
pub fn interpret_storm_alert(weather_code: i32, precipitation: f64) -> &'static str {
    StormAlert::classify(weather_code, precipitation).message()
}
