use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// One half of a calendar day.
///
/// Bookings are tracked at half-day granularity: a day is occupied by its
/// AM half, its PM half, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Half {
    Am,
    Pm,
}

impl Half {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Half::Am => "am",
            Half::Pm => "pm",
        }
    }
}

impl fmt::Display for Half {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Half {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "am" => Ok(Half::Am),
            "pm" => Ok(Half::Pm),
            other => Err(ModelError::UnknownHalf(other.to_string())),
        }
    }
}

/// How much of each day a booking occupies.
///
/// `Full` takes both halves of every day in the range; `Am`/`Pm` take a
/// single half. The database keeps the original NULL = full encoding, see
/// [`SlotKind::from_column`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    #[default]
    Full,
    Am,
    Pm,
}

impl SlotKind {
    /// Halves of a single day occupied by this kind.
    pub const fn halves(&self) -> &'static [Half] {
        match self {
            SlotKind::Full => &[Half::Am, Half::Pm],
            SlotKind::Am => &[Half::Am],
            SlotKind::Pm => &[Half::Pm],
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            SlotKind::Full => "full",
            SlotKind::Am => "am",
            SlotKind::Pm => "pm",
        }
    }

    /// Value stored in the `vacations.slot` column. `Full` is NULL so that
    /// databases written by earlier versions keep working.
    pub const fn column_value(&self) -> Option<&'static str> {
        match self {
            SlotKind::Full => None,
            SlotKind::Am => Some("am"),
            SlotKind::Pm => Some("pm"),
        }
    }

    /// Decode the `vacations.slot` column. NULL and any unrecognized text
    /// mean a full-day booking.
    pub fn from_column(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("am") => SlotKind::Am,
            Some("pm") => SlotKind::Pm,
            _ => SlotKind::Full,
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(SlotKind::Full),
            "am" => Ok(SlotKind::Am),
            "pm" => Ok(SlotKind::Pm),
            other => Err(ModelError::UnknownSlot(other.to_string())),
        }
    }
}

impl From<Half> for SlotKind {
    fn from(half: Half) -> Self {
        match half {
            Half::Am => SlotKind::Am,
            Half::Pm => SlotKind::Pm,
        }
    }
}
