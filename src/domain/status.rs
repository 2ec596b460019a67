//! Status levels — the ordered result scale shared by every check.
//!
//! Levels are ordered `Error < Warn < Info < Success < SuccessAll`. Raw values
//! written by the validation process are parsed leniently: anything that is
//! not one of the five members becomes `Error`.

use std::fmt;

use async_graphql::Enum;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Enum,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusLevel {
    #[default]
    Error,
    Warn,
    Info,
    Success,
    /// Current result passed and so did every result in the lookback window.
    SuccessAll,
}

impl StatusLevel {
    /// Numeric encoding used by the validation writer.
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => Self::Warn,
            3 => Self::Info,
            4 => Self::Success,
            5 => Self::SuccessAll,
            _ => Self::Error,
        }
    }

    /// Parse a level name. Accepts `success_all`, `SUCCESSALL`, `SuccessAll`
    /// and plain numeric strings.
    pub fn from_name(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "warn" | "warning" => Self::Warn,
            "info" => Self::Info,
            "success" => Self::Success,
            "successall" => Self::SuccessAll,
            other => other.parse::<i64>().map(Self::from_code).unwrap_or_default(),
        }
    }

    /// `Success` and `SuccessAll` count as passing for message selection.
    pub fn is_passing(self) -> bool {
        self >= Self::Success
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Success => "success",
            Self::SuccessAll => "success_all",
        }
    }
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl<'de> Deserialize<'de> for StatusLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LevelVisitor;

        impl<'de> Visitor<'de> for LevelVisitor {
            type Value = StatusLevel;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a status level name or code")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<StatusLevel, E> {
                Ok(StatusLevel::from_code(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<StatusLevel, E> {
                Ok(i64::try_from(v).map(StatusLevel::from_code).unwrap_or_default())
            }

            fn visit_f64<E: de::Error>(self, _v: f64) -> Result<StatusLevel, E> {
                Ok(StatusLevel::Error)
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<StatusLevel, E> {
                Ok(if v {
                    StatusLevel::Success
                } else {
                    StatusLevel::Error
                })
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<StatusLevel, E> {
                Ok(StatusLevel::from_name(v))
            }

            fn visit_unit<E: de::Error>(self) -> Result<StatusLevel, E> {
                Ok(StatusLevel::Error)
            }

            fn visit_none<E: de::Error>(self) -> Result<StatusLevel, E> {
                Ok(StatusLevel::Error)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<StatusLevel, D::Error> {
                d.deserialize_any(LevelVisitor)
            }
        }

        deserializer.deserialize_any(LevelVisitor)
    }
}

/// Combine the current result with the results stored inside the lookback
/// window.
///
/// `Warn` and `Info` are reported verbatim. A passing result becomes
/// `SuccessAll` only when nothing in the window fell below `Success`.
pub fn combine_with_history(current: StatusLevel, history: &[StatusLevel]) -> StatusLevel {
    match current {
        StatusLevel::Warn => StatusLevel::Warn,
        StatusLevel::Info => StatusLevel::Info,
        StatusLevel::Success => {
            let worst = history
                .iter()
                .copied()
                .filter(|level| !level.is_passing())
                .min()
                .unwrap_or(StatusLevel::SuccessAll);
            if worst == StatusLevel::SuccessAll {
                StatusLevel::SuccessAll
            } else {
                StatusLevel::Success
            }
        }
        _ => StatusLevel::Error,
    }
}

/// Roll a set of levels up to the worst one. Passing levels are treated as
/// `SuccessAll`; an empty set is `Error`.
pub fn worst_of(levels: &[StatusLevel]) -> StatusLevel {
    levels
        .iter()
        .map(|level| {
            if level.is_passing() {
                StatusLevel::SuccessAll
            } else {
                *level
            }
        })
        .min()
        .unwrap_or(StatusLevel::Error)
}
