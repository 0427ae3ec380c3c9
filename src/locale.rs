use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::workout::WorkoutKind;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Display language for workout descriptions and list units
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    English,
    Russian,
}

/// Unit labels shown next to list values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Units {
    pub distance: &'static str,
    pub duration: &'static str,
    pub pace: &'static str,
    pub cadence: &'static str,
    pub speed: &'static str,
    pub elevation: &'static str,
}

impl Locale {
    pub fn kind_name(&self, kind: WorkoutKind) -> &'static str {
        match (self, kind) {
            (Locale::English, WorkoutKind::Running) => "Running",
            (Locale::English, WorkoutKind::Cycling) => "Cycling",
            (Locale::Russian, WorkoutKind::Running) => "Бег",
            (Locale::Russian, WorkoutKind::Cycling) => "Вело",
        }
    }

    /// Month names stay English in every locale; `month0` is zero-based.
    pub fn month_name(&self, month0: u32) -> &'static str {
        MONTHS[(month0 as usize) % MONTHS.len()]
    }

    pub fn units(&self) -> Units {
        match self {
            Locale::English => Units {
                distance: "km",
                duration: "min",
                pace: "min/km",
                cadence: "spm",
                speed: "km/h",
                elevation: "m",
            },
            Locale::Russian => Units {
                distance: "км",
                duration: "мин",
                pace: "мин/км",
                cadence: "шаг",
                speed: "км/час",
                elevation: "м",
            },
        }
    }
}
