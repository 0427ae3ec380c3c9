use crate::locale::Locale;
use crate::workout::{Workout, WorkoutDetails, WorkoutKind};

pub const RUNNING_ICON: &str = "🏃";
pub const CYCLING_ICON: &str = "🚴";
const DURATION_ICON: &str = "⏱";
const METRIC_ICON: &str = "⚡";
const CADENCE_ICON: &str = "👣";
const ELEVATION_ICON: &str = "⛰";

pub fn kind_icon(kind: WorkoutKind) -> &'static str {
    match kind {
        WorkoutKind::Running => RUNNING_ICON,
        WorkoutKind::Cycling => CYCLING_ICON,
    }
}

/// Popup text attached to a map marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerContent {
    pub icon: &'static str,
    pub text: String,
}

impl MarkerContent {
    pub fn label(&self) -> String {
        format!("{} {}", self.icon, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

/// One entry of the rendered workout list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub id: String,
    pub kind: WorkoutKind,
    pub title: String,
    pub rows: Vec<DetailRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub marker: MarkerContent,
    pub item: ListItem,
}

pub fn render(workout: &Workout, locale: Locale) -> Rendered {
    Rendered {
        marker: marker_content(workout),
        item: list_item(workout, locale),
    }
}

pub fn marker_content(workout: &Workout) -> MarkerContent {
    MarkerContent {
        icon: kind_icon(workout.kind()),
        text: workout.description().to_string(),
    }
}

pub fn list_item(workout: &Workout, locale: Locale) -> ListItem {
    let units = locale.units();
    let mut rows = vec![
        DetailRow {
            icon: kind_icon(workout.kind()),
            value: format_value(workout.distance()),
            unit: units.distance,
        },
        DetailRow {
            icon: DURATION_ICON,
            value: format_value(workout.duration()),
            unit: units.duration,
        },
    ];

    match *workout.details() {
        WorkoutDetails::Running { cadence, pace } => {
            rows.push(DetailRow {
                icon: METRIC_ICON,
                value: format!("{pace:.1}"),
                unit: units.pace,
            });
            rows.push(DetailRow {
                icon: CADENCE_ICON,
                value: format_value(cadence),
                unit: units.cadence,
            });
        }
        WorkoutDetails::Cycling {
            elevation_gain,
            speed,
        } => {
            rows.push(DetailRow {
                icon: METRIC_ICON,
                value: format!("{speed:.1}"),
                unit: units.speed,
            });
            rows.push(DetailRow {
                icon: ELEVATION_ICON,
                value: format_value(elevation_gain),
                unit: units.elevation,
            });
        }
    }

    ListItem {
        id: workout.id().to_string(),
        kind: workout.kind(),
        title: workout.description().to_string(),
        rows,
    }
}

/// Whole numbers without a fraction, everything else as typed
pub fn format_value(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val}")
    }
}
