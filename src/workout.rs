use chrono::{DateTime, Datelike, Local};
use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::locale::Locale;

/// Latitude/longitude pair, stored as `[lat, lng]`
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for Coords {
    fn from(v: [f64; 2]) -> Self {
        Coords { lat: v[0], lng: v[1] }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(c: Coords) -> Self {
        [c.lat, c.lng]
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WorkoutKind {
    #[default]
    Running,
    Cycling,
}

impl WorkoutKind {
    pub fn toggled(self) -> Self {
        match self {
            WorkoutKind::Running => WorkoutKind::Cycling,
            WorkoutKind::Cycling => WorkoutKind::Running,
        }
    }
}

/// Kind-specific payload: the raw parameter plus its derived metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WorkoutDetails {
    Running {
        cadence: f64,
        pace: f64,
    },
    #[serde(rename_all = "camelCase")]
    Cycling {
        elevation_gain: f64,
        speed: f64,
    },
}

impl WorkoutDetails {
    pub fn kind(&self) -> WorkoutKind {
        match self {
            WorkoutDetails::Running { .. } => WorkoutKind::Running,
            WorkoutDetails::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

/// One logged workout. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    id: String,
    date: DateTime<Local>,
    coords: Coords,
    distance: f64,
    duration: f64,
    description: String,
    #[serde(flatten)]
    details: WorkoutDetails,
}

impl Workout {
    /// Validate `input` and build a record with its derived metric and
    /// description computed from `date`.
    pub fn build(
        coords: Coords,
        input: &WorkoutInput,
        date: DateTime<Local>,
        id: String,
        locale: Locale,
    ) -> Result<Self, ValidationError> {
        input.validate()?;
        Ok(Self::assemble(coords, input, date, id, locale))
    }

    /// Build a record stamped now, drawing a fresh id from `ids`.
    /// No id is consumed when validation fails.
    pub fn create(
        coords: Coords,
        input: &WorkoutInput,
        locale: Locale,
        ids: &mut IdGenerator,
    ) -> Result<Self, ValidationError> {
        input.validate()?;
        Ok(Self::assemble(coords, input, Local::now(), ids.next_id(), locale))
    }

    /// `input` must already have passed `validate`.
    fn assemble(
        coords: Coords,
        input: &WorkoutInput,
        date: DateTime<Local>,
        id: String,
        locale: Locale,
    ) -> Self {
        let metric = input.derived_metric();
        let details = match input.extra {
            KindInput::Running { cadence } => WorkoutDetails::Running {
                cadence,
                pace: metric,
            },
            KindInput::Cycling { elevation_gain } => WorkoutDetails::Cycling {
                elevation_gain,
                speed: metric,
            },
        };
        let description = describe(details.kind(), &date, locale);

        Self {
            id,
            date,
            coords,
            distance: input.distance,
            duration: input.duration,
            description,
            details,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> DateTime<Local> {
        self.date
    }

    pub fn coords(&self) -> Coords {
        self.coords
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn details(&self) -> &WorkoutDetails {
        &self.details
    }

    pub fn kind(&self) -> WorkoutKind {
        self.details.kind()
    }

    pub fn pace(&self) -> Option<f64> {
        match self.details {
            WorkoutDetails::Running { pace, .. } => Some(pace),
            WorkoutDetails::Cycling { .. } => None,
        }
    }

    pub fn speed(&self) -> Option<f64> {
        match self.details {
            WorkoutDetails::Running { .. } => None,
            WorkoutDetails::Cycling { speed, .. } => Some(speed),
        }
    }
}

fn describe(kind: WorkoutKind, date: &DateTime<Local>, locale: Locale) -> String {
    format!(
        "{} {} {}",
        locale.kind_name(kind),
        locale.month_name(date.month0()),
        date.day()
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum_macros::Display)]
pub enum Field {
    #[strum(serialize = "distance")]
    Distance,
    #[strum(serialize = "duration")]
    Duration,
    #[strum(serialize = "cadence")]
    Cadence,
    #[strum(serialize = "elevation gain")]
    ElevationGain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Problem {
    Missing,
    NotFinite,
    NotPositive,
    Negative,
    /// Valid on its own but the derived pace or speed overflows
    OutOfRange,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Problem::Missing => "is missing",
            Problem::NotFinite => "must be a finite number",
            Problem::NotPositive => "must be positive",
            Problem::Negative => "must not be negative",
            Problem::OutOfRange => "is out of range",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldFailure {
    pub field: Field,
    pub problem: Problem,
}

impl fmt::Display for FieldFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.problem)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid workout input: {}", .failures.iter().join(", "))]
pub struct ValidationError {
    pub failures: Vec<FieldFailure>,
}

impl ValidationError {
    pub fn fields(&self) -> Vec<Field> {
        self.failures.iter().map(|f| f.field).collect()
    }

    pub fn has(&self, field: Field) -> bool {
        self.failures.iter().any(|f| f.field == field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KindInput {
    Running { cadence: f64 },
    Cycling { elevation_gain: f64 },
}

/// Numeric form values, not yet checked against the workout rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutInput {
    pub distance: f64,
    pub duration: f64,
    pub extra: KindInput,
}

impl WorkoutInput {
    pub fn running(distance: f64, duration: f64, cadence: f64) -> Self {
        Self {
            distance,
            duration,
            extra: KindInput::Running { cadence },
        }
    }

    pub fn cycling(distance: f64, duration: f64, elevation_gain: f64) -> Self {
        Self {
            distance,
            duration,
            extra: KindInput::Cycling { elevation_gain },
        }
    }

    pub fn kind(&self) -> WorkoutKind {
        match self.extra {
            KindInput::Running { .. } => WorkoutKind::Running,
            KindInput::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let failures = self.failures();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { failures })
        }
    }

    fn failures(&self) -> Vec<FieldFailure> {
        let mut failures = Vec::new();
        check_positive(Field::Distance, self.distance, &mut failures);
        check_positive(Field::Duration, self.duration, &mut failures);
        match self.extra {
            KindInput::Running { cadence } => {
                check_positive(Field::Cadence, cadence, &mut failures)
            }
            KindInput::Cycling { elevation_gain } => {
                check_non_negative(Field::ElevationGain, elevation_gain, &mut failures)
            }
        }

        let base_ok = !failures
            .iter()
            .any(|f| matches!(f.field, Field::Distance | Field::Duration));
        if base_ok && !self.derived_metric().is_finite() {
            // blame the divisor
            let field = match self.extra {
                KindInput::Running { .. } => Field::Distance,
                KindInput::Cycling { .. } => Field::Duration,
            };
            failures.push(FieldFailure {
                field,
                problem: Problem::OutOfRange,
            });
        }
        failures
    }

    /// Pace in min/km for a run, speed in km/h for a ride.
    pub fn derived_metric(&self) -> f64 {
        match self.extra {
            KindInput::Running { .. } => self.duration / self.distance,
            KindInput::Cycling { .. } => self.distance / (self.duration / 60.0),
        }
    }
}

fn check_positive(field: Field, value: f64, failures: &mut Vec<FieldFailure>) {
    if !value.is_finite() {
        failures.push(FieldFailure {
            field,
            problem: Problem::NotFinite,
        });
    } else if value <= 0.0 {
        failures.push(FieldFailure {
            field,
            problem: Problem::NotPositive,
        });
    }
}

fn check_non_negative(field: Field, value: f64, failures: &mut Vec<FieldFailure>) {
    if !value.is_finite() {
        failures.push(FieldFailure {
            field,
            problem: Problem::NotFinite,
        });
    } else if value < 0.0 {
        failures.push(FieldFailure {
            field,
            problem: Problem::Negative,
        });
    }
}

/// Form contents exactly as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawForm {
    pub kind: WorkoutKind,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation_gain: String,
}

impl RawForm {
    /// Coerce the text fields to numbers and check them. Only the field
    /// belonging to the selected kind is read.
    pub fn parse(&self) -> Result<WorkoutInput, ValidationError> {
        let mut failures = Vec::new();

        let distance = read_number(Field::Distance, &self.distance, &mut failures);
        let duration = read_number(Field::Duration, &self.duration, &mut failures);
        let extra = match self.kind {
            WorkoutKind::Running => KindInput::Running {
                cadence: read_number(Field::Cadence, &self.cadence, &mut failures),
            },
            WorkoutKind::Cycling => KindInput::Cycling {
                elevation_gain: read_number(
                    Field::ElevationGain,
                    &self.elevation_gain,
                    &mut failures,
                ),
            },
        };

        let input = WorkoutInput {
            distance,
            duration,
            extra,
        };

        // unparseable fields are already reported as missing
        let rule_failures = input
            .failures()
            .into_iter()
            .filter(|rf| !failures.iter().any(|f: &FieldFailure| f.field == rf.field))
            .collect_vec();
        failures.extend(rule_failures);

        if failures.is_empty() {
            Ok(input)
        } else {
            failures.sort_by_key(|f| f.field);
            Err(ValidationError { failures })
        }
    }
}

fn read_number(field: Field, text: &str, failures: &mut Vec<FieldFailure>) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(value) => value,
        Err(_) => {
            failures.push(FieldFailure {
                field,
                problem: Problem::Missing,
            });
            f64::NAN
        }
    }
}

/// Issues `id-<7 clock digits><4 hex>` tokens, unique within the session
#[derive(Debug, Default)]
pub struct IdGenerator {
    seen: HashSet<String>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let millis = Local::now().timestamp_millis();
            let candidate = id_token(millis, rng.gen());
            if self.seen.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Mark an id restored from storage as taken.
    pub fn reserve(&mut self, id: &str) {
        self.seen.insert(id.to_string());
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }
}

fn id_token(millis: i64, salt: u16) -> String {
    format!("id-{:07}{:04x}", millis.rem_euclid(10_000_000), salt)
}
