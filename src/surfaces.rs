//! Capabilities the session drives but does not implement.

use std::time::Duration;
use thiserror::Error;

use crate::render::{ListItem, MarkerContent};
use crate::workout::{Coords, RawForm, WorkoutKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("location permission denied")]
pub struct PermissionDenied;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanOptions {
    pub animate: bool,
    pub duration: Duration,
}

impl Default for PanOptions {
    fn default() -> Self {
        Self {
            animate: true,
            duration: Duration::from_secs(1),
        }
    }
}

pub trait MapSurface {
    fn render_view(&mut self, center: Coords, zoom: f64);
    fn place_marker(&mut self, at: Coords, content: &MarkerContent);
    fn center_on(&mut self, at: Coords, zoom: f64, pan: PanOptions);
    fn clear_markers(&mut self);
}

pub trait WorkoutForm {
    fn values(&self) -> RawForm;
    fn show(&mut self);
    fn hide(&mut self);
    fn clear(&mut self);
    /// Move input focus to the distance field.
    fn focus_primary(&mut self);
    /// Show the cadence row for running, the elevation row for cycling.
    fn show_field_for(&mut self, kind: WorkoutKind);
}

pub trait WorkoutList {
    /// Add below the existing items; never replaces them.
    fn append(&mut self, item: ListItem);
    fn clear(&mut self);
}
