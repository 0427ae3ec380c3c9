use std::time::Duration;

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Map, MapResolution},
        Block, Borders, Widget,
    },
};

use crate::render::MarkerContent;
use crate::surfaces::{MapSurface, PanOptions};
use crate::workout::Coords;

const MIN_ZOOM: f64 = 1.0;
const MAX_ZOOM: f64 = 18.0;
/// Cursor moves this fraction of the visible width per key press
const CURSOR_STEPS: f64 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    pub at: Coords,
    pub content: MarkerContent,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pan {
    from: Coords,
    to: Coords,
    elapsed: Duration,
    duration: Duration,
}

/// World map drawn on a ratatui canvas with a movable click cursor
#[derive(Debug, Clone, Default)]
pub struct TerminalMap {
    center: Option<Coords>,
    zoom: f64,
    cursor: Coords,
    markers: Vec<PlacedMarker>,
    pan: Option<Pan>,
}

impl TerminalMap {
    pub fn new() -> Self {
        Self {
            zoom: crate::config::DEFAULT_ZOOM,
            cursor: Coords::new(0.0, 0.0),
            ..Self::default()
        }
    }

    /// True once a view has been rendered
    pub fn is_ready(&self) -> bool {
        self.center.is_some()
    }

    pub fn center(&self) -> Option<Coords> {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn cursor(&self) -> Coords {
        self.cursor
    }

    pub fn markers(&self) -> &[PlacedMarker] {
        &self.markers
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    /// Visible (latitude, longitude) extent in degrees
    pub fn span(&self) -> (f64, f64) {
        let lng_span = 360.0 / 2f64.powf(self.zoom - 1.0);
        (lng_span / 2.0, lng_span)
    }

    pub fn move_cursor(&mut self, lat_steps: i32, lng_steps: i32) {
        let (lat_span, lng_span) = self.span();
        self.cursor.lat = (self.cursor.lat + f64::from(lat_steps) * lat_span / CURSOR_STEPS)
            .clamp(-90.0, 90.0);
        self.cursor.lng = wrap_lng(self.cursor.lng + f64::from(lng_steps) * lng_span / CURSOR_STEPS);

        // keep the cursor on screen by dragging the view along
        if let Some(center) = self.center.as_mut() {
            if (self.cursor.lat - center.lat).abs() > lat_span / 2.0 {
                center.lat += f64::from(lat_steps) * lat_span / CURSOR_STEPS;
            }
            if (self.cursor.lng - center.lng).abs() > lng_span / 2.0 {
                center.lng = wrap_lng(center.lng + f64::from(lng_steps) * lng_span / CURSOR_STEPS);
            }
        }
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Advance a running pan animation.
    pub fn advance(&mut self, dt: Duration) {
        let Some(mut pan) = self.pan else {
            return;
        };
        pan.elapsed += dt;
        if pan.elapsed >= pan.duration {
            self.center = Some(pan.to);
            self.pan = None;
            return;
        }
        let t = pan.elapsed.as_secs_f64() / pan.duration.as_secs_f64();
        let eased = t * (2.0 - t);
        self.center = Some(Coords::new(
            pan.from.lat + (pan.to.lat - pan.from.lat) * eased,
            pan.from.lng + (pan.to.lng - pan.from.lng) * eased,
        ));
        self.pan = Some(pan);
    }

    pub fn widget(&self, focused: bool) -> impl Widget + '_ {
        let center = self.center.unwrap_or(self.cursor);
        let (lat_span, lng_span) = self.span();
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };

        Canvas::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(format!(" Map · zoom {:.0} · {} ", self.zoom, self.cursor)),
            )
            .x_bounds([center.lng - lng_span / 2.0, center.lng + lng_span / 2.0])
            .y_bounds([center.lat - lat_span / 2.0, center.lat + lat_span / 2.0])
            .paint(move |ctx| {
                ctx.draw(&Map {
                    color: Color::DarkGray,
                    resolution: MapResolution::High,
                });
                ctx.layer();
                for marker in &self.markers {
                    ctx.print(
                        marker.at.lng,
                        marker.at.lat,
                        Line::from(Span::styled(
                            marker.content.label(),
                            Style::default().fg(Color::Yellow),
                        )),
                    );
                }
                ctx.print(
                    self.cursor.lng,
                    self.cursor.lat,
                    Span::styled(
                        "╋",
                        Style::default()
                            .fg(Color::LightRed)
                            .add_modifier(Modifier::BOLD),
                    ),
                );
            })
    }
}

fn wrap_lng(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

impl MapSurface for TerminalMap {
    fn render_view(&mut self, center: Coords, zoom: f64) {
        self.center = Some(center);
        self.cursor = center;
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = None;
    }

    fn place_marker(&mut self, at: Coords, content: &MarkerContent) {
        self.markers.push(PlacedMarker {
            at,
            content: content.clone(),
        });
    }

    fn center_on(&mut self, at: Coords, zoom: f64, pan: PanOptions) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.cursor = at;
        match self.center {
            Some(from) if pan.animate && !pan.duration.is_zero() => {
                self.pan = Some(Pan {
                    from,
                    to: at,
                    elapsed: Duration::ZERO,
                    duration: pan.duration,
                });
            }
            _ => {
                self.center = Some(at);
                self.pan = None;
            }
        }
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
    }
}
