use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::surfaces::WorkoutForm;
use crate::workout::{RawForm, WorkoutKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Kind,
    Distance,
    Duration,
    Cadence,
    ElevationGain,
}

impl FormField {
    fn label(&self) -> &'static str {
        match self {
            FormField::Kind => "Type",
            FormField::Distance => "Distance",
            FormField::Duration => "Duration",
            FormField::Cadence => "Cadence",
            FormField::ElevationGain => "Elev Gain",
        }
    }

    fn placeholder(&self) -> &'static str {
        match self {
            FormField::Kind => "",
            FormField::Distance => "km",
            FormField::Duration => "min",
            FormField::Cadence => "step/min",
            FormField::ElevationGain => "meters",
        }
    }
}

/// Workout entry form with one text buffer per numeric field
#[derive(Debug, Clone)]
pub struct TerminalForm {
    visible: bool,
    kind: WorkoutKind,
    /// Which of cadence/elevation is shown
    extra: WorkoutKind,
    focus: FormField,
    distance: String,
    duration: String,
    cadence: String,
    elevation_gain: String,
}

impl Default for TerminalForm {
    fn default() -> Self {
        Self {
            visible: false,
            kind: WorkoutKind::Running,
            extra: WorkoutKind::Running,
            focus: FormField::Distance,
            distance: String::new(),
            duration: String::new(),
            cadence: String::new(),
            elevation_gain: String::new(),
        }
    }
}

impl TerminalForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn kind(&self) -> WorkoutKind {
        self.kind
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn visible_fields(&self) -> [FormField; 4] {
        let extra = match self.extra {
            WorkoutKind::Running => FormField::Cadence,
            WorkoutKind::Cycling => FormField::ElevationGain,
        };
        [FormField::Kind, FormField::Distance, FormField::Duration, extra]
    }

    pub fn focus_next(&mut self) {
        self.step_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.step_focus(-1);
    }

    fn step_focus(&mut self, delta: isize) {
        let fields = self.visible_fields();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0) as isize;
        let next = (idx + delta).rem_euclid(fields.len() as isize) as usize;
        self.focus = fields[next];
    }

    /// Switch the selected workout type and return it.
    pub fn toggle_kind(&mut self) -> WorkoutKind {
        self.kind = self.kind.toggled();
        self.kind
    }

    pub fn text(&self, field: FormField) -> &str {
        match field {
            FormField::Kind => "",
            FormField::Distance => &self.distance,
            FormField::Duration => &self.duration,
            FormField::Cadence => &self.cadence,
            FormField::ElevationGain => &self.elevation_gain,
        }
    }

    fn buffer_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Kind => None,
            FormField::Distance => Some(&mut self.distance),
            FormField::Duration => Some(&mut self.duration),
            FormField::Cadence => Some(&mut self.cadence),
            FormField::ElevationGain => Some(&mut self.elevation_gain),
        }
    }

    pub fn input(&mut self, c: char) {
        if let Some(buf) = self.buffer_mut() {
            buf.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(buf) = self.buffer_mut() {
            buf.pop();
        }
    }

    pub fn widget(&self) -> impl Widget + '_ {
        let label_style = Style::default().add_modifier(Modifier::BOLD);
        let focus_style = Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let dim = Style::default().add_modifier(Modifier::DIM);

        let lines = self
            .visible_fields()
            .into_iter()
            .map(|field| {
                let value = match field {
                    FormField::Kind => Span::raw(format!("◀ {} ▶", self.kind)),
                    _ if self.text(field).is_empty() => {
                        Span::styled(field.placeholder(), dim)
                    }
                    _ => Span::raw(self.text(field).to_string()),
                };
                let value = if field == self.focus {
                    value.style(focus_style)
                } else {
                    value
                };
                Line::from(vec![
                    Span::styled(format!("{:<10}", field.label()), label_style),
                    value,
                ])
            })
            .collect::<Vec<Line>>();

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green))
                .title(" New workout · Enter save · Esc cancel "),
        )
    }
}

impl WorkoutForm for TerminalForm {
    fn values(&self) -> RawForm {
        RawForm {
            kind: self.kind,
            distance: self.distance.clone(),
            duration: self.duration.clone(),
            cadence: self.cadence.clone(),
            elevation_gain: self.elevation_gain.clone(),
        }
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }

    fn clear(&mut self) {
        self.distance.clear();
        self.duration.clear();
        self.cadence.clear();
        self.elevation_gain.clear();
        self.focus = FormField::Distance;
    }

    fn focus_primary(&mut self) {
        self.focus = FormField::Distance;
    }

    fn show_field_for(&mut self, kind: WorkoutKind) {
        self.extra = kind;
        if !self.visible_fields().contains(&self.focus) {
            self.focus = FormField::Kind;
        }
    }
}
