use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListState, StatefulWidget, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::render::ListItem;
use crate::surfaces::WorkoutList;
use crate::workout::WorkoutKind;

/// Rendered workouts in log order with an optional selection
#[derive(Debug, Clone, Default)]
pub struct TerminalList {
    items: Vec<ListItem>,
    selected: Option<usize>,
}

impl TerminalList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => (i + 1).min(self.items.len() - 1),
            None => 0,
        });
    }

    pub fn select_prev(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = Some(self.selected.map_or(0, |i| i.saturating_sub(1)));
    }

    /// Id behind the current selection, if any
    pub fn selected_id(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.items.get(i))
            .map(|item| item.id.as_str())
    }

    pub fn widget(&self, focused: bool, width: u16) -> impl Widget + '_ {
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let inner_width = usize::from(width.saturating_sub(4));

        let entries = self
            .items
            .iter()
            .map(|item| {
                let accent = match item.kind {
                    WorkoutKind::Running => Color::Green,
                    WorkoutKind::Cycling => Color::Yellow,
                };
                let details = item
                    .rows
                    .iter()
                    .map(|row| format!("{} {} {}", row.icon, row.value, row.unit))
                    .collect::<Vec<_>>()
                    .join("  ");
                vec![
                    Line::from(Span::styled(
                        item.title.clone(),
                        Style::default().fg(accent).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(fit_width(&details, inner_width)),
                ]
            })
            .map(ratatui::widgets::ListItem::new)
            .collect::<Vec<_>>();

        let list = List::new(entries)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(format!(" Workouts ({}) ", self.items.len())),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        SelectedList {
            list,
            state: ListState::default().with_selected(self.selected),
        }
    }
}

struct SelectedList<'a> {
    list: List<'a>,
    state: ListState,
}

impl Widget for SelectedList<'_> {
    fn render(mut self, area: ratatui::layout::Rect, buf: &mut ratatui::buffer::Buffer) {
        StatefulWidget::render(self.list, area, buf, &mut self.state);
    }
}

/// Cut `text` to at most `width` terminal columns
pub fn fit_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    for c in text.chars() {
        let mut candidate = out.clone();
        candidate.push(c);
        if candidate.width() + 1 > width {
            break;
        }
        out = candidate;
    }
    out.push('…');
    out
}

impl WorkoutList for TerminalList {
    fn append(&mut self, item: ListItem) {
        self.items.push(item);
    }

    fn clear(&mut self) {
        self.items.clear();
        self.selected = None;
    }
}
