pub mod form_view;
pub mod list_view;
pub mod map_view;

pub use form_view::TerminalForm;
pub use list_view::TerminalList;
pub use map_view::TerminalMap;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::{
    app::{App, Focus},
    session::NoticeLevel,
    store::BlobStore,
};

const LIST_WIDTH_PERCENT: u16 = 38;
const FORM_HEIGHT: u16 = 6;

impl<S: BlobStore> Widget for &App<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(LIST_WIDTH_PERCENT),
                Constraint::Percentage(100 - LIST_WIDTH_PERCENT),
            ])
            .split(rows[0]);

        let session = &self.session;

        // left column: the form (when open) above the list
        let form_open = session.form().is_visible();
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints(if form_open {
                vec![Constraint::Length(FORM_HEIGHT), Constraint::Min(0)]
            } else {
                vec![Constraint::Length(0), Constraint::Min(0)]
            })
            .split(columns[0]);

        if form_open {
            Clear.render(left[0], buf);
            session.form().widget().render(left[0], buf);
        }
        session
            .list()
            .widget(self.focus == Focus::List && !form_open, left[1].width)
            .render(left[1], buf);

        if session.map_ready() {
            session
                .map()
                .widget(self.focus == Focus::Map && !form_open)
                .render(columns[1], buf);
        } else {
            Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Map unavailable",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from("set a home location with --lat/--lon or in config.json"),
            ])
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Map "))
            .render(columns[1], buf);
        }

        status_line(self).render(rows[1], buf);
    }
}

fn status_line<S: BlobStore>(app: &App<S>) -> Paragraph<'static> {
    let dim = Style::default().add_modifier(Modifier::DIM);
    let line = match &app.status {
        Some(notice) => {
            let color = match notice.level {
                NoticeLevel::Info => Color::Cyan,
                NoticeLevel::Warning => Color::Yellow,
                NoticeLevel::Error => Color::Red,
            };
            Line::from(Span::styled(notice.message.clone(), Style::default().fg(color)))
        }
        None if app.session.form().is_visible() => Line::from(Span::styled(
            "tab next field · ←/→ on type switches running/cycling",
            dim,
        )),
        None => Line::from(Span::styled(
            "arrows move · enter log workout here · tab list/map · +/- zoom · R reset · q quit",
            dim,
        )),
    };
    Paragraph::new(line)
}
