use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::runtime::AppEvent;
use crate::session::{Notice, SessionController};
use crate::store::BlobStore;
use crate::ui::{form_view::FormField, TerminalForm, TerminalList, TerminalMap};

pub type TerminalSession<S> = SessionController<TerminalMap, TerminalForm, TerminalList, S>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Map,
    List,
}

/// Terminal shell around a session: routes keys and ticks to it
#[derive(Debug)]
pub struct App<S: BlobStore> {
    pub session: TerminalSession<S>,
    pub focus: Focus,
    pub status: Option<Notice>,
    pub should_quit: bool,
}

impl<S: BlobStore> App<S> {
    pub fn new(session: TerminalSession<S>) -> Self {
        let mut app = Self {
            session,
            focus: Focus::Map,
            status: None,
            should_quit: false,
        };
        app.collect_notices();
        app
    }

    pub fn set_status(&mut self, notice: Notice) {
        self.status = Some(notice);
    }

    /// Apply one event. `tick` is the time a Tick stands for.
    pub fn handle_event(&mut self, event: AppEvent, tick: Duration) {
        match event {
            AppEvent::Tick => self.session.map_mut().advance(tick),
            AppEvent::Resize => {}
            AppEvent::Located(outcome) => {
                self.session.on_located(outcome);
                if !self.session.map_ready() {
                    self.focus = Focus::List;
                }
            }
            AppEvent::Key(key) => self.handle_key(key),
        }
        self.collect_notices();
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.session.form().is_visible() {
            self.handle_form_key(key);
            return;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('R') => {
                let restored = self.session.reset();
                debug!(restored, "reset from keyboard");
                self.status = None;
            }
            KeyCode::Tab if self.session.map_ready() => {
                self.focus = match self.focus {
                    Focus::Map => Focus::List,
                    Focus::List => Focus::Map,
                };
            }
            _ => match self.focus {
                Focus::Map => self.handle_map_key(key),
                Focus::List => self.handle_list_key(key),
            },
        }
    }

    fn handle_map_key(&mut self, key: KeyEvent) {
        let map = self.session.map_mut();
        match key.code {
            KeyCode::Up => map.move_cursor(1, 0),
            KeyCode::Down => map.move_cursor(-1, 0),
            KeyCode::Left => map.move_cursor(0, -1),
            KeyCode::Right => map.move_cursor(0, 1),
            KeyCode::Char('+') | KeyCode::Char('=') => map.zoom_by(1.0),
            KeyCode::Char('-') => map.zoom_by(-1.0),
            KeyCode::Enter | KeyCode::Char(' ') => {
                let at = map.cursor();
                self.session.on_map_click(at);
            }
            _ => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.session.list_mut().select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.session.list_mut().select_next(),
            KeyCode::Enter => {
                let id = self.session.list().selected_id().map(str::to_string);
                self.session.on_list_click(id.as_deref());
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let on_kind_row = self.session.form().focus() == FormField::Kind;
        match key.code {
            KeyCode::Esc => self.session.on_cancel(),
            KeyCode::Enter => {
                if let Ok(Some(workout)) = self.session.on_submit() {
                    debug!(id = workout.id(), "saved from form");
                    self.status = None;
                }
            }
            KeyCode::Tab | KeyCode::Down => self.session.form_mut().focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.session.form_mut().focus_prev(),
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') if on_kind_row => {
                let kind = self.session.form_mut().toggle_kind();
                self.session.on_kind_changed(kind);
            }
            KeyCode::Backspace => self.session.form_mut().backspace(),
            KeyCode::Char(c) if !on_kind_row => self.session.form_mut().input(c),
            _ => {}
        }
    }

    fn collect_notices(&mut self) {
        if let Some(latest) = self.session.take_notices().pop() {
            self.status = Some(latest);
        }
    }
}
