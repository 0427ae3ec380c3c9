use tracing::{debug, info, warn};

use crate::config::Config;
use crate::locale::Locale;
use crate::render::{list_item, marker_content, render};
use crate::store::{BlobStore, WorkoutStore};
use crate::surfaces::{MapSurface, PanOptions, PermissionDenied, WorkoutForm, WorkoutList};
use crate::workout::{Coords, IdGenerator, ValidationError, Workout, WorkoutKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub locale: Locale,
    pub zoom: f64,
    pub pan: PanOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SessionConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            locale: cfg.locale,
            zoom: cfg.zoom,
            pan: PanOptions {
                animate: cfg.pan_duration_ms > 0,
                duration: std::time::Duration::from_millis(cfg.pan_duration_ms),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionState {
    Idle,
    /// Form open for the coordinate clicked last
    AwaitingInput { pending: Coords },
    Validating { pending: Coords },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Message for the user; never blocks the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Owns the workout log and drives the map, form, list and store through
/// one entry point per user or system event.
#[derive(Debug)]
pub struct SessionController<M, F, L, S: BlobStore> {
    config: SessionConfig,
    state: SessionState,
    log: Vec<Workout>,
    ids: IdGenerator,
    map: M,
    map_ready: bool,
    form: F,
    list: L,
    store: WorkoutStore<S>,
    notices: Vec<Notice>,
}

impl<M, F, L, S> SessionController<M, F, L, S>
where
    M: MapSurface,
    F: WorkoutForm,
    L: WorkoutList,
    S: BlobStore,
{
    pub fn new(config: SessionConfig, map: M, form: F, list: L, store: WorkoutStore<S>) -> Self {
        Self {
            config,
            state: SessionState::Idle,
            log: Vec::new(),
            ids: IdGenerator::new(),
            map,
            map_ready: false,
            form,
            list,
            store,
            notices: Vec::new(),
        }
    }

    /// Restore the persisted log and list it. Markers follow once the map
    /// is ready. Returns the number of restored records.
    pub fn start(&mut self) -> usize {
        self.log = match self.store.load() {
            Ok(log) => log,
            Err(e) if e.is_corrupt() => {
                warn!(error = %e, "ignoring unreadable workout blob");
                self.notify(
                    NoticeLevel::Warning,
                    "Saved workouts were unreadable and have been ignored".to_string(),
                );
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "workout storage unavailable");
                self.notify(
                    NoticeLevel::Warning,
                    format!("Workouts are kept in memory only: {e}"),
                );
                Vec::new()
            }
        };

        for workout in &self.log {
            self.ids.reserve(workout.id());
            self.list.append(list_item(workout, self.config.locale));
        }
        if self.map_ready {
            self.render_markers();
        }

        info!(records = self.log.len(), "session started");
        self.log.len()
    }

    pub fn on_located(&mut self, outcome: Result<Coords, PermissionDenied>) {
        match outcome {
            Ok(center) => {
                self.map.render_view(center, self.config.zoom);
                if !self.map_ready {
                    self.map_ready = true;
                    self.render_markers();
                }
                debug!(%center, "map ready");
            }
            Err(denied) => {
                warn!("{denied}; continuing without the map");
                self.notify(
                    NoticeLevel::Warning,
                    format!("{denied}: the map is unavailable, workouts are listed only"),
                );
            }
        }
    }

    pub fn on_map_click(&mut self, at: Coords) {
        if !self.map_ready {
            debug!("map click before the map is ready");
            return;
        }
        debug!(%at, "map clicked, opening form");
        self.state = SessionState::AwaitingInput { pending: at };
        self.form.show();
        self.form.focus_primary();
    }

    pub fn on_kind_changed(&mut self, kind: WorkoutKind) {
        if let SessionState::AwaitingInput { .. } = self.state {
            self.form.show_field_for(kind);
        }
    }

    /// Validate the form and log a workout. Outside of form entry this does
    /// nothing and returns `Ok(None)`. A rejected submission leaves the log,
    /// the surfaces and the store untouched.
    pub fn on_submit(&mut self) -> Result<Option<&Workout>, ValidationError> {
        let SessionState::AwaitingInput { pending } = self.state else {
            debug!(state = ?self.state, "submit outside of form entry");
            return Ok(None);
        };
        self.state = SessionState::Validating { pending };

        let locale = self.config.locale;
        let built = self
            .form
            .values()
            .parse()
            .and_then(|input| Workout::create(pending, &input, locale, &mut self.ids));

        let workout = match built {
            Ok(workout) => workout,
            Err(e) => {
                warn!(error = %e, "rejected workout input");
                self.state = SessionState::AwaitingInput { pending };
                self.notify(NoticeLevel::Error, e.to_string());
                return Err(e);
            }
        };

        info!(id = workout.id(), kind = %workout.kind(), "workout logged");
        let rendered = render(&workout, locale);
        self.log.push(workout);
        if self.map_ready {
            self.map.place_marker(pending, &rendered.marker);
        }
        self.list.append(rendered.item);
        self.persist();

        self.form.clear();
        self.form.hide();
        self.state = SessionState::Idle;
        Ok(self.log.last())
    }

    /// Abandon the pending entry.
    pub fn on_cancel(&mut self) {
        if let SessionState::AwaitingInput { .. } = self.state {
            self.form.clear();
            self.form.hide();
            self.state = SessionState::Idle;
        }
    }

    /// Center the map on the record behind a list entry. Unknown ids and a
    /// missing map are ignored.
    pub fn on_list_click(&mut self, id: Option<&str>) {
        let Some(workout) = id.and_then(|id| self.log.iter().find(|w| w.id() == id)) else {
            return;
        };
        if !self.map_ready {
            return;
        }
        let at = workout.coords();
        self.map.center_on(at, self.config.zoom, self.config.pan);
    }

    /// Forget every record, drop the persisted blob and start over. When
    /// the blob cannot be removed the log still ends up empty and nothing
    /// is reloaded from it.
    pub fn reset(&mut self) -> usize {
        info!(records = self.log.len(), "resetting session");
        self.log.clear();
        let cleared = match self.store.clear() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to clear persisted workouts");
                self.notify(
                    NoticeLevel::Warning,
                    format!("Saved workouts could not be removed: {e}"),
                );
                false
            }
        };
        self.ids.clear();
        self.list.clear();
        self.map.clear_markers();
        self.form.clear();
        self.form.hide();
        self.state = SessionState::Idle;
        if cleared {
            self.start()
        } else {
            0
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn log(&self) -> &[Workout] {
        &self.log
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn map_ready(&self) -> bool {
        self.map_ready
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    pub fn list(&self) -> &L {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut L {
        &mut self.list
    }

    pub fn store(&self) -> &WorkoutStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut WorkoutStore<S> {
        &mut self.store
    }

    fn render_markers(&mut self) {
        for workout in &self.log {
            self.map
                .place_marker(workout.coords(), &marker_content(workout));
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.log) {
            self.notify(
                NoticeLevel::Warning,
                format!("Workout kept in memory only, saving failed: {e}"),
            );
        }
    }

    fn notify(&mut self, level: NoticeLevel, message: String) {
        self.notices.push(Notice { level, message });
    }
}
