#![allow(dead_code)]

use trailmark::render::{ListItem, MarkerContent};
use trailmark::session::{SessionConfig, SessionController};
use trailmark::store::{BlobStore, MemoryBlobStore, WorkoutStore, DEFAULT_KEY};
use trailmark::surfaces::{MapSurface, PanOptions, WorkoutForm, WorkoutList};
use trailmark::workout::{Coords, RawForm, Workout, WorkoutKind};

#[derive(Debug, Clone, PartialEq)]
pub enum MapCall {
    RenderView(Coords, f64),
    PlaceMarker(Coords, MarkerContent),
    CenterOn(Coords, f64, PanOptions),
    ClearMarkers,
}

/// Map double that records every call
#[derive(Debug, Default)]
pub struct FakeMap {
    pub calls: Vec<MapCall>,
}

impl FakeMap {
    pub fn markers(&self) -> Vec<(Coords, MarkerContent)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                MapCall::PlaceMarker(at, content) => Some((*at, content.clone())),
                _ => None,
            })
            .collect()
    }
}

impl MapSurface for FakeMap {
    fn render_view(&mut self, center: Coords, zoom: f64) {
        self.calls.push(MapCall::RenderView(center, zoom));
    }

    fn place_marker(&mut self, at: Coords, content: &MarkerContent) {
        self.calls.push(MapCall::PlaceMarker(at, content.clone()));
    }

    fn center_on(&mut self, at: Coords, zoom: f64, pan: PanOptions) {
        self.calls.push(MapCall::CenterOn(at, zoom, pan));
    }

    fn clear_markers(&mut self) {
        self.calls.push(MapCall::ClearMarkers);
    }
}

#[derive(Debug, Default)]
pub struct FakeForm {
    pub raw: RawForm,
    pub visible: bool,
    pub focused: bool,
    pub extra: Option<WorkoutKind>,
}

impl FakeForm {
    pub fn fill(&mut self, kind: WorkoutKind, distance: &str, duration: &str, extra: &str) {
        self.raw = RawForm {
            kind,
            distance: distance.into(),
            duration: duration.into(),
            ..RawForm::default()
        };
        match kind {
            WorkoutKind::Running => self.raw.cadence = extra.into(),
            WorkoutKind::Cycling => self.raw.elevation_gain = extra.into(),
        }
    }
}

impl WorkoutForm for FakeForm {
    fn values(&self) -> RawForm {
        self.raw.clone()
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }

    fn clear(&mut self) {
        self.raw = RawForm {
            kind: self.raw.kind,
            ..RawForm::default()
        };
        self.focused = false;
    }

    fn focus_primary(&mut self) {
        self.focused = true;
    }

    fn show_field_for(&mut self, kind: WorkoutKind) {
        self.extra = Some(kind);
    }
}

#[derive(Debug, Default)]
pub struct FakeList {
    pub items: Vec<ListItem>,
}

impl WorkoutList for FakeList {
    fn append(&mut self, item: ListItem) {
        self.items.push(item);
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}

pub type TestSession = SessionController<FakeMap, FakeForm, FakeList, MemoryBlobStore>;

pub fn session_with(blobs: MemoryBlobStore) -> TestSession {
    SessionController::new(
        SessionConfig::default(),
        FakeMap::default(),
        FakeForm::default(),
        FakeList::default(),
        WorkoutStore::new(blobs, DEFAULT_KEY),
    )
}

/// Started session with a ready map centered on `home`
pub fn located_session(home: Coords) -> TestSession {
    let mut session = session_with(MemoryBlobStore::new());
    session.start();
    session.on_located(Ok(home));
    session
}

/// Click, fill and submit one workout; panics if it is rejected
pub fn log_workout(
    session: &mut TestSession,
    at: Coords,
    kind: WorkoutKind,
    distance: &str,
    duration: &str,
    extra: &str,
) -> Workout {
    session.on_map_click(at);
    session.form_mut().fill(kind, distance, duration, extra);
    session
        .on_submit()
        .expect("valid workout")
        .expect("form was open")
        .clone()
}

/// Decode whatever the session last persisted
pub fn persisted(session: &TestSession) -> Option<Vec<Workout>> {
    session
        .store()
        .blobs()
        .get(DEFAULT_KEY)
        .unwrap()
        .map(|blob| WorkoutStore::<MemoryBlobStore>::deserialize(&blob).unwrap())
}
