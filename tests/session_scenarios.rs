mod common;

use assert_matches::assert_matches;
use chrono::{Local, TimeZone};
use common::{log_workout, located_session, persisted, session_with, MapCall};
use std::time::Duration;

use trailmark::locale::Locale;
use trailmark::session::{NoticeLevel, SessionState};
use trailmark::store::{MemoryBlobStore, WorkoutStore, DEFAULT_KEY};
use trailmark::surfaces::{PanOptions, PermissionDenied};
use trailmark::workout::{Coords, Field, Workout, WorkoutInput, WorkoutKind};

const NYC: Coords = Coords {
    lat: 40.7,
    lng: -74.0,
};

fn stored_log() -> Vec<Workout> {
    let date = Local.with_ymd_and_hms(2024, 5, 4, 9, 0, 0).unwrap();
    vec![
        Workout::build(
            Coords::new(48.85, 2.35),
            &WorkoutInput::running(10.0, 52.0, 172.0),
            date,
            "id-1111111aaaa".into(),
            Locale::English,
        )
        .unwrap(),
        Workout::build(
            Coords::new(52.52, 13.40),
            &WorkoutInput::cycling(42.0, 90.0, 310.0),
            date,
            "id-2222222bbbb".into(),
            Locale::English,
        )
        .unwrap(),
        Workout::build(
            Coords::new(41.90, 12.49),
            &WorkoutInput::running(5.0, 31.0, 160.0),
            date,
            "id-3333333cccc".into(),
            Locale::English,
        )
        .unwrap(),
    ]
}

fn blob_of(log: &[Workout]) -> MemoryBlobStore {
    let blob = WorkoutStore::<MemoryBlobStore>::serialize(log).unwrap();
    MemoryBlobStore::with_blob(DEFAULT_KEY, &blob)
}

#[test]
fn click_then_submit_logs_renders_and_persists() {
    let mut session = located_session(Coords::new(40.0, -73.0));

    session.on_map_click(NYC);
    assert_eq!(session.state(), SessionState::AwaitingInput { pending: NYC });
    assert!(session.form().visible);
    assert!(session.form().focused);

    session
        .form_mut()
        .fill(WorkoutKind::Running, "5", "25", "180");
    let workout = session.on_submit().unwrap().unwrap().clone();

    assert_eq!(workout.kind(), WorkoutKind::Running);
    assert_eq!(workout.pace(), Some(5.0));
    assert_eq!(workout.coords(), NYC);
    assert_eq!(session.log().last(), Some(&workout));
    assert_eq!(session.log().len(), 1);

    let markers = session.map().markers();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].0, NYC);
    assert_eq!(markers[0].1.text, workout.description());

    assert_eq!(session.list().items.len(), 1);
    assert_eq!(session.list().items[0].id, workout.id());

    assert_eq!(persisted(&session), Some(vec![workout]));

    assert!(!session.form().visible);
    assert!(session.form().raw.distance.is_empty());
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn non_numeric_distance_is_rejected_without_side_effects() {
    let mut session = located_session(NYC);
    session.on_map_click(NYC);
    session
        .form_mut()
        .fill(WorkoutKind::Running, "", "25", "180");
    let map_calls_before = session.map().calls.len();

    let err = session.on_submit().unwrap_err();

    assert!(err.has(Field::Distance));
    assert!(session.log().is_empty());
    assert_eq!(session.map().calls.len(), map_calls_before);
    assert!(session.list().items.is_empty());
    assert_eq!(session.store().blobs().writes(), 0);
    assert_eq!(persisted(&session), None);

    // form stays open and populated
    assert!(session.form().visible);
    assert_eq!(session.form().raw.duration, "25");
    assert_eq!(session.state(), SessionState::AwaitingInput { pending: NYC });

    let notices = session.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].message.contains("distance"));
}

#[test]
fn invalid_values_never_touch_the_log() {
    let cases = [
        (WorkoutKind::Running, "0", "25", "180", Field::Distance),
        (WorkoutKind::Running, "5", "-1", "180", Field::Duration),
        (WorkoutKind::Running, "5", "25", "NaN", Field::Cadence),
        (WorkoutKind::Cycling, "20", "60", "-5", Field::ElevationGain),
        (WorkoutKind::Cycling, "-3", "60", "100", Field::Distance),
        (WorkoutKind::Cycling, "20", "0", "100", Field::Duration),
    ];

    for (kind, distance, duration, extra, field) in cases {
        let mut session = located_session(NYC);
        session.on_map_click(NYC);
        session.form_mut().fill(kind, distance, duration, extra);

        let err = session.on_submit().unwrap_err();
        assert!(err.has(field), "{kind} {distance}/{duration}/{extra} should fail on {field}");
        assert!(session.log().is_empty());
        assert_eq!(session.store().blobs().writes(), 0);
    }
}

#[test]
fn zero_elevation_is_accepted() {
    let mut session = located_session(NYC);
    let ride = log_workout(&mut session, NYC, WorkoutKind::Cycling, "30", "60", "0");
    assert_eq!(ride.speed(), Some(30.0));
}

#[test]
fn failed_submit_can_be_corrected_and_resubmitted() {
    let mut session = located_session(NYC);
    session.on_map_click(NYC);
    session.form_mut().fill(WorkoutKind::Running, "5", "0", "180");
    assert!(session.on_submit().is_err());

    session.form_mut().raw.duration = "30".into();
    let workout = session.on_submit().unwrap().unwrap();
    assert_eq!(workout.pace(), Some(6.0));
    assert_eq!(session.log().len(), 1);
}

#[test]
fn restart_restores_log_then_markers_once_map_ready() {
    let log = stored_log();
    let mut session = session_with(blob_of(&log));

    assert_eq!(session.start(), 3);
    assert_eq!(session.log(), log.as_slice());

    let listed: Vec<_> = session.list().items.iter().map(|i| i.id.clone()).collect();
    let expected: Vec<_> = log.iter().map(|w| w.id().to_string()).collect();
    assert_eq!(listed, expected);
    assert!(session.map().calls.is_empty());

    session.on_located(Ok(NYC));
    assert_eq!(session.map().calls[0], MapCall::RenderView(NYC, 13.0));
    let marker_coords: Vec<_> = session.map().markers().iter().map(|m| m.0).collect();
    let expected_coords: Vec<_> = log.iter().map(|w| w.coords()).collect();
    assert_eq!(marker_coords, expected_coords);
}

#[test]
fn second_location_fix_does_not_duplicate_markers() {
    let mut session = session_with(blob_of(&stored_log()));
    session.start();
    session.on_located(Ok(NYC));
    session.on_located(Ok(NYC));
    assert_eq!(session.map().markers().len(), 3);
}

#[test]
fn reset_empties_log_blob_and_list() {
    let mut session = session_with(blob_of(&stored_log()));
    session.start();
    session.on_located(Ok(NYC));
    log_workout(&mut session, NYC, WorkoutKind::Running, "5", "25", "180");
    assert_eq!(session.log().len(), 4);

    assert_eq!(session.reset(), 0);

    assert!(session.log().is_empty());
    assert!(!session.store().blobs().contains(DEFAULT_KEY));
    assert!(session.list().items.is_empty());
    assert_eq!(session.map().calls.last(), Some(&MapCall::ClearMarkers));
    assert_eq!(session.state(), SessionState::Idle);

    // a second reset changes nothing
    assert_eq!(session.reset(), 0);
    assert!(!session.store().blobs().contains(DEFAULT_KEY));
}

#[test]
fn reset_abandons_open_form() {
    let mut session = located_session(NYC);
    session.on_map_click(NYC);
    session.form_mut().fill(WorkoutKind::Running, "5", "", "");
    session.reset();
    assert!(!session.form().visible);
    assert!(session.form().raw.distance.is_empty());
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn logged_workouts_survive_a_restart() {
    let mut first = located_session(NYC);
    log_workout(&mut first, NYC, WorkoutKind::Running, "5", "25", "180");
    log_workout(&mut first, Coords::new(40.8, -73.9), WorkoutKind::Cycling, "27", "95", "523");
    let blobs = first.store().blobs().clone();

    let mut second = session_with(blobs);
    assert_eq!(second.start(), 2);
    assert_eq!(second.log(), first.log());
}

#[test]
fn new_ids_differ_from_restored_ones() {
    let log = stored_log();
    let mut session = session_with(blob_of(&log));
    session.start();
    session.on_located(Ok(NYC));
    let fresh = log_workout(&mut session, NYC, WorkoutKind::Running, "5", "25", "180");
    assert!(log.iter().all(|w| w.id() != fresh.id()));
}

#[test]
fn permission_denied_keeps_list_only_mode() {
    let mut session = session_with(blob_of(&stored_log()));
    session.start();
    session.on_located(Err(PermissionDenied));

    assert!(!session.map_ready());
    assert_eq!(session.list().items.len(), 3);
    let notices = session.take_notices();
    assert_eq!(notices[0].level, NoticeLevel::Warning);

    session.on_map_click(NYC);
    assert_eq!(session.state(), SessionState::Idle);
    assert!(!session.form().visible);
    assert!(session.map().calls.is_empty());

    session.on_list_click(Some("id-1111111aaaa"));
    assert!(session.map().calls.is_empty());
}

#[test]
fn clicks_before_the_map_is_ready_are_ignored() {
    let mut session = session_with(MemoryBlobStore::new());
    session.start();
    session.on_map_click(NYC);
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn corrupt_blob_starts_empty_with_warning() {
    let mut session = session_with(MemoryBlobStore::with_blob(DEFAULT_KEY, "[{\"kind\":"));
    assert_eq!(session.start(), 0);
    assert!(session.log().is_empty());
    assert!(session.list().items.is_empty());

    let notices = session.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    // left in place until the next save
    assert!(session.store().blobs().contains(DEFAULT_KEY));
}

#[test]
fn unavailable_store_keeps_workouts_in_memory() {
    let mut session = located_session(NYC);
    session.store_mut().blobs_mut().set_unavailable(true);

    let workout = log_workout(&mut session, NYC, WorkoutKind::Running, "5", "25", "180");

    assert_eq!(session.log(), &[workout]);
    assert_eq!(session.list().items.len(), 1);
    let notices = session.take_notices();
    assert_matches!(notices.last(), Some(n) if n.level == NoticeLevel::Warning);
}

#[test]
fn unavailable_store_at_startup_is_not_fatal() {
    let mut blobs = MemoryBlobStore::new();
    blobs.set_unavailable(true);
    let mut session = session_with(blobs);
    assert_eq!(session.start(), 0);
    assert_eq!(session.take_notices().len(), 1);
}

#[test]
fn list_click_centers_map_with_animation() {
    let mut session = located_session(NYC);
    let target = Coords::new(40.75, -73.98);
    let workout = log_workout(&mut session, target, WorkoutKind::Cycling, "12", "40", "80");

    session.on_list_click(Some(workout.id()));
    assert_eq!(
        session.map().calls.last(),
        Some(&MapCall::CenterOn(
            target,
            13.0,
            PanOptions {
                animate: true,
                duration: Duration::from_secs(1)
            }
        ))
    );
}

#[test]
fn list_click_without_item_is_a_noop() {
    let mut session = located_session(NYC);
    log_workout(&mut session, NYC, WorkoutKind::Running, "5", "25", "180");
    let calls = session.map().calls.len();

    session.on_list_click(None);
    session.on_list_click(Some("id-missing"));
    assert_eq!(session.map().calls.len(), calls);
}

#[test]
fn submit_outside_form_entry_does_nothing() {
    let mut session = located_session(NYC);
    session.form_mut().fill(WorkoutKind::Running, "5", "25", "180");
    assert_matches!(session.on_submit(), Ok(None));
    assert!(session.log().is_empty());
    assert_eq!(session.store().blobs().writes(), 0);
}

#[test]
fn kind_change_only_toggles_fields_while_form_open() {
    let mut session = located_session(NYC);
    session.on_kind_changed(WorkoutKind::Cycling);
    assert_eq!(session.form().extra, None);

    session.on_map_click(NYC);
    session.on_kind_changed(WorkoutKind::Cycling);
    assert_eq!(session.form().extra, Some(WorkoutKind::Cycling));
    assert_eq!(session.state(), SessionState::AwaitingInput { pending: NYC });
}

#[test]
fn second_click_moves_the_pending_coordinate() {
    let mut session = located_session(NYC);
    session.on_map_click(NYC);
    let moved = Coords::new(40.71, -74.01);
    let workout = log_workout(&mut session, moved, WorkoutKind::Running, "3", "18", "170");
    assert_eq!(workout.coords(), moved);
}

#[test]
fn cancel_closes_the_form() {
    let mut session = located_session(NYC);
    session.on_map_click(NYC);
    session.form_mut().fill(WorkoutKind::Running, "5", "25", "180");
    session.on_cancel();
    assert!(!session.form().visible);
    assert_eq!(session.state(), SessionState::Idle);
    assert_matches!(session.on_submit(), Ok(None));
}

#[test]
fn log_keeps_insertion_order() {
    let mut session = located_session(NYC);
    let a = log_workout(&mut session, NYC, WorkoutKind::Running, "5", "25", "180");
    let b = log_workout(&mut session, NYC, WorkoutKind::Cycling, "20", "50", "100");
    let c = log_workout(&mut session, NYC, WorkoutKind::Running, "8", "44", "175");

    let ids: Vec<_> = session.log().iter().map(|w| w.id()).collect();
    assert_eq!(ids, vec![a.id(), b.id(), c.id()]);
    let listed: Vec<_> = session.list().items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(listed, ids);
    assert_eq!(persisted(&session).unwrap().len(), 3);
}

#[test]
fn overflowing_metric_is_rejected_and_saved_log_stays_readable() {
    let mut session = located_session(NYC);
    log_workout(&mut session, NYC, WorkoutKind::Running, "5", "25", "180");

    session.on_map_click(NYC);
    session
        .form_mut()
        .fill(WorkoutKind::Running, "1e-310", "1", "180");
    let err = session.on_submit().unwrap_err();
    assert!(err.has(Field::Distance));
    assert_eq!(session.log().len(), 1);
    assert_eq!(session.store().blobs().writes(), 1);

    let mut restarted = session_with(session.store().blobs().clone());
    assert_eq!(restarted.start(), 1);
    assert!(restarted.take_notices().is_empty());
}

#[test]
fn reset_empties_log_even_when_blob_cannot_be_removed() {
    let mut session = located_session(NYC);
    log_workout(&mut session, NYC, WorkoutKind::Running, "5", "25", "180");
    session.store_mut().blobs_mut().set_read_only(true);
    session.take_notices();

    assert_eq!(session.reset(), 0);

    assert!(session.log().is_empty());
    assert!(session.list().items.is_empty());
    assert_eq!(session.map().calls.last(), Some(&MapCall::ClearMarkers));
    assert_eq!(session.state(), SessionState::Idle);
    let notices = session.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
}

#[test]
fn click_after_rejected_submit_moves_the_pending_coordinate() {
    let mut session = located_session(NYC);
    session.on_map_click(NYC);
    session.form_mut().fill(WorkoutKind::Running, "", "25", "180");
    assert!(session.on_submit().is_err());

    let moved = Coords::new(40.72, -74.02);
    session.on_map_click(moved);
    assert_eq!(session.state(), SessionState::AwaitingInput { pending: moved });
}
