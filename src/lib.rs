// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod locale;
pub mod logging;
pub mod render;
pub mod runtime;
pub mod session;
pub mod store;
pub mod surfaces;
pub mod ui;
pub mod workout;

pub use session::{Notice, NoticeLevel, SessionConfig, SessionController, SessionState};
pub use workout::{Coords, ValidationError, Workout, WorkoutKind};
