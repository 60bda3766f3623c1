//! Compile-time constants and tunables shared across the crate.

/// Application name used for config directories and the status bar.
pub const APP_NAME: &str = "inkpanel";
/// Application version injected from `Cargo.toml` at compile time.
#[allow(dead_code)]
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable pointing at an alternative `service.json`.
pub const SERVICE_JSON_ENV: &str = "INKPANEL_SERVICE_JSON";

/// Well-known bus name of the story service on the session bus.
pub const DEFAULT_BUS_NAME: &str = "net.danigm.lils";
/// Object path the story service exports its interface on.
pub const DEFAULT_OBJECT_PATH: &str = "/net/danigm/lils";

/// Maximum number of log entries kept in the activity panel.
pub const MAX_LOGS: usize = 1000;
/// Height of the story panel in terminal rows.
pub const STORY_PANEL_HEIGHT: u16 = 10;
