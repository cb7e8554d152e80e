#![deny(warnings)]
pub mod game;
pub mod model;
pub mod shuffle;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "highlow"
    }

    pub const fn codename() -> &'static str {
        "Stacked Deck"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
