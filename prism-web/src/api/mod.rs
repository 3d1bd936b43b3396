//! HTTP surface: the calculator page and the health probe

pub mod health;
pub mod ui;

pub use health::health_routes;
pub use ui::ui_routes;
