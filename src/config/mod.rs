#[allow(clippy::module_inception)]
mod config;

pub use self::config::{DashboardSettings, ServerSettings, Settings, WarehouseBackend, WarehouseSettings};
