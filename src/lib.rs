pub mod api;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod query;
pub mod utils;

pub use crate::cache::{CachePolicy, QueryCache};
pub use crate::config::Settings;
pub use crate::dashboard::{Dashboard, DashboardData};
pub use crate::db::StakingSource;
pub use crate::query::{DateRange, QueryKind};
