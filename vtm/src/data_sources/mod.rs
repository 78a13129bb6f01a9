//! Data sources
//!
//! Each configuration object kind gets a `vtm_<type>` data source reading
//! one object and a `vtm_<type>_list` data source listing names. Kinds with
//! runtime counters also get `vtm_<type>_stats`.

mod config;
mod information;
mod list;
mod stats;

pub use config::ConfigDataSource;
pub use information::InformationDataSource;
pub use list::{ListDataSource, OBJECT_LIST};
pub use stats::StatsDataSource;
