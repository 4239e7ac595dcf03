pub mod aggregate;
pub mod cli;
pub mod forecast;
pub mod source;
pub mod store;

pub use cli::{get_config_info, setup_logger, Cli, Stage};
pub use source::{ArchiveClient, ArchiveQuery};
pub use store::{Observation, Store, STORE_TIME_FORMAT};
