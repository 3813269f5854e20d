pub mod config;
pub mod context;
pub mod error;
pub mod locale;
pub mod map;
pub mod metrics_consts;
pub mod reconcile;
pub mod resolve;
pub mod seed;
pub mod source;
pub mod staging;
pub mod store;
pub mod target;
pub mod types;
