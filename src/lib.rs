pub mod api;
pub mod config;
pub mod eta;
pub mod http;
pub mod search;
pub mod store;

pub use self::config::Config;
