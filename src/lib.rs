pub mod config;
pub mod diff;
pub mod error;
pub mod models;
pub mod monitor;
pub mod notify;
pub mod parsers;
pub mod scrapers;
pub mod storage;
pub mod utils;

pub use error::{Result, WatchError};
