pub mod config;
pub mod delivery;
pub mod env;
pub mod envelope;
pub mod error;
pub mod labels;
pub mod level;
pub mod logger;
pub mod message;
pub mod request;
pub mod scheduler;
pub mod transport;

mod wrap;
