pub mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod server;

#[cfg(test)]
mod test;

pub use api::Mode;
pub use config::{Config, ServiceAccount};
pub use error::{Error, Result, GATEWAY_FAILURE_MESSAGE};
