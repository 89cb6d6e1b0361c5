pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod coalesce;
pub mod config;
pub mod constants;
pub mod filter;
pub mod handlers;
pub mod input;
pub mod logger;
pub mod parser;
pub mod registry;
pub mod render;
pub mod style;
pub mod types;

#[cfg(test)]
mod test;
