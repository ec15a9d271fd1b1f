pub mod config;
pub mod error;
pub mod frame_index;
pub mod metadata;
pub mod session;

#[cfg(test)]
mod config_test;

pub use config::*;
pub use error::*;
pub use frame_index::*;
pub use metadata::*;
pub use session::*;
