pub mod events;
pub mod manager;

#[cfg(test)]
mod tests;

pub use events::*;
pub use manager::*;
