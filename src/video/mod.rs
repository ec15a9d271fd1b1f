pub mod color_track;
pub mod media_controller;
pub mod media_element;
pub mod player;
pub mod probe;

pub use color_track::*;
pub use media_controller::*;
pub use media_element::*;
pub use player::*;
pub use probe::*;
