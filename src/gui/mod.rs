pub mod app;
pub mod frame_panel;
pub mod seek_bar;

#[cfg(test)]
mod app_test;

pub use app::*;
