//! Terminal dashboard
//!
//! - `terminal`: event loop, polling cadence, key handling
//! - `layout`: widget layout for one frame
//! - `renderer`: text formatting shared with the headless summary

pub mod layout;
pub mod renderer;
pub mod terminal;

pub use renderer::render_plain;
pub use terminal::{run_ui, Action};
