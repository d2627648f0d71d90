//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `render` - Layout and size checks
//! - `search_bar` - Search box widget
//! - `list` - Character list widget
//! - `status` - Status bar widget

mod input;
mod list;
mod loop_runner;
mod render;
mod search_bar;
mod status;

pub use loop_runner::run;
use loop_runner::Action;
