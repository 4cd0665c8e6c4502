//! Terminal user interface
//!
//! Dashboard rendering and input handling using ratatui.

pub mod app;

pub use app::{App, Message, MessageCategory};
