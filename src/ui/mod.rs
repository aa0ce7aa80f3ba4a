//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: frame layout, overlays, status bar
//! - `input`: keyboard event handling per app state
//! - `styles`: color palette and text styling
//! - `tabs`: per-tab content rendering (home, customers, history)

pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
