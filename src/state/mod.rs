//! State management module for MDView
//!
//! This module contains the session's state types organized by concern:
//! - `presentation`: Theme and font size shared by all renders
//! - `document`: Open documents and their lazily read source text
//! - `edit_buffer`: Scratch text of a tab in edit mode
//! - `tab_state`: Tab ordering, active tab and per-tab view mode
//! - `split_state`: Side-by-side comparison
//! - `session_state`: Persistent session data

mod document;
mod edit_buffer;
mod presentation;
mod session_state;
mod split_state;
mod tab_state;

pub use document::*;
pub use edit_buffer::*;
pub use presentation::*;
pub use session_state::*;
pub use split_state::*;
pub use tab_state::*;
