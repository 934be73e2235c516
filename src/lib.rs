//! MDView - rendered Markdown document sessions
//!
//! A document session engine for browsing and previewing Markdown files:
//! tabs with preview and edit modes, side-by-side comparison, themed
//! rendering with inline diagrams, and a render cache that avoids
//! re-rendering unchanged documents.

pub mod config;
pub mod error;
pub mod file_handler;
pub mod markdown;
pub mod render_cache;
pub mod session;
pub mod state;
pub mod utils;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use render_cache::{CacheStats, RenderCache};
pub use session::{ActiveView, Session, SplitPane, TabContent};
