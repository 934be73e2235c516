//! Memoized preview documents
//!
//! Each entry remembers the settings generation it was rendered under. A
//! lookup under any other generation is a miss, so a settings change can
//! never serve a stale render even before the old entries are purged.

use crate::state::PresentationSettings;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An immutable rendered document
#[derive(Debug, Clone)]
pub struct RenderedView {
    /// The finished HTML document
    pub html: Arc<str>,

    /// Settings the document was rendered with
    pub settings: PresentationSettings,

    /// Settings generation at render time
    pub generation: u64,
}

/// Cache hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Rendered documents keyed by path and settings generation.
///
/// Unbounded: it holds at most one entry per document opened or compared.
#[derive(Debug, Default)]
pub struct RenderCache {
    entries: HashMap<PathBuf, RenderedView>,
    stats: CacheStats,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached view for `path` if it was rendered under `generation`
    pub fn get(&self, path: &Path, generation: u64) -> Option<&RenderedView> {
        self.entries
            .get(path)
            .filter(|view| view.generation == generation)
    }

    /// Return the cached HTML, rendering and storing it on a miss
    pub fn get_or_render<F>(
        &mut self,
        path: &Path,
        generation: u64,
        settings: &PresentationSettings,
        render: F,
    ) -> Arc<str>
    where
        F: FnOnce() -> String,
    {
        if let Some(view) = self.get(path, generation) {
            let html = Arc::clone(&view.html);
            self.stats.hits += 1;
            log::debug!("Render cache hit: {}", path.display());
            return html;
        }

        self.stats.misses += 1;
        log::debug!(
            "Render cache miss: {} (generation {})",
            path.display(),
            generation
        );

        let html: Arc<str> = Arc::from(render());
        self.entries.insert(
            path.to_path_buf(),
            RenderedView {
                html: Arc::clone(&html),
                settings: *settings,
                generation,
            },
        );
        html
    }

    /// Drop the entry for one document
    pub fn invalidate(&mut self, path: &Path) -> bool {
        let removed = self.entries.remove(path).is_some();
        if removed {
            log::debug!("Render cache invalidated: {}", path.display());
        }
        removed
    }

    /// Drop every entry not rendered under `generation`
    pub fn purge_stale(&mut self, generation: u64) {
        let before = self.entries.len();
        self.entries.retain(|_, view| view.generation == generation);
        log::debug!(
            "Render cache flushed {} stale entries",
            before - self.entries.len()
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, path: &Path, generation: u64) -> bool {
        self.get(path, generation).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
