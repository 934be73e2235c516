//! Document session
//!
//! Owns every piece of mutable session state: open documents, tabs, the
//! optional split view, presentation settings and the render cache. All
//! mutation goes through the operations below, each of which runs to
//! completion and returns what the presentation layer should now show.

use crate::config::Config;
use crate::error::{ConfigResult, PipelineError, SessionError, SessionResult};
use crate::file_handler::{FsStorage, Storage};
use crate::markdown::RenderPipeline;
use crate::render_cache::{CacheStats, RenderCache};
use crate::state::{
    Document, EditBuffer, PresentationSettings, RecentFile, RecentFiles, SessionSnapshot,
    SplitView, Tab, TabState, TabView, ThemeMode, ViewMode, MIN_FONT_SIZE_PT, SNAPSHOT_VERSION,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What a single tab currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum TabContent {
    /// Rendered HTML document
    Preview(Arc<str>),
    /// Current edit buffer text
    Edit(String),
}

/// One side of the split view
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPane {
    pub path: PathBuf,
    pub html: Arc<str>,
}

/// What the session currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveView {
    /// No active document
    Empty,
    /// The active tab
    Tab { path: PathBuf, content: TabContent },
    /// Two documents side by side
    Split { left: SplitPane, right: SplitPane },
}

impl ActiveView {
    pub fn is_empty(&self) -> bool {
        matches!(self, ActiveView::Empty)
    }

    /// Rendered HTML of a previewed tab
    pub fn preview_html(&self) -> Option<&str> {
        match self {
            ActiveView::Tab {
                content: TabContent::Preview(html),
                ..
            } => Some(html),
            _ => None,
        }
    }
}

/// The document session
pub struct Session {
    storage: Box<dyn Storage>,
    pipeline: RenderPipeline,
    cache: RenderCache,

    /// Documents referenced by a tab or by the split view
    documents: HashMap<PathBuf, Document>,
    tabs: TabState,
    split: Option<SplitView>,

    settings: PresentationSettings,
    /// Bumped on every effective settings change
    generation: u64,
    editor_font_size_pt: u32,

    recent: RecentFiles,
    last_directory: Option<PathBuf>,
}

impl Session {
    pub fn new(
        storage: impl Storage + 'static,
        pipeline: RenderPipeline,
        settings: PresentationSettings,
    ) -> Self {
        Self {
            storage: Box::new(storage),
            pipeline,
            cache: RenderCache::new(),
            documents: HashMap::new(),
            tabs: TabState::new(),
            split: None,
            settings,
            generation: 0,
            editor_font_size_pt: settings.font_size_pt,
            recent: RecentFiles::default(),
            last_directory: None,
        }
    }

    /// Session over the filesystem with the configured renderers
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        config.validate()?;
        let pipeline = RenderPipeline::from_config(&config.render)?;
        Ok(Self::new(
            FsStorage::new(config.files.max_file_size),
            pipeline,
            config.presentation(),
        ))
    }

    // Document session

    /// Open a document, selecting its tab if it is already open
    pub fn open(&mut self, path: impl Into<PathBuf>) -> ActiveView {
        let path = path.into();
        self.leave_split();
        self.open_tab(path.clone());
        self.recent.touch(&path);
        self.active_view()
    }

    /// Close a tab, discarding any unsaved edits it holds
    pub fn close(&mut self, path: &Path) -> SessionResult<ActiveView> {
        let tab = self
            .tabs
            .remove_tab(path)
            .ok_or_else(|| SessionError::TabNotFound {
                path: path.to_path_buf(),
            })?;

        if tab.has_unsaved_edits() {
            log::warn!("Discarding unsaved edits to {}", path.display());
        }
        log::info!("Closed {}", path.display());

        self.cache.invalidate(path);
        self.evict_if_unreferenced(path);
        Ok(self.active_view())
    }

    pub fn select_tab(&mut self, path: &Path) -> SessionResult<ActiveView> {
        if !self.tabs.contains(path) {
            return Err(SessionError::TabNotFound {
                path: path.to_path_buf(),
            });
        }
        self.leave_split();
        self.tabs.set_active(path);
        Ok(self.active_view())
    }

    pub fn next_tab(&mut self) -> ActiveView {
        self.leave_split();
        self.tabs.next_tab();
        self.active_view()
    }

    pub fn prev_tab(&mut self) -> ActiveView {
        self.leave_split();
        self.tabs.prev_tab();
        self.active_view()
    }

    /// Switch the active tab between preview and edit mode.
    ///
    /// Leaving edit mode this way only succeeds when the buffer has no
    /// unsaved changes; otherwise `save` or `cancel` must be used.
    pub fn toggle_edit_mode(&mut self, path: &Path) -> SessionResult<ActiveView> {
        if self.split.is_some() {
            return Err(SessionError::SplitViewActive);
        }
        if self.tabs.active_path() != Some(path) {
            let path = path.to_path_buf();
            return Err(if self.tabs.contains(&path) {
                SessionError::NotActiveTab { path }
            } else {
                SessionError::TabNotFound { path }
            });
        }

        let tab = self
            .tabs
            .get_mut(path)
            .ok_or_else(|| SessionError::TabNotFound {
                path: path.to_path_buf(),
            })?;

        match tab.edit_buffer().map(EditBuffer::is_modified) {
            Some(true) => {
                return Err(SessionError::UnsavedEdits {
                    path: path.to_path_buf(),
                })
            }
            Some(false) => {
                tab.view = TabView::Preview;
                log::debug!("{} back to preview", path.display());
            }
            None => {
                let document = self
                    .documents
                    .entry(path.to_path_buf())
                    .or_insert_with(|| Document::new(path.to_path_buf()));
                let text = document.load(self.storage.as_ref()).map_err(|e| {
                    log::warn!("Cannot edit {}: {}", path.display(), e);
                    e
                })?;
                tab.view = TabView::Edit(EditBuffer::new(text));
                self.editor_font_size_pt = self.settings.font_size_pt;
                log::debug!("Editing {}", path.display());
            }
        }

        Ok(self.active_view())
    }

    /// Write the edit buffer to storage and return to preview.
    ///
    /// On failure the tab stays in edit mode with its buffer intact.
    pub fn save(&mut self, path: &Path) -> SessionResult<ActiveView> {
        let tab = self
            .tabs
            .get_mut(path)
            .ok_or_else(|| SessionError::TabNotFound {
                path: path.to_path_buf(),
            })?;
        let text = tab
            .edit_buffer()
            .map(EditBuffer::text)
            .ok_or_else(|| SessionError::NotEditing {
                path: path.to_path_buf(),
            })?;

        if let Err(err) = self.storage.write(path, &text) {
            log::error!("Failed to save {}: {}", path.display(), err);
            return Err(err.into());
        }

        self.documents
            .entry(path.to_path_buf())
            .or_insert_with(|| Document::new(path.to_path_buf()))
            .replace_text(text);
        self.cache.invalidate(path);
        tab.view = TabView::Preview;

        Ok(self.active_view())
    }

    /// Discard the edit buffer without touching storage or the cache
    pub fn cancel(&mut self, path: &Path) -> SessionResult<ActiveView> {
        let tab = self
            .tabs
            .get_mut(path)
            .ok_or_else(|| SessionError::TabNotFound {
                path: path.to_path_buf(),
            })?;
        if tab.mode() != ViewMode::Edit {
            return Err(SessionError::NotEditing {
                path: path.to_path_buf(),
            });
        }

        tab.view = TabView::Preview;
        log::debug!("Cancelled edits to {}", path.display());
        Ok(self.active_view())
    }

    pub fn edit_buffer(&self, path: &Path) -> Option<&EditBuffer> {
        self.tabs.get(path).and_then(Tab::edit_buffer)
    }

    pub fn edit_buffer_mut(&mut self, path: &Path) -> Option<&mut EditBuffer> {
        self.tabs.get_mut(path).and_then(Tab::edit_buffer_mut)
    }

    // Split view

    /// Show two distinct documents side by side
    pub fn compare(
        &mut self,
        left: impl Into<PathBuf>,
        right: impl Into<PathBuf>,
    ) -> SessionResult<ActiveView> {
        let split = SplitView::new(left.into(), right.into())?;

        if let Some(tab) = self.tabs.iter().find(|t| t.mode() == ViewMode::Edit) {
            return Err(SessionError::EditModeActive {
                path: tab.path.clone(),
            });
        }

        for path in [split.left(), split.right()] {
            self.documents
                .entry(path.to_path_buf())
                .or_insert_with(|| Document::new(path.to_path_buf()));
        }
        log::info!(
            "Comparing {} with {}",
            split.left().display(),
            split.right().display()
        );

        if let Some(previous) = self.split.replace(split) {
            self.evict_if_unreferenced(previous.left());
            self.evict_if_unreferenced(previous.right());
        }
        Ok(self.active_view())
    }

    /// Leave split view, showing whichever tab was active before
    pub fn exit_split_view(&mut self) -> ActiveView {
        self.leave_split();
        self.active_view()
    }

    fn leave_split(&mut self) {
        if let Some(split) = self.split.take() {
            log::debug!("Leaving split view");
            self.evict_if_unreferenced(split.left());
            self.evict_if_unreferenced(split.right());
        }
    }

    // Presentation settings

    pub fn toggle_theme(&mut self) -> ActiveView {
        self.set_theme(self.settings.theme.toggled())
    }

    pub fn set_theme(&mut self, theme: ThemeMode) -> ActiveView {
        self.apply_settings(self.settings.with_theme(theme))
    }

    pub fn increase_font_size(&mut self) -> ActiveView {
        self.set_font_size(self.current_font_size_pt().saturating_add(1))
    }

    pub fn decrease_font_size(&mut self) -> ActiveView {
        let current = self.current_font_size_pt();
        if current <= MIN_FONT_SIZE_PT {
            return self.active_view();
        }
        self.set_font_size(current - 1)
    }

    /// Set the font size of whatever is showing.
    ///
    /// While the active tab is being edited only the editor font changes;
    /// preview settings and cached renders are left alone. Entering edit
    /// mode starts the editor at the current preview size.
    pub fn set_font_size(&mut self, font_size_pt: u32) -> ActiveView {
        let font_size_pt = font_size_pt.max(MIN_FONT_SIZE_PT);

        if self.editing_active() {
            if self.editor_font_size_pt != font_size_pt {
                log::debug!("Editor font size {}pt", font_size_pt);
                self.editor_font_size_pt = font_size_pt;
            }
            return self.active_view();
        }

        self.apply_settings(self.settings.with_font_size(font_size_pt))
    }

    fn apply_settings(&mut self, settings: PresentationSettings) -> ActiveView {
        if settings != self.settings {
            self.settings = settings;
            self.generation += 1;
            self.cache.purge_stale(self.generation);
            log::info!(
                "Presentation changed: {:?}, {}pt",
                settings.theme,
                settings.font_size_pt
            );
        }
        self.active_view()
    }

    /// Font size the size controls currently act on
    pub fn current_font_size_pt(&self) -> u32 {
        if self.editing_active() {
            self.editor_font_size_pt
        } else {
            self.settings.font_size_pt
        }
    }

    fn editing_active(&self) -> bool {
        self.split.is_none()
            && self
                .tabs
                .active_tab()
                .map_or(false, |tab| tab.mode() == ViewMode::Edit)
    }

    // Views

    /// Resolve what is currently showing, rendering through the cache
    pub fn active_view(&mut self) -> ActiveView {
        if let Some(split) = &self.split {
            let left = split.left().to_path_buf();
            let right = split.right().to_path_buf();
            let left_html = self.rendered_html(&left);
            let right_html = self.rendered_html(&right);
            return ActiveView::Split {
                left: SplitPane {
                    path: left,
                    html: left_html,
                },
                right: SplitPane {
                    path: right,
                    html: right_html,
                },
            };
        }

        let Some(tab) = self.tabs.active_tab() else {
            return ActiveView::Empty;
        };
        let path = tab.path.clone();
        let content = match tab.edit_buffer().map(EditBuffer::text) {
            Some(text) => TabContent::Edit(text),
            None => TabContent::Preview(self.rendered_html(&path)),
        };
        ActiveView::Tab { path, content }
    }

    fn rendered_html(&mut self, path: &Path) -> Arc<str> {
        let settings = self.settings;
        let generation = self.generation;
        let documents = &mut self.documents;
        let storage = self.storage.as_ref();
        let pipeline = &self.pipeline;

        self.cache
            .get_or_render(path, generation, &settings, move || {
                let document = documents
                    .entry(path.to_path_buf())
                    .or_insert_with(|| Document::new(path.to_path_buf()));
                let source = document.load(storage).map_err(PipelineError::from);
                pipeline.render_source(source, &settings)
            })
    }

    fn open_tab(&mut self, path: PathBuf) {
        if self.tabs.set_active(&path) {
            log::debug!("{} already open", path.display());
            return;
        }

        let title = self
            .documents
            .entry(path.clone())
            .or_insert_with(|| Document::new(path.clone()))
            .display_name
            .clone();
        log::info!("Opened {}", path.display());
        self.tabs.add_tab(path, title);
    }

    fn evict_if_unreferenced(&mut self, path: &Path) {
        let in_split = self.split.as_ref().map_or(false, |s| s.contains(path));
        if !in_split && !self.tabs.contains(path) && self.documents.remove(path).is_some() {
            log::debug!("Evicted {}", path.display());
        }
    }

    // Persistence

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            open_files: self.tabs.paths(),
            active_file_index: self.tabs.active_index,
            theme: self.settings.theme,
            font_size_pt: self.settings.font_size_pt,
            last_directory: self.last_directory.clone(),
            recent_files: self.recent.entries().to_vec(),
            version: SNAPSHOT_VERSION,
        }
    }

    /// Reopen the snapshot's documents in order and reselect the active one
    pub fn restore(&mut self, snapshot: SessionSnapshot) -> ActiveView {
        self.leave_split();
        self.apply_settings(PresentationSettings::new(
            snapshot.theme,
            snapshot.font_size_pt,
        ));

        for path in &snapshot.open_files {
            self.open_tab(path.clone());
        }
        if let Some(active) = snapshot.active_file() {
            self.tabs.set_active(active);
        }

        log::info!("Restored {} documents", snapshot.open_files.len());
        self.recent = RecentFiles::new(snapshot.recent_files);
        self.last_directory = snapshot.last_directory;
        self.active_view()
    }

    // Accessors

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs.tabs
    }

    pub fn active_path(&self) -> Option<&Path> {
        self.tabs.active_path()
    }

    pub fn split_view(&self) -> Option<&SplitView> {
        self.split.as_ref()
    }

    pub fn is_split_active(&self) -> bool {
        self.split.is_some()
    }

    pub fn document(&self, path: &Path) -> Option<&Document> {
        self.documents.get(path)
    }

    pub fn settings(&self) -> PresentationSettings {
        self.settings
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn editor_font_size_pt(&self) -> u32 {
        self.editor_font_size_pt
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn is_cached(&self, path: &Path) -> bool {
        self.cache.contains(path, self.generation)
    }

    pub fn recent_files(&self) -> &[RecentFile] {
        self.recent.entries()
    }

    pub fn last_directory(&self) -> Option<&Path> {
        self.last_directory.as_deref()
    }

    pub fn set_last_directory(&mut self, dir: impl Into<PathBuf>) {
        self.last_directory = Some(dir.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DiagramError, DiagramResult};
    use crate::file_handler::MemoryStorage;
    use crate::markdown::{CommonMarkConverter, DiagramFence, MarkupConverter};
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Converter that counts pipeline invocations
    struct CountingConverter(Arc<AtomicUsize>);

    impl MarkupConverter for CountingConverter {
        fn convert(&self, text: &str) -> String {
            self.0.fetch_add(1, Ordering::SeqCst);
            CommonMarkConverter::new().convert(text)
        }
    }

    struct Fixture {
        session: Session,
        storage: Rc<MemoryStorage>,
        renders: Arc<AtomicUsize>,
    }

    impl Fixture {
        fn new() -> Self {
            let storage = Rc::new(MemoryStorage::new());
            storage.insert("/docs/a.md", "# Alpha\n\nFirst document.\n");
            storage.insert("/docs/b.md", "# Beta\n\nSecond document.\n");
            storage.insert("/docs/notes.md", "# Notes\n\nRemember the milk.\n");

            let renders = Arc::new(AtomicUsize::new(0));
            let pipeline = RenderPipeline::new(
                |_: &str| -> DiagramResult<Vec<u8>> {
                    Err(DiagramError::Failed("renderer unavailable".to_string()))
                },
                CountingConverter(Arc::clone(&renders)),
                DiagramFence::new(&["mermaid"]).unwrap(),
            );
            let session = Session::new(
                Rc::clone(&storage),
                pipeline,
                PresentationSettings::default(),
            );

            Self {
                session,
                storage,
                renders,
            }
        }

        fn renders(&self) -> usize {
            self.renders.load(Ordering::SeqCst)
        }
    }

    fn a() -> &'static Path {
        Path::new("/docs/a.md")
    }

    fn b() -> &'static Path {
        Path::new("/docs/b.md")
    }

    fn html(view: &ActiveView) -> String {
        view.preview_html().expect("preview").to_string()
    }

    #[test]
    fn test_open_same_path_twice_keeps_one_tab() {
        let mut f = Fixture::new();
        f.session.open(a());
        f.session.open(b());
        let view = f.session.open(a());

        assert_eq!(f.session.tabs().len(), 2);
        assert_eq!(f.session.active_path(), Some(a()));
        assert!(html(&view).contains("<h1>Alpha</h1>"));
    }

    #[test]
    fn test_open_starts_in_preview_and_appends() {
        let mut f = Fixture::new();
        f.session.open(a());
        f.session.open(b());

        let tabs = f.session.tabs();
        assert_eq!(tabs[0].path, a());
        assert_eq!(tabs[1].path, b());
        assert!(tabs.iter().all(|t| t.mode() == ViewMode::Preview));
        assert_eq!(tabs[1].title, "b.md");
    }

    #[test]
    fn test_repeated_lookups_render_once() {
        let mut f = Fixture::new();
        let first = f.session.open(a());
        let second = f.session.active_view();
        f.session.open(a());

        assert_eq!(f.renders(), 1);
        assert_eq!(first, second);
        assert_eq!(f.storage.read_count(a()), 1);
        assert_eq!(f.session.cache_stats().misses, 1);
        assert_eq!(f.session.cache_stats().hits, 2);
    }

    #[test]
    fn test_theme_toggle_flushes_every_entry() {
        let mut f = Fixture::new();
        let light = html(&f.session.open(a()));
        f.session.open(b());
        assert_eq!(f.renders(), 2);

        f.session.toggle_theme();
        assert_eq!(f.renders(), 3);
        assert!(!f.session.is_cached(a()));

        let dark = html(&f.session.select_tab(a()).unwrap());
        assert_eq!(f.renders(), 4);
        assert_ne!(light, dark);
        assert_eq!(f.session.settings().theme, ThemeMode::Dark);
    }

    #[test]
    fn test_font_size_change_flushes() {
        let mut f = Fixture::new();
        f.session.open(a());
        let generation = f.session.generation();

        f.session.increase_font_size();
        assert_eq!(f.session.settings().font_size_pt, 13);
        assert_eq!(f.session.generation(), generation + 1);
        assert_eq!(f.renders(), 2);
    }

    #[test]
    fn test_noop_settings_change_keeps_cache() {
        let mut f = Fixture::new();
        f.session.open(a());

        f.session.set_theme(ThemeMode::Light);
        f.session.set_font_size(12);
        assert_eq!(f.session.generation(), 0);
        assert_eq!(f.renders(), 1);
    }

    #[test]
    fn test_font_size_floor() {
        let mut f = Fixture::new();
        f.session.set_font_size(2);
        assert_eq!(f.session.settings().font_size_pt, MIN_FONT_SIZE_PT);

        let generation = f.session.generation();
        f.session.decrease_font_size();
        assert_eq!(f.session.settings().font_size_pt, MIN_FONT_SIZE_PT);
        assert_eq!(f.session.generation(), generation);
    }

    #[test]
    fn test_font_size_in_edit_mode_only_changes_editor() {
        let mut f = Fixture::new();
        f.session.open(a());
        f.session.toggle_edit_mode(a()).unwrap();

        f.session.increase_font_size();
        f.session.increase_font_size();
        assert_eq!(f.session.editor_font_size_pt(), 14);
        assert_eq!(f.session.settings().font_size_pt, 12);
        assert_eq!(f.session.generation(), 0);
        assert!(f.session.is_cached(a()));
    }

    #[test]
    fn test_save_invalidates_only_saved_document() {
        let mut f = Fixture::new();
        let b_before = match f.session.open(b()) {
            ActiveView::Tab {
                content: TabContent::Preview(html),
                ..
            } => html,
            other => panic!("unexpected view {:?}", other),
        };
        f.session.open(a());
        f.session.toggle_edit_mode(a()).unwrap();
        f.session
            .edit_buffer_mut(a())
            .unwrap()
            .push_str("\nAdded line.\n");

        let view = f.session.save(a()).unwrap();
        assert!(html(&view).contains("Added line."));
        assert!(f.storage.contents(a()).unwrap().ends_with("Added line.\n"));
        assert_eq!(f.session.tabs()[1].mode(), ViewMode::Preview);

        let renders = f.renders();
        let b_after = match f.session.select_tab(b()).unwrap() {
            ActiveView::Tab {
                content: TabContent::Preview(html),
                ..
            } => html,
            other => panic!("unexpected view {:?}", other),
        };
        assert_eq!(f.renders(), renders);
        assert!(Arc::ptr_eq(&b_before, &b_after));
    }

    #[test]
    fn test_save_updates_raw_text_without_rereading() {
        let mut f = Fixture::new();
        f.session.open(a());
        f.session.toggle_edit_mode(a()).unwrap();
        f.session.edit_buffer_mut(a()).unwrap().set_text("# Replaced\n");
        f.session.save(a()).unwrap();

        assert_eq!(
            f.session.document(a()).unwrap().raw_text(),
            Some("# Replaced\n")
        );
        assert_eq!(f.storage.read_count(a()), 1);
    }

    #[test]
    fn test_save_failure_keeps_edit_buffer() {
        let mut f = Fixture::new();
        f.session.open(a());
        f.session.toggle_edit_mode(a()).unwrap();
        f.session.edit_buffer_mut(a()).unwrap().push_str("draft");
        f.storage.set_fail_writes(true);

        let err = f.session.save(a()).unwrap_err();
        assert!(matches!(err, SessionError::Storage(_)));
        assert_eq!(f.session.tabs()[0].mode(), ViewMode::Edit);
        assert!(f.session.edit_buffer(a()).unwrap().text().ends_with("draft"));
        assert_eq!(
            f.storage.contents(a()).as_deref(),
            Some("# Alpha\n\nFirst document.\n")
        );
        assert!(f.session.is_cached(a()));
    }

    #[test]
    fn test_cancel_leaves_disk_and_render_untouched() {
        let mut f = Fixture::new();
        let notes = Path::new("/docs/notes.md");
        let before = html(&f.session.open(notes));

        f.session.toggle_edit_mode(notes).unwrap();
        f.session
            .edit_buffer_mut(notes)
            .unwrap()
            .push_str("typing something new");
        let after = html(&f.session.cancel(notes).unwrap());

        assert_eq!(before, after);
        assert_eq!(
            f.storage.contents(notes).as_deref(),
            Some("# Notes\n\nRemember the milk.\n")
        );
        assert_eq!(f.renders(), 1);
    }

    #[test]
    fn test_edit_view_shows_buffer_text() {
        let mut f = Fixture::new();
        f.session.open(a());

        let view = f.session.toggle_edit_mode(a()).unwrap();
        assert_eq!(
            view,
            ActiveView::Tab {
                path: a().to_path_buf(),
                content: TabContent::Edit("# Alpha\n\nFirst document.\n".to_string()),
            }
        );
    }

    #[test]
    fn test_toggle_back_requires_clean_buffer() {
        let mut f = Fixture::new();
        f.session.open(a());
        f.session.toggle_edit_mode(a()).unwrap();
        f.session.edit_buffer_mut(a()).unwrap().push_str("x");

        let err = f.session.toggle_edit_mode(a()).unwrap_err();
        assert!(matches!(err, SessionError::UnsavedEdits { .. }));
        assert!(f.session.edit_buffer(a()).unwrap().text().ends_with('x'));

        f.session.cancel(a()).unwrap();
        f.session.toggle_edit_mode(a()).unwrap();
        let view = f.session.toggle_edit_mode(a()).unwrap();
        assert!(view.preview_html().is_some());
    }

    #[test]
    fn test_toggle_edit_mode_only_on_active_tab() {
        let mut f = Fixture::new();
        f.session.open(a());
        f.session.open(b());

        assert!(matches!(
            f.session.toggle_edit_mode(a()),
            Err(SessionError::NotActiveTab { .. })
        ));
        assert!(matches!(
            f.session.toggle_edit_mode(Path::new("/docs/missing.md")),
            Err(SessionError::TabNotFound { .. })
        ));
        assert!(matches!(
            f.session.save(b()),
            Err(SessionError::NotEditing { .. })
        ));
    }

    #[test]
    fn test_select_edit_tab_keeps_unsaved_buffer() {
        let mut f = Fixture::new();
        f.session.open(a());
        f.session.toggle_edit_mode(a()).unwrap();
        f.session.edit_buffer_mut(a()).unwrap().push_str(" draft");

        f.session.open(b());
        let view = f.session.select_tab(a()).unwrap();
        assert_eq!(
            view,
            ActiveView::Tab {
                path: a().to_path_buf(),
                content: TabContent::Edit("# Alpha\n\nFirst document.\n draft".to_string()),
            }
        );
        assert!(f.session.tabs()[0].has_unsaved_edits());
    }

    #[test]
    fn test_editor_font_starts_at_preview_size() {
        let mut f = Fixture::new();
        f.session.open(a());
        f.session.increase_font_size();
        f.session.increase_font_size();

        f.session.toggle_edit_mode(a()).unwrap();
        assert_eq!(f.session.editor_font_size_pt(), 14);
        assert_eq!(f.session.current_font_size_pt(), 14);

        f.session.decrease_font_size();
        assert_eq!(f.session.editor_font_size_pt(), 13);
        assert_eq!(f.session.settings().font_size_pt, 14);
    }

    #[test]
    fn test_compare_rejected_while_background_tab_edits() {
        let mut f = Fixture::new();
        f.session.open(a());
        f.session.toggle_edit_mode(a()).unwrap();
        f.session.edit_buffer_mut(a()).unwrap().push_str("draft");
        f.session.open(b());

        let err = f.session.compare(b(), "/docs/notes.md").unwrap_err();
        assert!(matches!(err, SessionError::EditModeActive { ref path } if path == a()));
        assert!(!f.session.is_split_active());
        assert_eq!(f.session.tabs()[0].mode(), ViewMode::Edit);
    }

    #[test]
    fn test_compare_same_document_rejected() {
        let mut f = Fixture::new();
        f.session.open(a());

        let err = f.session.compare(a(), a()).unwrap_err();
        assert!(matches!(err, SessionError::SameDocument { .. }));
        assert!(!f.session.is_split_active());
    }

    #[test]
    fn test_exit_split_restores_prior_tab() {
        let mut f = Fixture::new();
        f.session.open(a());
        f.session.open(b());
        f.session.select_tab(a()).unwrap();

        let view = f.session.compare(b(), "/docs/notes.md").unwrap();
        match view {
            ActiveView::Split { left, right } => {
                assert_eq!(left.path, b());
                assert!(left.html.contains("<h1>Beta</h1>"));
                assert!(right.html.contains("<h1>Notes</h1>"));
            }
            other => panic!("unexpected view {:?}", other),
        }

        let view = f.session.exit_split_view();
        assert_eq!(f.session.active_path(), Some(a()));
        assert!(html(&view).contains("<h1>Alpha</h1>"));
        assert!(f.session.document(Path::new("/docs/notes.md")).is_none());
    }

    #[test]
    fn test_exit_split_without_tabs_is_empty() {
        let mut f = Fixture::new();
        f.session.compare(a(), b()).unwrap();
        assert!(f.session.exit_split_view().is_empty());
    }

    #[test]
    fn test_split_and_edit_are_exclusive() {
        let mut f = Fixture::new();
        f.session.open(a());
        f.session.toggle_edit_mode(a()).unwrap();
        assert!(matches!(
            f.session.compare(a(), b()),
            Err(SessionError::EditModeActive { .. })
        ));

        f.session.cancel(a()).unwrap();
        f.session.compare(a(), b()).unwrap();
        assert!(matches!(
            f.session.toggle_edit_mode(a()),
            Err(SessionError::SplitViewActive)
        ));
    }

    #[test]
    fn test_open_leaves_split_view() {
        let mut f = Fixture::new();
        f.session.compare(a(), b()).unwrap();

        let view = f.session.open("/docs/notes.md");
        assert!(!f.session.is_split_active());
        assert!(html(&view).contains("<h1>Notes</h1>"));
    }

    #[test]
    fn test_split_shares_presentation_settings() {
        let mut f = Fixture::new();
        f.session.compare(a(), b()).unwrap();

        match f.session.toggle_theme() {
            ActiveView::Split { left, right } => {
                assert!(left.html.contains("#0d1117"));
                assert!(right.html.contains("#0d1117"));
                assert_eq!(f.renders(), 4);
            }
            other => panic!("unexpected view {:?}", other),
        }
    }

    #[test]
    fn test_closing_last_tab_keeps_split_view() {
        let mut f = Fixture::new();
        f.session.open(a());
        f.session.compare(a(), b()).unwrap();

        let view = f.session.close(a()).unwrap();
        assert!(matches!(view, ActiveView::Split { .. }));
        assert!(f.session.tabs().is_empty());
        assert!(f.session.document(a()).is_some());
    }

    #[test]
    fn test_close_only_tab_then_reopen_is_fresh() {
        let mut f = Fixture::new();
        f.session.open(a());
        f.session.toggle_edit_mode(a()).unwrap();
        f.session.edit_buffer_mut(a()).unwrap().push_str("unsaved");

        let view = f.session.close(a()).unwrap();
        assert!(view.is_empty());
        assert_eq!(f.session.active_path(), None);
        assert!(!f.session.is_cached(a()));
        assert!(f.session.document(a()).is_none());

        f.storage.insert(a(), "# Alpha v2\n");
        let view = f.session.open(a());
        assert_eq!(f.session.tabs()[0].mode(), ViewMode::Preview);
        assert!(html(&view).contains("<h1>Alpha v2</h1>"));
        assert_eq!(f.storage.read_count(a()), 2);
    }

    #[test]
    fn test_close_active_selects_neighbour() {
        let mut f = Fixture::new();
        f.session.open(a());
        f.session.open(b());
        f.session.open("/docs/notes.md");
        f.session.select_tab(b()).unwrap();

        f.session.close(b()).unwrap();
        assert_eq!(f.session.active_path(), Some(Path::new("/docs/notes.md")));

        f.session.close(Path::new("/docs/notes.md")).unwrap();
        assert_eq!(f.session.active_path(), Some(a()));
        assert!(matches!(
            f.session.close(b()),
            Err(SessionError::TabNotFound { .. })
        ));
    }

    #[test]
    fn test_open_failure_shows_error_document() {
        let mut f = Fixture::new();
        let missing = Path::new("/docs/missing.md");

        let view = f.session.open(missing);
        let html = html(&view);
        assert_eq!(f.session.tabs().len(), 1);
        assert!(html.contains("<h1>Error</h1>"));
        assert!(html.contains("Failed to render file: File not found: /docs/missing.md"));

        assert!(matches!(
            f.session.toggle_edit_mode(missing),
            Err(SessionError::Storage(_))
        ));
        assert_eq!(f.session.tabs()[0].mode(), ViewMode::Preview);
    }

    #[test]
    fn test_failing_diagram_document() {
        let mut f = Fixture::new();
        f.storage.insert(
            "/docs/readme.md",
            "Intro paragraph.\n\n```mermaid\ngraph TD\n  A-->B\n```\n\nClosing paragraph.\n",
        );

        let html = html(&f.session.open("/docs/readme.md"));
        assert!(html.contains("Intro paragraph."));
        assert!(html.contains("Closing paragraph."));
        assert!(html.contains("Diagram rendering failed: renderer unavailable"));
    }

    #[test]
    fn test_tab_cycling() {
        let mut f = Fixture::new();
        f.session.open(a());
        f.session.open(b());

        f.session.next_tab();
        assert_eq!(f.session.active_path(), Some(a()));
        f.session.prev_tab();
        assert_eq!(f.session.active_path(), Some(b()));
    }

    #[test]
    fn test_snapshot_and_restore() {
        let mut f = Fixture::new();
        f.session.open(a());
        f.session.open(b());
        f.session.select_tab(a()).unwrap();
        f.session.toggle_theme();
        f.session.set_last_directory("/docs");

        let snapshot = f.session.snapshot();
        assert_eq!(snapshot.open_files, vec![a().to_path_buf(), b().to_path_buf()]);
        assert_eq!(snapshot.active_file(), Some(a()));
        assert_eq!(snapshot.recent_files[0].path, b());

        let mut restored = Fixture::new();
        let view = restored.session.restore(snapshot);
        assert_eq!(restored.session.tabs().len(), 2);
        assert_eq!(restored.session.active_path(), Some(a()));
        assert_eq!(restored.session.settings().theme, ThemeMode::Dark);
        assert_eq!(restored.session.last_directory(), Some(Path::new("/docs")));
        assert_eq!(restored.session.recent_files().len(), 2);
        assert!(html(&view).contains("<h1>Alpha</h1>"));
        assert_eq!(restored.storage.read_count(b()), 0);
    }

    #[test]
    fn test_from_config() {
        let session = Session::from_config(&Config::default()).unwrap();
        assert_eq!(session.settings(), PresentationSettings::default());
        assert!(session.tabs().is_empty());
    }
}
