//! Application state container
//!
//! Owns the matrix store, the view state, the edit session, the editing
//! surface and the search debouncer. Every user intent from the rendering
//! layer comes through here, so the ordering rules between them (an open
//! edit is cancelled before a search, page move or discard) live in one
//! place.

use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::Config;
use crate::data::data_view::{derive_view, project, MatrixView, ViewState};
use crate::data::matrix::{LanguageEntry, MatrixStore, TranslationMatrix};
use crate::debouncer::{Debouncer, PendingSearch};
use crate::editor::session::{EditContext, EditSession};
use crate::editor::surface::{EditingSurface, NormalizingSurface};
use crate::{trace_edit, trace_view};

pub struct AppStateContainer<S: EditingSurface = NormalizingSurface> {
    store: MatrixStore,
    view_state: ViewState,
    session: EditSession,
    surface: S,
    debouncer: Debouncer,
    has_unsaved_changes: bool,
}

impl AppStateContainer<NormalizingSurface> {
    /// Container backed by the built-in normalizing surface
    pub fn with_config(config: &Config) -> Self {
        let surface = NormalizingSurface::new(config.editor.tag_profile());
        Self::new(config, surface)
    }
}

impl Default for AppStateContainer<NormalizingSurface> {
    fn default() -> Self {
        Self::with_config(&Config::default())
    }
}

impl<S: EditingSurface> AppStateContainer<S> {
    pub fn new(config: &Config, surface: S) -> Self {
        Self {
            store: MatrixStore::new(),
            view_state: ViewState::new(config.view.default_page_size),
            session: EditSession::new(config.editor.tag_profile()),
            surface,
            debouncer: Debouncer::new(config.search.debounce_ms),
            has_unsaved_changes: false,
        }
    }

    /// Take the host dataset. Empty input leaves the container inert.
    pub fn load(&mut self, original: Vec<LanguageEntry>) -> bool {
        self.store.load(original)
    }

    pub fn load_json(&mut self, json: &str) -> Result<bool> {
        let matrix = TranslationMatrix::from_json(json)?;
        Ok(self.load(matrix.entries().to_vec()))
    }

    pub fn is_loaded(&self) -> bool {
        self.store.is_loaded()
    }

    /// The edited dataset, for the host to read back
    pub fn working(&self) -> &TranslationMatrix {
        self.store.working()
    }

    pub fn original(&self) -> &TranslationMatrix {
        self.store.original()
    }

    pub fn export_json(&self) -> Result<String> {
        self.store.working().to_json()
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view_state
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    pub fn get_view(&self) -> MatrixView {
        derive_view(self.store.working(), &self.view_state)
    }

    pub fn total_pages(&self) -> usize {
        let total_rows = project(self.store.working(), &self.view_state)
            .all_keys()
            .len();
        let size = self.view_state.page.size.max(1);
        (total_rows + size - 1) / size
    }

    /// Column index of a language code, compared case-insensitively
    pub fn column_for_code(&self, code: &str) -> Option<usize> {
        self.store
            .working()
            .entries()
            .iter()
            .position(|entry| entry.code.eq_ignore_ascii_case(code))
    }

    fn has_column(&self, column_index: usize) -> bool {
        column_index < self.store.working().column_count()
    }

    // --- Editing ---

    pub fn is_editing(&self) -> bool {
        self.session.is_editing()
    }

    pub fn edit_context(&self) -> Option<&EditContext> {
        self.session.context()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The surface the user types into while an edit is open
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Open a cell for editing. Refused while another cell is open.
    pub fn open_edit(&mut self, key: &str, column_index: usize) -> bool {
        if !self.has_column(column_index) {
            return false;
        }
        let current = self
            .store
            .working()
            .value(column_index, key)
            .unwrap_or_default()
            .to_string();
        let opened = self
            .session
            .open(key, column_index, &current, &mut self.surface);
        if opened {
            trace_edit!("Open", column_index, key);
        }
        opened
    }

    /// Commit the open edit into the working matrix
    pub fn save_edit(&mut self) -> bool {
        let Some(saved) = self.session.save(&mut self.surface) else {
            return false;
        };
        self.store
            .set_value(saved.column_index, &saved.key, saved.value);
        self.has_unsaved_changes = true;
        trace_edit!("Save", saved.column_index, saved.key);
        self.revalidate_page();
        true
    }

    pub fn cancel_edit(&mut self) -> bool {
        self.session.cancel(&mut self.surface)
    }

    pub fn toggle_markup_preview(&mut self) -> bool {
        self.session.toggle_markup_preview(&mut self.surface)
    }

    pub fn set_raw_text(&mut self, text: &str) -> bool {
        self.session.set_raw_text(text)
    }

    /// A competing state change never commits an open edit
    fn abandon_edit(&mut self) {
        if self.session.cancel(&mut self.surface) {
            debug!(target: "edit", "Open edit cancelled by a view change");
        }
    }

    /// Throw away every saved edit and any open one
    pub fn discard_all(&mut self) {
        self.abandon_edit();
        self.store.discard();
        self.has_unsaved_changes = false;
        trace_view!("discard all");
        self.revalidate_page();
    }

    /// A save or discard can change how many rows match the search; keep
    /// the current page inside the new range
    fn revalidate_page(&mut self) {
        let total_pages = self.total_pages();
        if self.view_state.clamp_page(total_pages) {
            debug!(
                target: "view",
                "Page moved to {} of {} after the rows changed",
                self.view_state.page.number,
                total_pages
            );
        }
    }

    // --- View ---

    pub fn toggle_sort(&mut self, column_index: usize) -> bool {
        if !self.has_column(column_index) {
            return false;
        }
        self.view_state.toggle_sort(column_index);
        trace_view!(format!("sort {:?}", self.view_state.sort));
        true
    }

    pub fn toggle_collapse(&mut self, column_index: usize) -> bool {
        if !self.has_column(column_index) {
            return false;
        }
        let collapsed = self.view_state.toggle_collapse(column_index);
        trace_view!(format!("column {} collapsed={}", column_index, collapsed));
        true
    }

    /// Record a keystroke in the search box. The search itself runs from
    /// `poll_search` once typing has paused.
    pub fn set_search(&mut self, term: &str, now: Instant) -> PendingSearch {
        self.debouncer.trigger(term, now)
    }

    pub fn is_search_pending(&self, token: PendingSearch) -> bool {
        self.debouncer.is_current(token)
    }

    /// How long until the pending search is due, so the host can schedule
    /// its next `poll_search`. `None` when nothing is pending.
    pub fn search_due_in(&self, now: Instant) -> Option<Duration> {
        self.debouncer.time_remaining(now)
    }

    /// Run the pending search if its delay has elapsed
    pub fn poll_search(&mut self, now: Instant) -> bool {
        match self.debouncer.should_execute(now) {
            Some(term) => self.apply_search(&term),
            None => false,
        }
    }

    /// Apply a search term right away
    pub fn apply_search(&mut self, term: &str) -> bool {
        let active = !term.trim().is_empty();
        if term == self.view_state.search_term && active == self.view_state.is_search_active {
            return false;
        }
        self.abandon_edit();
        self.view_state.set_search(term);
        trace_view!(format!("search {:?}", term));
        true
    }

    pub fn set_page(&mut self, number: usize) -> bool {
        let total_pages = self.total_pages();
        if number < 1 || number > total_pages {
            debug!(target: "view", "Page {} outside 1..={}", number, total_pages);
            return false;
        }
        self.abandon_edit();
        self.view_state.set_page(number, total_pages)
    }

    pub fn set_page_size(&mut self, size: usize) -> bool {
        let mut next = self.view_state.clone();
        if !next.set_page_size(size) {
            return false;
        }
        self.abandon_edit();
        self.view_state = next;
        trace_view!(format!("page size {}", size));
        true
    }
}
