use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;
use tracing::debug;

use crate::data::matrix::TranslationMatrix;
use crate::markup::rendered_text;
use crate::search_filter::SearchFilter;

/// Page sizes the pagination control offers
pub const PAGE_SIZES: [usize; 4] = [25, 50, 100, 200];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Represents how rows should be sorted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub column_index: usize,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    /// 1-based
    pub number: usize,
    pub size: usize,
}

/// Everything the user controls about what is on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub search_term: String,
    pub is_search_active: bool,
    pub sort: Option<SortConfig>,
    pub collapsed_columns: BTreeSet<usize>,
    pub page: PageSpec,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(PAGE_SIZES[0])
    }
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        let size = if PAGE_SIZES.contains(&page_size) {
            page_size
        } else {
            PAGE_SIZES[0]
        };
        Self {
            search_term: String::new(),
            is_search_active: false,
            sort: None,
            collapsed_columns: BTreeSet::new(),
            page: PageSpec { number: 1, size },
        }
    }

    /// Apply a search term. Returns false if nothing changed.
    ///
    /// Activating search drops the sort; any change goes back to page 1.
    pub fn set_search(&mut self, term: &str) -> bool {
        let active = !term.trim().is_empty();
        if term == self.search_term && active == self.is_search_active {
            return false;
        }

        if active && !self.is_search_active {
            self.sort = None;
        }
        self.search_term = term.to_string();
        self.is_search_active = active;
        self.page.number = 1;
        true
    }

    /// Another column starts ascending; the same column goes
    /// ascending -> descending -> unsorted
    pub fn toggle_sort(&mut self, column_index: usize) {
        self.sort = match self.sort {
            Some(SortConfig {
                column_index: current,
                order: SortOrder::Ascending,
            }) if current == column_index => Some(SortConfig {
                column_index,
                order: SortOrder::Descending,
            }),
            Some(SortConfig {
                column_index: current,
                order: SortOrder::Descending,
            }) if current == column_index => None,
            _ => Some(SortConfig {
                column_index,
                order: SortOrder::Ascending,
            }),
        };
    }

    /// Returns whether the column is now collapsed
    pub fn toggle_collapse(&mut self, column_index: usize) -> bool {
        if self.collapsed_columns.remove(&column_index) {
            false
        } else {
            self.collapsed_columns.insert(column_index);
            true
        }
    }

    pub fn set_page_size(&mut self, size: usize) -> bool {
        if !PAGE_SIZES.contains(&size) || size == self.page.size {
            return false;
        }
        self.page.size = size;
        self.page.number = 1;
        true
    }

    /// Move to a page; anything outside `1..=total_pages` is refused
    pub fn set_page(&mut self, number: usize, total_pages: usize) -> bool {
        if number < 1 || number > total_pages {
            return false;
        }
        self.page.number = number;
        true
    }

    /// Pull the page back inside `1..=total_pages` after the row count
    /// shrank. Returns whether the page moved.
    pub fn clamp_page(&mut self, total_pages: usize) -> bool {
        let last = total_pages.max(1);
        if (1..=last).contains(&self.page.number) {
            return false;
        }
        self.page.number = self.page.number.clamp(1, last);
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewColumn {
    pub column_index: usize,
    pub code: String,
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewCell {
    pub column_index: usize,
    pub value: String,
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewRow {
    pub key: String,
    pub cells: Vec<ViewCell>,
}

/// One page of the matrix, ready to paint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixView {
    pub columns: Vec<ViewColumn>,
    pub rows: Vec<ViewRow>,
    pub total_rows: usize,
    pub total_pages: usize,
    pub page_number: usize,
    pub page_size: usize,
}

impl MatrixView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.key.as_str()).collect()
    }

    /// "Showing 26-50 of 120 entries", or "No entries"
    pub fn pagination_info(&self) -> String {
        if self.rows.is_empty() {
            return "No entries".to_string();
        }
        let start = self.page_number.saturating_sub(1) * self.page_size + 1;
        let end = start + self.rows.len() - 1;
        format!("Showing {}-{} of {} entries", start, end, self.total_rows)
    }
}

/// Stage 1: the filtered projection, or the working matrix itself
pub fn project<'a>(working: &'a TranslationMatrix, state: &ViewState) -> Cow<'a, TranslationMatrix> {
    if state.is_search_active {
        Cow::Owned(SearchFilter::filter_matrix(working, &state.search_term))
    } else {
        Cow::Borrowed(working)
    }
}

/// Stage 3: order keys by the rendered text of the working value in the
/// sort column. Stable, so ties keep their prior order in both directions.
pub fn sort_keys(keys: Vec<String>, working: &TranslationMatrix, sort: &SortConfig) -> Vec<String> {
    let mut decorated: Vec<(String, String)> = keys
        .into_iter()
        .map(|key| {
            let text = working
                .value(sort.column_index, &key)
                .map(rendered_text)
                .unwrap_or_default()
                .to_lowercase();
            (text, key)
        })
        .collect();

    match sort.order {
        SortOrder::Ascending => decorated.sort_by(|a, b| a.0.cmp(&b.0)),
        SortOrder::Descending => decorated.sort_by(|a, b| b.0.cmp(&a.0)),
    }

    decorated.into_iter().map(|(_, key)| key).collect()
}

/// Run the whole pipeline: filter, enumerate, sort, paginate, render.
///
/// Cells always come from `working`, one per language, so a column index
/// names the same language whatever is filtered or collapsed.
pub fn derive_view(working: &TranslationMatrix, state: &ViewState) -> MatrixView {
    let projection = project(working, state);
    let mut keys = projection.all_keys();

    if let Some(sort) = &state.sort {
        keys = sort_keys(keys, working, sort);
    }

    let total_rows = keys.len();
    let page_size = state.page.size.max(1);
    let total_pages = (total_rows + page_size - 1) / page_size;

    let page_number = state.page.number.max(1);
    let start = (page_number - 1) * page_size;
    let rows: Vec<ViewRow> = keys
        .iter()
        .skip(start)
        .take(page_size)
        .map(|key| ViewRow {
            key: key.clone(),
            cells: working
                .entries()
                .iter()
                .enumerate()
                .map(|(column_index, entry)| ViewCell {
                    column_index,
                    value: entry.get(key).unwrap_or_default().to_string(),
                    collapsed: state.collapsed_columns.contains(&column_index),
                })
                .collect(),
        })
        .collect();

    let columns = working
        .entries()
        .iter()
        .enumerate()
        .map(|(column_index, entry)| ViewColumn {
            column_index,
            code: entry.code.clone(),
            collapsed: state.collapsed_columns.contains(&column_index),
        })
        .collect();

    debug!(
        target: "view",
        "Derived page {}/{} ({} of {} rows)",
        page_number,
        total_pages,
        rows.len(),
        total_rows
    );

    MatrixView {
        columns,
        rows,
        total_rows,
        total_pages,
        page_number,
        page_size,
    }
}
