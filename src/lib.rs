pub mod app_state_container;
pub mod config;
pub mod data;
pub mod debouncer;
pub mod editor;
pub mod logging;
pub mod markup;
pub mod search_filter;

pub use app_state_container::AppStateContainer;
pub use data::data_view::{derive_view, MatrixView, SortOrder, ViewState, PAGE_SIZES};
pub use data::matrix::{LanguageEntry, MatrixStore, TranslationMatrix};
