use trans_matrix::data::data_view::{derive_view, SortConfig, ViewState};
use trans_matrix::{LanguageEntry, SortOrder, TranslationMatrix};

fn greet_matrix() -> TranslationMatrix {
    TranslationMatrix::new(vec![
        LanguageEntry::new("en").with("greet", "hi"),
        LanguageEntry::new("hr").with("greet", "bok"),
    ])
}

fn numbered_matrix(count: usize) -> TranslationMatrix {
    let mut en = LanguageEntry::new("en");
    let mut de = LanguageEntry::new("de");
    for i in 0..count {
        en = en.with(format!("key{:03}", i), format!("value {}", i));
        if i % 2 == 0 {
            de = de.with(format!("key{:03}", i), format!("wert {}", i));
        }
    }
    TranslationMatrix::new(vec![en, de])
}

#[test]
fn test_search_keeps_every_column() {
    let working = greet_matrix();
    let mut state = ViewState::default();
    assert!(state.set_search("hi"));

    let view = derive_view(&working, &state);
    assert_eq!(view.keys(), vec!["greet"]);
    assert_eq!(view.columns.len(), 2);
    assert_eq!(view.columns[1].code, "hr");

    let cells = &view.rows[0].cells;
    assert_eq!(cells[0].value, "hi");
    // Column 1 is still hr, whatever the filter kept of it
    assert_eq!(cells[1].column_index, 1);
    assert_eq!(cells[1].value, "bok");

    assert!(state.set_search(""));
    let view = derive_view(&working, &state);
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].cells[1].value, "bok");
}

#[test]
fn test_missing_key_renders_empty_cell() {
    let working = TranslationMatrix::new(vec![
        LanguageEntry::new("en").with("greet", "hi").with("only_en", "x"),
        LanguageEntry::new("hr").with("greet", "bok"),
    ]);
    let view = derive_view(&working, &ViewState::default());
    let row = view.rows.iter().find(|r| r.key == "only_en").unwrap();
    assert_eq!(row.cells.len(), 2);
    assert_eq!(row.cells[1].value, "");
}

#[test]
fn test_column_stability_under_search() {
    let working = numbered_matrix(40);
    for term in ["value 1", "wert", "KEY00", "nothing-matches", "3"] {
        let mut state = ViewState::new(200);
        state.set_search(term);
        let view = derive_view(&working, &state);
        for row in &view.rows {
            for cell in &row.cells {
                let expected = working.value(cell.column_index, &row.key).unwrap_or_default();
                assert_eq!(cell.value, expected, "term {:?} key {}", term, row.key);
            }
        }
    }
}

#[test]
fn test_sort_scenario() {
    let working = TranslationMatrix::new(vec![LanguageEntry::new("en")
        .with("k1", "banana")
        .with("k2", "apple")]);
    let mut state = ViewState::default();
    state.toggle_sort(0);
    assert_eq!(derive_view(&working, &state).keys(), vec!["k2", "k1"]);

    state.toggle_sort(0);
    assert_eq!(
        state.sort,
        Some(SortConfig {
            column_index: 0,
            order: SortOrder::Descending
        })
    );
    assert_eq!(derive_view(&working, &state).keys(), vec!["k1", "k2"]);

    state.toggle_sort(0);
    assert_eq!(state.sort, None);
}

#[test]
fn test_sort_uses_rendered_text_case_insensitively() {
    let working = TranslationMatrix::new(vec![LanguageEntry::new("en")
        .with("a", "<b>zebra</b>")
        .with("b", "<i>Apple</i>")
        .with("c", "banana")]);
    let mut state = ViewState::default();
    state.toggle_sort(0);
    assert_eq!(derive_view(&working, &state).keys(), vec!["b", "c", "a"]);
}

#[test]
fn test_sort_reads_working_not_projection() {
    // k2 only matches the search through hr, so the en projection lacks it
    let working = TranslationMatrix::new(vec![
        LanguageEntry::new("en").with("k1", "x banana").with("k2", "zulu"),
        LanguageEntry::new("hr").with("k2", "x"),
    ]);
    let mut state = ViewState::default();
    state.set_search("x");
    state.toggle_sort(0);

    let view = derive_view(&working, &state);
    assert_eq!(view.keys(), vec!["k1", "k2"]);
    assert_eq!(view.rows[1].cells[0].value, "zulu");
}

#[test]
fn test_pagination_is_idempotent() {
    let working = numbered_matrix(60);
    let mut state = ViewState::new(25);
    state.set_page(2, 3);

    let first = derive_view(&working, &state);
    let second = derive_view(&working, &state);
    assert_eq!(first, second);
    assert_eq!(first.rows.len(), 25);
    assert_eq!(first.pagination_info(), "Showing 26-50 of 60 entries");
}

#[test]
fn test_total_rows_independent_of_page_size() {
    let working = numbered_matrix(130);
    let totals: Vec<(usize, usize)> = trans_matrix::PAGE_SIZES
        .iter()
        .map(|size| {
            let view = derive_view(&working, &ViewState::new(*size));
            (view.total_rows, view.total_pages)
        })
        .collect();
    assert_eq!(totals, vec![(130, 6), (130, 3), (130, 2), (130, 1)]);
}

#[test]
fn test_last_page_is_partial() {
    let working = numbered_matrix(30);
    let mut state = ViewState::new(25);
    assert!(state.set_page(2, 2));
    let view = derive_view(&working, &state);
    assert_eq!(view.rows.len(), 5);
    assert_eq!(view.pagination_info(), "Showing 26-30 of 30 entries");
    assert!(!state.set_page(3, 2));
    assert!(!state.set_page(0, 2));
    assert_eq!(state.page.number, 2);
}

#[test]
fn test_collapse_flags_without_removing_data() {
    let working = greet_matrix();
    let mut state = ViewState::default();
    assert!(state.toggle_collapse(1));

    let view = derive_view(&working, &state);
    assert!(view.columns[1].collapsed);
    assert!(view.rows[0].cells[1].collapsed);
    assert_eq!(view.rows[0].cells[1].value, "bok");
    assert!(!view.rows[0].cells[0].collapsed);

    assert!(!state.toggle_collapse(1));
    assert!(!derive_view(&working, &state).columns[1].collapsed);
}

#[test]
fn test_empty_matrix_view() {
    let view = derive_view(&TranslationMatrix::default(), &ViewState::default());
    assert!(view.is_empty());
    assert!(view.columns.is_empty());
    assert_eq!(view.total_rows, 0);
    assert_eq!(view.total_pages, 0);
    assert_eq!(view.pagination_info(), "No entries");
}

#[test]
fn test_search_is_literal() {
    let working = TranslationMatrix::new(vec![LanguageEntry::new("en")
        .with("price", "costs $5 (approx.)")
        .with("other", "costs 55")]);
    let mut state = ViewState::default();
    state.set_search("$5 (");
    assert_eq!(derive_view(&working, &state).keys(), vec!["price"]);
}
