use criterion::{black_box, criterion_group, criterion_main, Criterion};
use trans_matrix::data::data_view::{derive_view, ViewState};
use trans_matrix::markup::{StructuralFingerprint, TagProfile};
use trans_matrix::{LanguageEntry, TranslationMatrix};

fn create_test_matrix(keys: usize) -> TranslationMatrix {
    let codes = ["en", "de", "fr", "hr", "it", "es"];
    let phrases = [
        "Welcome back",
        "<p>Your <b>order</b> has shipped</p>",
        "Settings",
        r#"<div class="note">Read the <a href="/terms">terms</a></div>"#,
        "Log out",
    ];

    let entries = codes
        .iter()
        .enumerate()
        .map(|(col, code)| {
            let mut entry = LanguageEntry::new(*code);
            for i in 0..keys {
                // Leave some gaps so languages differ in key coverage
                if (i + col) % 7 == 0 {
                    continue;
                }
                let phrase = phrases[(i + col) % phrases.len()];
                entry = entry.with(format!("section.{}.label", i), format!("{} {}", phrase, i));
            }
            entry
        })
        .collect();

    TranslationMatrix::new(entries)
}

fn benchmark_view_derivation(c: &mut Criterion) {
    let matrix_5k = create_test_matrix(5_000);
    let matrix_20k = create_test_matrix(20_000);

    let mut group = c.benchmark_group("derive_view");

    group.bench_function("5k_keys_unfiltered", |b| {
        let state = ViewState::new(100);
        b.iter(|| derive_view(black_box(&matrix_5k), &state));
    });

    group.bench_function("20k_keys_search", |b| {
        let mut state = ViewState::new(100);
        state.set_search("order");
        b.iter(|| derive_view(black_box(&matrix_20k), &state));
    });

    group.bench_function("20k_keys_search_and_sort", |b| {
        let mut state = ViewState::new(100);
        state.set_search("order");
        state.toggle_sort(2);
        b.iter(|| derive_view(black_box(&matrix_20k), &state));
    });

    group.finish();
}

fn benchmark_reapply(c: &mut Criterion) {
    let profile = TagProfile::default();
    let original = r#"<div class="note" data-id="7">Read the <b>full</b> <a href="/terms">terms</a> first</div>"#;
    let fingerprint = StructuralFingerprint::extract(original, &profile);
    let edited = r#"<p>Read the <strong>full</strong> <a href="/terms">terms</a> first, please</p>"#;

    c.bench_function("fingerprint_reapply", |b| {
        b.iter(|| fingerprint.reapply(black_box(edited), &profile));
    });
}

criterion_group!(benches, benchmark_view_derivation, benchmark_reapply);
criterion_main!(benches);
