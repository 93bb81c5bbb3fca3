use codeview_core::{CodeStorage, CodeStorageOptions, LineInfo, Theme};
use codeview_lang::{Grammar, LanguageConfiguration};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

const SNIPPETS: &[&str] = &[
    "/*", "*/", "//", "(", ")", "[", "]", "{", "}", "\"s\"", "\"", "let", "x", "42", " ", "\n",
    "\r\n", "é", "/* c */", "{-", "-}", "--",
];

fn random_text(rng: &mut StdRng, pieces: usize) -> String {
    (0..pieces)
        .map(|_| SNIPPETS[rng.gen_range(0..SNIPPETS.len())])
        .collect()
}

fn snapshot(storage: &CodeStorage) -> Vec<(usize, usize, usize, LineInfo)> {
    storage
        .line_map()
        .iter()
        .map(|record| {
            (
                record.start,
                record.length,
                record.content_length,
                record.info.clone(),
            )
        })
        .collect()
}

fn check_incremental_matches_rebuild(
    config: LanguageConfiguration,
    token_completion: bool,
    seed: u64,
) {
    let grammar = Arc::new(Grammar::new(&config).unwrap());
    let theme = Arc::new(Theme::default_light());
    let options = CodeStorageOptions { token_completion };
    let mut rng = StdRng::seed_from_u64(seed);

    let initial = random_text(&mut rng, 200);
    let mut storage =
        CodeStorage::with_options(&initial, Arc::clone(&grammar), Arc::clone(&theme), options);

    for step in 0..300 {
        let len = storage.len_chars();
        let start = rng.gen_range(0..=len);
        let end = match rng.gen_range(0..3) {
            0 => start,
            1 => (start + 1).min(len),
            _ => (start + rng.gen_range(0..12)).min(len),
        };
        let insert = if rng.gen_bool(0.3) {
            String::new()
        } else {
            let pieces = rng.gen_range(1..3);
            random_text(&mut rng, pieces)
        };
        storage.replace(start..end, &insert).unwrap();

        let text = storage.text().to_string();
        let rebuilt =
            CodeStorage::with_options(&text, Arc::clone(&grammar), Arc::clone(&theme), options);
        assert_eq!(
            snapshot(&storage),
            snapshot(&rebuilt),
            "seed {seed}, step {step}, text {text:?}"
        );
    }
}

#[test]
fn test_swift_edits_match_full_rebuild() {
    for seed in 0..4 {
        check_incremental_matches_rebuild(LanguageConfiguration::swift(), false, seed);
    }
}

#[test]
fn test_haskell_edits_match_full_rebuild() {
    for seed in 10..14 {
        check_incremental_matches_rebuild(LanguageConfiguration::haskell(), false, seed);
    }
}

#[test]
fn test_edits_with_completion_match_full_rebuild() {
    for seed in 20..24 {
        check_incremental_matches_rebuild(LanguageConfiguration::swift(), true, seed);
    }
}

#[test]
fn test_retokenizing_is_idempotent() {
    let grammar = Arc::new(Grammar::new(&LanguageConfiguration::swift()).unwrap());
    let mut rng = StdRng::seed_from_u64(99);
    let text = random_text(&mut rng, 500);
    let mut storage = CodeStorage::new(
        &text,
        Arc::clone(&grammar),
        Arc::new(Theme::default_light()),
    );

    let before = snapshot(&storage);
    storage.set_grammar(Arc::clone(&grammar));
    assert_eq!(snapshot(&storage), before);
    storage.set_grammar(grammar);
    assert_eq!(snapshot(&storage), before);
}
