// Browser tests for the localStorage adapter and the category export. Run with
// `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

use emoji_match::BestTimeStore;
use emoji_match::surface::record_best_time;
use emoji_match::web::LocalStorageStore;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn best_time_round_trips_through_local_storage() {
    let mut store = LocalStorageStore::new();
    let key = "emojiMatchTestBest";
    store.set_best_time(key, 42);
    assert_eq!(store.best_time(key), Some(42));

    assert!(!record_best_time(&mut store, key, 50));
    assert!(record_best_time(&mut store, key, 7));
    assert_eq!(LocalStorageStore::new().best_time(key), Some(7));
}

#[wasm_bindgen_test]
fn missing_key_reads_as_none() {
    let store = LocalStorageStore::new();
    assert_eq!(store.best_time("emojiMatchNeverWritten"), None);
}

#[wasm_bindgen_test]
fn category_export_rejects_unknown_names() {
    assert!(emoji_match::set_categories("animals,fruits").is_ok());
    assert!(emoji_match::set_categories("all").is_ok());
    assert!(emoji_match::set_categories("robots").is_err());
}
