//! WASM tests using wasm_bindgen_test
//!
//! Run with: wasm-pack test --headless --chrome --features wasm
//! Or natively: see tests in src/wasm.rs (run with cargo test --features wasm)

#![cfg(all(target_arch = "wasm32", feature = "wasm"))]

use wasm_bindgen_test::*;

// Configure tests to run in browser environment
wasm_bindgen_test_configure!(run_in_browser);

use dotsmith::wasm::Editor;

/// Editor with one selected sprite in the player category; returns its id.
fn editor_with_sprite() -> (Editor, String) {
    let mut editor = Editor::new(None);
    let sprite = r#"{"type": "ADD_SPRITE", "payload": {"id": "s1", "name": "hero", "categoryId": "cat_player",
        "frames": [{"id": "f1", "grid": [[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],
        [0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],
        [0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],
        [0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],
        [0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],
        [0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0]], "duration": 100}],
        "createdAt": 1, "updatedAt": 1}}"#;
    assert!(editor.dispatch(sprite, 1.0).unwrap());
    assert!(editor.dispatch(r#"{"type": "SET_SELECTED_SPRITE", "payload": "s1"}"#, 2.0).unwrap());
    (editor, "s1".to_string())
}

// ============================================================================
// Snapshot tests
// ============================================================================

#[wasm_bindgen_test]
fn test_new_editor_has_snapshot_after_edit() {
    let (editor, _) = editor_with_sprite();
    let snapshot = editor.snapshot().expect("snapshot should be written on dispatch");
    assert!(snapshot.contains("\"appData\""));
    assert!(snapshot.contains("\"appState\""));
}

#[wasm_bindgen_test]
fn test_reopen_from_snapshot() {
    let (editor, id) = editor_with_sprite();
    let reopened = Editor::new(editor.snapshot());
    assert!(reopened.frame_rgba(&id, 0).is_ok());
}

// ============================================================================
// Drawing tests
// ============================================================================

#[wasm_bindgen_test]
fn test_pointer_paints_selected_color() {
    let (mut editor, id) = editor_with_sprite();
    assert!(editor.pointer_down(1.0, 1.0, 20.0));
    editor.pointer_up();

    let rgba = editor.frame_rgba(&id, 0).unwrap();
    assert_eq!(rgba.len(), 16 * 16 * 4);
    assert_eq!(&rgba[..4], &[255, 255, 255, 255]);
}

#[wasm_bindgen_test]
fn test_frame_rgba_unknown_sprite() {
    let (editor, _) = editor_with_sprite();
    assert!(editor.frame_rgba("missing", 0).is_err());
}

// ============================================================================
// Export/import tests
// ============================================================================

#[wasm_bindgen_test]
fn test_export_import_round_trip() {
    let (editor, id) = editor_with_sprite();
    let exported = editor.export_document().unwrap();

    let mut other = Editor::new(None);
    other.import_document(&exported).unwrap();
    assert!(other.frame_rgba(&id, 0).is_ok());
    assert!(other.import_document("not json").is_err());
}
