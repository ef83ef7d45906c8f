//! Behavioral tests for the editing core.
//!
//! Exercises the pixel edit engine, frame store, playback timing and the
//! document store through the public library API only.

use dotsmith::draw::{draw_line, flood_fill, set_pixel};
use dotsmith::frames::{add_frame, delete_frame, FrameError};
use dotsmith::models::{Category, Document, Grid, Sprite, GRID_SIZE};
use dotsmith::palettes::DEFAULT_PALETTE_ID;
use dotsmith::persist::{export_document, import_document, Gateway, MemoryStorage};
use dotsmith::playback::{frame_at, Playback};
use dotsmith::store::{Action, Store};

/// A grid with a vertical wall of color 3 at x = 8 splitting it into two regions.
fn walled_grid() -> Grid {
    let mut cells = [[0u8; GRID_SIZE]; GRID_SIZE];
    for row in cells.iter_mut() {
        row[8] = 3;
    }
    cells[2][2] = 5;
    Grid::from(cells)
}

fn memory_store() -> Store<MemoryStorage> {
    Store::open(Gateway::new(MemoryStorage::new()))
}

// ============================================================================
// Pixel edits
// ============================================================================

#[test]
fn test_set_pixel_changes_exactly_one_cell() {
    let grid = walled_grid();
    for (x, y) in [(0, 0), (15, 15), (8, 3), (2, 2)] {
        let next = set_pixel(&grid, x, y, 7).unwrap();
        for cy in 0..GRID_SIZE {
            for cx in 0..GRID_SIZE {
                let expected = if (cx, cy) == (x as usize, y as usize) { Some(7) } else { grid.get(cx, cy) };
                assert_eq!(next.get(cx, cy), expected, "cell ({}, {}) after set ({}, {})", cx, cy, x, y);
            }
        }
    }
}

#[test]
fn test_set_pixel_out_of_bounds_is_rejected() {
    let grid = Grid::new();
    assert!(set_pixel(&grid, 16, 0, 1).is_err());
    assert!(set_pixel(&grid, 0, -1, 1).is_err());
}

#[test]
fn test_flood_fill_same_color_is_noop() {
    let grid = walled_grid();
    assert_eq!(flood_fill(&grid, 8, 0, 3).unwrap(), grid);
}

#[test]
fn test_flood_fill_is_idempotent() {
    let grid = walled_grid();
    let once = flood_fill(&grid, 0, 0, 9).unwrap();
    let twice = flood_fill(&once, 0, 0, 9).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_flood_fill_stays_in_connected_region() {
    let grid = walled_grid();
    let filled = flood_fill(&grid, 0, 0, 9).unwrap();
    for y in 0..GRID_SIZE {
        for x in 0..GRID_SIZE {
            let expected = match (x, y) {
                (8, _) => 3,
                (2, 2) => 5,
                (x, _) if x < 8 => 9,
                _ => 0,
            };
            assert_eq!(filled.get(x, y), Some(expected), "cell ({}, {})", x, y);
        }
    }
}

#[test]
fn test_degenerate_line_equals_set_pixel() {
    let grid = walled_grid();
    assert_eq!(draw_line(&grid, (4, 9), (4, 9), 2), set_pixel(&grid, 4, 9, 2).unwrap());
}

#[test]
fn test_diagonal_line_colors_main_diagonal() {
    let line = draw_line(&Grid::new(), (0, 0), (15, 15), 1);
    assert_eq!(line.painted_cells(), GRID_SIZE);
    for i in 0..GRID_SIZE {
        assert_eq!(line.get(i, i), Some(1));
    }
}

// ============================================================================
// Frames
// ============================================================================

#[test]
fn test_delete_only_frame_is_rejected() {
    let sprite = Sprite::new("hero", "cat_player", 1);
    assert_eq!(delete_frame(&sprite, 0, 2), Err(FrameError::LastFrame));
}

#[test]
fn test_add_then_delete_restores_frames() {
    let sprite = Sprite::new("hero", "cat_player", 1);
    let grown = add_frame(&sprite, 2);
    assert_eq!(grown.frame_count(), 2);

    let restored = delete_frame(&grown, 1, 3).unwrap();
    assert_eq!(restored.frames, sprite.frames);
}

// ============================================================================
// Playback
// ============================================================================

#[test]
fn test_frame_at_boundaries_advance() {
    let durations = [100, 200, 50];
    assert_eq!(frame_at(99, &durations, 1.0), 0);
    assert_eq!(frame_at(100, &durations, 1.0), 1);
    assert_eq!(frame_at(299, &durations, 1.0), 1);
    assert_eq!(frame_at(300, &durations, 1.0), 2);
    assert_eq!(frame_at(349, &durations, 1.0), 2);
    // Frame 2's window is fully consumed at 350ms, so playback has looped
    assert_eq!(frame_at(350, &durations, 1.0), 0);
}

#[test]
fn test_ticking_matches_frame_at() {
    let durations = [100, 200, 50];
    let mut playback = Playback::new();
    playback.play();
    for now in (0..=1400).step_by(50) {
        playback.tick(now, &durations, 1.0);
        assert_eq!(playback.current_frame(), frame_at(now, &durations, 1.0), "at {}ms", now);
    }
}

// ============================================================================
// Store
// ============================================================================

#[test]
fn test_delete_category_cascades_to_its_sprites_only() {
    let mut store = memory_store();
    let doomed = store.create_sprite("slime", "cat_enemy");
    let kept = store.create_sprite("hero", "cat_player");

    assert!(store.dispatch(Action::DeleteCategory("cat_enemy".to_string())));
    assert!(store.document().sprite(&doomed).is_none());
    assert!(store.document().sprite(&kept).is_some());
    assert!(store.document().category("cat_enemy").is_none());
}

#[test]
fn test_export_import_round_trip() {
    let mut store = memory_store();
    let id = store.create_sprite("hero", "cat_player");
    store.dispatch(Action::AddFrame { sprite_id: id.clone(), duration: Some(250) });
    store.dispatch(Action::AddCategory(Category::new("Bosses", Some("cat_enemy".to_string()))));
    store.dispatch(Action::SetSelectedSprite(Some(id)));

    let json = store.export().unwrap();
    let before = store.document().clone();

    let mut other = memory_store();
    other.import(&json).unwrap();
    assert_eq!(other.document(), &before);
    assert_eq!(other.session().selected_sprite_id, None);

    let reparsed = import_document(&export_document(&before).unwrap()).unwrap();
    assert_eq!(reparsed, before);
}

#[test]
fn test_import_garbage_leaves_document_alone() {
    let mut store = memory_store();
    let id = store.create_sprite("hero", "cat_player");
    assert!(store.import("[1, 2, 3]").is_err());
    assert!(store.document().sprite(&id).is_some());
}

#[test]
fn test_default_palette_cannot_be_deleted() {
    let mut store = memory_store();
    let palettes = store.document().palettes.clone();

    assert!(!store.dispatch(Action::DeletePalette(DEFAULT_PALETTE_ID.to_string())));
    assert_eq!(store.document().palettes, palettes);
    assert_eq!(store.document(), &Document::default());
}
