//! WASM API module for browser/JS interop
//!
//! Exposes an [`Editor`] that owns the document store. The host keeps the
//! snapshot string in local storage, feeds pointer events and display
//! refresh timestamps, and reads back RGBA pixels for drawing.

use wasm_bindgen::prelude::*;

use crate::draw::{cell_at, Stroke};
use crate::persist::{Gateway, MemoryStorage, Storage, DEFAULT_STORAGE_KEY};
use crate::playback::{Preview, TickId, Ticker};
use crate::renderer::render_grid;
use crate::store::{Action, Store};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// JS timestamps are float milliseconds.
fn millis(now: f64) -> u64 {
    if now.is_finite() && now > 0.0 {
        now as u64
    } else {
        0
    }
}

/// Tick requests handed to the JS host.
///
/// The host owns the `requestAnimationFrame` loop: after each refresh it asks
/// [`Editor::wants_tick`] and, if so, calls [`Editor::tick`] on the next one.
/// Cancelling needs no host call, since the preview stops asking.
#[derive(Debug, Default)]
struct HostTicker {
    next_id: TickId,
}

impl Ticker for HostTicker {
    fn schedule(&mut self) -> TickId {
        self.next_id += 1;
        self.next_id
    }

    fn cancel(&mut self, _id: TickId) {}
}

/// Editing session for one browser tab.
#[wasm_bindgen]
pub struct Editor {
    store: Store<MemoryStorage>,
    preview: Preview<HostTicker>,
    stroke: Stroke,
}

#[wasm_bindgen]
impl Editor {
    /// Open an editor from a previously saved snapshot, or the starter
    /// document when there is none (or it cannot be read).
    #[wasm_bindgen(constructor)]
    pub fn new(snapshot: Option<String>) -> Editor {
        let mut storage = MemoryStorage::new();
        if let Some(snapshot) = snapshot {
            storage.insert(DEFAULT_STORAGE_KEY, snapshot);
        }
        Editor {
            store: Store::open(Gateway::new(storage)),
            preview: Preview::new(HostTicker::default()),
            stroke: Stroke::new(),
        }
    }

    /// The snapshot to persist: document plus session, as JSON.
    pub fn snapshot(&self) -> Option<String> {
        self.store.gateway().storage().read(DEFAULT_STORAGE_KEY).ok().flatten()
    }

    /// Apply a JSON action (`{"type": "...", "payload": ...}`) at time `now`.
    /// Returns whether the state changed.
    pub fn dispatch(&mut self, action: &str, now: f64) -> Result<bool, String> {
        let action: Action = serde_json::from_str(action).map_err(|e| format!("invalid action: {}", e))?;
        Ok(self.store.dispatch_at(action, millis(now)))
    }

    /// Session (selection, tool, playback flags) as JSON.
    pub fn session(&self) -> Result<String, String> {
        serde_json::to_string(self.store.session()).map_err(|e| e.to_string())
    }

    /// Pretty-printed document for download.
    pub fn export_document(&self) -> Result<String, String> {
        self.store.export().map_err(|e| e.to_string())
    }

    /// Replace the document with an exported one; the session resets.
    pub fn import_document(&mut self, text: &str) -> Result<(), String> {
        self.preview.stop();
        self.store.import(text).map_err(|e| e.to_string())
    }

    /// RGBA bytes (16x16x4) of a frame, drawn with the selected palette.
    pub fn frame_rgba(&self, sprite_id: &str, frame_index: usize) -> Result<Vec<u8>, String> {
        let state = self.store.state();
        let frame = state
            .document
            .sprite(sprite_id)
            .and_then(|s| s.frame(frame_index))
            .ok_or_else(|| format!("no frame {} in sprite '{}'", frame_index, sprite_id))?;
        let palette = state.selected_palette().ok_or("no palette to draw with")?;
        let (image, _warnings) = render_grid(&frame.grid, palette);
        Ok(image.into_raw())
    }

    /// Pointer pressed at an offset from the grid origin. Returns whether the
    /// selected frame (or selected color) changed.
    pub fn pointer_down(&mut self, offset_x: f64, offset_y: f64, scale: f64) -> bool {
        match self.stroke.press(cell_at(offset_x, offset_y, scale)) {
            Some(gesture) => self.store.apply_tool(gesture),
            None => false,
        }
    }

    /// Pointer moved while possibly pressed.
    pub fn pointer_move(&mut self, offset_x: f64, offset_y: f64, scale: f64) -> bool {
        let cell = cell_at(offset_x, offset_y, scale);
        let Some(gesture) = self.stroke.moved(cell) else {
            if cell.is_none() {
                self.stroke.release();
            }
            return false;
        };
        self.store.apply_tool(gesture)
    }

    /// Pointer released or left the grid.
    pub fn pointer_up(&mut self) {
        self.stroke.release();
    }

    /// Start or stop the preview. Returns whether it is now playing.
    pub fn toggle_playback(&mut self, now: f64) -> bool {
        self.preview.toggle();
        let playing = self.preview.is_playing();
        self.store.dispatch_at(Action::SetIsPlaying(playing), millis(now));
        playing
    }

    /// Jump the preview back to frame 0 and play.
    pub fn restart_playback(&mut self, now: f64) {
        self.preview.restart();
        self.store.dispatch_at(Action::SetIsPlaying(true), millis(now));
    }

    /// Whether the preview is waiting for a display refresh.
    pub fn wants_tick(&self) -> bool {
        self.preview.pending_tick().is_some()
    }

    /// Display refresh at `now`. Returns the preview frame index after the tick.
    /// A refresh nobody asked for is ignored.
    pub fn tick(&mut self, now: f64) -> usize {
        if self.wants_tick() {
            let state = self.store.state();
            let durations = state.selected_sprite().map(|s| s.durations()).unwrap_or_default();
            self.preview.on_tick(millis(now), &durations, state.session.playback_speed);
        }
        self.preview.current_frame()
    }

    /// Frame index the preview is showing.
    pub fn preview_frame(&self) -> usize {
        self.preview.current_frame()
    }
}
