//! Document and session store.
//!
//! All state changes go through [`reduce`], a pure function from the current
//! state and an [`Action`] to the next state. The reducer never mutates its
//! input; updated containers are rebuilt and everything untouched is shared,
//! so `Arc::ptr_eq` on the document (or on a sprite or frame) tells whether
//! anything changed. Rejected actions return the input state unchanged.
//!
//! [`Store`] owns the current state and a persistence [`Gateway`] and writes
//! a snapshot after every change.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::draw::{self, Edit, EditOutcome};
use crate::frames::{self, Direction};
use crate::models::{
    now_millis, Category, ColorIndex, Document, Frame, Palette, Session, Sprite, Tool,
};
use crate::palettes::{is_protected, DEFAULT_PALETTE_ID};
use crate::persist::{export_document, import_document, Gateway, ImportError, PersistError, Storage};
use crate::playback::{MAX_SPEED, MIN_SPEED};
use crate::query::creates_cycle;

/// Document plus session. Cloning is cheap: the document is shared.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub document: Arc<Document>,
    pub session: Session,
}

impl AppState {
    pub fn new(document: Document, session: Session) -> Self {
        Self { document: Arc::new(document), session }
    }

    /// The selected sprite, if any.
    pub fn selected_sprite(&self) -> Option<&Sprite> {
        self.session.selected_sprite_id.as_deref().and_then(|id| self.document.sprite(id))
    }

    /// The selected frame of the selected sprite, if both exist.
    pub fn selected_frame(&self) -> Option<&Frame> {
        self.selected_sprite().and_then(|s| s.frame(self.session.selected_frame_index))
    }

    /// The selected palette, falling back to the system default.
    pub fn selected_palette(&self) -> Option<&Palette> {
        self.document
            .palette(&self.session.selected_palette_id)
            .or_else(|| self.document.palette(DEFAULT_PALETTE_ID))
    }
}

/// Everything that can change the state.
///
/// Serialized as `{"type": "ADD_SPRITE", "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    SetSelectedCategory(Option<String>),
    /// Also resets the selected frame to 0.
    SetSelectedSprite(Option<String>),
    SetSelectedFrameIndex(usize),
    SetSelectedColor(ColorIndex),
    SetSelectedPalette(String),
    SetCurrentTool(Tool),
    SetIsPlaying(bool),
    /// Clamped to the supported speed range.
    SetPlaybackSpeed(f64),

    AddSprite(Sprite),
    UpdateSprite(Sprite),
    DeleteSprite(String),

    AddCategory(Category),
    UpdateCategory(Category),
    /// Also deletes every sprite in the category. Child categories are kept.
    DeleteCategory(String),

    AddPalette(Palette),
    UpdatePalette(Palette),
    DeletePalette(String),

    #[serde(rename_all = "camelCase")]
    AddFrame {
        sprite_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration: Option<u32>,
    },
    #[serde(rename_all = "camelCase")]
    DuplicateFrame { sprite_id: String, frame_index: usize },
    #[serde(rename_all = "camelCase")]
    DeleteFrame { sprite_id: String, frame_index: usize },
    #[serde(rename_all = "camelCase")]
    MoveFrame { sprite_id: String, frame_index: usize, direction: Direction },
    #[serde(rename_all = "camelCase")]
    SetFrameDuration { sprite_id: String, frame_index: usize, duration: u32 },
    /// Replace the frame at `frame_index` wholesale.
    #[serde(rename_all = "camelCase")]
    UpdateFrame { sprite_id: String, frame_index: usize, frame: Frame },
    #[serde(rename_all = "camelCase")]
    UpdatePixel { sprite_id: String, frame_index: usize, x: i32, y: i32, color_index: ColorIndex },
    #[serde(rename_all = "camelCase")]
    ApplyEdit { sprite_id: String, frame_index: usize, edit: Edit },

    /// Replace the whole document and reset the session.
    ImportData(Document),
}

impl Action {
    /// The wire name of the action, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetSelectedCategory(_) => "SET_SELECTED_CATEGORY",
            Action::SetSelectedSprite(_) => "SET_SELECTED_SPRITE",
            Action::SetSelectedFrameIndex(_) => "SET_SELECTED_FRAME_INDEX",
            Action::SetSelectedColor(_) => "SET_SELECTED_COLOR",
            Action::SetSelectedPalette(_) => "SET_SELECTED_PALETTE",
            Action::SetCurrentTool(_) => "SET_CURRENT_TOOL",
            Action::SetIsPlaying(_) => "SET_IS_PLAYING",
            Action::SetPlaybackSpeed(_) => "SET_PLAYBACK_SPEED",
            Action::AddSprite(_) => "ADD_SPRITE",
            Action::UpdateSprite(_) => "UPDATE_SPRITE",
            Action::DeleteSprite(_) => "DELETE_SPRITE",
            Action::AddCategory(_) => "ADD_CATEGORY",
            Action::UpdateCategory(_) => "UPDATE_CATEGORY",
            Action::DeleteCategory(_) => "DELETE_CATEGORY",
            Action::AddPalette(_) => "ADD_PALETTE",
            Action::UpdatePalette(_) => "UPDATE_PALETTE",
            Action::DeletePalette(_) => "DELETE_PALETTE",
            Action::AddFrame { .. } => "ADD_FRAME",
            Action::DuplicateFrame { .. } => "DUPLICATE_FRAME",
            Action::DeleteFrame { .. } => "DELETE_FRAME",
            Action::MoveFrame { .. } => "MOVE_FRAME",
            Action::SetFrameDuration { .. } => "SET_FRAME_DURATION",
            Action::UpdateFrame { .. } => "UPDATE_FRAME",
            Action::UpdatePixel { .. } => "UPDATE_PIXEL",
            Action::ApplyEdit { .. } => "APPLY_EDIT",
            Action::ImportData(_) => "IMPORT_DATA",
        }
    }
}

/// Compute the state that follows `action`. `now` stamps `updatedAt`.
pub fn reduce(state: &AppState, action: Action, now: u64) -> AppState {
    match action {
        Action::SetSelectedCategory(id) => with_session(state, |s| s.selected_category_id = id),
        Action::SetSelectedSprite(id) => with_session(state, |s| {
            s.selected_sprite_id = id;
            s.selected_frame_index = 0;
        }),
        Action::SetSelectedFrameIndex(index) => {
            with_session(state, |s| s.selected_frame_index = index)
        }
        Action::SetSelectedColor(color) => with_session(state, |s| s.selected_color = color),
        Action::SetSelectedPalette(id) => with_session(state, |s| s.selected_palette_id = id),
        Action::SetCurrentTool(tool) => with_session(state, |s| s.current_tool = tool),
        Action::SetIsPlaying(playing) => with_session(state, |s| s.is_playing = playing),
        Action::SetPlaybackSpeed(speed) => {
            if !speed.is_finite() {
                return state.clone();
            }
            with_session(state, |s| s.playback_speed = speed.clamp(MIN_SPEED, MAX_SPEED))
        }

        Action::AddSprite(sprite) => {
            if sprite.frames.is_empty() || state.document.sprite(&sprite.id).is_some() {
                return state.clone();
            }
            with_document(state, |doc| doc.sprites.push(Arc::new(sprite)))
        }
        Action::UpdateSprite(sprite) => {
            if sprite.frames.is_empty() {
                return state.clone();
            }
            let id = sprite.id.clone();
            let last = sprite.frames.len() - 1;
            let mut next = replace_sprite(state, &id, |_| Some(Sprite { updated_at: now, ..sprite }));
            if changed(state, &next) && is_selected(state, &id) {
                next.session.selected_frame_index = next.session.selected_frame_index.min(last);
            }
            next
        }
        Action::DeleteSprite(id) => {
            if state.document.sprite(&id).is_none() {
                return state.clone();
            }
            let mut next = with_document(state, |doc| doc.sprites.retain(|s| s.id != id));
            if next.session.selected_sprite_id.as_deref() == Some(id.as_str()) {
                next.session.selected_sprite_id = None;
                next.session.selected_frame_index = 0;
            }
            next
        }

        Action::AddCategory(category) => {
            if state.document.category(&category.id).is_some() {
                return state.clone();
            }
            with_document(state, |doc| doc.categories.push(category))
        }
        Action::UpdateCategory(category) => {
            let Some(pos) = state.document.categories.iter().position(|c| c.id == category.id)
            else {
                return state.clone();
            };
            if creates_cycle(&state.document.categories, &category.id, category.parent_id.as_deref())
            {
                tracing::debug!(category = %category.id, "rejected category update that would create a cycle");
                return state.clone();
            }
            with_document(state, |doc| doc.categories[pos] = category)
        }
        Action::DeleteCategory(id) => {
            if state.document.category(&id).is_none() {
                return state.clone();
            }
            let mut next = with_document(state, |doc| {
                doc.categories.retain(|c| c.id != id);
                doc.sprites.retain(|s| s.category_id != id);
            });
            if next.session.selected_category_id.as_deref() == Some(id.as_str()) {
                next.session.selected_category_id = None;
            }
            let selected_gone = next
                .session
                .selected_sprite_id
                .as_deref()
                .is_some_and(|sid| next.document.sprite(sid).is_none());
            if selected_gone {
                next.session.selected_sprite_id = None;
                next.session.selected_frame_index = 0;
            }
            next
        }

        Action::AddPalette(palette) => {
            if state.document.palette(&palette.id).is_some() {
                return state.clone();
            }
            with_document(state, |doc| doc.palettes.push(palette))
        }
        Action::UpdatePalette(palette) => {
            let Some(pos) = state.document.palettes.iter().position(|p| p.id == palette.id) else {
                return state.clone();
            };
            with_document(state, |doc| doc.palettes[pos] = palette)
        }
        Action::DeletePalette(id) => {
            if is_protected(&id) || state.document.palette(&id).is_none() {
                return state.clone();
            }
            let mut next = with_document(state, |doc| doc.palettes.retain(|p| p.id != id));
            if next.session.selected_palette_id == id {
                next.session.selected_palette_id = DEFAULT_PALETTE_ID.to_string();
            }
            next
        }

        Action::AddFrame { sprite_id, duration } => {
            let next = replace_sprite(state, &sprite_id, |sprite| {
                Some(match duration {
                    Some(d) if d > 0 => frames::add_frame_with_duration(sprite, d, now),
                    _ => frames::add_frame(sprite, now),
                })
            });
            select_last_frame(next, state, &sprite_id)
        }
        Action::DuplicateFrame { sprite_id, frame_index } => {
            let next = replace_sprite(state, &sprite_id, |sprite| {
                frames::duplicate_frame(sprite, frame_index, now).ok()
            });
            select_last_frame(next, state, &sprite_id)
        }
        Action::DeleteFrame { sprite_id, frame_index } => {
            let mut next = replace_sprite(state, &sprite_id, |sprite| {
                frames::delete_frame(sprite, frame_index, now).ok()
            });
            if changed(state, &next) && is_selected(state, &sprite_id) {
                next.session.selected_frame_index =
                    frames::selection_after_delete(next.session.selected_frame_index, frame_index);
            }
            next
        }
        Action::MoveFrame { sprite_id, frame_index, direction } => {
            let mut target = None;
            let mut next = replace_sprite(state, &sprite_id, |sprite| {
                let (moved, to) = frames::move_frame(sprite, frame_index, direction, now).ok()?;
                target = Some(to);
                Some(moved)
            });
            if let Some(to) = target.filter(|_| is_selected(state, &sprite_id)) {
                next.session.selected_frame_index =
                    frames::selection_after_move(next.session.selected_frame_index, frame_index, to);
            }
            next
        }
        Action::SetFrameDuration { sprite_id, frame_index, duration } => {
            replace_sprite(state, &sprite_id, |sprite| {
                frames::set_frame_duration(sprite, frame_index, duration, now).ok()
            })
        }
        Action::UpdateFrame { sprite_id, frame_index, frame } => {
            replace_sprite(state, &sprite_id, |sprite| {
                let slot = sprite.frames.get(frame_index)?;
                if slot.as_ref() == &frame {
                    return None;
                }
                let mut next = sprite.clone();
                next.frames[frame_index] = Arc::new(frame);
                next.updated_at = now;
                Some(next)
            })
        }
        Action::UpdatePixel { sprite_id, frame_index, x, y, color_index } => apply_edit(
            state,
            &sprite_id,
            frame_index,
            Edit::Pixel { x, y, color: color_index },
            now,
        ),
        Action::ApplyEdit { sprite_id, frame_index, edit } => {
            apply_edit(state, &sprite_id, frame_index, edit, now)
        }

        Action::ImportData(document) => AppState::new(document, Session::default()),
    }
}

fn with_session(state: &AppState, f: impl FnOnce(&mut Session)) -> AppState {
    let mut session = state.session.clone();
    f(&mut session);
    AppState { document: Arc::clone(&state.document), session }
}

fn with_document(state: &AppState, f: impl FnOnce(&mut Document)) -> AppState {
    let mut document = state.document.as_ref().clone();
    f(&mut document);
    AppState { document: Arc::new(document), session: state.session.clone() }
}

/// Replace the sprite `sprite_id` with what `f` returns. `None` from `f`,
/// or a missing sprite, leaves the state untouched.
fn replace_sprite(
    state: &AppState,
    sprite_id: &str,
    f: impl FnOnce(&Sprite) -> Option<Sprite>,
) -> AppState {
    let Some(pos) = state.document.sprites.iter().position(|s| s.id == sprite_id) else {
        return state.clone();
    };
    match f(&state.document.sprites[pos]) {
        Some(sprite) => with_document(state, |doc| doc.sprites[pos] = Arc::new(sprite)),
        None => state.clone(),
    }
}

fn changed(before: &AppState, after: &AppState) -> bool {
    !Arc::ptr_eq(&before.document, &after.document)
}

fn is_selected(state: &AppState, sprite_id: &str) -> bool {
    state.session.selected_sprite_id.as_deref() == Some(sprite_id)
}

fn select_last_frame(mut next: AppState, before: &AppState, sprite_id: &str) -> AppState {
    if changed(before, &next) && is_selected(before, sprite_id) {
        if let Some(sprite) = next.document.sprite(sprite_id) {
            next.session.selected_frame_index = sprite.frame_count().saturating_sub(1);
        }
    }
    next
}

fn apply_edit(state: &AppState, sprite_id: &str, frame_index: usize, edit: Edit, now: u64) -> AppState {
    let Some(frame) = state.document.sprite(sprite_id).and_then(|s| s.frame(frame_index)) else {
        return state.clone();
    };

    match draw::apply(&frame.grid, &edit) {
        Ok(EditOutcome::Grid(grid)) => {
            if grid == frame.grid {
                return state.clone();
            }
            replace_sprite(state, sprite_id, |sprite| {
                frames::update_frame(sprite, frame_index, grid, now).ok()
            })
        }
        Ok(EditOutcome::Picked(color)) => {
            let in_palette = state.selected_palette().is_some_and(|p| p.has_index(color));
            if in_palette && state.session.selected_color != color {
                with_session(state, |s| s.selected_color = color)
            } else {
                state.clone()
            }
        }
        Err(e) => {
            tracing::debug!(sprite = sprite_id, frame = frame_index, error = %e, "ignored edit");
            state.clone()
        }
    }
}

/// Holds the current state and persists it after every change.
pub struct Store<S: Storage> {
    state: AppState,
    gateway: Gateway<S>,
}

impl<S: Storage> Store<S> {
    /// Open a store from whatever the gateway has persisted.
    pub fn open(gateway: Gateway<S>) -> Self {
        let snapshot = gateway.load();
        Self { state: AppState::new(snapshot.app_data, snapshot.app_state), gateway }
    }

    /// A store starting from `state`, without reading storage.
    pub fn with_state(gateway: Gateway<S>, state: AppState) -> Self {
        Self { state, gateway }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn document(&self) -> &Document {
        &self.state.document
    }

    pub fn session(&self) -> &Session {
        &self.state.session
    }

    pub fn gateway(&self) -> &Gateway<S> {
        &self.gateway
    }

    /// Apply an action stamped with the current time. Returns whether the state changed.
    pub fn dispatch(&mut self, action: Action) -> bool {
        self.dispatch_at(action, now_millis())
    }

    /// Apply an action stamped with `now`. Returns whether the state changed.
    pub fn dispatch_at(&mut self, action: Action, now: u64) -> bool {
        let name = action.name();
        let next = reduce(&self.state, action, now);
        let dirty = changed(&self.state, &next) || next.session != self.state.session;
        tracing::debug!(action = name, changed = dirty, "dispatch");
        if dirty {
            self.state = next;
            self.save();
        }
        dirty
    }

    /// Write the current state to storage. Failures are logged, not returned.
    pub fn save(&mut self) -> bool {
        self.gateway.save(&self.state.document, &self.state.session)
    }

    /// Create a sprite with one blank frame and return its id.
    pub fn create_sprite(&mut self, name: &str, category_id: &str) -> String {
        let sprite = Sprite::new(name, category_id, now_millis());
        let id = sprite.id.clone();
        self.dispatch(Action::AddSprite(sprite));
        id
    }

    /// Create a category and return its id.
    pub fn create_category(&mut self, name: &str, parent_id: Option<&str>) -> String {
        let category = Category::new(name, parent_id.map(str::to_string));
        let id = category.id.clone();
        self.dispatch(Action::AddCategory(category));
        id
    }

    /// Create a palette and return its id.
    pub fn create_palette(&mut self, name: &str, colors: Vec<String>) -> String {
        let palette = Palette::new(name, colors);
        let id = palette.id.clone();
        self.dispatch(Action::AddPalette(palette));
        id
    }

    /// Apply the active tool to a cell of the selected frame.
    pub fn apply_tool(&mut self, gesture: draw::Gesture) -> bool {
        let session = &self.state.session;
        let Some(sprite_id) = session.selected_sprite_id.clone() else {
            return false;
        };
        let Some(edit) = draw::resolve(session.current_tool, gesture, session.selected_color) else {
            return false;
        };
        let frame_index = session.selected_frame_index;
        self.dispatch(Action::ApplyEdit { sprite_id, frame_index, edit })
    }

    /// Pretty-printed JSON of the document.
    pub fn export(&self) -> Result<String, PersistError> {
        export_document(&self.state.document)
    }

    /// Replace the document with an exported one. On failure nothing changes.
    pub fn import(&mut self, text: &str) -> Result<(), ImportError> {
        let document = import_document(text)?;
        self.dispatch(Action::ImportData(document));
        Ok(())
    }

    pub fn into_parts(self) -> (AppState, Gateway<S>) {
        (self.state, self.gateway)
    }
}
