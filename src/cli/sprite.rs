//! Sprite command implementation

use clap::Subcommand;
use std::process::ExitCode;

use crate::lookup::{find_category, find_sprite};
use crate::models::{now_millis, Frame, Sprite};
use crate::query::sprites_in;
use crate::store::Action;
use crate::validate::validate_name;

use super::{lookup_failed, Workspace, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

#[derive(Subcommand)]
pub enum SpriteAction {
    /// Create a sprite with one blank frame and select it
    New {
        /// Sprite name
        name: String,

        /// Category id or name (default: the selected category)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List sprites
    List {
        /// Only sprites in this category (id or name)
        #[arg(short, long)]
        category: Option<String>,

        /// Only sprites whose name contains this text
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Rename a sprite
    Rename {
        /// Sprite id or name
        sprite: String,
        /// New name
        name: String,
    },
    /// Move a sprite to another category
    Move {
        /// Sprite id or name
        sprite: String,
        /// Target category id or name
        category: String,
    },
    /// Delete a sprite
    Delete {
        /// Sprite id or name
        sprite: String,
    },
    /// Make a sprite the selected sprite
    Select {
        /// Sprite id or name
        sprite: String,
    },
}

/// Execute a sprite subcommand
pub fn run_sprite(ws: &mut Workspace, action: SpriteAction) -> ExitCode {
    match action {
        SpriteAction::New { name, category } => run_new(ws, &name, category.as_deref()),
        SpriteAction::List { category, search } => run_list(ws, category.as_deref(), &search),
        SpriteAction::Rename { sprite, name } => {
            let name = match validate_name("sprite", &name) {
                Ok(name) => name,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::from(EXIT_INVALID_ARGS);
                }
            };
            update(ws, &sprite, |s| s.name = name)
        }
        SpriteAction::Move { sprite, category } => {
            let category_id = match find_category(ws.store.document(), &category) {
                Ok(c) => c.id.clone(),
                Err(e) => return lookup_failed(e),
            };
            update(ws, &sprite, |s| s.category_id = category_id)
        }
        SpriteAction::Delete { sprite } => {
            let (id, name) = match find_sprite(ws.store.document(), &sprite) {
                Ok(s) => (s.id.clone(), s.name.clone()),
                Err(e) => return lookup_failed(e),
            };
            ws.store.dispatch(Action::DeleteSprite(id));
            println!("Deleted sprite '{}'", name);
            ExitCode::from(EXIT_SUCCESS)
        }
        SpriteAction::Select { sprite } => {
            let id = match find_sprite(ws.store.document(), &sprite) {
                Ok(s) => s.id.clone(),
                Err(e) => return lookup_failed(e),
            };
            ws.store.dispatch(Action::SetSelectedSprite(Some(id)));
            ExitCode::from(EXIT_SUCCESS)
        }
    }
}

fn run_new(ws: &mut Workspace, name: &str, category: Option<&str>) -> ExitCode {
    let name = match validate_name("sprite", name) {
        Ok(name) => name,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let category_id = match category {
        Some(reference) => match find_category(ws.store.document(), reference) {
            Ok(c) => c.id.clone(),
            Err(e) => return lookup_failed(e),
        },
        None => match ws.store.session().selected_category_id.clone() {
            Some(id) => id,
            None => {
                eprintln!("Error: no category selected, pass --category");
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        },
    };

    let mut frame = Frame::new();
    frame.duration = ws.config.editor.default_frame_duration;
    let sprite = Sprite::with_frame(name, category_id, frame, now_millis());
    let id = sprite.id.clone();
    ws.store.dispatch(Action::AddSprite(sprite));
    ws.store.dispatch(Action::SetSelectedSprite(Some(id.clone())));
    println!("{}", id);
    ExitCode::from(EXIT_SUCCESS)
}

fn run_list(ws: &Workspace, category: Option<&str>, search: &str) -> ExitCode {
    let document = ws.store.document();
    let category_id = match category {
        Some(reference) => match find_category(document, reference) {
            Ok(c) => Some(c.id.as_str()),
            Err(e) => return lookup_failed(e),
        },
        None => None,
    };

    let selected = ws.store.session().selected_sprite_id.as_deref();
    for sprite in sprites_in(document, category_id, search) {
        let marker = if Some(sprite.id.as_str()) == selected { "*" } else { " " };
        let category_name =
            document.category(&sprite.category_id).map_or("(missing)", |c| c.name.as_str());
        println!(
            "{} {}  {:<24} {:<20} {} frame(s)",
            marker,
            sprite.id,
            sprite.name,
            category_name,
            sprite.frame_count()
        );
    }
    ExitCode::from(EXIT_SUCCESS)
}

/// Replace a sprite with an edited copy.
fn update(ws: &mut Workspace, reference: &str, edit: impl FnOnce(&mut Sprite)) -> ExitCode {
    let mut sprite = match find_sprite(ws.store.document(), reference) {
        Ok(s) => s.clone(),
        Err(e) => return lookup_failed(e),
    };
    edit(&mut sprite);
    if ws.store.dispatch(Action::UpdateSprite(sprite)) {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        eprintln!("Error: sprite '{}' was not updated", reference);
        ExitCode::from(EXIT_ERROR)
    }
}
