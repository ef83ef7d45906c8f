//! Category command implementation

use clap::Subcommand;
use std::process::ExitCode;

use crate::lookup::find_category;
use crate::models::Category;
use crate::query::{category_tree, creates_cycle, orphaned_categories, CategoryNode};
use crate::store::Action;
use crate::validate::validate_name;

use super::{lookup_failed, Workspace, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

#[derive(Subcommand)]
pub enum CategoryAction {
    /// Create a category
    New {
        /// Category name
        name: String,

        /// Parent category id or name (default: top level)
        #[arg(short, long)]
        parent: Option<String>,
    },
    /// Print the category tree
    List {
        /// Only categories whose name (or a descendant's) contains this text
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Rename a category
    Rename {
        /// Category id or name
        category: String,
        /// New name
        name: String,
    },
    /// Move a category under another parent
    Reparent {
        /// Category id or name
        category: String,

        /// New parent id or name (omit to make it top level)
        #[arg(short, long)]
        parent: Option<String>,
    },
    /// Delete a category and every sprite in it. Child categories are kept.
    Delete {
        /// Category id or name
        category: String,
    },
    /// Make a category the selected category
    Select {
        /// Category id or name
        category: String,
    },
}

/// Execute a category subcommand
pub fn run_category(ws: &mut Workspace, action: CategoryAction) -> ExitCode {
    match action {
        CategoryAction::New { name, parent } => {
            let name = match validate_name("category", &name) {
                Ok(name) => name,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::from(EXIT_INVALID_ARGS);
                }
            };
            let parent_id = match parent.as_deref().map(|p| find_category(ws.store.document(), p)) {
                Some(Ok(c)) => Some(c.id.clone()),
                Some(Err(e)) => return lookup_failed(e),
                None => None,
            };
            let id = ws.store.create_category(&name, parent_id.as_deref());
            println!("{}", id);
            ExitCode::from(EXIT_SUCCESS)
        }
        CategoryAction::List { search } => {
            let document = ws.store.document();
            print!("{}", format_tree(&category_tree(&document.categories, &search)));
            let orphans = orphaned_categories(&document.categories);
            if !orphans.is_empty() && search.is_empty() {
                println!("\nOrphaned (parent missing):");
                for orphan in orphans {
                    println!("  {} ({})", orphan.name, orphan.id);
                }
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        CategoryAction::Rename { category, name } => {
            let name = match validate_name("category", &name) {
                Ok(name) => name,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::from(EXIT_INVALID_ARGS);
                }
            };
            update(ws, &category, |c| c.name = name)
        }
        CategoryAction::Reparent { category, parent } => {
            let document = ws.store.document();
            let current = match find_category(document, &category) {
                Ok(c) => c.clone(),
                Err(e) => return lookup_failed(e),
            };
            let parent_id = match parent.as_deref().map(|p| find_category(document, p)) {
                Some(Ok(c)) => Some(c.id.clone()),
                Some(Err(e)) => return lookup_failed(e),
                None => None,
            };
            if creates_cycle(&document.categories, &current.id, parent_id.as_deref()) {
                eprintln!("Error: '{}' cannot be moved under its own descendant", current.name);
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
            update(ws, &current.id, |c| c.parent_id = parent_id)
        }
        CategoryAction::Delete { category } => {
            let document = ws.store.document();
            let target = match find_category(document, &category) {
                Ok(c) => c.clone(),
                Err(e) => return lookup_failed(e),
            };
            let removed = document.sprites.iter().filter(|s| s.category_id == target.id).count();
            ws.store.dispatch(Action::DeleteCategory(target.id));
            println!("Deleted category '{}' and {} sprite(s)", target.name, removed);
            ExitCode::from(EXIT_SUCCESS)
        }
        CategoryAction::Select { category } => {
            let id = match find_category(ws.store.document(), &category) {
                Ok(c) => c.id.clone(),
                Err(e) => return lookup_failed(e),
            };
            ws.store.dispatch(Action::SetSelectedCategory(Some(id)));
            ExitCode::from(EXIT_SUCCESS)
        }
    }
}

fn update(ws: &mut Workspace, reference: &str, edit: impl FnOnce(&mut Category)) -> ExitCode {
    let mut category = match find_category(ws.store.document(), reference) {
        Ok(c) => c.clone(),
        Err(e) => return lookup_failed(e),
    };
    edit(&mut category);
    if ws.store.document().category(&category.id) == Some(&category) {
        return ExitCode::from(EXIT_SUCCESS);
    }
    if ws.store.dispatch(Action::UpdateCategory(category)) {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        eprintln!("Error: category '{}' was not updated", reference);
        ExitCode::from(EXIT_ERROR)
    }
}

/// Indented tree, two spaces per level.
fn format_tree(nodes: &[CategoryNode]) -> String {
    fn walk(node: &CategoryNode, depth: usize, out: &mut String) {
        out.push_str(&format!("{}{} ({})\n", "  ".repeat(depth), node.name, node.id));
        for child in &node.children {
            walk(child, depth + 1, out);
        }
    }

    let mut out = String::new();
    for node in nodes {
        walk(node, 0, &mut out);
    }
    out
}
