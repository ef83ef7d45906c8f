//! Read-only views over a document: the category tree and sprite listings.

use serde::Serialize;
use std::collections::HashSet;

use crate::models::{Category, Document, Sprite};

/// A category with its (possibly filtered) children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    pub id: String,
    pub name: String,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// Number of nodes in this subtree, including itself.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(CategoryNode::size).sum::<usize>()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Build the category forest from its roots.
///
/// With a non-empty `search`, a node is kept when its name contains the text
/// (ignoring case) or when any descendant is kept; kept nodes only list kept
/// children. Categories whose parent does not exist are not reachable from a
/// root and are left out (see [`orphaned_categories`]).
pub fn category_tree(categories: &[Category], search: &str) -> Vec<CategoryNode> {
    let mut visited = HashSet::new();
    let tree = children_of(categories, None, &mut visited);
    if search.is_empty() {
        tree
    } else {
        filter_nodes(tree, search)
    }
}

fn children_of<'a>(
    categories: &'a [Category],
    parent: Option<&str>,
    visited: &mut HashSet<&'a str>,
) -> Vec<CategoryNode> {
    categories
        .iter()
        .filter(|c| c.parent_id.as_deref() == parent)
        .filter_map(|c| {
            // Imported documents may contain cycles; visit each category once
            if !visited.insert(c.id.as_str()) {
                return None;
            }
            Some(CategoryNode {
                id: c.id.clone(),
                name: c.name.clone(),
                children: children_of(categories, Some(c.id.as_str()), visited),
            })
        })
        .collect()
}

fn filter_nodes(nodes: Vec<CategoryNode>, search: &str) -> Vec<CategoryNode> {
    nodes
        .into_iter()
        .filter_map(|node| {
            let children = filter_nodes(node.children, search);
            if contains_ignore_case(&node.name, search) || !children.is_empty() {
                Some(CategoryNode { children, ..node })
            } else {
                None
            }
        })
        .collect()
}

/// Categories whose parent id points at a category that does not exist.
pub fn orphaned_categories(categories: &[Category]) -> Vec<&Category> {
    let ids: HashSet<&str> = categories.iter().map(|c| c.id.as_str()).collect();
    categories
        .iter()
        .filter(|c| c.parent_id.as_deref().is_some_and(|p| !ids.contains(p)))
        .collect()
}

/// Whether giving `category_id` the parent `new_parent` would close a cycle.
pub fn creates_cycle(categories: &[Category], category_id: &str, new_parent: Option<&str>) -> bool {
    let mut seen = HashSet::new();
    let mut current = new_parent;
    while let Some(id) = current {
        if id == category_id {
            return true;
        }
        if !seen.insert(id) {
            // Existing cycle elsewhere; it does not involve this category
            return false;
        }
        current = categories.iter().find(|c| c.id == id).and_then(|c| c.parent_id.as_deref());
    }
    false
}

/// Sprites in `category_id` (all sprites when `None`) whose name contains
/// `search`, ignoring case.
pub fn sprites_in<'a>(document: &'a Document, category_id: Option<&str>, search: &str) -> Vec<&'a Sprite> {
    document
        .sprites
        .iter()
        .map(|s| s.as_ref())
        .filter(|s| category_id.map_or(true, |c| s.category_id == c))
        .filter(|s| search.is_empty() || contains_ignore_case(&s.name, search))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn forest() -> Vec<Category> {
        vec![
            Category::builtin("a", "Animals", None),
            Category::builtin("b", "Birds", Some("a")),
            Category::builtin("c", "Cats", Some("a")),
            Category::builtin("r", "Robins", Some("b")),
            Category::builtin("t", "Tools", None),
        ]
    }

    #[test]
    fn test_tree_structure() {
        let tree = category_tree(&forest(), "");
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id, "a");
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].children[0].children[0].name, "Robins");
        assert_eq!(tree[0].size(), 4);
    }

    #[test]
    fn test_search_keeps_matching_ancestors() {
        let tree = category_tree(&forest(), "ROB");
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, "a");
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].id, "b");
        assert_eq!(tree[0].children[0].children[0].id, "r");
    }

    #[test]
    fn test_search_without_match() {
        assert!(category_tree(&forest(), "zebra").is_empty());
    }

    #[test]
    fn test_orphans_excluded_from_tree() {
        let mut categories = forest();
        categories.retain(|c| c.id != "b");
        let tree = category_tree(&categories, "");
        assert_eq!(tree[0].children.len(), 1);

        let orphans = orphaned_categories(&categories);
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].id, "r");
    }

    #[test]
    fn test_creates_cycle() {
        let categories = forest();
        assert!(creates_cycle(&categories, "a", Some("r")));
        assert!(creates_cycle(&categories, "b", Some("b")));
        assert!(!creates_cycle(&categories, "r", Some("t")));
        assert!(!creates_cycle(&categories, "a", None));
    }

    #[test]
    fn test_tree_survives_imported_cycle() {
        let categories = vec![
            Category::builtin("root", "Root", None),
            Category::builtin("x", "X", Some("y")),
            Category::builtin("y", "Y", Some("x")),
        ];
        let tree = category_tree(&categories, "");
        assert_eq!(tree.len(), 1);
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn test_sprites_in_filters() {
        let mut doc = Document::default();
        doc.sprites.push(Arc::new(Sprite::new("Slime", "cat_enemy", 0)));
        doc.sprites.push(Arc::new(Sprite::new("Bat", "cat_enemy", 0)));
        doc.sprites.push(Arc::new(Sprite::new("Sword", "cat_weapon", 0)));

        assert_eq!(sprites_in(&doc, None, "").len(), 3);
        assert_eq!(sprites_in(&doc, Some("cat_enemy"), "").len(), 2);
        let found = sprites_in(&doc, Some("cat_enemy"), "sli");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Slime");
        assert_eq!(sprites_in(&doc, None, "s").len(), 2);
    }
}
