//! Resolve user-typed references to sprites, categories and palettes.
//!
//! A reference is either an id or a name. Ids win; names match exactly
//! first, then ignoring case. Misses come with a "did you mean" hint built
//! from edit distance over the known names.

use thiserror::Error;

use crate::models::{Category, Document, Palette, Sprite};

/// Names further than this many edits away are not suggested.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Failed lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no {kind} named '{reference}'{}", hint(.suggestions))]
    NotFound { kind: &'static str, reference: String, suggestions: Vec<String> },
    #[error("{count} {kind}s are named '{reference}', use the id instead")]
    Ambiguous { kind: &'static str, reference: String, count: usize },
}

fn hint(suggestions: &[String]) -> String {
    match suggestions {
        [] => String::new(),
        [one] => format!(". Did you mean '{}'?", one),
        [first, second] => format!(". Did you mean '{}' or '{}'?", first, second),
        [first, second, third, ..] => {
            format!(". Did you mean '{}', '{}', or '{}'?", first, second, third)
        }
    }
}

/// Number of single-character insertions, deletions or substitutions
/// turning `a` into `b`.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Up to three names closest to `query`, ignoring case, closest first.
pub fn closest_names<'a>(query: &str, names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let query = query.to_lowercase();
    let mut scored: Vec<(usize, &str)> = names
        .into_iter()
        .map(|name| (edit_distance(&query, &name.to_lowercase()), name))
        .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
        .collect();
    scored.sort_by_key(|(distance, _)| *distance);
    scored.dedup_by(|a, b| a.1 == b.1);
    scored.into_iter().take(3).map(|(_, name)| name.to_string()).collect()
}

fn find<'a, T>(
    kind: &'static str,
    items: impl Iterator<Item = &'a T> + Clone,
    reference: &str,
    id: impl Fn(&T) -> &str,
    name: impl Fn(&T) -> &str,
) -> Result<&'a T, LookupError>
where
    T: 'a,
{
    if let Some(item) = items.clone().find(|item| id(item) == reference) {
        return Ok(item);
    }

    let matchers: [fn(&str, &str) -> bool; 2] =
        [|n, r| n == r, |n, r| n.eq_ignore_ascii_case(r)];
    for matches in matchers {
        let found: Vec<&T> = items.clone().filter(|item| matches(name(item), reference)).collect();
        match found.len() {
            0 => continue,
            1 => return Ok(found[0]),
            count => {
                return Err(LookupError::Ambiguous { kind, reference: reference.to_string(), count })
            }
        }
    }

    Err(LookupError::NotFound {
        kind,
        reference: reference.to_string(),
        suggestions: closest_names(reference, items.map(|item| name(item))),
    })
}

/// Sprite by id or name.
pub fn find_sprite<'a>(document: &'a Document, reference: &str) -> Result<&'a Sprite, LookupError> {
    find("sprite", document.sprites.iter().map(|s| &**s), reference, |s| s.id.as_str(), |s| s.name.as_str())
}

/// Category by id or name.
pub fn find_category<'a>(document: &'a Document, reference: &str) -> Result<&'a Category, LookupError> {
    find("category", document.categories.iter(), reference, |c| c.id.as_str(), |c| c.name.as_str())
}

/// Palette by id or name.
pub fn find_palette<'a>(document: &'a Document, reference: &str) -> Result<&'a Palette, LookupError> {
    find("palette", document.palettes.iter(), reference, |p| p.id.as_str(), |p| p.name.as_str())
}
