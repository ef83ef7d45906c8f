//! Export and import command implementations

use std::path::Path;
use std::process::ExitCode;

use crate::output::write_text;
use crate::persist::import_document;
use crate::store::Action;
use crate::telemetry::{ErrorCollector, ErrorEntry};
use crate::validate::Validator;

use super::{Workspace, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the export command
pub fn run_export(ws: &Workspace, output: Option<&Path>) -> ExitCode {
    let json = match ws.store.export() {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match output {
        None => {
            println!("{}", json);
            ExitCode::from(EXIT_SUCCESS)
        }
        Some(path) => match write_text(path, &json) {
            Ok(()) => {
                eprintln!("Wrote: {}", path.display());
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: Failed to write '{}': {}", path.display(), e);
                ExitCode::from(EXIT_ERROR)
            }
        },
    }
}

/// Execute the import command
///
/// The file replaces the whole document and resets the session. Validation
/// issues are reported; with `strict` any error aborts the import.
pub fn run_import(ws: &mut Workspace, input: &Path, strict: bool) -> ExitCode {
    let collector = ErrorCollector::new(&ws.config.telemetry.path, ws.config.telemetry.collect_errors);

    let text = match std::fs::read_to_string(input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: Cannot read '{}': {}", input.display(), e);
            collector.record(ErrorEntry::new("import", "io_error", e.to_string()).with_key(input.display().to_string()));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let document = match import_document(&text) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error: {}", e);
            collector.record(ErrorEntry::new("import", "parse_error", e.to_string()).with_key(input.display().to_string()));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut validator = Validator::new();
    validator.validate_document(&document);
    for issue in validator.issues() {
        eprintln!("{}", issue);
    }
    if strict && validator.has_errors() {
        eprintln!(
            "Error: import aborted, {} error(s) and {} warning(s)",
            validator.error_count(),
            validator.warning_count()
        );
        return ExitCode::from(EXIT_ERROR);
    }

    let (sprites, categories, palettes) =
        (document.sprites.len(), document.categories.len(), document.palettes.len());
    ws.store.dispatch(Action::ImportData(document));
    println!(
        "Imported {} sprite(s), {} categories, {} palette(s)",
        sprites, categories, palettes
    );
    ExitCode::from(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_support::workspace;
    use std::fs;

    #[test]
    fn test_export_then_import_into_fresh_workspace() {
        let (temp, mut ws) = workspace();
        let id = ws.store.create_sprite("hero", "cat_player");
        let file = temp.path().join("out/doc.json");
        assert_eq!(run_export(&ws, Some(&file)), ExitCode::from(EXIT_SUCCESS));

        let (_temp2, mut other) = workspace();
        assert_eq!(run_import(&mut other, &file, true), ExitCode::from(EXIT_SUCCESS));
        assert_eq!(other.store.document().sprite(&id).unwrap().name, "hero");
        assert_eq!(other.store.session().selected_sprite_id, None);
    }

    #[test]
    fn test_import_rejects_garbage_and_records() {
        let (temp, mut ws) = workspace();
        ws.config.telemetry.collect_errors = true;
        let before = ws.store.create_sprite("keep", "cat_item");
        let file = temp.path().join("bad.json");
        fs::write(&file, "{ not json").unwrap();

        assert_eq!(run_import(&mut ws, &file, false), ExitCode::from(EXIT_ERROR));
        assert!(ws.store.document().sprite(&before).is_some());

        let log = fs::read_to_string(&ws.config.telemetry.path).unwrap();
        assert!(log.contains("\"operation\":\"import\""));
        assert!(log.contains("parse_error"));
    }

    #[test]
    fn test_strict_import_refuses_invalid_document() {
        let (temp, mut ws) = workspace();
        let file = temp.path().join("doc.json");
        fs::write(
            &file,
            r#"{"sprites":[],"categories":[],"palettes":[{"id":"p1","name":"Bad","colors":["notacolor"]}]}"#,
        )
        .unwrap();

        assert_eq!(run_import(&mut ws, &file, true), ExitCode::from(EXIT_ERROR));
        assert_eq!(ws.store.document().palettes.len(), 2);

        assert_eq!(run_import(&mut ws, &file, false), ExitCode::from(EXIT_SUCCESS));
        assert_eq!(ws.store.document().palettes.len(), 1);
        assert!(ws.store.document().categories.is_empty());
    }
}
