//! Validation at the form boundary and for imported documents.
//!
//! The reducer accepts whatever it is given; user input is checked here
//! first. [`Validator`] also lints a whole document (typically one about to
//! be imported) for references and values the editor would never produce.

use std::collections::HashSet;
use thiserror::Error;

use crate::color::parse_color;
use crate::models::{Document, PALETTE_SIZE};
use crate::palettes::DEFAULT_PALETTE_ID;
use crate::playback::{MAX_SPEED, MIN_SPEED};
use crate::query::{creates_cycle, orphaned_categories};

/// Rejected user input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} name must not be empty")]
    EmptyName(&'static str),
    #[error("palette must have exactly 16 colors, got {0}")]
    PaletteSize(usize),
    #[error("color {index} ('{value}') is not a valid color: {reason}")]
    InvalidColor { index: usize, value: String, reason: String },
    #[error("category '{0}' does not exist")]
    UnknownCategory(String),
    #[error("frame duration {value}ms is outside {min}..={max}ms")]
    DurationOutOfRange { value: u32, min: u32, max: u32 },
    #[error("frame duration {value}ms is not a multiple of {step}ms")]
    DurationStep { value: u32, step: u32 },
    #[error("playback speed {0} is outside 0.1..=3.0")]
    SpeedOutOfRange(f64),
}

/// Trimmed, non-empty name. `what` names the entity in the error message.
pub fn validate_name(what: &'static str, name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName(what));
    }
    Ok(trimmed.to_string())
}

/// A user-created palette needs exactly 16 parseable colors.
pub fn validate_palette_colors(colors: &[String]) -> Result<(), ValidationError> {
    if colors.len() != PALETTE_SIZE {
        return Err(ValidationError::PaletteSize(colors.len()));
    }
    for (index, value) in colors.iter().enumerate() {
        parse_color(value).map_err(|e| ValidationError::InvalidColor {
            index,
            value: value.clone(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

/// The referenced category must exist.
pub fn validate_category_ref(document: &Document, category_id: &str) -> Result<(), ValidationError> {
    match document.category(category_id) {
        Some(_) => Ok(()),
        None => Err(ValidationError::UnknownCategory(category_id.to_string())),
    }
}

/// Allowed frame durations: `min..=max` in multiples of `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationRange {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl Default for DurationRange {
    fn default() -> Self {
        Self { min: 10, max: 1000, step: 10 }
    }
}

impl DurationRange {
    /// Check a duration entered by the user.
    pub fn check(&self, value: u32) -> Result<u32, ValidationError> {
        if value < self.min || value > self.max {
            return Err(ValidationError::DurationOutOfRange { value, min: self.min, max: self.max });
        }
        if self.step > 1 && value % self.step != 0 {
            return Err(ValidationError::DurationStep { value, step: self.step });
        }
        Ok(value)
    }

    /// Nearest allowed duration, for inputs that snap instead of rejecting.
    pub fn clamp(&self, value: u32) -> u32 {
        let value = value.clamp(self.min, self.max);
        if self.step <= 1 {
            return value;
        }
        let snapped = ((value + self.step / 2) / self.step) * self.step;
        snapped.clamp(self.min, self.max)
    }
}

/// Playback speed must lie in the slider range.
pub fn validate_speed(speed: f64) -> Result<f64, ValidationError> {
    if (MIN_SPEED..=MAX_SPEED).contains(&speed) {
        Ok(speed)
    } else {
        Err(ValidationError::SpeedOutOfRange(speed))
    }
}

/// Severity of a document issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
        }
    }
}

/// Kind of document issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueType {
    /// Two entities of the same kind share an id
    DuplicateId,
    /// Sprite or category name is blank
    EmptyName,
    /// Sprite points at a category that does not exist
    MissingCategory,
    /// Category points at a parent that does not exist
    OrphanedCategory,
    /// Category is its own ancestor
    CategoryCycle,
    /// Palette color string does not parse
    InvalidColor,
    /// The protected default palette is absent
    MissingDefaultPalette,
    /// Frame duration is zero
    ZeroDuration,
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueType::DuplicateId => write!(f, "duplicate_id"),
            IssueType::EmptyName => write!(f, "empty_name"),
            IssueType::MissingCategory => write!(f, "missing_category"),
            IssueType::OrphanedCategory => write!(f, "orphaned_category"),
            IssueType::CategoryCycle => write!(f, "category_cycle"),
            IssueType::InvalidColor => write!(f, "invalid_color"),
            IssueType::MissingDefaultPalette => write!(f, "missing_default_palette"),
            IssueType::ZeroDuration => write!(f, "zero_duration"),
        }
    }
}

/// A problem found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub issue_type: IssueType,
    pub message: String,
    /// Id of the entity the issue is about
    pub context: Option<String>,
}

impl ValidationIssue {
    pub fn error(issue_type: IssueType, message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, issue_type, message: message.into(), context: None }
    }

    pub fn warning(issue_type: IssueType, message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, issue_type, message: message.into(), context: None }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.issue_type, self.message)
    }
}

/// Collects issues found in a document.
#[derive(Debug, Default)]
pub struct Validator {
    issues: Vec<ValidationIssue>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check every sprite, category and palette of `document`.
    pub fn validate_document(&mut self, document: &Document) {
        self.check_categories(document);
        self.check_sprites(document);
        self.check_palettes(document);
    }

    fn check_duplicates<'a>(&mut self, kind: &str, ids: impl Iterator<Item = &'a str>) {
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id) {
                self.issues.push(
                    ValidationIssue::error(IssueType::DuplicateId, format!("Duplicate {} id '{}'", kind, id))
                        .with_context(id),
                );
            }
        }
    }

    fn check_categories(&mut self, document: &Document) {
        let categories = &document.categories;
        self.check_duplicates("category", categories.iter().map(|c| c.id.as_str()));

        for category in categories {
            if category.name.trim().is_empty() {
                self.issues.push(
                    ValidationIssue::warning(IssueType::EmptyName, "Category has an empty name")
                        .with_context(&category.id),
                );
            }
            if let Some(parent) = category.parent_id.as_deref() {
                if parent != category.id
                    && categories.iter().any(|c| c.id == parent)
                    && creates_cycle(categories, &category.id, Some(parent))
                {
                    self.issues.push(
                        ValidationIssue::error(
                            IssueType::CategoryCycle,
                            format!("Category '{}' is its own ancestor", category.name),
                        )
                        .with_context(&category.id),
                    );
                } else if parent == category.id {
                    self.issues.push(
                        ValidationIssue::error(
                            IssueType::CategoryCycle,
                            format!("Category '{}' is its own parent", category.name),
                        )
                        .with_context(&category.id),
                    );
                }
            }
        }

        for orphan in orphaned_categories(categories) {
            self.issues.push(
                ValidationIssue::warning(
                    IssueType::OrphanedCategory,
                    format!(
                        "Category '{}' has missing parent '{}'",
                        orphan.name,
                        orphan.parent_id.as_deref().unwrap_or_default()
                    ),
                )
                .with_context(&orphan.id),
            );
        }
    }

    fn check_sprites(&mut self, document: &Document) {
        self.check_duplicates("sprite", document.sprites.iter().map(|s| s.id.as_str()));

        for sprite in &document.sprites {
            if sprite.name.trim().is_empty() {
                self.issues.push(
                    ValidationIssue::warning(IssueType::EmptyName, "Sprite has an empty name")
                        .with_context(&sprite.id),
                );
            }
            if document.category(&sprite.category_id).is_none() {
                self.issues.push(
                    ValidationIssue::warning(
                        IssueType::MissingCategory,
                        format!("Sprite '{}' is in missing category '{}'", sprite.name, sprite.category_id),
                    )
                    .with_context(&sprite.id),
                );
            }
            for (index, frame) in sprite.frames.iter().enumerate() {
                if frame.duration == 0 {
                    self.issues.push(
                        ValidationIssue::warning(
                            IssueType::ZeroDuration,
                            format!("Frame {} of sprite '{}' has zero duration", index, sprite.name),
                        )
                        .with_context(&sprite.id),
                    );
                }
            }
        }
    }

    fn check_palettes(&mut self, document: &Document) {
        self.check_duplicates("palette", document.palettes.iter().map(|p| p.id.as_str()));

        if document.palette(DEFAULT_PALETTE_ID).is_none() {
            self.issues.push(ValidationIssue::warning(
                IssueType::MissingDefaultPalette,
                format!("Default palette '{}' is missing", DEFAULT_PALETTE_ID),
            ));
        }

        for palette in &document.palettes {
            for (index, value) in palette.colors.iter().enumerate() {
                if let Err(e) = parse_color(value) {
                    self.issues.push(
                        ValidationIssue::error(
                            IssueType::InvalidColor,
                            format!("Palette '{}' color {} ('{}'): {}", palette.name, index, value, e),
                        )
                        .with_context(&palette.id),
                    );
                }
            }
        }
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues.iter().filter(|i| i.severity == Severity::Warning).count()
    }
}

/// Lint a document in one call.
pub fn validate_document(document: &Document) -> Vec<ValidationIssue> {
    let mut validator = Validator::new();
    validator.validate_document(document);
    validator.into_issues()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Palette, Sprite};
    use crate::palettes::preset_colors;
    use std::sync::Arc;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("sprite", "  hero "), Ok("hero".to_string()));
        assert_eq!(validate_name("sprite", "   "), Err(ValidationError::EmptyName("sprite")));
        assert_eq!(
            ValidationError::EmptyName("category").to_string(),
            "category name must not be empty"
        );
    }

    #[test]
    fn test_validate_palette_colors() {
        let colors = preset_colors("pico8").unwrap();
        assert!(validate_palette_colors(&colors).is_ok());

        assert_eq!(validate_palette_colors(&colors[..4]), Err(ValidationError::PaletteSize(4)));

        let mut bad = colors.clone();
        bad[3] = "nope".to_string();
        assert!(matches!(
            validate_palette_colors(&bad),
            Err(ValidationError::InvalidColor { index: 3, .. })
        ));
    }

    #[test]
    fn test_validate_category_ref() {
        let doc = Document::default();
        assert!(validate_category_ref(&doc, "cat_enemy").is_ok());
        assert_eq!(
            validate_category_ref(&doc, "cat_missing"),
            Err(ValidationError::UnknownCategory("cat_missing".into()))
        );
    }

    #[test]
    fn test_duration_range() {
        let range = DurationRange::default();
        assert_eq!(range.check(10), Ok(10));
        assert_eq!(range.check(1000), Ok(1000));
        assert_eq!(
            range.check(5),
            Err(ValidationError::DurationOutOfRange { value: 5, min: 10, max: 1000 })
        );
        assert_eq!(range.check(105), Err(ValidationError::DurationStep { value: 105, step: 10 }));

        assert_eq!(range.clamp(0), 10);
        assert_eq!(range.clamp(104), 100);
        assert_eq!(range.clamp(105), 110);
        assert_eq!(range.clamp(5000), 1000);
    }

    #[test]
    fn test_validate_speed() {
        assert_eq!(validate_speed(0.1), Ok(0.1));
        assert_eq!(validate_speed(3.0), Ok(3.0));
        assert!(validate_speed(0.0).is_err());
        assert!(validate_speed(3.5).is_err());
        assert!(validate_speed(f64::NAN).is_err());
    }

    #[test]
    fn test_default_document_is_clean() {
        assert!(validate_document(&Document::default()).is_empty());
    }

    #[test]
    fn test_document_issues() {
        let mut doc = Document::default();
        doc.categories.retain(|c| c.id != "cat_item");
        doc.categories.push(Category::builtin("loop_a", "A", Some("loop_b")));
        doc.categories.push(Category::builtin("loop_b", "B", Some("loop_a")));
        doc.sprites.push(Arc::new(Sprite::new("ghost", "cat_nowhere", 0)));
        doc.palettes.push(Palette::new("broken", vec!["#XYZ".into()]));

        let mut validator = Validator::new();
        validator.validate_document(&doc);
        let types: Vec<IssueType> = validator.issues().iter().map(|i| i.issue_type).collect();

        // Four children of cat_item lose their parent
        assert_eq!(types.iter().filter(|t| **t == IssueType::OrphanedCategory).count(), 4);
        assert_eq!(types.iter().filter(|t| **t == IssueType::CategoryCycle).count(), 2);
        assert!(types.contains(&IssueType::MissingCategory));
        assert!(types.contains(&IssueType::InvalidColor));
        assert!(validator.has_errors());
        assert!(validator.has_warnings());
        assert_eq!(validator.error_count(), 3);
    }

    #[test]
    fn test_duplicate_ids() {
        let mut doc = Document::default();
        let sprite = Arc::new(Sprite::new("twin", "cat_npc", 0));
        doc.sprites.push(Arc::clone(&sprite));
        doc.sprites.push(sprite);
        doc.palettes.retain(|p| p.id != DEFAULT_PALETTE_ID);

        let issues = validate_document(&doc);
        assert!(issues.iter().any(|i| i.issue_type == IssueType::DuplicateId));
        assert!(issues.iter().any(|i| i.issue_type == IssueType::MissingDefaultPalette));
    }

    #[test]
    fn test_issue_display() {
        let issue = ValidationIssue::warning(IssueType::EmptyName, "Sprite has an empty name");
        assert_eq!(issue.to_string(), "WARNING [empty_name] Sprite has an empty name");
    }
}
