//! Input validation for project and objective creation and step completion.
//!
//! All checks here run before any write, so a rejected request never leaves
//! partial entities behind.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Every objective needs at least this many non-empty steps.
pub const MIN_STEPS_PER_OBJECTIVE: usize = 3;

/// Maximum length of a project name.
pub const MAX_NAME_LENGTH: u64 = 200;

/// Maximum length of an objective or step title.
pub const MAX_TITLE_LENGTH: u64 = 500;

/// Maximum length of long-form text (project descriptions, completion notes).
pub const MAX_TEXT_LENGTH: u64 = 5000;

/// Maximum length of a cover image URL.
pub const MAX_URL_LENGTH: u64 = 2048;

/// Maximum length of the `completed_by` label.
pub const MAX_COMPLETED_BY_LENGTH: u64 = 200;

// ---------------------------------------------------------------------------
// Field validators
// ---------------------------------------------------------------------------

/// Reject empty or whitespace-only text.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

/// Trim an optional string, mapping blank values to `None`.
pub fn trim_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Project fields
// ---------------------------------------------------------------------------

/// The user-editable fields of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ProjectFields {
    #[validate(length(max = MAX_NAME_LENGTH), custom(function = "not_blank"))]
    pub name: String,
    #[validate(length(max = MAX_TEXT_LENGTH), custom(function = "not_blank"))]
    pub what_is: String,
    #[validate(length(max = MAX_TEXT_LENGTH), custom(function = "not_blank"))]
    pub how_to_do: String,
    #[validate(length(max = MAX_TEXT_LENGTH), custom(function = "not_blank"))]
    pub what_to_expect: String,
    /// Opaque URL of an already-uploaded image.
    #[serde(default)]
    #[validate(length(max = MAX_URL_LENGTH))]
    pub cover_image: Option<String>,
}

impl ProjectFields {
    /// Validate and return a trimmed copy. A blank cover image becomes `None`.
    pub fn normalized(&self) -> Result<Self, CoreError> {
        self.validate()?;
        Ok(Self {
            name: self.name.trim().to_string(),
            what_is: self.what_is.trim().to_string(),
            how_to_do: self.how_to_do.trim().to_string(),
            what_to_expect: self.what_to_expect.trim().to_string(),
            cover_image: trim_optional(self.cover_image.as_deref()),
        })
    }
}

// ---------------------------------------------------------------------------
// Objectives
// ---------------------------------------------------------------------------

/// An objective as submitted by a client: a title and its step titles.
///
/// Blank step titles are allowed in the draft and dropped during
/// normalization, the way the creation form ignores empty rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ObjectiveDraft {
    #[validate(length(max = MAX_TITLE_LENGTH), custom(function = "not_blank"))]
    pub title: String,
    #[serde(default)]
    pub steps: Vec<String>,
}

/// A validated objective ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidObjective {
    pub title: String,
    pub steps: Vec<String>,
}

impl ValidObjective {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

/// Trim step titles, drop blank ones, and require at least
/// [`MIN_STEPS_PER_OBJECTIVE`] to remain.
pub fn normalize_step_titles(titles: &[String]) -> Result<Vec<String>, CoreError> {
    let steps: Vec<String> = titles
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if steps.len() < MIN_STEPS_PER_OBJECTIVE {
        return Err(CoreError::Validation(format!(
            "an objective needs at least {MIN_STEPS_PER_OBJECTIVE} non-empty steps, got {}",
            steps.len()
        )));
    }

    if let Some(long) = steps
        .iter()
        .find(|t| t.chars().count() as u64 > MAX_TITLE_LENGTH)
    {
        return Err(CoreError::Validation(format!(
            "step title exceeds {MAX_TITLE_LENGTH} characters: '{}...'",
            long.chars().take(20).collect::<String>()
        )));
    }

    Ok(steps)
}

impl ObjectiveDraft {
    /// Validate the title and step list.
    pub fn normalized(&self) -> Result<ValidObjective, CoreError> {
        self.validate()?;
        Ok(ValidObjective {
            title: self.title.trim().to_string(),
            steps: normalize_step_titles(&self.steps)?,
        })
    }
}

/// Validate a whole new project: its fields and a non-empty objective list.
///
/// Errors name the offending objective by its 1-based position.
pub fn validate_new_project(
    fields: &ProjectFields,
    objectives: &[ObjectiveDraft],
) -> Result<(ProjectFields, Vec<ValidObjective>), CoreError> {
    let fields = fields.normalized()?;

    if objectives.is_empty() {
        return Err(CoreError::Validation(
            "a project needs at least one objective".to_string(),
        ));
    }

    let objectives = objectives
        .iter()
        .enumerate()
        .map(|(i, draft)| {
            draft.normalized().map_err(|e| match e {
                CoreError::Validation(msg) => {
                    CoreError::Validation(format!("objective {}: {msg}", i + 1))
                }
                other => other,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((fields, objectives))
}

// ---------------------------------------------------------------------------
// Step completion
// ---------------------------------------------------------------------------

/// Validate a completion note.
///
/// With `required` set, a missing or blank note is rejected; otherwise a
/// blank note is stored as `None`.
pub fn normalize_completion_note(
    note: Option<&str>,
    required: bool,
) -> Result<Option<String>, CoreError> {
    let note = trim_optional(note);
    match &note {
        None if required => Err(CoreError::Validation(
            "a completion note is required to complete a step".to_string(),
        )),
        Some(n) if n.chars().count() as u64 > MAX_TEXT_LENGTH => Err(CoreError::Validation(
            format!("completion note exceeds {MAX_TEXT_LENGTH} characters"),
        )),
        _ => Ok(note),
    }
}

/// Validate the optional `completed_by` label.
pub fn normalize_completed_by(value: Option<&str>) -> Result<Option<String>, CoreError> {
    let value = trim_optional(value);
    if let Some(v) = &value {
        if v.chars().count() as u64 > MAX_COMPLETED_BY_LENGTH {
            return Err(CoreError::Validation(format!(
                "completed_by exceeds {MAX_COMPLETED_BY_LENGTH} characters"
            )));
        }
    }
    Ok(value)
}
