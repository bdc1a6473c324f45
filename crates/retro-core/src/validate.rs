use crate::types::SentimentColor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Field length bounds shared by the add and edit forms.
pub const SPRINT_NAME_MAX: usize = 100;
pub const WHO_AM_I_MAX: usize = 50;
pub const WHAT_TO_SAY_MAX: usize = 500;
pub const ACTION_ITEMS_MAX: usize = 500;

// ---------------------------------------------------------------------------
// ValidationErrors
// ---------------------------------------------------------------------------

/// Per-field validation messages, keyed by the wire name of the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Ok(())` when no messages were collected, `Err(self)` otherwise.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for msg in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {msg}")?;
                first = false;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SprintDraft
// ---------------------------------------------------------------------------

/// Values submitted by the "new sprint" form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintDraft {
    pub name: String,
}

impl SprintDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.name.trim().is_empty() {
            errors.push("name", "Please enter a sprint name.");
        } else if self.name.chars().count() > SPRINT_NAME_MAX {
            errors.push(
                "name",
                format!("Sprint name must be {SPRINT_NAME_MAX} characters or less."),
            );
        }
        errors.into_result()
    }
}

// ---------------------------------------------------------------------------
// ItemDraft
// ---------------------------------------------------------------------------

/// Values submitted by the add/edit note forms. `action_items` defaults to
/// the empty string when the field is left out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub who_am_i: String,
    pub what_to_say: String,
    #[serde(default)]
    pub action_items: String,
    pub color: SentimentColor,
}

impl ItemDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_who_am_i(&mut errors, &self.who_am_i);
        check_what_to_say(&mut errors, &self.what_to_say);
        check_action_items(&mut errors, &self.action_items, self.color);
        errors.into_result()
    }
}

// ---------------------------------------------------------------------------
// ItemPatch
// ---------------------------------------------------------------------------

/// Partial edit of a retro item. Only supplied fields are validated and
/// written; the edit form always submits the complete set, so a `red` color
/// in the patch is checked against the patch's own action items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub who_am_i: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub what_to_say: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_items: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<SentimentColor>,
}

impl ItemPatch {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Some(who) = &self.who_am_i {
            check_who_am_i(&mut errors, who);
        }
        if let Some(say) = &self.what_to_say {
            check_what_to_say(&mut errors, say);
        }
        if let Some(color) = self.color {
            check_action_items(&mut errors, self.action_items.as_deref().unwrap_or(""), color);
        } else if let Some(action) = &self.action_items {
            if action.chars().count() > ACTION_ITEMS_MAX {
                errors.push(
                    "actionItems",
                    format!("Action items must be {ACTION_ITEMS_MAX} characters or less."),
                );
            }
        }
        errors.into_result()
    }
}

// ---------------------------------------------------------------------------
// Field rules
// ---------------------------------------------------------------------------

fn check_who_am_i(errors: &mut ValidationErrors, value: &str) {
    if value.is_empty() {
        errors.push("whoAmI", "Please enter who you are or a team role.");
    } else if value.chars().count() > WHO_AM_I_MAX {
        errors.push(
            "whoAmI",
            format!("Name/role must be {WHO_AM_I_MAX} characters or less."),
        );
    }
}

fn check_what_to_say(errors: &mut ValidationErrors, value: &str) {
    if value.is_empty() {
        errors.push("whatToSay", "This field cannot be empty.");
    } else if value.chars().count() > WHAT_TO_SAY_MAX {
        errors.push(
            "whatToSay",
            format!("Message must be {WHAT_TO_SAY_MAX} characters or less."),
        );
    }
}

fn check_action_items(errors: &mut ValidationErrors, value: &str, color: SentimentColor) {
    if value.chars().count() > ACTION_ITEMS_MAX {
        errors.push(
            "actionItems",
            format!("Action items must be {ACTION_ITEMS_MAX} characters or less."),
        );
    }
    if color.requires_action_items() && value.trim().is_empty() {
        errors.push(
            "actionItems",
            "Action items are required when the color is red.",
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
