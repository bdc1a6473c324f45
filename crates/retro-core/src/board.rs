use crate::cache::QueryKey;
use crate::sprint::Sprint;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// EditMode
// ---------------------------------------------------------------------------

/// Which form, if any, the board currently shows. At most one note (or the
/// add form) may be open at a time; the guarded transitions below are what
/// the board uses to disable the other controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EditMode {
    #[default]
    Idle,
    Adding,
    Editing {
        id: String,
    },
}

impl EditMode {
    pub fn is_idle(&self) -> bool {
        matches!(self, EditMode::Idle)
    }

    pub fn editing_id(&self) -> Option<&str> {
        match self {
            EditMode::Editing { id } => Some(id),
            _ => None,
        }
    }

    /// Open the add form. Refused (returns `false`, state unchanged) unless
    /// the board is idle.
    pub fn begin_add(&mut self) -> bool {
        if !self.is_idle() {
            return false;
        }
        *self = EditMode::Adding;
        true
    }

    /// Open the edit form for one note. Refused unless the board is idle, so
    /// starting a second edit leaves the first in place.
    pub fn begin_edit(&mut self, id: &str) -> bool {
        if !self.is_idle() {
            return false;
        }
        *self = EditMode::Editing { id: id.to_string() };
        true
    }

    /// Submit or cancel; either way the board returns to idle.
    pub fn finish(&mut self) {
        *self = EditMode::Idle;
    }
}

// ---------------------------------------------------------------------------
// BoardSession
// ---------------------------------------------------------------------------

/// Per-viewer board state: which sprint is shown and which form is open.
#[derive(Debug, Clone, Default)]
pub struct BoardSession {
    pub current_sprint_id: Option<String>,
    pub edit_mode: EditMode,
}

impl BoardSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile the selection with a freshly listed sprint set (newest
    /// first): a valid selection is kept, a missing or stale one falls back
    /// to the newest sprint, and an empty set clears the selection.
    pub fn sync_sprints(&mut self, sprints: &[Sprint]) {
        match &self.current_sprint_id {
            Some(id) if sprints.iter().any(|s| &s.id == id) => {}
            _ => {
                self.current_sprint_id = sprints.first().map(|s| s.id.clone());
                self.edit_mode.finish();
            }
        }
    }

    /// Switch to another sprint, closing any open form.
    pub fn select_sprint(&mut self, id: &str) {
        self.current_sprint_id = Some(id.to_string());
        self.edit_mode.finish();
    }

    /// Cache key for the item list, or `None` while no sprint is selected —
    /// in which case the items query is skipped entirely.
    pub fn items_query(&self) -> Option<QueryKey> {
        self.current_sprint_id
            .as_ref()
            .map(|id| QueryKey::Items(id.clone()))
    }

    /// The orphan count is only worth fetching once there is a sprint to
    /// assign orphans to.
    pub fn orphan_query_enabled(&self, sprints: &[Sprint]) -> bool {
        !sprints.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sprint(id: &str, name: &str, minute: u32) -> Sprint {
        Sprint {
            id: id.to_string(),
            name: name.to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, minute, 0).unwrap(),
        }
    }

    #[test]
    fn second_edit_attempt_keeps_the_original() {
        let mut mode = EditMode::Idle;
        assert!(mode.begin_edit("note-1"));
        assert!(!mode.begin_edit("note-2"));
        assert_eq!(mode.editing_id(), Some("note-1"));
    }

    #[test]
    fn add_and_edit_are_mutually_exclusive() {
        let mut mode = EditMode::Idle;
        assert!(mode.begin_add());
        assert!(!mode.begin_edit("note-1"));
        assert_eq!(mode, EditMode::Adding);

        mode.finish();
        assert!(mode.begin_edit("note-1"));
        assert!(!mode.begin_add());
        assert_eq!(mode.editing_id(), Some("note-1"));
    }

    #[test]
    fn finish_returns_to_idle_from_any_state() {
        let mut mode = EditMode::Adding;
        mode.finish();
        assert!(mode.is_idle());

        let mut mode = EditMode::Editing {
            id: "note-1".into(),
        };
        mode.finish();
        assert!(mode.is_idle());
    }

    #[test]
    fn sync_selects_newest_when_unset() {
        let mut session = BoardSession::new();
        let sprints = vec![sprint("s2", "newer", 30), sprint("s1", "older", 10)];
        session.sync_sprints(&sprints);
        assert_eq!(session.current_sprint_id.as_deref(), Some("s2"));
    }

    #[test]
    fn sync_keeps_valid_selection() {
        let mut session = BoardSession::new();
        session.select_sprint("s1");
        let sprints = vec![sprint("s2", "newer", 30), sprint("s1", "older", 10)];
        session.sync_sprints(&sprints);
        assert_eq!(session.current_sprint_id.as_deref(), Some("s1"));
    }

    #[test]
    fn sync_replaces_deleted_selection() {
        let mut session = BoardSession::new();
        session.select_sprint("gone");
        let sprints = vec![sprint("s2", "newer", 30)];
        session.sync_sprints(&sprints);
        assert_eq!(session.current_sprint_id.as_deref(), Some("s2"));
    }

    #[test]
    fn sync_clears_selection_when_no_sprints_remain() {
        let mut session = BoardSession::new();
        session.select_sprint("s1");
        session.sync_sprints(&[]);
        assert!(session.current_sprint_id.is_none());
    }

    #[test]
    fn items_query_disabled_without_selection() {
        let session = BoardSession::new();
        assert!(session.items_query().is_none());

        let mut session = BoardSession::new();
        session.select_sprint("s1");
        assert_eq!(session.items_query(), Some(QueryKey::Items("s1".into())));
    }

    #[test]
    fn orphan_query_requires_a_sprint() {
        let session = BoardSession::new();
        assert!(!session.orphan_query_enabled(&[]));
        assert!(session.orphan_query_enabled(&[sprint("s1", "only", 0)]));
    }

    #[test]
    fn switching_sprint_closes_open_form() {
        let mut session = BoardSession::new();
        session.select_sprint("s1");
        session.edit_mode.begin_edit("note-1");
        session.select_sprint("s2");
        assert!(session.edit_mode.is_idle());
    }
}
