//! Consolidated action-item view and its downloadable Markdown rendering.

use crate::item::RetroItem;

/// Items that carry a non-blank action-items field, in the order given
/// (callers pass the newest-first board list). Each entry keeps its source
/// note id so the board can jump back to the originating card.
pub fn consolidated(items: &[RetroItem]) -> Vec<&RetroItem> {
    items.iter().filter(|i| i.has_action_items()).collect()
}

/// Render the consolidated list as a standalone Markdown document.
///
/// One section per action item: the action text, the author it came from,
/// and the sentiment of the originating note. Items without action items
/// never appear.
pub fn render_markdown(sprint_name: &str, items: &[RetroItem]) -> String {
    let actions = consolidated(items);

    let mut out = String::new();
    out.push_str(&format!("# Action Items — {sprint_name}\n\n"));

    if actions.is_empty() {
        out.push_str("_No action items yet._\n");
        return out;
    }

    for item in actions {
        out.push_str(&format!(
            "## {} ({})\n\n",
            item.who_am_i,
            item.color.label()
        ));
        out.push_str(item.action_items.trim());
        out.push_str("\n\n");
        out.push_str(&format!("> {}\n\n", item.what_to_say.trim()));
    }
    out
}

/// File name offered for the download, derived from the sprint name.
pub fn export_filename(sprint_name: &str) -> String {
    let slug: String = sprint_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug.trim_matches('-').to_string();
    let mut compact = String::with_capacity(slug.len());
    let mut prev_dash = false;
    for c in slug.chars() {
        if c == '-' {
            if !prev_dash {
                compact.push('-');
            }
            prev_dash = true;
        } else {
            compact.push(c);
            prev_dash = false;
        }
    }
    if compact.is_empty() {
        "action-items.md".to_string()
    } else {
        format!("action-items-{compact}.md")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SentimentColor;
    use chrono::Utc;

    fn item(who: &str, action_items: &str, color: SentimentColor) -> RetroItem {
        let now = Utc::now();
        RetroItem {
            id: format!("item-{who}"),
            sprint_id: Some("s1".to_string()),
            who_am_i: who.to_string(),
            what_to_say: "Something happened".to_string(),
            action_items: action_items.to_string(),
            color,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn consolidated_skips_blank_action_items() {
        let items = vec![
            item("Dev", "fix the build", SentimentColor::Red),
            item("QA", "", SentimentColor::Green),
            item("PM", "   \n", SentimentColor::Yellow),
        ];
        let actions = consolidated(&items);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].who_am_i, "Dev");
    }

    #[test]
    fn markdown_contains_one_section_per_action() {
        let items = vec![
            item("Dev", "fix the build", SentimentColor::Red),
            item("QA", "add regression tests", SentimentColor::Yellow),
            item("PM", "", SentimentColor::Green),
        ];
        let doc = render_markdown("Sprint 1", &items);
        assert!(doc.starts_with("# Action Items — Sprint 1"));
        assert_eq!(doc.matches("## ").count(), 2);
        assert!(doc.contains("fix the build"));
        assert!(doc.contains("Change This"));
        assert!(doc.contains("add regression tests"));
        assert!(!doc.contains("PM"));
    }

    #[test]
    fn markdown_for_empty_list_has_placeholder() {
        let doc = render_markdown("Sprint 1", &[]);
        assert!(doc.contains("No action items yet"));
    }

    #[test]
    fn filename_slugifies_the_sprint_name() {
        assert_eq!(export_filename("Sprint 1"), "action-items-sprint-1.md");
        assert_eq!(
            export_filename("  Q3 / wrap-up!  "),
            "action-items-q3-wrap-up.md"
        );
        assert_eq!(export_filename("!!!"), "action-items.md");
    }
}
