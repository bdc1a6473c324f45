use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use retro_core::export;
use retro_core::item::RetroItem;
use retro_core::sprint::Sprint;
use retro_core::RetroError;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct SprintQuery {
    pub sprint_id: Option<String>,
}

/// GET /api/action-items?sprint_id=S — the consolidated view: every item of
/// the sprint with a non-blank action-items field, plus the id of the
/// originating note for the jump-back affordance.
pub async fn list_action_items(
    State(app): State<AppState>,
    Query(query): Query<SprintQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let result = tokio::task::spawn_blocking(move || {
        let items = RetroItem::list(&store, query.sprint_id.as_deref())?;
        let list: Vec<serde_json::Value> = export::consolidated(&items)
            .iter()
            .map(|item| {
                serde_json::json!({
                    "itemId": item.id,
                    "whoAmI": item.who_am_i,
                    "actionItems": item.action_items,
                    "color": item.color,
                    "colorLabel": item.color.label(),
                })
            })
            .collect();
        Ok::<_, RetroError>(serde_json::json!(list))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/action-items/export?sprint_id=S — the consolidated list as a
/// downloadable Markdown document.
pub async fn export_action_items(
    State(app): State<AppState>,
    Query(query): Query<SprintQuery>,
) -> Result<Response, AppError> {
    let store = app.store.clone();
    let (filename, document) = tokio::task::spawn_blocking(move || {
        let sprint_id = query
            .sprint_id
            .filter(|s| !s.is_empty())
            .ok_or(RetroError::SprintIdRequired("export action items"))?;
        let sprint = Sprint::list(&store)?
            .into_iter()
            .find(|s| s.id == sprint_id)
            .ok_or_else(|| RetroError::SprintNotFound(sprint_id.clone()))?;

        let items = RetroItem::list(&store, Some(&sprint_id))?;
        let document = export::render_markdown(&sprint.name, &items);
        Ok::<_, RetroError>((export::export_filename(&sprint.name), document))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        document,
    )
        .into_response())
}
