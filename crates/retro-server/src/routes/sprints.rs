use axum::extract::{Path, State};
use axum::Json;
use retro_core::cache::QueryKey;
use retro_core::sprint::Sprint;
use retro_core::validate::SprintDraft;
use retro_core::RetroError;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/sprints — all sprints, newest first.
pub async fn list_sprints(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let cache = app.cache.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut cache = cache
            .lock()
            .map_err(|_| RetroError::Store("cache lock poisoned".into()))?;
        cache.get_or_fetch(QueryKey::Sprints, || {
            let sprints = Sprint::list(&store)?;
            Ok(serde_json::to_value(sprints)?)
        })
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/sprints — create a sprint and return the resolved entity.
pub async fn create_sprint(
    State(app): State<AppState>,
    Json(draft): Json<SprintDraft>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let cache = app.cache.clone();
    let result = tokio::task::spawn_blocking(move || {
        draft.validate().map_err(RetroError::Validation)?;
        let sprint = Sprint::create(&store, &draft.name)?;
        tracing::info!(sprint_id = %sprint.id, name = %sprint.name, "sprint created");

        let mut cache = cache
            .lock()
            .map_err(|_| RetroError::Store("cache lock poisoned".into()))?;
        cache.invalidate(&QueryKey::Sprints);
        Ok::<_, RetroError>(serde_json::to_value(sprint)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify();
    Ok(Json(result))
}

/// DELETE /api/sprints/:id — delete the sprint and every item it owns.
pub async fn delete_sprint(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let cache = app.cache.clone();
    let result = tokio::task::spawn_blocking(move || {
        Sprint::delete_cascade(&store, &id)?;
        tracing::info!(sprint_id = %id, "sprint deleted");

        let mut cache = cache
            .lock()
            .map_err(|_| RetroError::Store("cache lock poisoned".into()))?;
        cache.invalidate(&QueryKey::Sprints);
        cache.invalidate_all_items();
        Ok::<_, RetroError>(serde_json::json!({ "deleted": id }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify();
    Ok(Json(result))
}
