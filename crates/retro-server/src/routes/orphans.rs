use axum::extract::State;
use axum::Json;
use retro_core::cache::QueryKey;
use retro_core::migrate;
use retro_core::RetroError;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/orphans — how many legacy items lack a sprint.
pub async fn orphan_count(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let cache = app.cache.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut cache = cache
            .lock()
            .map_err(|_| RetroError::Store("cache lock poisoned".into()))?;
        cache.get_or_fetch(QueryKey::OrphanCount, || {
            let count = migrate::count_orphaned(&store)?;
            Ok(serde_json::json!({ "count": count }))
        })
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignBody {
    pub sprint_id: String,
}

/// POST /api/orphans/assign — move every orphaned item into the given
/// sprint, atomically.
pub async fn assign_orphans(
    State(app): State<AppState>,
    Json(body): Json<AssignBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let cache = app.cache.clone();
    let result = tokio::task::spawn_blocking(move || {
        let assigned = migrate::assign_orphaned(&store, &body.sprint_id)?;

        let mut cache = cache
            .lock()
            .map_err(|_| RetroError::Store("cache lock poisoned".into()))?;
        cache.invalidate(&QueryKey::OrphanCount);
        cache.invalidate(&QueryKey::Items(body.sprint_id.clone()));
        Ok::<_, RetroError>(serde_json::json!({ "assigned": assigned }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify();
    Ok(Json(result))
}
