use axum::extract::{Path, Query, State};
use axum::Json;
use retro_core::cache::QueryKey;
use retro_core::item::RetroItem;
use retro_core::store::Collection;
use retro_core::validate::{ItemDraft, ItemPatch};
use retro_core::RetroError;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct ItemsQuery {
    pub sprint_id: Option<String>,
}

/// GET /api/items?sprint_id=S — items of one sprint, newest first. Without
/// the parameter the query is skipped and an empty list returned; there is
/// no "all items" fallback.
pub async fn list_items(
    State(app): State<AppState>,
    Query(query): Query<ItemsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Some(sprint_id) = query.sprint_id.filter(|s| !s.is_empty()) else {
        return Ok(Json(serde_json::json!([])));
    };

    let store = app.store.clone();
    let cache = app.cache.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut cache = cache
            .lock()
            .map_err(|_| RetroError::Store("cache lock poisoned".into()))?;
        cache.get_or_fetch(QueryKey::Items(sprint_id.clone()), || {
            let items = RetroItem::list(&store, Some(&sprint_id))?;
            Ok(serde_json::to_value(items)?)
        })
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemBody {
    pub sprint_id: String,
    #[serde(flatten)]
    pub draft: ItemDraft,
}

/// POST /api/items — validate a draft and add it to its sprint.
pub async fn create_item(
    State(app): State<AppState>,
    Json(body): Json<CreateItemBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let cache = app.cache.clone();
    let result = tokio::task::spawn_blocking(move || {
        body.draft.validate().map_err(RetroError::Validation)?;
        let item = RetroItem::create(&store, &body.draft, &body.sprint_id)?;
        tracing::info!(item_id = %item.id, sprint_id = %body.sprint_id, "item created");

        let mut cache = cache
            .lock()
            .map_err(|_| RetroError::Store("cache lock poisoned".into()))?;
        cache.invalidate(&QueryKey::Items(body.sprint_id.clone()));
        Ok::<_, RetroError>(serde_json::to_value(item)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify();
    Ok(Json(result))
}

/// PATCH /api/items/:id — update the supplied fields of one item.
pub async fn update_item(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ItemPatch>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let cache = app.cache.clone();
    let result = tokio::task::spawn_blocking(move || {
        patch.validate().map_err(RetroError::Validation)?;
        RetroItem::update(&store, &id, &patch)?;
        tracing::info!(item_id = %id, "item updated");

        let mut cache = cache
            .lock()
            .map_err(|_| RetroError::Store("cache lock poisoned".into()))?;
        match owning_sprint(&store, &id)? {
            Some(sprint_id) => cache.invalidate(&QueryKey::Items(sprint_id)),
            None => cache.invalidate_all_items(),
        }
        Ok::<_, RetroError>(serde_json::json!({ "updated": id }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify();
    Ok(Json(result))
}

/// DELETE /api/items/:id — remove one item.
pub async fn delete_item(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let cache = app.cache.clone();
    let result = tokio::task::spawn_blocking(move || {
        // Look up the owner before the document disappears so only its
        // sprint's list is refetched.
        let owner = owning_sprint(&store, &id)?;
        RetroItem::delete(&store, &id)?;
        tracing::info!(item_id = %id, "item deleted");

        let mut cache = cache
            .lock()
            .map_err(|_| RetroError::Store("cache lock poisoned".into()))?;
        match owner {
            Some(sprint_id) => cache.invalidate(&QueryKey::Items(sprint_id)),
            None => cache.invalidate_all_items(),
        }
        Ok::<_, RetroError>(serde_json::json!({ "deleted": id }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify();
    Ok(Json(result))
}

fn owning_sprint(
    store: &retro_core::store::DocStore,
    item_id: &str,
) -> Result<Option<String>, RetroError> {
    Ok(store
        .get(Collection::RetroItems, item_id)?
        .and_then(|doc| doc.get("sprintId").and_then(|v| v.as_str()).map(String::from)))
}
