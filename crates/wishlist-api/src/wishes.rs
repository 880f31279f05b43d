//! Handlers for the `/api` wish endpoints.
//!
//! | Method | Path | Body | Notes |
//! |--------|------|------|-------|
//! | `GET`  | `/data` | | all three stages |
//! | `POST` | `/wishes` | `{"text":"…"}` | |
//! | `POST` | `/vote` | `{"wishId":n}` | 404 unless pending |
//! | `POST` | `/weekly-check` | | `movedWish` is `null` when nothing moved |
//! | `POST` | `/delete-wish` | `{"wishId":n}` | moderation |
//! | `POST` | `/move-to-implementing` | `{"wishId":n}` | moderation |
//! | `POST` | `/complete` | `{"wishId":n,"url":"…"}` | moderation |

use std::sync::Arc;

use axum::{
  Json,
  extract::{FromRequest, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use wishlist_core::{
  lifecycle::Snapshot,
  store::WishStore,
  wish::{NewWish, WishId},
};

use crate::error::ApiError;

/// JSON request body whose rejections render as [`ApiError::BadRequest`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Body<T>(pub T);

#[derive(Debug, Deserialize)]
pub struct AddBody {
  pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishRef {
  pub wish_id: WishId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteBody {
  pub wish_id: WishId,
  #[serde(default)]
  pub url:     Option<String>,
}

// ─── Public ──────────────────────────────────────────────────────────────────

/// `GET /data`
pub async fn data<S: WishStore>(State(store): State<Arc<S>>) -> Result<Json<Snapshot>, ApiError> {
  let snapshot = store.get_all_data().await.map_err(ApiError::from_store)?;
  Ok(Json(snapshot))
}

/// `POST /wishes`, body: `{"text":"build a dog park"}`
pub async fn add<S: WishStore>(
  State(store): State<Arc<S>>,
  Body(body): Body<AddBody>,
) -> Result<Json<Value>, ApiError> {
  let input = NewWish::new(body.text).map_err(ApiError::from_store)?;
  let wish = store.add_wish(input).await.map_err(ApiError::from_store)?;
  Ok(Json(json!({ "success": true, "wish": wish })))
}

/// `POST /vote`, body: `{"wishId":1700000000000}`
pub async fn vote<S: WishStore>(
  State(store): State<Arc<S>>,
  Body(body): Body<WishRef>,
) -> Result<Json<Value>, ApiError> {
  let votes = store.vote_wish(body.wish_id).await.map_err(ApiError::from_store)?;
  Ok(Json(json!({ "success": true, "votes": votes })))
}

/// `POST /weekly-check`
pub async fn weekly_check<S: WishStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Value>, ApiError> {
  let outcome = store.weekly_check().await.map_err(ApiError::from_store)?;
  Ok(Json(json!({ "success": true, "movedWish": outcome.into_moved_wish() })))
}

// ─── Moderation ──────────────────────────────────────────────────────────────

/// `POST /delete-wish`. Deleting an unknown id is not an error.
pub async fn delete<S: WishStore>(
  State(store): State<Arc<S>>,
  Body(body): Body<WishRef>,
) -> Result<Json<Value>, ApiError> {
  let deleted = store.delete_wish(body.wish_id).await.map_err(ApiError::from_store)?;
  Ok(Json(json!({ "success": true, "deleted": deleted })))
}

/// `POST /move-to-implementing`
pub async fn move_to_implementing<S: WishStore>(
  State(store): State<Arc<S>>,
  Body(body): Body<WishRef>,
) -> Result<Json<Value>, ApiError> {
  let wish = store
    .move_to_implementing(body.wish_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(json!({ "success": true, "wish": wish })))
}

/// `POST /complete`. The `url` may be omitted, `null` or blank.
pub async fn complete<S: WishStore>(
  State(store): State<Arc<S>>,
  Body(body): Body<CompleteBody>,
) -> Result<Json<Value>, ApiError> {
  let wish = store
    .complete_wish(body.wish_id, body.url)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(json!({ "success": true, "wish": wish })))
}
