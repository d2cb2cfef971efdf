//! 선호도 저장/조회 endpoint.
//!
//! 저장 시 생성 캐시(`generate:*`)가 무효화됩니다.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use insight_core::{resolve_user_id, PreferenceDocument, PreferencesInput};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::error::{into_api_error, ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// `user_id` 쿼리 (생략 시 `default_user`).
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UserQuery {
    pub user_id: Option<String>,
}

/// 저장 확인 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomizeConfirmation {
    pub status: String,
    pub user_id: String,
    pub saved: PreferenceDocument,
}

/// 선호도 조회 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PreferencesResponse {
    pub user_id: String,
    pub preferences: PreferenceDocument,
}

/// 선호도 저장 (upsert).
#[utoipa::path(
    post,
    path = "/api/customize",
    request_body = PreferencesInput,
    responses(
        (status = 200, description = "저장 완료", body = CustomizeConfirmation),
        (status = 422, description = "허용되지 않는 값"),
        (status = 500, description = "저장소 미설정", body = ApiErrorResponse)
    ),
    tag = "preferences"
)]
pub async fn save_preferences(
    State(state): State<Arc<AppState>>,
    Json(input): Json<PreferencesInput>,
) -> ApiResult<Json<CustomizeConfirmation>> {
    let service = state.generation_service().map_err(into_api_error)?;
    let saved = service
        .save_preferences(input)
        .await
        .map_err(into_api_error)?;

    Ok(Json(CustomizeConfirmation {
        status: "ok".to_string(),
        user_id: saved.user_id.clone(),
        saved,
    }))
}

/// 저장된 선호도 조회.
#[utoipa::path(
    get,
    path = "/api/preferences",
    params(UserQuery),
    responses(
        (status = 200, description = "조회 성공", body = PreferencesResponse),
        (status = 404, description = "선호도 없음", body = ApiErrorResponse),
        (status = 500, description = "저장소 미설정", body = ApiErrorResponse)
    ),
    tag = "preferences"
)]
pub async fn get_preferences(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<PreferencesResponse>> {
    let user_id = resolve_user_id(query.user_id.as_deref());
    let service = state.generation_service().map_err(into_api_error)?;
    let preferences = service
        .load_preferences(&user_id)
        .await
        .map_err(into_api_error)?;

    Ok(Json(PreferencesResponse {
        user_id,
        preferences,
    }))
}

pub fn preferences_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/customize", post(save_preferences))
        .route("/api/preferences", get(get_preferences))
}
