//! 가입, OTP 검증, 로그인, 세션 조회 endpoint.
//!
//! 전달 채널이 없으므로 가입 응답에 OTP가 포함됩니다.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use insight_core::{NewUser, ServiceError, SessionRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{
    generate_access_token, hash_password, issue_otp, verify_password, CurrentUser,
};
use crate::error::{into_api_error, ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 가입 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(length(max = 100))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// 가입 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignupResponse {
    pub otp: String,
    pub message: String,
}

/// OTP 검증 요청.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

/// 로그인 폼 (`username`은 username 또는 email).
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// 발급된 세션 토큰.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// 사용자 프로필.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub full_name: String,
    pub email: String,
    pub username: Option<String>,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserInfoResponse {
    pub data: UserInfo,
}

/// 가입.
#[utoipa::path(
    post,
    path = "/registration",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "OTP 발급", body = SignupResponse),
        (status = 400, description = "입력값 오류", body = ApiErrorResponse),
        (status = 500, description = "저장소 미설정", body = ApiErrorResponse)
    ),
    tag = "auth"
)]
pub async fn registration(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> ApiResult<Json<SignupResponse>> {
    let accounts = state.account_store().map_err(into_api_error)?;

    payload.validate().map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiErrorResponse::with_details(
                "INVALID_INPUT",
                "Invalid signup request",
                serde_json::to_value(&e).unwrap_or_default(),
            )),
        )
    })?;

    let password_hash = hash_password(&payload.password)
        .map_err(|e| into_api_error(ServiceError::Internal(e.to_string())))?;

    let user = accounts
        .ensure_user(NewUser::new(
            payload.email.trim(),
            Some(&payload.full_name),
            password_hash,
        ))
        .await
        .map_err(into_api_error)?;

    let otp = issue_otp(state.auth.demo_otp.as_deref());
    accounts
        .set_pending_otp(&user.email, &otp)
        .await
        .map_err(into_api_error)?;

    info!(email = %user.email, "OTP issued");

    Ok(Json(SignupResponse {
        otp,
        message: "OTP sent".to_string(),
    }))
}

/// OTP 검증 후 세션 발급.
#[utoipa::path(
    post,
    path = "/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "검증 성공", body = TokenResponse),
        (status = 400, description = "OTP 불일치", body = ApiErrorResponse),
        (status = 404, description = "사용자 없음", body = ApiErrorResponse)
    ),
    tag = "auth"
)]
pub async fn verify_otp(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VerifyOtpRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let accounts = state.account_store().map_err(into_api_error)?;

    let user = accounts
        .find_user_by_email(payload.email.trim())
        .await
        .map_err(into_api_error)?
        .ok_or_else(|| into_api_error(ServiceError::NotFound("User not found".to_string())))?;

    if user.pending_otp.as_deref() != Some(payload.otp.trim()) {
        return Err(into_api_error(ServiceError::InvalidOtp));
    }

    accounts
        .mark_verified(&user.email)
        .await
        .map_err(into_api_error)?;

    let token = start_session(&state, user.identity()).await?;
    info!(email = %user.email, "OTP verified");
    Ok(Json(token))
}

/// username 또는 email로 로그인.
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "로그인 성공", body = TokenResponse),
        (status = 400, description = "자격증명 불일치", body = ApiErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<TokenResponse>> {
    let accounts = state.account_store().map_err(into_api_error)?;

    let user = accounts
        .find_user_by_login(form.username.trim())
        .await
        .map_err(into_api_error)?
        .ok_or_else(|| into_api_error(ServiceError::InvalidCredentials))?;

    verify_password(&form.password, &user.password_hash)
        .map_err(|_| into_api_error(ServiceError::InvalidCredentials))?;

    let token = start_session(&state, user.identity()).await?;
    Ok(Json(token))
}

/// 온보딩 전 사용자인지 여부.
#[utoipa::path(
    get,
    path = "/is_new_user",
    responses(
        (status = 200, description = "온보딩 전이면 true", body = bool),
        (status = 401, description = "인증 실패", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn is_new_user(CurrentUser(user): CurrentUser) -> Json<bool> {
    Json(!user.onboarded)
}

/// 사용자 프로필 조회.
#[utoipa::path(
    get,
    path = "/get_user_info",
    responses(
        (status = 200, description = "프로필", body = UserInfoResponse),
        (status = 401, description = "인증 실패", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn get_user_info(CurrentUser(user): CurrentUser) -> Json<UserInfoResponse> {
    Json(UserInfoResponse {
        data: UserInfo {
            full_name: user.full_name,
            email: user.email,
            username: user.username,
            profile_picture: user.profile_picture,
        },
    })
}

async fn start_session(state: &AppState, identity: &str) -> ApiResult<TokenResponse> {
    let accounts = state.account_store().map_err(into_api_error)?;
    let session = SessionRecord::issue(generate_access_token(), identity, state.auth.session_ttl);

    accounts
        .insert_session(&session)
        .await
        .map_err(into_api_error)?;

    Ok(TokenResponse {
        access_token: session.access_token,
        token_type: "bearer".to_string(),
    })
}

pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/registration", post(registration))
        .route("/verify-otp", post(verify_otp))
        .route("/login", post(login))
        .route("/is_new_user", get(is_new_user))
        .route("/get_user_info", get(get_user_info))
}
