//! Authentication routes
//!
//! Registration, login, logout and the current-session lookup. The session
//! token travels in the `token` cookie and may also be sent in the
//! `Authorization` header.

use crate::auth::{removal_cookie, session_cookie, Session, SESSION_COOKIE};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use lnd_shared::{
    LoginRequest, LoginResponse, MeResponse, MessageResponse, RegisterRequest, RegisterResponse,
};

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// Register a new user
///
/// POST /auth/register
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(req) = payload?;
    let user_id = state
        .auth()
        .register(&req.username, &req.email, &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created".to_string(),
            user_id: user_id.to_string(),
        }),
    ))
}

/// Login with email and password
///
/// POST /auth/login
///
/// Any session cookie already on the request is revoked and cleared, even
/// when the new credentials turn out to be wrong.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginResponse>), (CookieJar, ApiError)> {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return Err((jar, rejection.into())),
    };
    let secure = state.config().cookie.secure;
    let presented = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty());

    let jar = match presented {
        Some(_) => jar.remove(removal_cookie(secure)),
        None => jar,
    };

    match state
        .auth()
        .login(&req.email, &req.password, presented.as_deref())
        .await
    {
        Ok(token) => Ok((
            jar.add(session_cookie(token.clone(), secure)),
            Json(LoginResponse { token }),
        )),
        Err(err) => Err((jar, err)),
    }
}

/// Revoke the current session
///
/// POST /auth/logout
async fn logout(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<MessageResponse>)> {
    state.auth().logout(&session.token).await?;

    let jar = jar.remove(removal_cookie(state.config().cookie.secure));
    Ok((jar, Json(MessageResponse::new("Logged out successfully"))))
}

/// Identity behind the current session
///
/// GET /auth/me
async fn me(session: Session) -> Json<MeResponse> {
    let identity = session.identity;
    Json(MeResponse {
        name: identity.display_name,
        user_id: identity.subject_id,
        email: identity.email,
    })
}
