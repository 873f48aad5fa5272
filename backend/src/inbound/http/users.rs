//! Account and session handlers.
//!
//! ```text
//! POST /api/users  {"username":"ada","email":"ada@example.com","password":"..."}
//! POST /api/login  {"email":"ada@example.com","password":"..."}
//! POST /api/logout
//! GET  /api/users/{username}
//! GET  /api/me
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde_json::json;
use tracing::debug;

use crate::domain::{
    Error, LoginCredentials, LoginValidationError, Registration, RegistrationValidationError,
    UserValidationError, Username,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{LoginRequest, RegisterRequest, UserResponse};
use crate::inbound::http::session::{
    CurrentUser, expired_session_cookie, session_cookie, session_token,
};
use crate::inbound::http::state::HttpState;

fn field_error(message: String, field: &str, code: &str) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

fn map_user_validation_error(err: UserValidationError) -> Error {
    let (field, code) = match err {
        UserValidationError::EmptyUsername => ("username", "empty_username"),
        UserValidationError::UsernameTooLong { .. } => ("username", "username_too_long"),
        UserValidationError::UsernameInvalidCharacters => ("username", "invalid_username"),
        UserValidationError::EmptyEmail => ("email", "empty_email"),
        UserValidationError::InvalidEmail => ("email", "invalid_email"),
        UserValidationError::EmailTooLong { .. } => ("email", "email_too_long"),
        UserValidationError::EmptyId | UserValidationError::InvalidId => ("id", "invalid_id"),
    };
    field_error(err.to_string(), field, code)
}

fn map_registration_error(err: RegistrationValidationError) -> Error {
    let code = match &err {
        RegistrationValidationError::User(inner) => {
            return map_user_validation_error(inner.clone());
        }
        RegistrationValidationError::EmptyPassword => "empty_password",
        RegistrationValidationError::PasswordTooShort { .. } => "password_too_short",
        RegistrationValidationError::PasswordInvalidCharacters => "invalid_password",
    };
    field_error(err.to_string(), "password", code)
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyEmail => {
            field_error(err.to_string(), "email", "empty_email")
        }
        LoginValidationError::EmptyPassword => {
            field_error(err.to_string(), "password", "empty_password")
        }
    }
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username or email already registered", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security([])
)]
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        username,
        email,
        password,
    } = payload.into_inner();
    let registration = Registration::try_from_parts(&username, &email, &password)
        .map_err(map_registration_error)?;
    let user = state.identity.register(registration).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Authenticate and establish a session.
///
/// Unknown email and wrong password produce the same `401`.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserResponse,
            headers(("Set-Cookie" = String, description = "session_id cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(map_login_validation_error)?;
    let outcome = state.identity.login(&credentials).await?;
    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&outcome.token, state.cookie_secure))
        .json(UserResponse::from(outcome.user)))
}

/// Drop the caller's session. Succeeds even without one.
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 204, description = "Session cleared"),
        (status = 503, description = "Session store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(state: web::Data<HttpState>, req: HttpRequest) -> ApiResult<HttpResponse> {
    if let Some(token) = session_token(&req) {
        state.identity.logout(&token).await?;
    } else {
        debug!("logout without session cookie");
    }
    Ok(HttpResponse::NoContent()
        .cookie(expired_session_cookie(state.cookie_secure))
        .finish())
}

/// Public profile lookup.
#[utoipa::path(
    get,
    path = "/api/users/{username}",
    params(("username" = String, Path, description = "Account handle")),
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{username}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    _viewer: CurrentUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let raw = path.into_inner();
    let username =
        Username::new(raw.as_str()).map_err(|_| Error::not_found(format!("user {raw} not found")))?;
    let user = state.profiles.by_username(&username).await?;
    Ok(web::Json(user.into()))
}

/// The caller's own profile.
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    viewer: CurrentUser,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state.profiles.by_id(&viewer.id).await?;
    Ok(web::Json(user.into()))
}
