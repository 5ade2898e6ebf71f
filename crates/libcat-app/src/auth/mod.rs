use crate::{error::ApiResult, state::AppState};
use axum::{
    extract::{FromRequest as _, State},
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Form, Json,
};
use axum_valid::Garde;
use cookie::{Cookie, Expiration, SameSite};
use garde::Validate;
use http::StatusCode;
use libcat_dal::user::{CreateUser, UserRepository};
use libcat_types::{claim::ApiClaim, general::ValidEmail, validation::rules};
use time::OffsetDateTime;
use tower_cookies::Cookies;
use tracing::{debug, error, info};

pub mod token;

pub const TOKEN_COOKIE_NAME: &str = "libcat_token";

/// Self registration, account gets no roles
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Registration {
    #[garde(length(min = 3, max = 150), custom(rules::username))]
    pub name: String,
    #[garde(dive)]
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub email: ValidEmail,
    #[garde(length(min = 8, max = 255))]
    pub password: String,
}

impl From<Registration> for CreateUser {
    fn from(value: Registration) -> Self {
        CreateUser {
            name: value.name,
            email: value.email,
            password: Some(value.password),
            roles: None,
        }
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(post, path = "/register", tag = "Auth", operation_id = "register",
    request_body = Registration,
    responses((status = StatusCode::CREATED, description = "Registered new user", body = libcat_dal::user::User))))]
pub async fn register(
    user_registry: UserRepository,
    Garde(Json(payload)): Garde<Json<Registration>>,
) -> ApiResult<impl IntoResponse> {
    let user = user_registry.create(payload.into()).await?;
    info!("Registered user {}", user.name);
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(serde::Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginCredentials {
    email: String,
    password: String,
}

#[cfg_attr(feature = "openapi", utoipa::path(post, path = "/login", tag = "Auth", operation_id = "login",
    request_body = LoginCredentials,
    responses((status = StatusCode::OK, description = "Signed API token, also set as cookie", body = String))))]
pub async fn login(
    State(state): State<AppState>,
    user_registry: UserRepository,
    cookies: Cookies,
    request: axum::extract::Request,
) -> Result<impl IntoResponse, StatusCode> {
    let content_type = request
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::BAD_REQUEST)?;
    let credentials = if content_type.starts_with("application/json") {
        let Json(data) = Json::<LoginCredentials>::from_request(request, &())
            .await
            .map_err(|e| {
                error!("Failed to get login credentials: {e}");
                StatusCode::BAD_REQUEST
            })?;
        data
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(data) = Form::<LoginCredentials>::from_request(request, &())
            .await
            .map_err(|e| {
                error!("Failed to get login credentials: {e}");
                StatusCode::BAD_REQUEST
            })?;
        data
    } else {
        return Err(StatusCode::BAD_REQUEST);
    };

    let email = credentials.email.trim().to_lowercase();
    let user = user_registry
        .check_password(&email, &credentials.password)
        .await
        .map_err(|e| {
            debug!("Login of {email} failed: {e}");
            StatusCode::UNAUTHORIZED
        })?;

    let claim = ApiClaim::new_expired(user.id.to_string(), &user.roles);
    let signed_token = state.tokens().issue(claim).map_err(|e| {
        error!("Failed to issue token: {e}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let cookie = Cookie::build((TOKEN_COOKIE_NAME, signed_token.clone()))
        .http_only(true)
        .secure(true)
        .path("/")
        .same_site(SameSite::Lax)
        .expires(Expiration::DateTime(
            OffsetDateTime::now_utc() + state.tokens().default_validity(),
        ));
    cookies.add(cookie.into());
    debug!("User {} logged in", user.id);

    Ok(signed_token)
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/logout", tag = "Auth", operation_id = "logout",
    responses((status = StatusCode::TEMPORARY_REDIRECT, description = "Token cookie removed"))))]
pub async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<impl IntoResponse, StatusCode> {
    let redirect_url = state.build_url("/").map_err(|e| {
        error!("Failed to build redirect URL: {e}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    cookies.remove(Cookie::build((TOKEN_COOKIE_NAME, "")).path("/").into());

    Ok(Redirect::temporary(redirect_url.as_str()))
}

/// Builds authentication router - must be nested on /auth path!
pub fn auth_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
}

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;
    #[derive(utoipa::OpenApi)]
    #[openapi(paths(register, login, logout))]
    struct ApiDocs;
    ApiDocs::openapi()
}
