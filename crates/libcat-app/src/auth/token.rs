use std::{
    collections::HashSet,
    task::{Context, Poll},
};

use crate::state::AppState;
use axum::{
    extract::{FromRequestParts, Request},
    response::{IntoResponse, Response},
    RequestPartsExt,
};
use axum_extra::TypedHeader;
use futures::future::BoxFuture;
use headers::{authorization::Bearer, Authorization as AuthorizationHeader};
use http::{request::Parts, StatusCode};
use libcat_types::claim::{ApiClaim, Authorization as _, Role};
use tower::{Layer, Service};
use tower_cookies::Cookies;
use tracing::{debug, error, warn};

use super::TOKEN_COOKIE_NAME;

/// Looks for token in `Authorization: Bearer` header first, then in token cookie
async fn find_token(parts: &mut Parts) -> Option<String> {
    let header_token = parts
        .extract::<TypedHeader<AuthorizationHeader<Bearer>>>()
        .await
        .ok()
        .map(|h| h.0.token().to_string());
    if header_token.is_some() {
        return header_token;
    }

    match parts.extract::<Cookies>().await {
        Ok(cookies) => cookies.get(TOKEN_COOKIE_NAME).map(|t| t.value().to_string()),
        Err(e) => {
            error!("Cannot get cookies: {}", e.1);
            None
        }
    }
}

fn validate_token(token: &str, state: &AppState) -> Result<ApiClaim, StatusCode> {
    state.tokens().validate::<ApiClaim>(token).map_err(|e| {
        if e.is_expired() {
            debug!("Token expired");
        } else {
            warn!("Failed to validate token: {}", e);
        }
        StatusCode::UNAUTHORIZED
    })
}

impl FromRequestParts<AppState> for ApiClaim {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claim) = parts.extensions.get::<ApiClaim>() {
            return Ok(claim.clone());
        }

        match find_token(parts).await {
            Some(token) => validate_token(&token, state),
            None => {
                debug!("No token found");
                Err(StatusCode::UNAUTHORIZED)
            }
        }
    }
}

/// Validates token if request carries one and stores claim in request extensions.
///
/// Requests without token pass through as anonymous, requests with invalid or expired
/// token are rejected with 401.
#[derive(Clone)]
pub struct TokenLayer {
    state: AppState,
}

impl TokenLayer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for TokenLayer {
    type Service = TokenService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TokenService {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct TokenService<S> {
    inner: S,
    state: AppState,
}

impl<S> Service<Request> for TokenService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let state = self.state.clone();
        // ready service must be used for this call
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move {
            let (mut parts, body) = request.into_parts();
            if let Some(token) = find_token(&mut parts).await {
                match validate_token(&token, &state) {
                    Ok(claim) => {
                        parts.extensions.insert(claim);
                    }
                    Err(status) => return Ok(status.into_response()),
                }
            }
            inner.call(Request::from_parts(parts, body)).await
        })
    }
}

/// Lets request pass only if token claim (set by [`TokenLayer`]) has at least one of the roles
#[derive(Clone)]
pub struct RequiredRolesLayer {
    roles: HashSet<Role>,
}

impl RequiredRolesLayer {
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
        }
    }
}

impl<S> Layer<S> for RequiredRolesLayer {
    type Service = RequiredRolesService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequiredRolesService {
            inner,
            roles: self.roles.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RequiredRolesService<S> {
    inner: S,
    roles: HashSet<Role>,
}

fn check_roles(roles: &HashSet<Role>, claim: Option<&ApiClaim>) -> Result<(), StatusCode> {
    match claim {
        None => Err(StatusCode::UNAUTHORIZED),
        Some(claim) if roles.is_empty() || claim.has_any_role(roles) => Ok(()),
        Some(claim) => {
            debug!("User {} lacks any of required roles {:?}", claim.sub, roles);
            Err(StatusCode::FORBIDDEN)
        }
    }
}

impl<S> Service<Request> for RequiredRolesService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        match check_roles(&self.roles, request.extensions().get::<ApiClaim>()) {
            Ok(()) => {
                let fut = self.inner.call(request);
                Box::pin(fut)
            }
            Err(status) => Box::pin(futures::future::ready(Ok(status.into_response()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_check() {
        let roles = HashSet::from([Role::Admin, Role::Trusted]);
        let trusted = ApiClaim::new_expired("1", &[Role::Trusted]);
        let plain = ApiClaim::new_expired("2", &[]);

        assert_eq!(check_roles(&roles, None), Err(StatusCode::UNAUTHORIZED));
        assert_eq!(check_roles(&roles, Some(&trusted)), Ok(()));
        assert_eq!(
            check_roles(&roles, Some(&plain)),
            Err(StatusCode::FORBIDDEN)
        );
        assert_eq!(check_roles(&HashSet::new(), Some(&plain)), Ok(()));
    }
}
