use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use videmaison::{Error, RepositoryProvider, SecurityState};
use videmaison_core::security::{RateLimitDecision, RateLimiter};

use crate::{
    AppState,
    error::ApiError,
    extractors::{ClientIp, bearer_token},
};

pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Verifies a bearer access token, when present, and stores its claims in the
/// request extensions. Never rejects; routes opt in with `AuthUser`.
pub async fn auth_middleware<R>(
    State(state): State<AppState<R>>,
    mut request: Request,
    next: Next,
) -> Response
where
    R: RepositoryProvider,
{
    if let Some(token) = bearer_token(request.headers()) {
        match state.app.auth().authenticate(&token) {
            Ok(claims) => {
                request.extensions_mut().insert(claims);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid bearer token");
            }
        }
    }

    next.run(request).await
}

/// Which limiter guards a route, and how its key is derived from the client IP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitScope {
    GeneralApi,
    Registration,
    Login,
}

impl LimitScope {
    pub fn key(&self, ip: &str) -> String {
        match self {
            LimitScope::GeneralApi => ip.to_string(),
            LimitScope::Registration => format!("register:{ip}"),
            LimitScope::Login => format!("login:{ip}"),
        }
    }

    fn limiter<'a>(&self, security: &'a SecurityState) -> &'a RateLimiter {
        match self {
            LimitScope::GeneralApi => security.general_api(),
            LimitScope::Registration => security.registration(),
            LimitScope::Login => security.login(),
        }
    }
}

async fn enforce<R>(
    state: &AppState<R>,
    scope: LimitScope,
    ClientIp(ip): ClientIp,
    request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    R: RepositoryProvider,
{
    let decision = scope.limiter(state.app.security()).check(&scope.key(&ip));

    match decision {
        RateLimitDecision::Allowed => {}
        RateLimitDecision::Escalated { .. } => {
            tracing::warn!(ip = %ip, scope = ?scope, "IP blocked for rate limit violation");
        }
        RateLimitDecision::Limited { .. } => {
            tracing::warn!(ip = %ip, scope = ?scope, "Rate limit exceeded");
        }
        RateLimitDecision::Blocked { .. } => {
            tracing::debug!(ip = %ip, scope = ?scope, "Request from blocked IP");
        }
    }
    decision.into_result().map_err(Error::from)?;

    Ok(next.run(request).await)
}

pub async fn limit_general_api<R>(
    State(state): State<AppState<R>>,
    ip: ClientIp,
    request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    R: RepositoryProvider,
{
    enforce(&state, LimitScope::GeneralApi, ip, request, next).await
}

pub async fn limit_registration<R>(
    State(state): State<AppState<R>>,
    ip: ClientIp,
    request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    R: RepositoryProvider,
{
    enforce(&state, LimitScope::Registration, ip, request, next).await
}

pub async fn limit_login<R>(
    State(state): State<AppState<R>>,
    ip: ClientIp,
    request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    R: RepositoryProvider,
{
    enforce(&state, LimitScope::Login, ip, request, next).await
}

/// Rejects state-changing requests without a live token in `X-CSRF-Token`.
pub async fn require_csrf<R>(
    State(state): State<AppState<R>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    R: RepositoryProvider,
{
    if matches!(*request.method(), Method::POST | Method::PUT | Method::DELETE) {
        let valid = request
            .headers()
            .get(CSRF_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|token| state.app.security().csrf().validate(token));

        if !valid {
            tracing::warn!(method = %request.method(), path = %request.uri().path(), "Missing or invalid CSRF token");
            return Err(ApiError::InvalidCsrfToken);
        }
    }

    Ok(next.run(request).await)
}
