use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use videmaison::{
    MessageId, NewServiceRequest, RepositoryProvider, RequestStatus, ServiceRequestId, UserId,
};
use videmaison_core::{error::ValidationError, validation::require_fields};

use crate::{
    AppState,
    error::{ApiError, Result},
    extractors::{AdminUser, AuthUser, BearerToken},
    middleware::{auth_middleware, limit_general_api, limit_login, limit_registration, require_csrf},
    types::*,
    ws::ws_handler,
};

pub fn create_router<R>(state: AppState<R>) -> Router
where
    R: RepositoryProvider,
{
    let csrf = || from_fn_with_state(state.clone(), require_csrf::<R>);

    let auth_routes = Router::new()
        .route(
            "/register",
            post(register_handler::<R>)
                .layer(from_fn_with_state(state.clone(), limit_registration::<R>)),
        )
        .route(
            "/login",
            post(login_handler::<R>).layer(from_fn_with_state(state.clone(), limit_login::<R>)),
        )
        .route("/refresh", post(refresh_handler::<R>))
        .route("/profile", get(profile_handler::<R>))
        .route("/logout", post(logout_handler))
        .route("/csrf", get(csrf_handler::<R>));

    let service_routes = Router::new()
        .route(
            "/request",
            post(submit_request_handler::<R>)
                .layer(from_fn_with_state(state.clone(), limit_general_api::<R>)),
        )
        .route("/types", get(service_types_handler::<R>));

    let admin_routes = Router::new()
        .route("/requests", get(list_requests_handler::<R>))
        .route("/requests/unread-count", get(unread_count_handler::<R>))
        .route("/requests/{id}", get(get_request_handler::<R>))
        .route(
            "/requests/{id}/read",
            put(mark_request_read_handler::<R>).layer(csrf()),
        )
        .route(
            "/requests/{id}/status",
            put(update_status_handler::<R>).layer(csrf()),
        )
        .route("/dashboard/stats", get(dashboard_stats_handler::<R>));

    let chat_routes = Router::new()
        .route(
            "/messages/{id}",
            post(send_message_handler::<R>)
                .layer(csrf())
                .get(conversation_handler::<R>),
        )
        .route(
            "/messages/{id}/read",
            put(mark_message_read_handler::<R>).layer(csrf()),
        );

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/services", service_routes)
        .nest("/admin", admin_routes)
        .nest("/chat", chat_routes)
        .layer(from_fn_with_state(state.clone(), auth_middleware::<R>));

    Router::new()
        .nest("/api", api)
        .route("/ws", get(ws_handler::<R>))
        .route("/health", get(health_handler::<R>))
        .with_state(state)
}

async fn health_handler<R>(State(state): State<AppState<R>>) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state.app.health_check().await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

async fn register_handler<R>(
    State(state): State<AppState<R>>,
    WithRejection(Json(body), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    require_fields(&[
        ("email", body.email.as_deref()),
        ("password", body.password.as_deref()),
    ])
    .map_err(videmaison::Error::from)?;

    let user = state
        .app
        .auth()
        .register(
            body.email.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
            body.first_name.as_deref(),
            body.last_name.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user: UserSummary::from(&user),
        }),
    ))
}

async fn login_handler<R>(
    State(state): State<AppState<R>>,
    WithRejection(Json(body), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let (Some(email), Some(password)) = (
        body.email.as_deref().filter(|v| !v.trim().is_empty()),
        body.password.as_deref().filter(|v| !v.is_empty()),
    ) else {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    };

    let outcome = state.app.auth().login(email, password).await?;

    Ok(Json(LoginResponse {
        user: UserSummary::from(&outcome.user),
        access_token: outcome.access_token,
        refresh_token: outcome.refresh_token,
    }))
}

async fn refresh_handler<R>(
    State(state): State<AppState<R>>,
    BearerToken(token): BearerToken,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let token = token.ok_or(ApiError::Unauthorized)?;
    let access_token = state.app.auth().refresh(&token).await?;

    Ok(Json(RefreshResponse { access_token }))
}

async fn profile_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let user = state.app.auth().profile(&claims.user_id()).await?;
    Ok(Json(ProfileResponse::from(&user)))
}

async fn logout_handler(AuthUser(_claims): AuthUser) -> Result<impl IntoResponse> {
    Ok(Json(MessageResponse::new("Successfully logged out")))
}

async fn csrf_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let csrf_token = state.app.security().csrf().issue(&claims.sub);
    Ok(Json(CsrfTokenResponse { csrf_token }))
}

async fn submit_request_handler<R>(
    State(state): State<AppState<R>>,
    WithRejection(Json(form), _): WithRejection<Json<NewServiceRequest>, ApiError>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let request = state.app.service_requests().submit(form).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            message: "Service request submitted successfully".to_string(),
            request_id: request.id,
        }),
    ))
}

async fn service_types_handler<R>(State(state): State<AppState<R>>) -> impl IntoResponse
where
    R: RepositoryProvider,
{
    Json(state.app.service_requests().service_types())
}

async fn list_requests_handler<R>(
    State(state): State<AppState<R>>,
    _admin: AdminUser,
    WithRejection(Query(query), _): WithRejection<Query<RequestListQuery>, ApiError>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(raw.parse::<RequestStatus>().map_err(|_| {
            videmaison::Error::from(ValidationError::InvalidField(format!(
                "Unknown status filter: {raw}"
            )))
        })?),
        None => None,
    };

    let page = state
        .app
        .service_requests()
        .list(query.page(), status)
        .await?;

    Ok(Json(RequestListResponse::from(page)))
}

async fn unread_count_handler<R>(
    State(state): State<AppState<R>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let unread_count = state.app.service_requests().unread_count().await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

async fn get_request_handler<R>(
    State(state): State<AppState<R>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let request = state
        .app
        .service_requests()
        .get(&ServiceRequestId::new(&id))
        .await?;
    Ok(Json(request))
}

async fn mark_request_read_handler<R>(
    State(state): State<AppState<R>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state
        .app
        .service_requests()
        .mark_read(&ServiceRequestId::new(&id))
        .await?;
    Ok(Json(MessageResponse::new("Request marked as read")))
}

async fn update_status_handler<R>(
    State(state): State<AppState<R>>,
    AdminUser(claims): AdminUser,
    Path(id): Path<String>,
    WithRejection(Json(body), _): WithRejection<Json<StatusUpdateRequest>, ApiError>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    require_fields(&[("status", body.status.as_deref())]).map_err(videmaison::Error::from)?;
    let status = body.status.as_deref().unwrap_or_default();

    state
        .app
        .service_requests()
        .update_status(&ServiceRequestId::new(&id), status, body.admin_notes.as_deref())
        .await?;

    tracing::info!(request_id = %id, status = %status, admin = %claims.sub, "Service request status updated");
    Ok(Json(MessageResponse::new("Request updated successfully")))
}

async fn dashboard_stats_handler<R>(
    State(state): State<AppState<R>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let stats = state
        .app
        .service_requests()
        .dashboard_stats(Utc::now())
        .await?;
    Ok(Json(stats))
}

async fn send_message_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(claims): AuthUser,
    Path(receiver_id): Path<String>,
    WithRejection(Json(body), _): WithRejection<Json<SendMessageRequest>, ApiError>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let message = state
        .app
        .chat()
        .send_message(
            &claims.user_id(),
            &UserId::new(&receiver_id),
            body.content.as_deref().unwrap_or_default(),
            body.message_type.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

async fn conversation_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(claims): AuthUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let messages = state
        .app
        .chat()
        .conversation(&claims.user_id(), &UserId::new(&user_id))
        .await?;
    Ok(Json(messages))
}

async fn mark_message_read_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(_claims): AuthUser,
    Path(message_id): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state
        .app
        .chat()
        .mark_read(&MessageId::new(&message_id))
        .await?;
    Ok(Json(MessageResponse::new("Message marked as read")))
}
