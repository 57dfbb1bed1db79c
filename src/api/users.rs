use axum::{extract::State, routing::get, Router};

use crate::middleware::{ApiError, ApiResponse, Bind, PathId};
use crate::models::{CreateUserRequest, GetUsersQuery, UpdateUserRequest, User, UserList};
use crate::services::UserService;

#[derive(Clone)]
pub struct UsersAppState {
    pub user_service: UserService,
}

pub fn user_routes(user_service: UserService) -> Router {
    let shared_state = UsersAppState { user_service };

    Router::new()
        .route("/", get(get_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .with_state(shared_state)
}

/// Create a new user
pub async fn create_user(
    State(state): State<UsersAppState>,
    Bind(request): Bind<CreateUserRequest>,
) -> Result<ApiResponse<User>, ApiError> {
    let user = state
        .user_service
        .create_user(&request)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create user: {}", e);
            ApiError::Internal(e.to_string())
        })?;

    Ok(ApiResponse::success(user))
}

/// List users with pagination and optional name/email filters
pub async fn get_users(
    State(state): State<UsersAppState>,
    Bind(query): Bind<GetUsersQuery>,
) -> Result<ApiResponse<UserList>, ApiError> {
    let users = state.user_service.get_users(&query).await.map_err(|e| {
        tracing::error!("Failed to list users: {}", e);
        ApiError::Internal(e.to_string())
    })?;

    Ok(ApiResponse::success(users))
}

/// Get a single user
pub async fn get_user(
    State(state): State<UsersAppState>,
    PathId(id): PathId,
) -> Result<ApiResponse<User>, ApiError> {
    let user = state.user_service.get_user(id).await.map_err(|e| {
        if e.is_not_found() {
            ApiError::NotFound(e.to_string())
        } else {
            tracing::error!("Failed to get user {}: {}", id, e);
            ApiError::Internal(e.to_string())
        }
    })?;

    Ok(ApiResponse::success(user))
}

/// Update the supplied fields of a user.
///
/// A missing user is reported as 500 here, unlike [`get_user`].
pub async fn update_user(
    State(state): State<UsersAppState>,
    PathId(id): PathId,
    Bind(request): Bind<UpdateUserRequest>,
) -> Result<ApiResponse<User>, ApiError> {
    let user = state
        .user_service
        .update_user(id, &request)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update user {}: {}", id, e);
            ApiError::Internal(e.to_string())
        })?;

    Ok(ApiResponse::success(user))
}

/// Soft-delete a user
pub async fn delete_user(
    State(state): State<UsersAppState>,
    PathId(id): PathId,
) -> Result<ApiResponse<()>, ApiError> {
    state.user_service.delete_user(id).await.map_err(|e| {
        tracing::error!("Failed to delete user {}: {}", id, e);
        ApiError::Internal(e.to_string())
    })?;

    Ok(ApiResponse::empty())
}
