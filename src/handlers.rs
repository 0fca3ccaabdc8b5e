use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::error::AppError;
use crate::mapper::to_user_response;
use crate::models::{CreateUserRequest, User, UserId, UserResponse};
use crate::state::AppState;

pub async fn get_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.users.get_all().await?;

    Ok(Json(users.iter().map(to_user_response).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    match state.users.get_by_id(UserId(id)).await? {
        Some(user) => Ok((StatusCode::OK, Json(to_user_response(&user))).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

pub async fn add_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    // Malformed bodies answer 400 like an empty name.
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected create user body");
            return Ok(StatusCode::BAD_REQUEST.into_response());
        }
    };

    if body.full_name.is_empty() {
        return Ok(StatusCode::BAD_REQUEST.into_response());
    }

    let user = User {
        id: UserId::new(),
        full_name: body.full_name,
    };

    if !state.users.create(user.clone()).await? {
        return Ok(StatusCode::BAD_REQUEST.into_response());
    }

    state.users_created_counter.add(1, &[]);
    let location = format!("/users/{}", user.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(UserResponse::from(user)),
    )
        .into_response())
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.users.delete_by_id(UserId(id)).await? {
        Ok(StatusCode::OK)
    } else {
        Ok(StatusCode::NOT_FOUND)
    }
}
