//! API route handlers

use axum::{
    extract::{Path, State},
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    Extension, Json,
};

use super::error::{ApiError, ApiResult, MessageBody};
use super::extract::JsonBody;
use super::server::AppState;
use crate::auth::{hash_password, CurrentUser};
use crate::models::{
    CourseWithOwner, CreateCourseRequest, RegisterRequest, UpdateCourseRequest, UserInfo,
};

/// Course ids are integers; anything else names a course that cannot exist
fn parse_course_id(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

// General routes

pub async fn welcome() -> impl IntoResponse {
    Json(MessageBody::new("Welcome to the courses REST API!"))
}

pub async fn health() -> impl IntoResponse {
    Json(MessageBody::new("healthy"))
}

pub async fn route_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(MessageBody::new("Route Not Found")))
}

// User routes

pub async fn current_user(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserInfo> {
    Json(UserInfo::from(user))
}

pub async fn register_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let registration = payload.validate()?;

    let password = registration.password.clone();
    let hash = hash_password(password, state.auth.bcrypt_cost).await?;
    let user = state.stores.users.create_user(registration.with_hash(hash)).await?;

    tracing::info!("Registered user {} ({})", user.id, user.email_address);

    Ok((
        StatusCode::CREATED,
        [(LOCATION, "/".to_string())],
        Json(MessageBody::new("Account successfully created!")),
    ))
}

// Course routes

pub async fn list_courses(State(state): State<AppState>) -> ApiResult<Json<Vec<CourseWithOwner>>> {
    Ok(Json(state.stores.courses.list_courses().await?))
}

pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CourseWithOwner>> {
    let course = match parse_course_id(&id) {
        Some(course_id) => state.stores.courses.find_course_with_owner(course_id).await?,
        None => None,
    };

    course
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("There is no course with id: {}.", id)))
}

pub async fn create_course(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    JsonBody(payload): JsonBody<CreateCourseRequest>,
) -> ApiResult<impl IntoResponse> {
    let new_course = payload.validate(user.id)?;
    let course = state.stores.courses.create_course(new_course).await?;

    tracing::info!("User {} created course {}", user.id, course.id);

    Ok((
        StatusCode::CREATED,
        [(LOCATION, format!("/courses/{}", course.id))],
        Json(MessageBody::new("Course successfully created!")),
    ))
}

/// Find a course the current user may modify
async fn owned_course_id(state: &AppState, raw_id: &str, user_id: i64) -> ApiResult<i64> {
    let not_found = || ApiError::NotFound("The course was not found.".to_string());

    let id = parse_course_id(raw_id).ok_or_else(not_found)?;
    let course = state
        .stores
        .courses
        .find_course(id)
        .await?
        .ok_or_else(not_found)?;

    if !course.is_owned_by(user_id) {
        tracing::warn!(
            "User {} tried to modify course {} owned by {}",
            user_id,
            course.id,
            course.user_id
        );
        return Err(ApiError::Forbidden);
    }

    Ok(course.id)
}

pub async fn update_course(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateCourseRequest>,
) -> ApiResult<StatusCode> {
    let course_id = owned_course_id(&state, &id, user.id).await?;
    let changes = payload.validate()?;

    state
        .stores
        .courses
        .update_course(course_id, changes)
        .await?
        .ok_or_else(|| ApiError::NotFound("The course was not found.".to_string()))?;

    tracing::info!("User {} updated course {}", user.id, course_id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_course(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let course_id = owned_course_id(&state, &id, user.id).await?;

    if !state.stores.courses.delete_course(course_id).await? {
        return Err(ApiError::NotFound("The course was not found.".to_string()));
    }

    tracing::info!("User {} deleted course {}", user.id, course_id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_course_id() {
        assert_eq!(parse_course_id("42"), Some(42));
        assert_eq!(parse_course_id("abc"), None);
        assert_eq!(parse_course_id(""), None);
    }
}
