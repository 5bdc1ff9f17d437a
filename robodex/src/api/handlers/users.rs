use crate::{
    AppState,
    api::models::users::{CurrentUser, UserResponse},
    db::handlers::{Repository, Users},
    errors::{Error, Result},
};
use axum::{extract::State, response::Json};

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "users",
    summary = "Get current user",
    description = "Get the full profile of the currently authenticated user",
    responses(
        (status = 200, description = "The current user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_current_user(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<UserResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    // The session outlives the row if the account was deleted in the meantime
    let user = repo.get_by_id(current_user.id).await?.ok_or_else(|| Error::NotFound {
        resource: "user".to_string(),
        id: current_user.id.to_string(),
    })?;

    Ok(Json(UserResponse::from(user)))
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::users::{Role, UserResponse},
        test_utils::{add_auth_headers, create_test_state, create_test_user},
    };
    use axum_test::TestServer;
    use sqlx::PgPool;

    fn users_router(state: crate::AppState) -> axum::Router {
        axum::Router::new()
            .route("/users/me", axum::routing::get(super::get_current_user))
            .with_state(state)
    }

    #[sqlx::test]
    async fn test_get_current_user(pool: PgPool) {
        let state = create_test_state(pool.clone());
        let server = TestServer::new(users_router(state)).unwrap();
        let user = create_test_user(&pool, Role::User).await;

        let (header_name, header_value) = add_auth_headers(&user);
        let response = server.get("/users/me").add_header(header_name, header_value).await;

        response.assert_status_ok();
        let body: UserResponse = response.json();
        assert_eq!(body.id, user.id);
        assert_eq!(body.email, user.email);
        assert_eq!(body.role, Role::User);
    }

    #[sqlx::test]
    async fn test_get_current_user_unauthenticated(pool: PgPool) {
        let state = create_test_state(pool);
        let server = TestServer::new(users_router(state)).unwrap();

        let response = server.get("/users/me").await;

        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }
}
