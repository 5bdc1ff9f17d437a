use crate::{
    AppState,
    api::models::{
        robots::{
            BulkUploadError, BulkUploadRequest, BulkUploadResponse, NlQueryRequest, NlQueryResponse, RobotCreate,
            RobotResponse, RobotSearchQuery, RobotUpdate,
        },
        users::CurrentUser,
    },
    db::{
        handlers::{Repository, Robots, robots::RobotFilter},
        models::robots::{RobotCreateDBRequest, RobotUpdateDBRequest},
    },
    errors::{Error, Result},
    types::RobotId,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

/// List the whole robot catalog
#[utoipa::path(
    get,
    path = "/robots",
    tag = "robots",
    summary = "List all robots",
    description = "List every robot in the catalog, newest first",
    responses(
        (status = 200, description = "All robots", body = Vec<RobotResponse>),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_robots(State(state): State<AppState>) -> Result<Json<Vec<RobotResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Robots::new(&mut conn);

    let robots = repo.list(&RobotFilter::default()).await?;

    Ok(Json(robots.into_iter().map(RobotResponse::from).collect()))
}

/// Search the catalog with structured capability filters
#[utoipa::path(
    get,
    path = "/robots/search",
    tag = "robots",
    summary = "Search robots",
    description = "Filter the catalog by capability requirements. All supplied filters must match; \
                   robots missing a value for a filtered field are excluded.",
    params(RobotSearchQuery),
    responses(
        (status = 200, description = "Robots matching every filter", body = Vec<RobotResponse>),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn search_robots(
    State(state): State<AppState>,
    Query(query): Query<RobotSearchQuery>,
) -> Result<Json<Vec<RobotResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Robots::new(&mut conn);

    let robots = repo.list(&query.into()).await?;

    Ok(Json(robots.into_iter().map(RobotResponse::from).collect()))
}

/// Search the catalog from a free-text description
#[utoipa::path(
    post,
    path = "/robots/nl-query",
    tag = "robots",
    summary = "Natural-language search",
    description = "Extract structured filters from a free-text query via the configured language \
                   model, then run the same search as the structured endpoint",
    request_body = NlQueryRequest,
    responses(
        (status = 200, description = "Extracted filters and matching robots", body = NlQueryResponse),
        (status = 502, description = "Language model service unavailable"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn nl_query(State(state): State<AppState>, Json(request): Json<NlQueryRequest>) -> Result<Json<NlQueryResponse>> {
    let filters = state.extractor.extract_filters(&request.query).await?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Robots::new(&mut conn);

    let robots = repo.list(&filters.clone().into()).await?;
    let results: Vec<RobotResponse> = robots.into_iter().map(RobotResponse::from).collect();
    let explanation = format!("Found {} robot(s) matching your query.", results.len());

    Ok(Json(NlQueryResponse {
        filters,
        results,
        explanation,
    }))
}

/// Get a single robot by id
#[utoipa::path(
    get,
    path = "/robots/{id}",
    tag = "robots",
    summary = "Get robot",
    description = "Fetch a single robot. An unknown id yields a 200 with a null body rather than a 404.",
    params(
        ("id" = i64, Path, description = "Robot ID to retrieve"),
    ),
    responses(
        (status = 200, description = "The robot, or null when the id is unknown", body = Option<RobotResponse>),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_robot(State(state): State<AppState>, Path(robot_id): Path<RobotId>) -> Result<Json<Option<RobotResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Robots::new(&mut conn);

    let robot = repo.get_by_id(robot_id).await?;

    Ok(Json(robot.map(RobotResponse::from)))
}

/// Add a robot to the catalog
#[utoipa::path(
    post,
    path = "/robots",
    tag = "robots",
    summary = "Create robot",
    description = "Add a new robot to the catalog",
    request_body = RobotCreate,
    responses(
        (status = 201, description = "Robot created successfully", body = RobotResponse),
        (status = 400, description = "Bad request - invalid robot data"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_robot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(create): Json<RobotCreate>,
) -> Result<(StatusCode, Json<RobotResponse>)> {
    if create.name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Robot name must not be empty or whitespace".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Robots::new(&mut conn);

    let db_request = RobotCreateDBRequest::from_api_create(Some(current_user.id), create);
    let robot = repo.create(&db_request).await?;

    Ok((StatusCode::CREATED, Json(RobotResponse::from(robot))))
}

/// Update an existing robot
#[utoipa::path(
    patch,
    path = "/robots/{id}",
    tag = "robots",
    summary = "Update robot",
    description = "Update a robot. Omitted fields keep their stored values.",
    params(
        ("id" = i64, Path, description = "Robot ID to update"),
    ),
    request_body = RobotUpdate,
    responses(
        (status = 200, description = "Robot updated successfully", body = RobotResponse),
        (status = 400, description = "Bad request - invalid robot data"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Robot not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_robot(
    State(state): State<AppState>,
    Path(robot_id): Path<RobotId>,
    _current_user: CurrentUser,
    Json(update): Json<RobotUpdate>,
) -> Result<Json<RobotResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Robots::new(&mut conn);

    let db_request = RobotUpdateDBRequest::from(update);
    let robot = repo.update(robot_id, &db_request).await?;

    Ok(Json(RobotResponse::from(robot)))
}

/// Remove a robot from the catalog
#[utoipa::path(
    delete,
    path = "/robots/{id}",
    tag = "robots",
    summary = "Delete robot",
    description = "Remove a robot. Deleting an id that does not exist still succeeds.",
    params(
        ("id" = i64, Path, description = "Robot ID to delete"),
    ),
    responses(
        (status = 204, description = "Robot deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_robot(
    State(state): State<AppState>,
    Path(robot_id): Path<RobotId>,
    _current_user: CurrentUser,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Robots::new(&mut conn);

    // Deletion is idempotent, so the affected-row count is not surfaced
    repo.delete(robot_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Import a batch of robots
#[utoipa::path(
    post,
    path = "/robots/bulk",
    tag = "robots",
    summary = "Bulk upload robots",
    description = "Validate and insert entries one at a time. Invalid entries are reported per item \
                   and never abort the rest of the batch.",
    request_body = BulkUploadRequest,
    responses(
        (status = 200, description = "Per-item tally of the import", body = BulkUploadResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all, fields(count = request.robots.len()))]
pub async fn bulk_upload(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<BulkUploadRequest>,
) -> Result<Json<BulkUploadResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Robots::new(&mut conn);

    let mut success = 0;
    let mut failed = 0;
    let mut errors = Vec::new();

    for value in request.robots {
        // Remember the candidate's name before the value is consumed, for error reporting
        let name = value.get("name").and_then(|v| v.as_str()).unwrap_or("unknown").to_string();

        match serde_json::from_value::<RobotCreate>(value) {
            Ok(create) => {
                let db_request = RobotCreateDBRequest::from_api_create(Some(current_user.id), create);
                match repo.create(&db_request).await {
                    Ok(_) => success += 1,
                    Err(e) => {
                        failed += 1;
                        errors.push(BulkUploadError {
                            robot: name,
                            error: Error::from(e).user_message(),
                        });
                    }
                }
            }
            Err(e) => {
                failed += 1;
                errors.push(BulkUploadError {
                    robot: name,
                    error: format!("Invalid robot data: {e}"),
                });
            }
        }
    }

    Ok(Json(BulkUploadResponse { success, failed, errors }))
}
