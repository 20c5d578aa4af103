//! Axum route handlers for the user profile service.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::errors::AppError;
use crate::models::user::{
    salary_as_text, RecentSearch, UserDocument, PASSWORD_FIELD, RESUME_PATH_FIELD, USERNAME_FIELD,
};
use crate::state::AppState;
use crate::users::recent_searches::{self, LatestField};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub id: i64,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub message: &'static str,
    pub user: CreateUserRequest,
}

#[derive(Debug, Deserialize)]
pub struct MedianSalaryPatch {
    #[serde(deserialize_with = "salary_as_text")]
    pub med_salary: String,
}

#[derive(Debug, Deserialize)]
pub struct UrlPatch {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResumePathBody {
    pub resume_path: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn load_user(state: &AppState, user_id: i64) -> Result<UserDocument, AppError> {
    state
        .users
        .get(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))
}

fn text_of(user: &UserDocument, field: &str) -> Result<String, AppError> {
    user.text_field(field)
        .map(str::to_string)
        .ok_or_else(|| AppError::NotFound(format!("User {} has no {field}", user.id)))
}

fn single_field(name: &str, value: Value) -> Map<String, Value> {
    let mut patch = Map::new();
    patch.insert(name.to_string(), value);
    patch
}

// ────────────────────────────────────────────────────────────────────────────
// Profile CRUD
// ────────────────────────────────────────────────────────────────────────────

/// POST /users/
pub async fn handle_create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<CreateUserResponse>, AppError> {
    let Json(request) = body?;

    let doc = UserDocument::new_profile(request.id, &request.username, &request.password);
    if !state.users.insert(doc).await? {
        return Err(AppError::Conflict(format!(
            "User with ID {} already exists",
            request.id
        )));
    }

    info!(user_id = request.id, "User created");
    Ok(Json(CreateUserResponse {
        message: "User created",
        user: request,
    }))
}

/// GET /users/
pub async fn handle_list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserDocument>>, AppError> {
    Ok(Json(state.users.list().await?))
}

/// GET /users/:id
pub async fn handle_get_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<UserDocument>, AppError> {
    let Path(user_id) = path?;
    Ok(Json(load_user(&state, user_id).await?))
}

/// PUT /users/:id
///
/// Merges every top-level field of the body into the record, unchecked.
pub async fn handle_update_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(user_id) = path?;
    let Json(patch) = body?;

    if !state.users.merge(user_id, patch).await? {
        return Err(AppError::NotFound(format!("User {user_id} not found")));
    }

    info!(user_id, "User updated");
    Ok(Json(MessageResponse {
        message: "User updated",
    }))
}

/// DELETE /users/:id
pub async fn handle_delete_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(user_id) = path?;
    if !state.users.delete(user_id).await? {
        return Err(AppError::NotFound(format!("User {user_id} not found")));
    }

    info!(user_id, "User deleted");
    Ok(Json(MessageResponse {
        message: "User deleted",
    }))
}

/// DELETE /users/delete_all
pub async fn handle_delete_all_users(
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let deleted = state.users.delete_all().await?;
    info!(deleted, "All users deleted");
    Ok(Json(json!({ "message": "All users deleted", "deleted": deleted })))
}

/// GET /users/:id/username
///
/// Returns the bare value as a text body.
pub async fn handle_get_username(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<String, AppError> {
    let Path(user_id) = path?;
    let user = load_user(&state, user_id).await?;
    text_of(&user, USERNAME_FIELD)
}

/// GET /users/:id/password
pub async fn handle_get_password(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<String, AppError> {
    let Path(user_id) = path?;
    let user = load_user(&state, user_id).await?;
    text_of(&user, PASSWORD_FIELD)
}

// ────────────────────────────────────────────────────────────────────────────
// Recent searches
// ────────────────────────────────────────────────────────────────────────────

/// GET /users/:id/recent_searches
pub async fn handle_get_recent_searches(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<RecentSearch>>, AppError> {
    let Path(user_id) = path?;
    let user = load_user(&state, user_id).await?;
    Ok(Json(recent_searches::read_slots(&user.fields)))
}

/// POST /users/:id/recent_searches
///
/// Records a search at position 1 and rewrites all five slots.
pub async fn handle_add_recent_search(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<RecentSearch>, JsonRejection>,
) -> Result<Json<Vec<RecentSearch>>, AppError> {
    let Path(user_id) = path?;
    let Json(entry) = body?;

    let user = load_user(&state, user_id).await?;
    let stored = recent_searches::read_slots(&user.fields);
    let updated = recent_searches::insert(&stored, entry);
    let slots = recent_searches::to_slots(&updated).map_err(anyhow::Error::from)?;

    if !state.users.merge(user_id, slots).await? {
        return Err(AppError::NotFound(format!("User {user_id} not found")));
    }

    info!(user_id, stored = updated.len(), "Recent search recorded");
    Ok(Json(updated))
}

/// PATCH /users/:id/recent_searches/latest/med_salary
pub async fn handle_patch_latest_salary(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<MedianSalaryPatch>, JsonRejection>,
) -> Result<Json<RecentSearch>, AppError> {
    let Path(user_id) = path?;
    let Json(patch) = body?;
    patch_latest(&state, user_id, LatestField::MedianSalary(patch.med_salary)).await
}

/// PATCH /users/:id/recent_searches/latest/url
pub async fn handle_patch_latest_url(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UrlPatch>, JsonRejection>,
) -> Result<Json<RecentSearch>, AppError> {
    let Path(user_id) = path?;
    let Json(patch) = body?;
    patch_latest(&state, user_id, LatestField::Url(patch.url)).await
}

async fn patch_latest(
    state: &AppState,
    user_id: i64,
    field: LatestField,
) -> Result<Json<RecentSearch>, AppError> {
    let user = load_user(state, user_id).await?;
    let stored = recent_searches::read_slots(&user.fields);
    let latest = recent_searches::patch_most_recent(&stored, field)?;
    let slot = recent_searches::latest_slot(&latest).map_err(anyhow::Error::from)?;

    if !state.users.merge(user_id, slot).await? {
        return Err(AppError::NotFound(format!("User {user_id} not found")));
    }

    Ok(Json(latest))
}

// ────────────────────────────────────────────────────────────────────────────
// Resume path
// ────────────────────────────────────────────────────────────────────────────

/// GET /users/:id/resume_path
pub async fn handle_get_resume_path(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<ResumePathBody>, AppError> {
    let Path(user_id) = path?;
    let user = load_user(&state, user_id).await?;
    Ok(Json(ResumePathBody {
        resume_path: text_of(&user, RESUME_PATH_FIELD)?,
    }))
}

/// PUT /users/:id/resume_path
pub async fn handle_set_resume_path(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<ResumePathBody>, JsonRejection>,
) -> Result<Json<ResumePathBody>, AppError> {
    let Path(user_id) = path?;
    let Json(request) = body?;

    let patch = single_field(RESUME_PATH_FIELD, Value::String(request.resume_path.clone()));
    if !state.users.merge(user_id, patch).await? {
        return Err(AppError::NotFound(format!("User {user_id} not found")));
    }

    info!(user_id, "Resume path stored");
    Ok(Json(request))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    use crate::test_support::{get_json, get_text, send_json, TestApp};

    async fn create(app: &TestApp, id: i64, username: &str, password: &str) -> (StatusCode, Value) {
        send_json(
            app.router(),
            Method::POST,
            "/users/",
            Some(json!({"id": id, "username": username, "password": password})),
        )
        .await
    }

    async fn record_search(app: &TestApp, id: i64, search: Value) -> (StatusCode, Value) {
        send_json(
            app.router(),
            Method::POST,
            &format!("/users/{id}/recent_searches"),
            Some(search),
        )
        .await
    }

    fn nth_search(n: usize) -> Value {
        json!({"jobTitle": format!("job-{n}"), "location": "NYC", "med_salary": n * 1000})
    }

    #[tokio::test]
    async fn test_create_then_read_profile() {
        let app = TestApp::new();
        let (status, body) = create(&app, 1, "alice", "p1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User created");
        assert_eq!(body["user"]["id"], 1);

        let (status, body) = get_json(app.router(), "/users/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "id": 1,
                "username": "alice",
                "password": "p1",
                "rs1": null, "rs2": null, "rs3": null, "rs4": null, "rs5": null
            })
        );
    }

    #[tokio::test]
    async fn test_duplicate_id_conflicts_and_keeps_original() {
        let app = TestApp::new();
        create(&app, 1, "alice", "p1").await;

        let (status, body) = create(&app, 1, "mallory", "x").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");

        let (_, body) = get_json(app.router(), "/users/1").await;
        assert_eq!(body["username"], "alice");
        assert_eq!(body["password"], "p1");
    }

    #[tokio::test]
    async fn test_create_without_password_is_bad_request() {
        let app = TestApp::new();
        let (status, body) = send_json(
            app.router(),
            Method::POST,
            "/users/",
            Some(json!({"id": 3, "username": "carol"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let app = TestApp::new();
        let (status, _) = get_json(app.router(), "/users/404").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send_json(app.router(), Method::DELETE, "/users/404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send_json(
            app.router(),
            Method::PUT,
            "/users/404",
            Some(json!({"username": "ghost"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_merges_and_username_password_are_raw_text() {
        let app = TestApp::new();
        create(&app, 5, "erin", "old").await;

        let (status, body) = send_json(
            app.router(),
            Method::PUT,
            "/users/5",
            Some(json!({"password": "new", "theme": "dark"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User updated");

        let (status, text) = get_text(app.router(), "/users/5/password").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(text, "new");

        let (_, text) = get_text(app.router(), "/users/5/username").await;
        assert_eq!(text, "erin");

        let (_, body) = get_json(app.router(), "/users/5").await;
        assert_eq!(body["theme"], "dark");
    }

    #[tokio::test]
    async fn test_list_delete_and_delete_all() {
        let app = TestApp::new();
        create(&app, 2, "bob", "b").await;
        create(&app, 1, "alice", "a").await;

        let (_, body) = get_json(app.router(), "/users/").await;
        let ids: Vec<i64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2]);

        let (status, body) = send_json(app.router(), Method::DELETE, "/users/2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User deleted");

        let (status, body) =
            send_json(app.router(), Method::DELETE, "/users/delete_all", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], 1);

        let (_, body) = get_json(app.router(), "/users/").await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_recent_searches_keep_five_most_recent() {
        let app = TestApp::new();
        create(&app, 1, "alice", "p1").await;

        let (status, body) = record_search(
            &app,
            1,
            json!({"jobTitle": "SWE", "location": "NYC", "med_salary": 100000}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{"jobTitle": "SWE", "location": "NYC", "med_salary": "100000"}])
        );

        for n in 2..=6 {
            record_search(&app, 1, nth_search(n)).await;
        }

        let (status, body) = get_json(app.router(), "/users/1/recent_searches").await;
        assert_eq!(status, StatusCode::OK);
        let titles: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["jobTitle"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["job-6", "job-5", "job-4", "job-3", "job-2"]);

        let (_, user) = get_json(app.router(), "/users/1").await;
        assert_eq!(user["rs1"]["jobTitle"], "job-6");
        assert_eq!(user["rs5"]["jobTitle"], "job-2");
    }

    #[tokio::test]
    async fn test_second_search_moves_first_to_position_two() {
        let app = TestApp::new();
        create(&app, 1, "alice", "p1").await;
        record_search(&app, 1, nth_search(1)).await;
        record_search(&app, 1, nth_search(2)).await;

        let (_, body) = get_json(app.router(), "/users/1/recent_searches").await;
        assert_eq!(body[0]["jobTitle"], "job-2");
        assert_eq!(body[1]["jobTitle"], "job-1");
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_for_missing_user_is_not_found() {
        let app = TestApp::new();
        let (status, _) = record_search(&app, 77, nth_search(1)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_patch_latest_on_empty_history_is_not_found() {
        let app = TestApp::new();
        create(&app, 1, "alice", "p1").await;

        let (status, _) = send_json(
            app.router(),
            Method::PATCH,
            "/users/1/recent_searches/latest/url",
            Some(json!({"url": "https://jobs.example/1"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = get_json(app.router(), "/users/1/recent_searches").await;
        assert_eq!(body, json!([]), "no entry is created by a failed patch");
    }

    #[tokio::test]
    async fn test_patch_latest_touches_only_position_one() {
        let app = TestApp::new();
        create(&app, 1, "alice", "p1").await;
        record_search(&app, 1, nth_search(1)).await;
        record_search(&app, 1, nth_search(2)).await;

        let (status, body) = send_json(
            app.router(),
            Method::PATCH,
            "/users/1/recent_searches/latest/med_salary",
            Some(json!({"med_salary": "131000"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["med_salary"], "131000");

        let (status, body) = send_json(
            app.router(),
            Method::PATCH,
            "/users/1/recent_searches/latest/url",
            Some(json!({"url": "https://jobs.example/2"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["url"], "https://jobs.example/2");
        assert_eq!(body["med_salary"], "131000");

        let (_, body) = get_json(app.router(), "/users/1/recent_searches").await;
        assert_eq!(body[0]["jobTitle"], "job-2");
        assert_eq!(body[0]["url"], "https://jobs.example/2");
        assert_eq!(body[1], json!({"jobTitle": "job-1", "location": "NYC", "med_salary": "1000"}));
    }

    #[tokio::test]
    async fn test_resume_path_round_trip() {
        let app = TestApp::new();
        create(&app, 1, "alice", "p1").await;

        let (status, _) = get_json(app.router(), "/users/1/resume_path").await;
        assert_eq!(status, StatusCode::NOT_FOUND, "unset path is not found");

        let (status, _) = send_json(
            app.router(),
            Method::PUT,
            "/users/1/resume_path",
            Some(json!({"resume_path": "resumes/alice.pdf"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get_json(app.router(), "/users/1/resume_path").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resume_path"], "resumes/alice.pdf");

        let (status, _) = send_json(
            app.router(),
            Method::PUT,
            "/users/2/resume_path",
            Some(json!({"resume_path": "x.pdf"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_json_bad_request() {
        let app = TestApp::new();
        let (status, body) = get_json(app.router(), "/users/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");

        let (status, body) = send_json(
            app.router(),
            Method::POST,
            "/users/abc/recent_searches",
            Some(nth_search(1)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_overwritten_slot_is_ignored_and_repaired_by_insert() {
        let app = TestApp::new();
        create(&app, 8, "heidi", "pw").await;
        record_search(&app, 8, nth_search(1)).await;

        let (status, _) = send_json(
            app.router(),
            Method::PUT,
            "/users/8",
            Some(json!({"rs2": "junk", "rs1": {"location": "no title"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get_json(app.router(), "/users/8/recent_searches").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (status, body) = record_search(&app, 8, nth_search(2)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (_, user) = get_json(app.router(), "/users/8").await;
        assert_eq!(user["rs1"]["jobTitle"], "job-2");
        assert!(user["rs2"].is_null(), "malformed slot rewritten");
    }
}
