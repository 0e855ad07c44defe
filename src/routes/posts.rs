use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::state::AppState;
use crate::uploads;

// --- Response shapes ---

#[derive(Debug, Serialize)]
pub struct PostAuthor {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub author: PostAuthor,
}

// --- Input schema ---

/// Fields accepted by the multipart post endpoints. Unknown parts are
/// ignored; each operation checks its own required fields after parsing.
#[derive(Default)]
struct PostInput {
    id: Option<String>,
    title: Option<String>,
    summary: Option<String>,
    content: Option<String>,
    cover: Option<(String, Vec<u8>)>,
}

async fn read_post_input(mut multipart: Multipart) -> AppResult<PostInput> {
    let mut input = PostInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "id" => input.id = Some(text_field(field).await?),
            "title" => input.title = Some(text_field(field).await?),
            "summary" => input.summary = Some(text_field(field).await?),
            "content" => input.content = Some(text_field(field).await?),
            "file" => {
                let original_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("failed to read uploaded file: {}", e))
                })?;
                input.cover = Some((original_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    Ok(input)
}

async fn text_field(field: Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid field value: {}", e)))
}

fn required<'a>(value: &'a Option<String>, name: &str) -> AppResult<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::BadRequest(format!("{} is required", name))),
    }
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/post",
            get(list_posts).post(create_post).put(update_post),
        )
        .route("/post/{id}", get(get_post))
}

// --- Handlers ---

/// POST /post — create a post owned by the verified caller.
/// No ownership guard applies here; the author is simply the caller.
async fn create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> AppResult<Response> {
    let input = read_post_input(multipart).await?;

    let title = required(&input.title, "title")?;
    let summary = required(&input.summary, "summary")?;
    let content = required(&input.content, "content")?;
    let (original_name, bytes) = input
        .cover
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("cover file is required".into()))?;

    let cover_path = uploads::save_cover(state.config.uploads_path(), original_name, bytes)?;

    let post_id = uuid::Uuid::now_v7().to_string();
    let conn = state.db.get()?;
    conn.execute(
        "INSERT INTO posts (id, author_id, title, summary, content, cover_path)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![post_id, user.id, title, summary, content, cover_path],
    )?;

    tracing::info!(post_id = %post_id, author = %user.username, "post created");

    let post = query_post(&conn, &post_id)?.ok_or(AppError::NotFound)?;
    Ok((StatusCode::OK, Json(post)).into_response())
}

/// PUT /post — update a post. Only the owning author may mutate it;
/// unsupplied fields keep their prior values.
async fn update_post(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> AppResult<Response> {
    let input = read_post_input(multipart).await?;
    let post_id = required(&input.id, "id")?;

    let conn = state.db.get()?;
    authorize_author(&conn, post_id, &user.id)?;

    let cover_path = match input.cover.as_ref() {
        Some((original_name, bytes)) => Some(uploads::save_cover(
            state.config.uploads_path(),
            original_name,
            bytes,
        )?),
        None => None,
    };

    conn.execute(
        "UPDATE posts SET
            title = COALESCE(?2, title),
            summary = COALESCE(?3, summary),
            content = COALESCE(?4, content),
            cover_path = COALESCE(?5, cover_path),
            updated_at = datetime('now')
         WHERE id = ?1",
        params![post_id, input.title, input.summary, input.content, cover_path],
    )?;

    let post = query_post(&conn, post_id)?.ok_or(AppError::NotFound)?;
    Ok((StatusCode::OK, Json(post)).into_response())
}

/// GET /post — newest posts first, capped at the configured page size.
async fn list_posts(State(state): State<AppState>) -> AppResult<Response> {
    let conn = state.db.get()?;
    let posts = query_posts(&conn, state.config.posts.page_size)?;
    Ok((StatusCode::OK, Json(posts)).into_response())
}

/// GET /post/{id}
async fn get_post(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Response> {
    let conn = state.db.get()?;
    let post = query_post(&conn, &id)?.ok_or(AppError::NotFound)?;
    Ok((StatusCode::OK, Json(post)).into_response())
}

// --- Authorization guard ---

/// Check that the verified caller owns the post before any mutation.
/// Author ids are compared as plain values.
fn authorize_author(conn: &Connection, post_id: &str, caller_id: &str) -> AppResult<()> {
    let author_id: String = conn
        .query_row(
            "SELECT author_id FROM posts WHERE id = ?1",
            params![post_id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(AppError::NotFound)?;

    if author_id != caller_id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

// --- Queries ---

const POST_SELECT: &str = "SELECT p.id, p.title, p.summary, p.content, p.cover_path,
        p.created_at, p.updated_at, u.id, u.username
     FROM posts p JOIN users u ON u.id = p.author_id";

fn query_post(conn: &Connection, id: &str) -> AppResult<Option<PostResponse>> {
    conn.query_row(
        &format!("{} WHERE p.id = ?1", POST_SELECT),
        params![id],
        map_post,
    )
    .optional()
    .map_err(AppError::Database)
}

fn query_posts(conn: &Connection, limit: u32) -> AppResult<Vec<PostResponse>> {
    let mut stmt = conn.prepare(&format!(
        "{} ORDER BY p.created_at DESC, p.id DESC LIMIT ?1",
        POST_SELECT
    ))?;
    let posts = stmt
        .query_map(params![limit], map_post)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}

fn map_post(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostResponse> {
    Ok(PostResponse {
        id: row.get(0)?,
        title: row.get(1)?,
        summary: row.get(2)?,
        content: row.get(3)?,
        cover: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        author: PostAuthor {
            id: row.get(7)?,
            username: row.get(8)?,
        },
    })
}
