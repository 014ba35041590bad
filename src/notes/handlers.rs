//! Note HTTP handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::gamification;
use crate::middleware::auth::AuthUser;
use crate::notes::encryption;
use crate::notes::types::{
    CreateFromTemplateRequest, CreateNoteRequest, DecryptedNoteResponse, Note, NoteListParams,
    NotePasswordRequest, NoteResponse, UpdateNoteRequest,
};
use crate::notes::db;
use crate::templates;

const VISIBILITIES: &[&str] = &["private", "followers", "public"];

fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::bad_request("Title cannot be empty"));
    }
    if title.len() > 200 {
        return Err(ApiError::bad_request("Title cannot exceed 200 characters"));
    }
    Ok(())
}

fn validate_visibility(visibility: &str) -> Result<(), ApiError> {
    if !VISIBILITIES.contains(&visibility) {
        return Err(ApiError::bad_request(
            "Visibility must be one of: private, followers, public",
        ));
    }
    Ok(())
}

async fn response_with_tags(pool: &PgPool, note: &Note) -> Result<NoteResponse, ApiError> {
    let tags = db::get_tag_ids(pool, note.id).await?;
    Ok(NoteResponse::from_note(note, tags))
}

pub async fn list_notes(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Query(params): Query<NoteListParams>,
) -> ApiResult<Json<Vec<NoteResponse>>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let notes = db::list_notes(&pool, auth.user_id, &params).await?;
    let mut responses = Vec::with_capacity(notes.len());
    for note in &notes {
        responses.push(response_with_tags(&pool, note).await?);
    }
    Ok(Json(responses))
}

pub async fn get_note(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(note_id): Path<Uuid>,
) -> ApiResult<Json<NoteResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let note = db::get_note_for_user(&pool, note_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;
    Ok(Json(response_with_tags(&pool, &note).await?))
}

pub async fn create_note(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Json(request): Json<CreateNoteRequest>,
) -> ApiResult<Json<NoteResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    validate_title(&request.title)?;
    let visibility = request.visibility.as_deref().unwrap_or("private");
    validate_visibility(visibility)?;

    let note = db::create_note(
        &pool,
        auth.user_id,
        request.title.trim(),
        &request.content,
        request.folder_id,
        None,
        visibility,
    )
    .await?;

    if !request.tags.is_empty() {
        db::set_tags(&pool, note.id, auth.user_id, &request.tags).await?;
    }

    gamification::db::record_note_created(&pool, auth.user_id, &request.content).await?;
    gamification::db::credit_currency(
        &pool,
        auth.user_id,
        gamification::NOTE_CREATION_REWARD,
        "Note created",
    )
    .await?;

    tracing::info!("User {} created note {}", auth.username, note.id);
    Ok(Json(response_with_tags(&pool, &note).await?))
}

pub async fn update_note(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(note_id): Path<Uuid>,
    Json(request): Json<UpdateNoteRequest>,
) -> ApiResult<Json<NoteResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    if let Some(ref title) = request.title {
        validate_title(title)?;
    }
    if let Some(ref visibility) = request.visibility {
        validate_visibility(visibility)?;
    }

    let existing = db::get_note_for_user(&pool, note_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;
    if existing.is_encrypted && request.content.is_some() {
        return Err(ApiError::bad_request(
            "Cannot edit content of an encrypted note. Decrypt it first",
        ));
    }

    let note = db::update_note(
        &pool,
        note_id,
        auth.user_id,
        request.title.as_deref().map(str::trim),
        request.content.as_deref(),
        request.folder_id,
        request.visibility.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Note not found"))?;

    if let Some(ref tags) = request.tags {
        db::set_tags(&pool, note.id, auth.user_id, tags).await?;
    }

    Ok(Json(response_with_tags(&pool, &note).await?))
}

pub async fn delete_note(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(note_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    if !db::delete_note(&pool, note_id, auth.user_id).await? {
        return Err(ApiError::not_found("Note not found"));
    }
    tracing::info!("User {} deleted note {}", auth.username, note_id);
    Ok(Json(json!({ "message": "Note deleted" })))
}

pub async fn toggle_pin(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(note_id): Path<Uuid>,
) -> ApiResult<Json<NoteResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let note = db::toggle_pinned(&pool, note_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;
    Ok(Json(response_with_tags(&pool, &note).await?))
}

pub async fn toggle_archive(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(note_id): Path<Uuid>,
) -> ApiResult<Json<NoteResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let note = db::toggle_archived(&pool, note_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;
    Ok(Json(response_with_tags(&pool, &note).await?))
}

/// Instantiate a note from a template. Premium templates require a prior
/// purchase unless the caller created them.
pub async fn create_from_template(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Json(request): Json<CreateFromTemplateRequest>,
) -> ApiResult<Json<NoteResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let template = templates::db::get_template(&pool, request.template_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Template not found"))?;

    if template.is_premium && template.creator_id != Some(auth.user_id) {
        let owned =
            templates::db::has_purchased(&pool, auth.user_id, template.id).await?;
        if !owned {
            return Err(ApiError::forbidden("Premium template not purchased"));
        }
    }

    let title = request
        .title
        .unwrap_or_else(|| template.name.clone());
    validate_title(&title)?;

    let note = db::create_note(
        &pool,
        auth.user_id,
        title.trim(),
        &template.content,
        request.folder_id,
        Some(template.id),
        "private",
    )
    .await?;

    gamification::db::record_note_created(&pool, auth.user_id, &template.content).await?;
    gamification::db::credit_currency(
        &pool,
        auth.user_id,
        gamification::NOTE_CREATION_REWARD,
        "Note created",
    )
    .await?;

    Ok(Json(response_with_tags(&pool, &note).await?))
}

/// Seal a note's content with a password.
pub async fn encrypt_note(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(note_id): Path<Uuid>,
    Json(request): Json<NotePasswordRequest>,
) -> ApiResult<Json<NoteResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    if request.password.len() < 4 {
        return Err(ApiError::bad_request(
            "Encryption password must be at least 4 characters",
        ));
    }

    let note = db::get_note_for_user(&pool, note_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;
    if note.is_encrypted {
        return Err(ApiError::bad_request("Note is already encrypted"));
    }

    let sealed = encryption::encrypt_content(&note.content, &request.password)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let key_hash = encryption::hash_password(&request.password);

    let updated = db::set_encryption(
        &pool,
        note_id,
        auth.user_id,
        &sealed.ciphertext,
        &key_hash,
        &sealed.salt,
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Note not found"))?;

    Ok(Json(response_with_tags(&pool, &updated).await?))
}

/// Return the plaintext of an encrypted note without changing its state.
pub async fn decrypt_note(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(note_id): Path<Uuid>,
    Json(request): Json<NotePasswordRequest>,
) -> ApiResult<Json<DecryptedNoteResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let note = db::get_note_for_user(&pool, note_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;
    let content = open_note(&note, &request.password)?;

    Ok(Json(DecryptedNoteResponse {
        id: note.id,
        content,
    }))
}

/// Permanently remove encryption, restoring plaintext content.
pub async fn remove_encryption(
    State(pool): State<Option<PgPool>>,
    AuthUser(auth): AuthUser,
    Path(note_id): Path<Uuid>,
    Json(request): Json<NotePasswordRequest>,
) -> ApiResult<Json<NoteResponse>> {
    let pool = pool.ok_or(ApiError::DatabaseUnavailable)?;

    let note = db::get_note_for_user(&pool, note_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;
    let plaintext = open_note(&note, &request.password)?;

    let updated = db::clear_encryption(&pool, note_id, auth.user_id, &plaintext)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;

    Ok(Json(response_with_tags(&pool, &updated).await?))
}

fn open_note(note: &Note, password: &str) -> Result<String, ApiError> {
    if !note.is_encrypted {
        return Err(ApiError::bad_request("Note is not encrypted"));
    }
    let (key_hash, salt) = match (&note.encryption_key_hash, &note.encryption_salt) {
        (Some(hash), Some(salt)) => (hash, salt),
        _ => return Err(ApiError::internal("Encrypted note is missing key material")),
    };
    if !encryption::verify_password(password, key_hash) {
        return Err(ApiError::unauthorized("Incorrect password"));
    }
    encryption::decrypt_content(&note.content, password, salt)
        .map_err(|e| ApiError::internal(e.to_string()))
}
