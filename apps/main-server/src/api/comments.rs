//! Comment API endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use authz::{Action, Identity, authorize};
use entities::Comment;
use project_store::ProjectStore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::views::{CommentDetail, comment_detail};
use crate::error::{ServerError, ServerResult};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub task_id: Uuid,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Creates a comment on a task.
pub async fn create_comment<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<CreateCommentRequest>,
) -> ServerResult<Json<CommentDetail>> {
    authorize(&identity, &Action::CreateComment)?;

    if request.content.trim().is_empty() {
        return Err(ServerError::Validation(vec![
            "Content is required".to_string(),
        ]));
    }

    state
        .store
        .get_task(request.task_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Task not found".to_string()))?;

    let comment = Comment::new(request.content, request.task_id, identity.id);
    let comment = state.store.create_comment(comment).await?;
    tracing::info!(comment_id = %comment.id, task_id = %comment.task_id, "comment created");

    Ok(Json(comment_detail(&state.store, &comment).await?))
}

/// Lists a task's comments, newest first.
pub async fn get_task_comments<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path(task_id): Path<Uuid>,
) -> ServerResult<Json<Vec<CommentDetail>>> {
    authorize(&identity, &Action::ViewTask)?;

    state
        .store
        .get_task(task_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Task not found".to_string()))?;

    let comments = state.store.list_task_comments(task_id).await?;
    let mut details = Vec::with_capacity(comments.len());
    for comment in &comments {
        details.push(comment_detail(&state.store, comment).await?);
    }
    Ok(Json(details))
}

/// Updates a comment. Author, manager, or admin only.
pub async fn update_comment<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCommentRequest>,
) -> ServerResult<Json<CommentDetail>> {
    let mut comment = state
        .store
        .get_comment(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Comment not found".to_string()))?;

    authorize(
        &identity,
        &Action::EditComment {
            comment_id: comment.id,
            author_id: comment.author_id,
        },
    )?;

    if request.content.trim().is_empty() {
        return Err(ServerError::Validation(vec![
            "Content is required".to_string(),
        ]));
    }

    comment.content = request.content;
    let comment = state.store.update_comment(comment).await?;

    Ok(Json(comment_detail(&state.store, &comment).await?))
}

/// Deletes a comment. Author, manager, or admin only.
pub async fn delete_comment<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<MessageResponse>> {
    let comment = state
        .store
        .get_comment(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Comment not found".to_string()))?;

    authorize(
        &identity,
        &Action::DeleteComment {
            comment_id: comment.id,
            author_id: comment.author_id,
        },
    )?;

    state.store.delete_comment(id).await?;

    Ok(Json(MessageResponse {
        message: "Comment deleted successfully".to_string(),
    }))
}
