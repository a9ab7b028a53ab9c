/// Comment handlers - HTTP endpoints for comment operations
use crate::error::Result;
use crate::metrics::{observe, COMMENT_OPERATIONS_TOTAL};
use crate::middleware::UserId;
use crate::services::{parse_id, CommentService, CreateComment, UpdateComment};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: String,
    pub parent_comment_id: Option<i64>,
}

/// Empty or missing content leaves the comment text unchanged
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentRequest {
    pub content: Option<String>,
}

/// Create a comment or reply
/// POST /api/v1/posts/{post_id}/comments
pub async fn create_comment(
    service: web::Data<CommentService>,
    post_id: web::Path<String>,
    user_id: UserId,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let post_id = parse_id(&post_id)?;
    req.validate()?;
    let author = service.resolve_author(user_id.0).await?;

    let req = req.into_inner();
    let input = CreateComment {
        content: req.content,
        parent_comment_id: req.parent_comment_id,
    };

    let comment = observe(
        &COMMENT_OPERATIONS_TOTAL,
        "create",
        service.create_comment(post_id, input, &author).await,
    )?;

    Ok(HttpResponse::Created().json(comment))
}

/// Get the reply tree of a post
/// GET /api/v1/posts/{post_id}/comments
pub async fn list_comments(
    service: web::Data<CommentService>,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    let post_id = parse_id(&post_id)?;
    let comments = observe(
        &COMMENT_OPERATIONS_TOTAL,
        "list",
        service.list_comments(post_id).await,
    )?;
    Ok(HttpResponse::Ok().json(comments))
}

/// Get a comment with its direct replies
/// GET /api/v1/posts/{post_id}/comments/{comment_id}
pub async fn get_comment(
    service: web::Data<CommentService>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let (post_id, comment_id) = (parse_id(&post_id)?, parse_id(&comment_id)?);

    let comment = observe(
        &COMMENT_OPERATIONS_TOTAL,
        "get",
        service.get_comment(post_id, comment_id).await,
    )?;
    Ok(HttpResponse::Ok().json(comment))
}

/// Update comment content
/// PATCH /api/v1/posts/{post_id}/comments/{comment_id}
pub async fn update_comment(
    service: web::Data<CommentService>,
    path: web::Path<(String, String)>,
    user_id: UserId,
    req: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let (post_id, comment_id) = (parse_id(&post_id)?, parse_id(&comment_id)?);
    let author = service.resolve_author(user_id.0).await?;

    let input = UpdateComment {
        content: req.into_inner().content,
    };

    let comment = observe(
        &COMMENT_OPERATIONS_TOTAL,
        "update",
        service
            .update_comment(post_id, comment_id, input, &author)
            .await,
    )?;
    Ok(HttpResponse::Ok().json(comment))
}

/// Delete a comment
/// DELETE /api/v1/posts/{post_id}/comments/{comment_id}
pub async fn delete_comment(
    service: web::Data<CommentService>,
    path: web::Path<(String, String)>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let (post_id, comment_id) = (parse_id(&post_id)?, parse_id(&comment_id)?);
    let author = service.resolve_author(user_id.0).await?;

    let ack = observe(
        &COMMENT_OPERATIONS_TOTAL,
        "delete",
        service.delete_comment(post_id, comment_id, &author).await,
    )?;
    Ok(HttpResponse::Ok().json(ack))
}
