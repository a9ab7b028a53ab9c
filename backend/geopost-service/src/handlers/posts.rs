/// Post handlers - HTTP endpoints for post operations
use crate::error::{AppError, Result};
use crate::handlers::UploadLimits;
use crate::metrics::{observe, POST_OPERATIONS_TOTAL};
use crate::middleware::UserId;
use crate::services::{parse_id, CreatePost, PostService, UpdatePost};
use crate::storage::ImageUpload;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::stream::StreamExt;
use validator::Validate;

const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// Text fields of a post form after multipart decoding
#[derive(Debug, Default, Validate)]
pub struct PostForm {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: Option<String>,
    #[validate(length(min = 1, message = "address must not be empty"))]
    pub address: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub image: Option<ImageUpload>,
}

impl PostForm {
    /// Drain a multipart payload, keeping the known fields
    pub async fn read(mut payload: Multipart, limits: &UploadLimits) -> Result<Self> {
        let mut form = PostForm::default();

        while let Some(item) = payload.next().await {
            let mut field =
                item.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;
            let name = field.name().unwrap_or_default().to_string();
            let filename = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(str::to_string);

            let limit = if name == "image" {
                limits.max_image_bytes
            } else {
                MAX_TEXT_FIELD_BYTES
            };

            let mut data = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk =
                    chunk.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;
                if data.len() + chunk.len() > limit {
                    return Err(AppError::BadRequest(format!(
                        "field '{}' exceeds {} bytes",
                        name, limit
                    )));
                }
                data.extend_from_slice(&chunk);
            }

            match name.as_str() {
                "image" => {
                    form.image = Some(ImageUpload {
                        filename: filename.unwrap_or_default(),
                        bytes: data,
                    })
                }
                "title" => form.title = Some(text_field(&name, data)?),
                "content" => form.content = Some(text_field(&name, data)?),
                "address" => form.address = Some(text_field(&name, data)?),
                "latitude" => form.latitude = Some(text_field(&name, data)?),
                "longitude" => form.longitude = Some(text_field(&name, data)?),
                other => tracing::debug!(field = other, "ignoring unknown form field"),
            }
        }

        Ok(form)
    }
}

fn text_field(name: &str, data: Vec<u8>) -> Result<String> {
    String::from_utf8(data)
        .map_err(|_| AppError::BadRequest(format!("field '{}' must be UTF-8 text", name)))
}

/// Parse a submitted coordinate; absent stays absent
fn parse_coordinate(raw: Option<&str>) -> Result<Option<f64>> {
    match raw {
        None => Ok(None),
        Some(value) => value.trim().parse::<f64>().map(Some).map_err(|_| {
            AppError::BadRequest("Invalid latitude or longitude value".to_string())
        }),
    }
}

/// Create a new post
/// POST /api/v1/posts
pub async fn create_post(
    service: web::Data<PostService>,
    limits: web::Data<UploadLimits>,
    user_id: UserId,
    payload: Multipart,
) -> Result<HttpResponse> {
    let form = PostForm::read(payload, &limits).await?;
    form.validate()?;

    let input = CreatePost {
        title: form.title.ok_or_else(|| missing("title"))?,
        content: form.content.ok_or_else(|| missing("content"))?,
        address: form.address.ok_or_else(|| missing("address"))?,
        latitude: parse_coordinate(form.latitude.as_deref())?,
        longitude: parse_coordinate(form.longitude.as_deref())?,
    };
    let image = form.image.ok_or_else(|| missing("image"))?;

    let post = observe(
        &POST_OPERATIONS_TOTAL,
        "create",
        service.create_post(user_id.0, input, image).await,
    )?;

    Ok(HttpResponse::Created().json(post))
}

fn missing(field: &str) -> AppError {
    AppError::BadRequest(format!("{} is required", field))
}

/// List every post
/// GET /api/v1/posts
pub async fn list_posts(service: web::Data<PostService>) -> Result<HttpResponse> {
    let posts = observe(&POST_OPERATIONS_TOTAL, "list", service.list_posts().await)?;
    Ok(HttpResponse::Ok().json(posts))
}

/// List every post as a map marker
/// GET /api/v1/posts/markers
pub async fn list_markers(
    service: web::Data<PostService>,
    _user_id: UserId,
) -> Result<HttpResponse> {
    let markers = observe(&POST_OPERATIONS_TOTAL, "markers", service.list_markers().await)?;
    Ok(HttpResponse::Ok().json(markers))
}

/// Get a post by ID
/// GET /api/v1/posts/{post_id}
pub async fn get_post(
    service: web::Data<PostService>,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    let post_id = parse_id(&post_id)?;
    let post = observe(&POST_OPERATIONS_TOTAL, "get", service.get_post(post_id).await)?;
    Ok(HttpResponse::Ok().json(post))
}

/// Update a post; every field and the image are optional
/// PATCH /api/v1/posts/{post_id}
pub async fn update_post(
    service: web::Data<PostService>,
    limits: web::Data<UploadLimits>,
    post_id: web::Path<String>,
    user_id: UserId,
    payload: Multipart,
) -> Result<HttpResponse> {
    let post_id = parse_id(&post_id)?;
    let form = PostForm::read(payload, &limits).await?;
    form.validate()?;

    let input = UpdatePost {
        latitude: parse_coordinate(form.latitude.as_deref())?,
        longitude: parse_coordinate(form.longitude.as_deref())?,
        title: form.title,
        content: form.content,
        address: form.address,
    };

    let post = observe(
        &POST_OPERATIONS_TOTAL,
        "update",
        service
            .update_post(user_id.0, post_id, input, form.image)
            .await,
    )?;

    Ok(HttpResponse::Ok().json(post))
}

/// Delete a post with its likes and comments
/// DELETE /api/v1/posts/{post_id}
pub async fn delete_post(
    service: web::Data<PostService>,
    post_id: web::Path<String>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let post_id = parse_id(&post_id)?;
    let ack = observe(
        &POST_OPERATIONS_TOTAL,
        "delete",
        service.delete_post(user_id.0, post_id).await,
    )?;
    Ok(HttpResponse::Ok().json(ack))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_parse_or_reject() {
        assert_eq!(parse_coordinate(None).unwrap(), None);
        assert_eq!(parse_coordinate(Some(" 37.5 ")).unwrap(), Some(37.5));
        assert!(matches!(
            parse_coordinate(Some("north")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn empty_text_fields_fail_validation() {
        let form = PostForm {
            title: Some(String::new()),
            ..PostForm::default()
        };
        assert!(form.validate().is_err());
        assert!(PostForm::default().validate().is_ok());
    }
}
