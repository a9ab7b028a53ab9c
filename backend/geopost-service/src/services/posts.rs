/// Post service - handles post creation, retrieval, and ownership-checked mutation
use crate::db::ContentStore;
use crate::error::{AppError, Result};
use crate::middleware::permissions::check_post_ownership;
use crate::models::{DeleteAck, MarkerResponse, NewPost, PostRecord, PostResponse};
use crate::storage::{ImageUpload, ImageUploader};
use std::sync::Arc;

/// Input for a new post
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePost {
    pub title: String,
    pub content: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Partial post update; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Parse a path identifier
pub fn parse_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("ID must be a number, got '{}'", raw)))
}

/// Require both coordinates, finite and within WGS84 bounds
pub fn resolve_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<(f64, f64)> {
    match (latitude, longitude) {
        (Some(lat), Some(lon))
            if lat.is_finite()
                && lon.is_finite()
                && (-90.0..=90.0).contains(&lat)
                && (-180.0..=180.0).contains(&lon) =>
        {
            Ok((lat, lon))
        }
        _ => Err(AppError::BadRequest(
            "Invalid latitude or longitude value".to_string(),
        )),
    }
}

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn ContentStore>,
    uploader: Arc<dyn ImageUploader>,
}

impl PostService {
    pub fn new(store: Arc<dyn ContentStore>, uploader: Arc<dyn ImageUploader>) -> Self {
        Self { store, uploader }
    }

    /// Create a new post
    pub async fn create_post(
        &self,
        user_id: i64,
        input: CreatePost,
        image: ImageUpload,
    ) -> Result<PostResponse> {
        let author = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {} not found", user_id)))?;

        // Validate before uploading so rejected requests leave no stray objects
        let (latitude, longitude) = resolve_coordinates(input.latitude, input.longitude)?;

        let image_url = self.uploader.upload(&image.filename, image.bytes).await?;

        let post = self
            .store
            .insert_post(NewPost {
                user_id,
                title: input.title,
                content: input.content,
                image_url,
                address: input.address,
                latitude,
                longitude,
            })
            .await?;

        tracing::info!(post_id = post.id, user_id, "post created");
        Ok(PostResponse::from(&PostRecord { post, author }))
    }

    /// List all posts with full detail
    pub async fn list_posts(&self) -> Result<Vec<PostResponse>> {
        let posts = self.store.list_posts().await?;
        Ok(posts.iter().map(PostResponse::from).collect())
    }

    /// Get a post by ID
    pub async fn get_post(&self, post_id: i64) -> Result<PostResponse> {
        let post = self.load_post(post_id).await?;
        Ok(PostResponse::from(&post))
    }

    /// Update a post, optionally replacing its image
    pub async fn update_post(
        &self,
        user_id: i64,
        post_id: i64,
        input: UpdatePost,
        image: Option<ImageUpload>,
    ) -> Result<PostResponse> {
        let PostRecord { mut post, author } = self.load_owned_post(user_id, post_id).await?;

        let (latitude, longitude) = resolve_coordinates(
            input.latitude.or(Some(post.latitude)),
            input.longitude.or(Some(post.longitude)),
        )?;

        if let Some(image) = image {
            post.image_url = self.uploader.upload(&image.filename, image.bytes).await?;
        }

        if let Some(title) = input.title {
            post.title = title;
        }
        if let Some(content) = input.content {
            post.content = content;
        }
        if let Some(address) = input.address {
            post.address = address;
        }
        post.latitude = latitude;
        post.longitude = longitude;

        let saved = self.store.save_post(&post).await?;
        tracing::debug!(post_id, user_id, "post saved");

        Ok(PostResponse::from(&PostRecord {
            post: saved,
            author,
        }))
    }

    /// Delete a post along with its likes and comments
    pub async fn delete_post(&self, user_id: i64, post_id: i64) -> Result<DeleteAck> {
        self.load_owned_post(user_id, post_id).await?;
        self.store.delete_post_cascade(post_id).await?;

        tracing::info!(post_id, user_id, "post deleted");
        Ok(DeleteAck::deleted())
    }

    /// List every post as a map marker
    ///
    /// Failures are logged with their cause and reported without detail.
    pub async fn list_markers(&self) -> Result<Vec<MarkerResponse>> {
        match self.store.list_posts().await {
            Ok(posts) => Ok(posts.iter().map(MarkerResponse::from).collect()),
            Err(err) => {
                tracing::error!(error = %err, "Failed to fetch posts with markers");
                Err(AppError::MarkerListingFailed)
            }
        }
    }

    async fn load_post(&self, post_id: i64) -> Result<PostRecord> {
        self.store
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {} not found", post_id)))
    }

    async fn load_owned_post(&self, user_id: i64, post_id: i64) -> Result<PostRecord> {
        let post = self.load_post(post_id).await?;
        if let Err(err) = check_post_ownership(user_id, &post) {
            tracing::warn!(post_id, user_id, "post ownership check failed");
            return Err(err);
        }
        Ok(post)
    }
}
