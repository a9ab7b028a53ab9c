/// HTTP handlers for geopost endpoints
///
/// - Posts: create (multipart with image), list, markers, read, update, delete
/// - Comments: threaded comments nested under their post
pub mod comments;
pub mod posts;

use actix_web::web;

pub use comments::{create_comment, delete_comment, get_comment, list_comments, update_comment};
pub use posts::{create_post, delete_post, get_post, list_markers, list_posts, update_post};

/// Size limits applied while reading multipart bodies
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub max_image_bytes: usize,
}

/// Register the `/posts` routes; callers mount this inside the `/api/v1` scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/posts")
            .service(
                web::resource("")
                    .route(web::post().to(create_post))
                    .route(web::get().to(list_posts)),
            )
            .service(web::resource("/markers").route(web::get().to(list_markers)))
            .service(
                web::resource("/{post_id}")
                    .route(web::get().to(get_post))
                    .route(web::patch().to(update_post))
                    .route(web::delete().to(delete_post)),
            )
            .service(
                web::resource("/{post_id}/comments")
                    .route(web::post().to(create_comment))
                    .route(web::get().to(list_comments)),
            )
            .service(
                web::resource("/{post_id}/comments/{comment_id}")
                    .route(web::get().to(get_comment))
                    .route(web::patch().to(update_comment))
                    .route(web::delete().to(delete_comment)),
            ),
    );
}
