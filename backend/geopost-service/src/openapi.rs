/// OpenAPI documentation for Geopost Service
use crate::models::{
    AuthorSummary, CommentResponse, DeleteAck, MarkerAuthor, MarkerResponse, PostResponse,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Geopost Service API",
        version = "1.0.0",
        description = "Location-tagged posts with images and threaded comments. Posts carry WGS84 coordinates and can be listed as map markers; comments are returned as reply trees.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8083", description = "Development server"),
    ),
    tags(
        (name = "health", description = "Service health checks"),
        (name = "posts", description = "Post creation, retrieval, updates, and deletion"),
        (name = "comments", description = "Threaded comments on posts"),
    ),
    components(schemas(
        AuthorSummary,
        PostResponse,
        MarkerAuthor,
        MarkerResponse,
        CommentResponse,
        DeleteAck,
    )),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("HS256 bearer token; `sub` is the numeric user id"))
                        .build(),
                ),
            )
        }
    }
}

impl ApiDoc {
    pub fn openapi_json_path() -> &'static str {
        "/api/v1/openapi.json"
    }
}
