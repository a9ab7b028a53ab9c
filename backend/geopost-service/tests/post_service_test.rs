//! Post service behavior against the in-memory store

mod common;

use common::{MemoryStore, RecordingUploader};
use geopost_service::error::AppError;
use geopost_service::services::{CreatePost, PostService, UpdatePost};
use geopost_service::storage::ImageUpload;
use std::sync::Arc;

fn service(store: &MemoryStore, uploader: &RecordingUploader) -> PostService {
    PostService::new(Arc::new(store.clone()), Arc::new(uploader.clone()))
}

fn new_post(latitude: Option<f64>, longitude: Option<f64>) -> CreatePost {
    CreatePost {
        title: "Cherry blossoms".to_string(),
        content: "Full bloom along the river".to_string(),
        address: "Yeouido, Seoul".to_string(),
        latitude,
        longitude,
    }
}

fn image(name: &str) -> ImageUpload {
    ImageUpload {
        filename: name.to_string(),
        bytes: vec![0xFF, 0xD8, 0xFF],
    }
}

#[tokio::test]
async fn create_post_uploads_image_and_returns_author() {
    let store = MemoryStore::new();
    let uploader = RecordingUploader::new();
    let author = store.add_user("alice");

    let post = service(&store, &uploader)
        .create_post(author.id, new_post(Some(37.5), Some(127.0)), image("bloom.jpg"))
        .await
        .unwrap();

    assert_eq!(post.latitude, 37.5);
    assert_eq!(post.longitude, 127.0);
    assert_eq!(post.image_url, "https://cdn.test/posts/1-bloom.jpg");
    assert_eq!(post.author.id, author.id);
    assert_eq!(post.author.nick_name, "alice");
    assert_eq!(uploader.uploads(), vec![("bloom.jpg".to_string(), 3)]);
}

#[tokio::test]
async fn create_post_rejects_invalid_coordinates_without_uploading() {
    let store = MemoryStore::new();
    let uploader = RecordingUploader::new();
    let author = store.add_user("alice");
    let service = service(&store, &uploader);

    let out_of_range = service
        .create_post(author.id, new_post(Some(200.0), Some(127.0)), image("a.jpg"))
        .await;
    assert!(matches!(out_of_range, Err(AppError::BadRequest(_))));

    let only_longitude = service
        .create_post(author.id, new_post(None, Some(127.0)), image("a.jpg"))
        .await;
    assert!(matches!(only_longitude, Err(AppError::BadRequest(_))));

    assert!(uploader.uploads().is_empty());
    assert_eq!(store.post_count(), 0);
}

#[tokio::test]
async fn create_post_for_unknown_user_is_not_found() {
    let store = MemoryStore::new();
    let uploader = RecordingUploader::new();

    let result = service(&store, &uploader)
        .create_post(404, new_post(Some(37.5), Some(127.0)), image("a.jpg"))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(uploader.uploads().is_empty());
}

#[tokio::test]
async fn upload_failure_propagates_and_stores_nothing() {
    let store = MemoryStore::new();
    let uploader = RecordingUploader::failing();
    let author = store.add_user("alice");

    let result = service(&store, &uploader)
        .create_post(author.id, new_post(Some(37.5), Some(127.0)), image("a.jpg"))
        .await;

    assert!(matches!(result, Err(AppError::Upload(_))));
    assert_eq!(store.post_count(), 0);
}

#[tokio::test]
async fn get_post_unknown_id_is_not_found() {
    let store = MemoryStore::new();
    let uploader = RecordingUploader::new();

    let result = service(&store, &uploader).get_post(999).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn list_posts_returns_newest_first() {
    let store = MemoryStore::new();
    let uploader = RecordingUploader::new();
    let author = store.add_user("alice");
    let service = service(&store, &uploader);

    let first = service
        .create_post(author.id, new_post(Some(1.0), Some(1.0)), image("1.jpg"))
        .await
        .unwrap();
    let second = service
        .create_post(author.id, new_post(Some(2.0), Some(2.0)), image("2.jpg"))
        .await
        .unwrap();

    let ids: Vec<i64> = service
        .list_posts()
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn only_the_author_may_update_or_delete() {
    let store = MemoryStore::new();
    let uploader = RecordingUploader::new();
    let alice = store.add_user("alice");
    let bob = store.add_user("bob");
    let service = service(&store, &uploader);

    let post = service
        .create_post(alice.id, new_post(Some(37.5), Some(127.0)), image("a.jpg"))
        .await
        .unwrap();

    let update = UpdatePost {
        title: Some("hijacked".to_string()),
        ..UpdatePost::default()
    };
    let result = service.update_post(bob.id, post.id, update, None).await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));

    let result = service.delete_post(bob.id, post.id).await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));

    let stored = store.stored_post(post.id).unwrap();
    assert_eq!(stored.title, "Cherry blossoms");
}

#[tokio::test]
async fn update_merges_partial_fields() {
    let store = MemoryStore::new();
    let uploader = RecordingUploader::new();
    let alice = store.add_user("alice");
    let service = service(&store, &uploader);

    let post = service
        .create_post(alice.id, new_post(Some(37.5), Some(127.0)), image("a.jpg"))
        .await
        .unwrap();

    let updated = service
        .update_post(
            alice.id,
            post.id,
            UpdatePost {
                title: Some("Night view".to_string()),
                latitude: Some(35.1),
                ..UpdatePost::default()
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Night view");
    assert_eq!(updated.content, post.content);
    assert_eq!(updated.latitude, 35.1);
    assert_eq!(updated.longitude, 127.0);
    assert_eq!(updated.image_url, post.image_url);
}

#[tokio::test]
async fn update_rejects_out_of_range_coordinate() {
    let store = MemoryStore::new();
    let uploader = RecordingUploader::new();
    let alice = store.add_user("alice");
    let service = service(&store, &uploader);

    let post = service
        .create_post(alice.id, new_post(Some(37.5), Some(127.0)), image("a.jpg"))
        .await
        .unwrap();

    let result = service
        .update_post(
            alice.id,
            post.id,
            UpdatePost {
                longitude: Some(181.0),
                ..UpdatePost::default()
            },
            None,
        )
        .await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
    assert_eq!(store.stored_post(post.id).unwrap().longitude, 127.0);
}

#[tokio::test]
async fn repeated_update_is_idempotent() {
    let store = MemoryStore::new();
    let uploader = RecordingUploader::new();
    let alice = store.add_user("alice");
    let service = service(&store, &uploader);

    let post = service
        .create_post(alice.id, new_post(Some(37.5), Some(127.0)), image("a.jpg"))
        .await
        .unwrap();
    let update = UpdatePost {
        content: Some("Petals everywhere".to_string()),
        ..UpdatePost::default()
    };

    let first = service
        .update_post(alice.id, post.id, update.clone(), None)
        .await
        .unwrap();
    let second = service
        .update_post(alice.id, post.id, update, None)
        .await
        .unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn update_with_image_replaces_url() {
    let store = MemoryStore::new();
    let uploader = RecordingUploader::new();
    let alice = store.add_user("alice");
    let service = service(&store, &uploader);

    let post = service
        .create_post(alice.id, new_post(Some(37.5), Some(127.0)), image("a.jpg"))
        .await
        .unwrap();

    let updated = service
        .update_post(
            alice.id,
            post.id,
            UpdatePost::default(),
            Some(image("b.png")),
        )
        .await
        .unwrap();

    assert_eq!(updated.image_url, "https://cdn.test/posts/2-b.png");
    assert_eq!(uploader.uploads().len(), 2);
}

#[tokio::test]
async fn delete_removes_post_likes_and_comments() {
    let store = MemoryStore::new();
    let uploader = RecordingUploader::new();
    let alice = store.add_user("alice");
    let bob = store.add_user("bob");
    let service = service(&store, &uploader);

    let post = service
        .create_post(alice.id, new_post(Some(37.5), Some(127.0)), image("a.jpg"))
        .await
        .unwrap();
    store.add_like(post.id, alice.id);
    store.add_like(post.id, bob.id);
    let root = store.insert_raw_comment(post.id, bob.id, None);
    store.insert_raw_comment(post.id, alice.id, Some(root.id));
    store.insert_raw_comment(post.id, bob.id, None);

    let ack = service.delete_post(alice.id, post.id).await.unwrap();

    assert!(ack.deleted);
    assert_eq!(store.likes_for(post.id), 0);
    assert_eq!(store.comments_for(post.id), 0);
    assert!(store.stored_post(post.id).is_none());
    assert!(matches!(
        service.get_post(post.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn markers_reduce_author_to_nickname() {
    let store = MemoryStore::new();
    let uploader = RecordingUploader::new();
    let alice = store.add_user("alice");
    let service = service(&store, &uploader);

    service
        .create_post(alice.id, new_post(Some(37.5), Some(127.0)), image("a.jpg"))
        .await
        .unwrap();

    let markers = service.list_markers().await.unwrap();
    assert_eq!(markers.len(), 1);

    let json = serde_json::to_value(&markers[0]).unwrap();
    assert_eq!(json["latitude"], 37.5);
    assert_eq!(json["author"]["nickName"], "alice");
    assert!(json["author"].get("email").is_none());
    assert!(json.get("createdAt").is_none());
}

#[tokio::test]
async fn marker_listing_failure_is_generic() {
    let store = MemoryStore::new();
    let uploader = RecordingUploader::new();
    store.fail_listing();

    let result = service(&store, &uploader).list_markers().await;

    match result {
        Err(err @ AppError::MarkerListingFailed) => {
            assert_eq!(err.to_string(), "Failed to fetch posts with markers");
        }
        other => panic!("unexpected result: {:?}", other.map(|m| m.len())),
    }
}
