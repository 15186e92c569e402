//! End-to-end tests of the update engine against the in-memory gateway.

use std::sync::Arc;
use std::time::Duration;

use brewlog_core::domain::{Identity, NewBeer, NewBrewery, PostKind};
use brewlog_core::ports::{Credentials, DataGateway, ImageUpload, ObjectStorage};
use brewlog_core::{EngineError, EntityStore, SessionState, UpdateEngine};
use brewlog_infra::InMemoryGateway;
use brewlog_shared::NoticeQueue;

struct App {
    engine: UpdateEngine,
    gateway: Arc<InMemoryGateway>,
    session: Arc<SessionState>,
    notices: Arc<NoticeQueue>,
}

fn app() -> App {
    let gateway = Arc::new(InMemoryGateway::new().with_admin("boss@example.com"));
    let store = Arc::new(EntityStore::new());
    let session = Arc::new(SessionState::new(gateway.clone()));
    let notices = Arc::new(NoticeQueue::new());
    let engine = UpdateEngine::new(
        store,
        gateway.clone(),
        gateway.clone(),
        gateway.clone(),
        session.clone(),
        notices.clone(),
    );
    App {
        engine,
        gateway,
        session,
        notices,
    }
}

async fn sign_up_as(session: &SessionState, email: &str) -> Identity {
    session
        .sign_up(&Credentials {
            email: email.to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap()
        .expect("in-memory accounts are live immediately")
}

fn image() -> Option<ImageUpload> {
    Some(ImageUpload {
        file_name: "label.jpg".to_string(),
        content_type: "image/jpeg".to_string(),
        bytes: vec![0xff, 0xd8, 0xff],
    })
}

fn beer_draft(name: &str) -> NewBeer {
    NewBeer {
        name: name.to_string(),
        brewery: "Acme".to_string(),
        nation: "Italy".to_string(),
        style: "IPA".to_string(),
        abv: 6.2,
        price: 5.0,
        description: Some("hoppy".to_string()),
    }
}

fn brewery_draft(name: &str) -> NewBrewery {
    NewBrewery {
        name: name.to_string(),
        address: "Via Roma 1".to_string(),
        city: "Roma".to_string(),
        nation: "Italy".to_string(),
        description: None,
    }
}

#[tokio::test]
async fn test_empty_gateway_falls_back_to_sample_data() {
    let app = app();
    app.engine.load_initial().await;

    assert!(!app.engine.store().beers.is_empty().await);
    assert!(!app.engine.store().breweries.is_empty().await);
}

#[tokio::test]
async fn test_create_beer_prepends_with_empty_children() {
    let app = app();
    sign_up_as(&app.session, "taster@example.com").await;

    app.engine
        .create_beer(beer_draft("First"), image())
        .await
        .unwrap();
    let created = app
        .engine
        .create_beer(beer_draft("Second"), image())
        .await
        .unwrap();

    let beers = app.engine.store().beers.snapshot().await;
    assert_eq!(beers.len(), 2);
    assert_eq!(beers[0].id, created.id);
    assert_eq!(beers[0].name, "Second");
    assert!(beers[0].ratings.is_empty());
    assert!(beers[0].comments.is_empty());
    assert!(app.notices.current().is_some());
}

#[tokio::test]
async fn test_created_brewery_gets_placeholder_coordinates() {
    let app = app();
    sign_up_as(&app.session, "taster@example.com").await;

    let created = app
        .engine
        .create_brewery(brewery_draft("Hops & Sons"), image())
        .await
        .unwrap();

    assert!((created.details.lat - 41.902782).abs() < 0.1);
    assert!((created.details.lng - 12.496366).abs() < 0.1);
}

#[tokio::test]
async fn test_second_rating_by_same_author_replaces_first() {
    let app = app();
    let user = sign_up_as(&app.session, "taster@example.com").await;
    let post = app
        .engine
        .create_beer(beer_draft("Rated"), image())
        .await
        .unwrap();

    app.engine.rate(PostKind::Beers, post.id, 3).await.unwrap();
    app.engine.rate(PostKind::Beers, post.id, 5).await.unwrap();

    let stored = app.engine.store().beers.get(post.id).await.unwrap();
    let mine: Vec<_> = stored
        .ratings
        .iter()
        .filter(|r| r.user_id == user.id)
        .collect();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].value, 5);

    // The remote row converged to the same state.
    let remote = app.gateway.fetch_beers().await.unwrap();
    let remote_post = remote.iter().find(|p| p.id == post.id).unwrap();
    assert_eq!(remote_post.ratings.len(), 1);
    assert_eq!(remote_post.ratings[0].value, 5);
}

#[tokio::test]
async fn test_comments_arrive_newest_first() {
    let app = app();
    sign_up_as(&app.session, "taster@example.com").await;
    let post = app
        .engine
        .create_beer(beer_draft("Discussed"), image())
        .await
        .unwrap();

    app.engine
        .comment(PostKind::Beers, post.id, "older")
        .await
        .unwrap();
    app.engine
        .comment(PostKind::Beers, post.id, "newer")
        .await
        .unwrap();

    let stored = app.engine.store().beers.get(post.id).await.unwrap();
    assert_eq!(stored.comments[0].text, "newer");
    assert_eq!(stored.comments[1].text, "older");
    assert_eq!(stored.comments[0].user_email, "taster@example.com");
}

#[tokio::test]
async fn test_comment_on_locally_vanished_post_still_succeeds() {
    let app = app();
    sign_up_as(&app.session, "taster@example.com").await;
    let post = app
        .engine
        .create_beer(beer_draft("Ghost"), image())
        .await
        .unwrap();

    // The post is gone locally but its row still exists remotely.
    app.engine.store().beers.remove_by_id(post.id).await;

    let comment = app
        .engine
        .comment(PostKind::Beers, post.id, "late")
        .await
        .unwrap();
    assert_eq!(comment.text, "late");
    assert!(app.engine.store().beers.is_empty().await);
}

#[tokio::test]
async fn test_suggested_description_reflects_the_draft() {
    let app = app();
    // No sign-in needed: the helper only drafts text.
    let text = app
        .engine
        .suggest_description(&beer_draft("Nastro Dorato"))
        .await;
    assert!(text.contains("Nastro Dorato"));
    assert!(text.contains("Acme"));
}

#[tokio::test]
async fn test_owner_delete_removes_post_and_image() {
    let app = app();
    sign_up_as(&app.session, "taster@example.com").await;
    let post = app
        .engine
        .create_beer(beer_draft("Doomed"), image())
        .await
        .unwrap();

    app.engine.delete(PostKind::Beers, post.id).await.unwrap();

    assert!(app.engine.store().beers.is_empty().await);
    assert!(app.gateway.fetch_beers().await.unwrap().is_empty());

    // The image object is gone too: removing it again fails.
    let path = app.gateway.object_path(&post.image_url).unwrap();
    assert!(app.gateway.remove(&[path]).await.is_err());
}

#[tokio::test]
async fn test_delete_survives_storage_removal_failure() {
    let app = app();
    sign_up_as(&app.session, "taster@example.com").await;
    let post = app
        .engine
        .create_beer(beer_draft("Orphaned image"), image())
        .await
        .unwrap();

    // Remove the object out of band so the engine's own removal fails.
    let path = app.gateway.object_path(&post.image_url).unwrap();
    app.gateway.remove(&[path]).await.unwrap();

    app.engine.delete(PostKind::Beers, post.id).await.unwrap();
    assert!(app.engine.store().beers.is_empty().await);
    assert!(app.gateway.fetch_beers().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_may_delete_someone_elses_post() {
    let app = app();
    sign_up_as(&app.session, "taster@example.com").await;
    let post = app
        .engine
        .create_beer(beer_draft("Flagged"), image())
        .await
        .unwrap();

    app.session.sign_out().await.unwrap();
    sign_up_as(&app.session, "boss@example.com").await;

    app.engine.delete(PostKind::Beers, post.id).await.unwrap();
    assert!(app.engine.store().beers.is_empty().await);
}

#[tokio::test]
async fn test_non_owner_delete_is_rejected_and_store_unchanged() {
    let app = app();
    sign_up_as(&app.session, "owner@example.com").await;
    let post = app
        .engine
        .create_beer(beer_draft("Protected"), image())
        .await
        .unwrap();

    app.session.sign_out().await.unwrap();
    sign_up_as(&app.session, "other@example.com").await;

    let err = app.engine.delete(PostKind::Beers, post.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden));
    assert_eq!(app.engine.store().beers.len().await, 1);
    assert_eq!(app.gateway.fetch_beers().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_clears_matching_open_detail() {
    let app = app();
    sign_up_as(&app.session, "taster@example.com").await;
    let post = app
        .engine
        .create_beer(beer_draft("Open in detail"), image())
        .await
        .unwrap();

    app.engine.store().open_detail(PostKind::Beers, post.id).await;
    app.engine.delete(PostKind::Beers, post.id).await.unwrap();
    assert!(app.engine.store().selection().await.is_none());
}

#[tokio::test]
async fn test_session_feed_signs_the_watcher_out() {
    let app = app();
    sign_up_as(&app.session, "taster@example.com").await;
    let _watch = app.session.watch();

    // Sign-out from elsewhere (another task holding the same gateway).
    use brewlog_core::ports::AuthGateway;
    app.gateway.sign_out().await.unwrap();

    for _ in 0..50 {
        if !app.session.is_signed_in().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("session feed change was never applied");
}
