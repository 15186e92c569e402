//! In-memory gateway implementation - used as fallback when no remote
//! service is configured, and as the fixture for engine tests.
//!
//! Implements every port (data, storage, auth, description) in one
//! process.
//! Note: everything is lost on process exit.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use brewlog_core::domain::{
    BeerDetails, BeerPost, BreweryDetails, BreweryPost, Comment, Identity, NewBeer, Post, PostKind,
    Rating,
};
use brewlog_core::error::GatewayError;
use brewlog_core::ports::{
    AuthGateway, BeerInsert, BreweryInsert, CommentInsert, Credentials, DataGateway,
    DescriptionGenerator, ImageUpload, ObjectStorage, RatingUpsert, object_path_from_url,
};

struct StoredUser {
    id: Uuid,
    password: String,
}

/// In-memory backend: row tables with auto-increment ids, an object map,
/// and a password table with a broadcast session feed.
pub struct InMemoryGateway {
    beers: RwLock<Vec<BeerPost>>,
    breweries: RwLock<Vec<BreweryPost>>,
    next_id: AtomicI64,
    objects: RwLock<HashMap<String, Vec<u8>>>,
    users: RwLock<HashMap<String, StoredUser>>,
    sessions: broadcast::Sender<Option<Identity>>,
    bucket: String,
    admin_email: Option<String>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self {
            beers: RwLock::new(Vec::new()),
            breweries: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
            objects: RwLock::new(HashMap::new()),
            users: RwLock::new(HashMap::new()),
            sessions: broadcast::channel(16).0,
            bucket: "posts-images".to_string(),
            admin_email: None,
        }
    }

    /// Sign-ins with this address receive the admin role claim.
    pub fn with_admin(mut self, email: impl Into<String>) -> Self {
        self.admin_email = Some(email.into());
        self
    }

    fn identity_for(&self, id: Uuid, email: &str) -> Identity {
        let identity = Identity::new(id, email);
        if self.admin_email.as_deref() == Some(email) {
            identity.with_role(Identity::ADMIN_ROLE)
        } else {
            identity
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataGateway for InMemoryGateway {
    async fn fetch_beers(&self) -> Result<Vec<BeerPost>, GatewayError> {
        Ok(self.beers.read().await.clone())
    }

    async fn fetch_breweries(&self) -> Result<Vec<BreweryPost>, GatewayError> {
        Ok(self.breweries.read().await.clone())
    }

    async fn insert_beer(&self, insert: BeerInsert) -> Result<BeerPost, GatewayError> {
        let draft = insert.draft;
        let post = Post {
            id: self.next_id(),
            name: draft.name,
            image_url: insert.image_url,
            description: draft.description,
            created_at: Utc::now(),
            user_id: Some(insert.user_id),
            ratings: Vec::new(),
            comments: Vec::new(),
            details: BeerDetails {
                brewery: draft.brewery,
                nation: draft.nation,
                style: draft.style,
                abv: draft.abv,
                price: draft.price,
            },
        };
        // Newest first, mirroring the remote fetch ordering.
        self.beers.write().await.insert(0, post.clone());
        Ok(post)
    }

    async fn insert_brewery(&self, insert: BreweryInsert) -> Result<BreweryPost, GatewayError> {
        let draft = insert.draft;
        let post = Post {
            id: self.next_id(),
            name: draft.name,
            image_url: insert.image_url,
            description: draft.description,
            created_at: Utc::now(),
            user_id: Some(insert.user_id),
            ratings: Vec::new(),
            comments: Vec::new(),
            details: BreweryDetails {
                address: draft.address,
                city: draft.city,
                nation: draft.nation,
                lat: insert.lat,
                lng: insert.lng,
            },
        };
        self.breweries.write().await.insert(0, post.clone());
        Ok(post)
    }

    async fn upsert_rating(&self, upsert: RatingUpsert) -> Result<(), GatewayError> {
        let rating = Rating {
            user_id: upsert.user_id,
            value: upsert.value,
        };
        let found = match upsert.kind {
            PostKind::Beers => {
                let mut beers = self.beers.write().await;
                beers
                    .iter_mut()
                    .find(|p| p.id == upsert.post_id)
                    .map(|p| p.upsert_rating(rating))
                    .is_some()
            }
            PostKind::Breweries => {
                let mut breweries = self.breweries.write().await;
                breweries
                    .iter_mut()
                    .find(|p| p.id == upsert.post_id)
                    .map(|p| p.upsert_rating(rating))
                    .is_some()
            }
        };
        if !found {
            return Err(GatewayError::Remote(format!(
                "No row with id {} in {}",
                upsert.post_id, upsert.kind
            )));
        }
        Ok(())
    }

    async fn insert_comment(&self, insert: CommentInsert) -> Result<Comment, GatewayError> {
        let comment = Comment {
            id: Uuid::new_v4(),
            user_id: insert.user_id,
            user_email: insert.user_email,
            text: insert.text,
            created_at: Utc::now(),
        };
        let stored = comment.clone();
        let found = match insert.kind {
            PostKind::Beers => {
                let mut beers = self.beers.write().await;
                beers
                    .iter_mut()
                    .find(|p| p.id == insert.post_id)
                    .map(|p| p.prepend_comment(stored))
                    .is_some()
            }
            PostKind::Breweries => {
                let mut breweries = self.breweries.write().await;
                breweries
                    .iter_mut()
                    .find(|p| p.id == insert.post_id)
                    .map(|p| p.prepend_comment(stored))
                    .is_some()
            }
        };
        if !found {
            return Err(GatewayError::Remote(format!(
                "No row with id {} in {}",
                insert.post_id, insert.kind
            )));
        }
        Ok(comment)
    }

    async fn delete_post(&self, kind: PostKind, id: i64) -> Result<(), GatewayError> {
        match kind {
            PostKind::Beers => self.beers.write().await.retain(|p| p.id != id),
            PostKind::Breweries => self.breweries.write().await.retain(|p| p.id != id),
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for InMemoryGateway {
    async fn upload(&self, path: &str, image: &ImageUpload) -> Result<(), GatewayError> {
        self.objects
            .write()
            .await
            .insert(path.to_string(), image.bytes.clone());
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://storage/{}/{}", self.bucket, path)
    }

    async fn remove(&self, paths: &[String]) -> Result<(), GatewayError> {
        let mut objects = self.objects.write().await;
        for path in paths {
            if objects.remove(path).is_none() {
                return Err(GatewayError::Remote(format!("Object not found: {path}")));
            }
        }
        Ok(())
    }

    fn object_path(&self, public_url: &str) -> Option<String> {
        object_path_from_url(public_url, &self.bucket)
    }
}

#[async_trait]
impl DescriptionGenerator for InMemoryGateway {
    async fn describe_beer(&self, draft: &NewBeer) -> Result<String, GatewayError> {
        // Deterministic template in place of a real text model.
        Ok(format!(
            "{} by {} ({}) is a {} at {:.1}% ABV with a character all of its own.",
            draft.name, draft.brewery, draft.nation, draft.style, draft.abv
        ))
    }
}

#[async_trait]
impl AuthGateway for InMemoryGateway {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, GatewayError> {
        let users = self.users.read().await;
        let user = users
            .get(&credentials.email)
            .filter(|u| u.password == credentials.password)
            .ok_or_else(|| GatewayError::Remote("Invalid login credentials".to_string()))?;

        let identity = self.identity_for(user.id, &credentials.email);
        let _ = self.sessions.send(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<Option<Identity>, GatewayError> {
        let mut users = self.users.write().await;
        if users.contains_key(&credentials.email) {
            return Err(GatewayError::Remote("User already registered".to_string()));
        }
        let id = Uuid::new_v4();
        users.insert(
            credentials.email.clone(),
            StoredUser {
                id,
                password: credentials.password.clone(),
            },
        );

        // No confirmation step in memory: the account is live immediately.
        let identity = self.identity_for(id, &credentials.email);
        let _ = self.sessions.send(Some(identity.clone()));
        Ok(Some(identity))
    }

    async fn sign_out(&self) -> Result<(), GatewayError> {
        let _ = self.sessions.send(None);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Option<Identity>> {
        self.sessions.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(email: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let gateway = InMemoryGateway::new();
        let created = gateway.sign_up(&creds("a@b.c")).await.unwrap().unwrap();
        let signed_in = gateway.sign_in(&creds("a@b.c")).await.unwrap();
        assert_eq!(created.id, signed_in.id);
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let gateway = InMemoryGateway::new();
        gateway.sign_up(&creds("a@b.c")).await.unwrap();

        let bad = Credentials {
            email: "a@b.c".to_string(),
            password: "wrong".to_string(),
        };
        let err = gateway.sign_in(&bad).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");
    }

    #[tokio::test]
    async fn test_admin_email_gets_role_claim() {
        let gateway = InMemoryGateway::new().with_admin("boss@b.c");
        gateway.sign_up(&creds("boss@b.c")).await.unwrap();
        let identity = gateway.sign_in(&creds("boss@b.c")).await.unwrap();
        assert!(identity.is_admin());
    }

    #[tokio::test]
    async fn test_remove_missing_object_errors() {
        let gateway = InMemoryGateway::new();
        let err = gateway
            .remove(&["nope/missing.jpg".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing.jpg"));
    }

    #[tokio::test]
    async fn test_described_beer_carries_the_draft_fields() {
        let gateway = InMemoryGateway::new();
        let draft = NewBeer {
            name: "Nastro Dorato".to_string(),
            brewery: "Acme".to_string(),
            nation: "Italy".to_string(),
            style: "Lager".to_string(),
            abv: 5.0,
            price: 4.5,
            description: None,
        };
        let text = gateway.describe_beer(&draft).await.unwrap();
        assert!(text.contains("Nastro Dorato"));
        assert!(text.contains("Lager"));
    }

    #[tokio::test]
    async fn test_public_url_round_trips_to_path() {
        let gateway = InMemoryGateway::new();
        let url = gateway.public_url("uid/1_a.jpg");
        assert_eq!(gateway.object_path(&url), Some("uid/1_a.jpg".to_string()));
    }
}
