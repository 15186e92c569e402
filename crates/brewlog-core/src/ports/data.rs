use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{BeerPost, BreweryPost, Comment, NewBeer, NewBrewery, PostKind};
use crate::error::GatewayError;

/// A fully assembled beer row ready for insertion: the user's draft plus
/// the fields the engine fills in (image URL, owner).
#[derive(Debug, Clone)]
pub struct BeerInsert {
    pub draft: NewBeer,
    pub image_url: String,
    pub user_id: Uuid,
}

/// A fully assembled brewery row: draft plus image URL, owner and the
/// engine-assigned coordinates.
#[derive(Debug, Clone)]
pub struct BreweryInsert {
    pub draft: NewBrewery,
    pub image_url: String,
    pub user_id: Uuid,
    pub lat: f64,
    pub lng: f64,
}

/// A rating write, upserted on the composite key (post, author, kind).
#[derive(Debug, Clone, Copy)]
pub struct RatingUpsert {
    pub kind: PostKind,
    pub post_id: i64,
    pub user_id: Uuid,
    pub value: u8,
}

/// A comment write referencing its parent post by (id, kind), with the
/// author's email snapshotted at creation time.
#[derive(Debug, Clone)]
pub struct CommentInsert {
    pub kind: PostKind,
    pub post_id: i64,
    pub user_id: Uuid,
    pub user_email: String,
    pub text: String,
}

/// Row-oriented data store port. Fetches return posts joined with their
/// ratings and comments in one round trip per kind; inserts return the
/// stored row so the caller can merge it locally without a second fetch.
#[async_trait]
pub trait DataGateway: Send + Sync {
    async fn fetch_beers(&self) -> Result<Vec<BeerPost>, GatewayError>;

    async fn fetch_breweries(&self) -> Result<Vec<BreweryPost>, GatewayError>;

    async fn insert_beer(&self, insert: BeerInsert) -> Result<BeerPost, GatewayError>;

    async fn insert_brewery(&self, insert: BreweryInsert) -> Result<BreweryPost, GatewayError>;

    /// Create-or-replace a rating keyed by (post id, author id, kind).
    async fn upsert_rating(&self, upsert: RatingUpsert) -> Result<(), GatewayError>;

    /// Insert a comment and return it as stored (id and timestamp assigned
    /// remotely).
    async fn insert_comment(&self, insert: CommentInsert) -> Result<Comment, GatewayError>;

    /// Delete the row matching `id` in the table for `kind`.
    async fn delete_post(&self, kind: PostKind, id: i64) -> Result<(), GatewayError>;
}
