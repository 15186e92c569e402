//! Optimistic update engine.
//!
//! The only component that calls the remote gateway for mutations, and the
//! sole authority on how results merge back into the local entity store.
//! Every mutation follows one shape: local precondition check (a violation
//! never reaches the network), exactly one logical remote call, and on
//! success the corresponding store mutation. On failure the store is left
//! untouched and the gateway's message is surfaced verbatim as a transient
//! notice. The engine never retries; a retry is the user repeating the
//! action.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;

use brewlog_shared::{Notice, NoticeQueue};

use crate::domain::{
    BeerPost, BreweryPost, Comment, Coordinates, Identity, NewBeer, NewBrewery, PostKind, Rating,
};
use crate::error::EngineError;
use crate::ports::{
    BeerInsert, BreweryInsert, CommentInsert, DataGateway, DescriptionGenerator, ImageUpload,
    ObjectStorage, RatingUpsert,
};
use crate::sample::{sample_beers, sample_breweries};
use crate::session::SessionState;
use crate::store::EntityStore;

/// Fixed reference point for placeholder brewery coordinates (Rome).
/// Real geocoding is out of scope; new breweries get a small random
/// jitter around this point so the map does not stack every marker.
const REFERENCE_POINT: Coordinates = Coordinates {
    lat: 41.902782,
    lng: 12.496366,
};

/// Shown in place of a generated description when the text service is
/// unreachable or misconfigured.
const DESCRIPTION_FALLBACK: &str = "A description could not be generated right now.";

pub struct UpdateEngine {
    store: Arc<EntityStore>,
    data: Arc<dyn DataGateway>,
    storage: Arc<dyn ObjectStorage>,
    describer: Arc<dyn DescriptionGenerator>,
    session: Arc<SessionState>,
    notices: Arc<NoticeQueue>,
}

impl UpdateEngine {
    pub fn new(
        store: Arc<EntityStore>,
        data: Arc<dyn DataGateway>,
        storage: Arc<dyn ObjectStorage>,
        describer: Arc<dyn DescriptionGenerator>,
        session: Arc<SessionState>,
        notices: Arc<NoticeQueue>,
    ) -> Self {
        Self {
            store,
            data,
            storage,
            describer,
            session,
            notices,
        }
    }

    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    /// Initial load: one joined fetch per kind. An empty table falls back
    /// to the sample dataset for that kind; a failed fetch falls back for
    /// both kinds. Either way the application stays usable.
    pub async fn load_initial(&self) {
        let fetched = async {
            let beers = self.data.fetch_beers().await?;
            let breweries = self.data.fetch_breweries().await?;
            Ok::<_, crate::error::GatewayError>((beers, breweries))
        }
        .await;

        match fetched {
            Ok((beers, breweries)) => {
                if beers.is_empty() {
                    tracing::debug!("no beers in the remote store, loading sample data");
                    self.store.beers.replace_all(sample_beers()).await;
                } else {
                    self.store.beers.replace_all(beers).await;
                }
                if breweries.is_empty() {
                    tracing::debug!("no breweries in the remote store, loading sample data");
                    self.store.breweries.replace_all(sample_breweries()).await;
                } else {
                    self.store.breweries.replace_all(breweries).await;
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "initial fetch failed, loading sample data");
                self.notices.post(Notice::info(
                    "Could not reach the data service, showing sample data.",
                ));
                self.store.beers.replace_all(sample_beers()).await;
                self.store.breweries.replace_all(sample_breweries()).await;
            }
        }
    }

    pub async fn create_beer(
        &self,
        draft: NewBeer,
        image: Option<ImageUpload>,
    ) -> Result<BeerPost, EngineError> {
        let result = self.try_create_beer(draft, image).await;
        self.reported(result)
    }

    pub async fn create_brewery(
        &self,
        draft: NewBrewery,
        image: Option<ImageUpload>,
    ) -> Result<BreweryPost, EngineError> {
        let result = self.try_create_brewery(draft, image).await;
        self.reported(result)
    }

    pub async fn rate(
        &self,
        kind: PostKind,
        post_id: i64,
        value: u8,
    ) -> Result<(), EngineError> {
        let result = self.try_rate(kind, post_id, value).await;
        self.reported(result)
    }

    pub async fn comment(
        &self,
        kind: PostKind,
        post_id: i64,
        text: &str,
    ) -> Result<Comment, EngineError> {
        let result = self.try_comment(kind, post_id, text).await;
        self.reported(result)
    }

    pub async fn delete(&self, kind: PostKind, post_id: i64) -> Result<(), EngineError> {
        let result = self.try_delete(kind, post_id).await;
        self.reported(result)
    }

    /// Draft helper: ask the text service for a tasting description of the
    /// beer being composed. Touches no store state and never raises a
    /// notice; when the service is unavailable the caller gets a canned
    /// sentence and the draft stays editable.
    pub async fn suggest_description(&self, draft: &NewBeer) -> String {
        match self.describer.describe_beer(draft).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "description service unavailable");
                DESCRIPTION_FALLBACK.to_string()
            }
        }
    }

    async fn try_create_beer(
        &self,
        draft: NewBeer,
        image: Option<ImageUpload>,
    ) -> Result<BeerPost, EngineError> {
        let user = self.require_identity().await?;
        let image = image.ok_or(EngineError::MissingImage)?;

        let image_url = self.upload_image(&user, &image).await?;
        let mut post = self
            .data
            .insert_beer(BeerInsert {
                draft,
                image_url,
                user_id: user.id,
            })
            .await?;

        // A fresh post starts with empty child lists regardless of what
        // the insert echoed back.
        post.ratings.clear();
        post.comments.clear();
        self.store.beers.insert_front(post.clone()).await;
        self.notices.post(Notice::success("New beer added!"));
        Ok(post)
    }

    async fn try_create_brewery(
        &self,
        draft: NewBrewery,
        image: Option<ImageUpload>,
    ) -> Result<BreweryPost, EngineError> {
        let user = self.require_identity().await?;
        let image = image.ok_or(EngineError::MissingImage)?;

        let image_url = self.upload_image(&user, &image).await?;
        let location = placeholder_coordinates();
        let mut post = self
            .data
            .insert_brewery(BreweryInsert {
                draft,
                image_url,
                user_id: user.id,
                lat: location.lat,
                lng: location.lng,
            })
            .await?;

        post.ratings.clear();
        post.comments.clear();
        self.store.breweries.insert_front(post.clone()).await;
        self.notices.post(Notice::success("New brewery added!"));
        Ok(post)
    }

    async fn try_rate(
        &self,
        kind: PostKind,
        post_id: i64,
        value: u8,
    ) -> Result<(), EngineError> {
        let user = self.require_identity().await?;
        if !(1..=5).contains(&value) {
            return Err(EngineError::InvalidRating(value));
        }

        self.data
            .upsert_rating(RatingUpsert {
                kind,
                post_id,
                user_id: user.id,
                value,
            })
            .await?;

        let rating = Rating {
            user_id: user.id,
            value,
        };
        let applied = match kind {
            PostKind::Beers => {
                self.store
                    .beers
                    .update_by_id(post_id, |p| p.upsert_rating(rating))
                    .await
            }
            PostKind::Breweries => {
                self.store
                    .breweries
                    .update_by_id(post_id, |p| p.upsert_rating(rating))
                    .await
            }
        };
        if !applied {
            // The post vanished locally between the tap and the remote
            // confirmation (e.g. a concurrent delete). The remote row is
            // orphaned with the post and will cascade with it.
            tracing::debug!(%kind, post_id, "rated post no longer in the local store");
        }
        Ok(())
    }

    async fn try_comment(
        &self,
        kind: PostKind,
        post_id: i64,
        text: &str,
    ) -> Result<Comment, EngineError> {
        let user = self.require_identity().await?;
        if text.trim().is_empty() {
            return Err(EngineError::EmptyComment);
        }

        let comment = self
            .data
            .insert_comment(CommentInsert {
                kind,
                post_id,
                user_id: user.id,
                user_email: user.email.clone(),
                text: text.to_string(),
            })
            .await?;

        let stored = comment.clone();
        let applied = match kind {
            PostKind::Beers => {
                self.store
                    .beers
                    .update_by_id(post_id, |p| p.prepend_comment(stored))
                    .await
            }
            PostKind::Breweries => {
                self.store
                    .breweries
                    .update_by_id(post_id, |p| p.prepend_comment(stored))
                    .await
            }
        };
        if !applied {
            tracing::debug!(%kind, post_id, "commented post no longer in the local store");
        }
        Ok(comment)
    }

    async fn try_delete(&self, kind: PostKind, post_id: i64) -> Result<(), EngineError> {
        let user = self.require_identity().await?;

        let (owner, image_url) = match kind {
            PostKind::Beers => self
                .store
                .beers
                .get(post_id)
                .await
                .map(|p| (p.user_id, p.image_url)),
            PostKind::Breweries => self
                .store
                .breweries
                .get(post_id)
                .await
                .map(|p| (p.user_id, p.image_url)),
        }
        .ok_or(EngineError::NotFound { id: post_id })?;

        if !user.is_admin() && owner != Some(user.id) {
            return Err(EngineError::Forbidden);
        }

        // Best-effort image removal first. A URL that does not point into
        // our storage is skipped; a failed removal is logged and the record
        // deletion proceeds regardless - the row is the authoritative part.
        if let Some(path) = self.storage.object_path(&image_url) {
            if let Err(err) = self.storage.remove(&[path]).await {
                tracing::warn!(%kind, post_id, error = %err, "could not delete image, continuing");
            }
        }

        self.data.delete_post(kind, post_id).await?;

        match kind {
            PostKind::Beers => self.store.beers.remove_by_id(post_id).await,
            PostKind::Breweries => self.store.breweries.remove_by_id(post_id).await,
        };
        self.store.clear_selection_of(kind, post_id).await;
        self.notices.post(Notice::success("Post deleted."));
        Ok(())
    }

    async fn require_identity(&self) -> Result<Identity, EngineError> {
        self.session
            .identity()
            .await
            .ok_or(EngineError::SignInRequired)
    }

    async fn upload_image(
        &self,
        user: &Identity,
        image: &ImageUpload,
    ) -> Result<String, EngineError> {
        // Namespaced by owner and timestamped to avoid collisions.
        let path = format!(
            "{}/{}_{}",
            user.id,
            Utc::now().timestamp_millis(),
            image.file_name
        );
        self.storage.upload(&path, image).await?;
        Ok(self.storage.public_url(&path))
    }

    /// Surface a failed mutation as a transient error notice and hand the
    /// error back unchanged. Nothing propagates past this boundary
    /// unreported.
    fn reported<T>(&self, result: Result<T, EngineError>) -> Result<T, EngineError> {
        if let Err(err) = &result {
            self.notices.post(Notice::error(err.to_string()));
        }
        result
    }
}

fn placeholder_coordinates() -> Coordinates {
    let mut rng = rand::thread_rng();
    Coordinates {
        lat: REFERENCE_POINT.lat + rng.gen_range(-0.1..0.1),
        lng: REFERENCE_POINT.lng + rng.gen_range(-0.1..0.1),
    }
}
