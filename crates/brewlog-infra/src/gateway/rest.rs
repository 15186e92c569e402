//! REST gateway implementation.
//!
//! Speaks the Supabase-style HTTP contract of the remote service: a
//! PostgREST data API under `/rest/v1`, object storage under
//! `/storage/v1`, and password auth under `/auth/v1`. Every request
//! carries the public API key; data and storage calls additionally carry
//! the session's bearer token once someone is signed in, so row-level
//! permissions are enforced remotely.

use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use async_trait::async_trait;

use brewlog_core::domain::{
    BeerPost, BreweryPost, Comment, Identity, Post, PostDetails, PostKind,
};
use brewlog_core::error::GatewayError;
use brewlog_core::ports::{
    AuthGateway, BeerInsert, BreweryInsert, CommentInsert, Credentials, DataGateway, ImageUpload,
    ObjectStorage, RatingUpsert, object_path_from_url,
};

use crate::config::GatewayConfig;

/// Columns to join on every post fetch: one round trip brings the posts
/// with their denormalized children.
const POST_SELECT: &str = "select=*,ratings(*),comments(*)&order=created_at.desc";

pub struct RestGateway {
    http: reqwest::Client,
    config: GatewayConfig,
    access_token: RwLock<Option<String>>,
    sessions: broadcast::Sender<Option<Identity>>,
}

#[derive(Debug, serde::Deserialize)]
struct ApiUser {
    id: Uuid,
    email: Option<String>,
}

impl RestGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            access_token: RwLock::new(None),
            sessions: broadcast::channel(16).0,
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url, table)
    }

    fn storage_url(&self, suffix: &str) -> String {
        format!(
            "{}/storage/v1/object/{}{}",
            self.config.url, self.config.bucket, suffix
        )
    }

    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{}", self.config.url, endpoint)
    }

    async fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self.access_token.read().await.clone();
        let bearer = token.unwrap_or_else(|| self.config.anon_key.clone());
        request
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {bearer}"))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(remote_error(response).await)
        }
    }

    async fn fetch_posts<D>(&self, kind: PostKind) -> Result<Vec<Post<D>>, GatewayError>
    where
        D: PostDetails + DeserializeOwned,
    {
        let url = format!("{}?{}", self.rest_url(kind.table_name()), POST_SELECT);
        let request = self.authed(self.http.get(url)).await;
        decode(self.send(request).await?).await
    }

    /// Insert one row and return it as stored (`Prefer: return=representation`;
    /// PostgREST answers with a one-element array).
    async fn insert_row<T: DeserializeOwned>(
        &self,
        url: String,
        prefer: &str,
        body: serde_json::Value,
    ) -> Result<T, GatewayError> {
        let request = self
            .authed(self.http.post(url))
            .await
            .header("Prefer", prefer)
            .json(&body);
        let rows: Vec<T> = decode(self.send(request).await?).await?;
        rows.into_iter().next().ok_or_else(|| {
            GatewayError::Decode(
                "No row returned from the insert; check the service permissions".to_string(),
            )
        })
    }

    fn identity_for(&self, id: Uuid, email: &str) -> Identity {
        let identity = Identity::new(id, email);
        if self.config.admin_email.as_deref() == Some(email) {
            identity.with_role(Identity::ADMIN_ROLE)
        } else {
            identity
        }
    }
}

#[async_trait]
impl DataGateway for RestGateway {
    async fn fetch_beers(&self) -> Result<Vec<BeerPost>, GatewayError> {
        self.fetch_posts(PostKind::Beers).await
    }

    async fn fetch_breweries(&self) -> Result<Vec<BreweryPost>, GatewayError> {
        self.fetch_posts(PostKind::Breweries).await
    }

    async fn insert_beer(&self, insert: BeerInsert) -> Result<BeerPost, GatewayError> {
        let d = insert.draft;
        self.insert_row(
            self.rest_url(PostKind::Beers.table_name()),
            "return=representation",
            json!({
                "name": d.name,
                "brewery": d.brewery,
                "nation": d.nation,
                "type": d.style,
                "abv": d.abv,
                "price": d.price,
                "description": d.description,
                "imageUrl": insert.image_url,
                "user_id": insert.user_id,
            }),
        )
        .await
    }

    async fn insert_brewery(&self, insert: BreweryInsert) -> Result<BreweryPost, GatewayError> {
        let d = insert.draft;
        self.insert_row(
            self.rest_url(PostKind::Breweries.table_name()),
            "return=representation",
            json!({
                "name": d.name,
                "address": d.address,
                "city": d.city,
                "nation": d.nation,
                "description": d.description,
                "imageUrl": insert.image_url,
                "user_id": insert.user_id,
                "lat": insert.lat,
                "lng": insert.lng,
            }),
        )
        .await
    }

    async fn upsert_rating(&self, upsert: RatingUpsert) -> Result<(), GatewayError> {
        let url = format!(
            "{}?on_conflict=post_id,user_id,table_name",
            self.rest_url("ratings")
        );
        let request = self
            .authed(self.http.post(url))
            .await
            .header("Prefer", "resolution=merge-duplicates")
            .json(&json!({
                "post_id": upsert.post_id,
                "user_id": upsert.user_id,
                "value": upsert.value,
                "table_name": upsert.kind.table_name(),
            }));
        self.send(request).await?;
        Ok(())
    }

    async fn insert_comment(&self, insert: CommentInsert) -> Result<Comment, GatewayError> {
        self.insert_row(
            self.rest_url("comments"),
            "return=representation",
            json!({
                "post_id": insert.post_id,
                "user_id": insert.user_id,
                "user_email": insert.user_email,
                "text": insert.text,
                "table_name": insert.kind.table_name(),
            }),
        )
        .await
    }

    async fn delete_post(&self, kind: PostKind, id: i64) -> Result<(), GatewayError> {
        let url = format!("{}?id=eq.{}", self.rest_url(kind.table_name()), id);
        let request = self.authed(self.http.delete(url)).await;
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for RestGateway {
    async fn upload(&self, path: &str, image: &ImageUpload) -> Result<(), GatewayError> {
        let request = self
            .authed(self.http.post(self.storage_url(&format!("/{path}"))))
            .await
            .header("Content-Type", image.content_type.clone())
            .body(image.bytes.clone());
        self.send(request).await?;
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.config.url, self.config.bucket, path
        )
    }

    async fn remove(&self, paths: &[String]) -> Result<(), GatewayError> {
        let request = self
            .authed(self.http.delete(self.storage_url("")))
            .await
            .json(&json!({ "prefixes": paths }));
        self.send(request).await?;
        Ok(())
    }

    fn object_path(&self, public_url: &str) -> Option<String> {
        object_path_from_url(public_url, &self.config.bucket)
    }
}

#[async_trait]
impl AuthGateway for RestGateway {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, GatewayError> {
        let url = format!("{}?grant_type=password", self.auth_url("token"));
        let request = self.authed(self.http.post(url)).await.json(&json!({
            "email": credentials.email,
            "password": credentials.password,
        }));

        #[derive(serde::Deserialize)]
        struct TokenResponse {
            access_token: String,
            user: ApiUser,
        }

        let token: TokenResponse = decode(self.send(request).await?).await?;
        *self.access_token.write().await = Some(token.access_token);

        let email = token.user.email.unwrap_or_else(|| credentials.email.clone());
        let identity = self.identity_for(token.user.id, &email);
        let _ = self.sessions.send(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<Option<Identity>, GatewayError> {
        let request = self.authed(self.http.post(self.auth_url("signup"))).await.json(&json!({
            "email": credentials.email,
            "password": credentials.password,
        }));

        // With auto-confirm the service answers with a session; with email
        // confirmation pending it answers with the bare user record and the
        // session stays guest until the confirmation sign-in.
        let body: serde_json::Value = decode(self.send(request).await?).await?;
        match body.get("access_token").and_then(|v| v.as_str()) {
            Some(token) => {
                *self.access_token.write().await = Some(token.to_string());
                let user: ApiUser = serde_json::from_value(body["user"].clone())
                    .map_err(|e| GatewayError::Decode(e.to_string()))?;
                let email = user.email.unwrap_or_else(|| credentials.email.clone());
                let identity = self.identity_for(user.id, &email);
                let _ = self.sessions.send(Some(identity.clone()));
                Ok(Some(identity))
            }
            None => Ok(None),
        }
    }

    async fn sign_out(&self) -> Result<(), GatewayError> {
        let request = self.authed(self.http.post(self.auth_url("logout"))).await;
        let result = self.send(request).await.map(|_| ());
        *self.access_token.write().await = None;
        let _ = self.sessions.send(None);
        result
    }

    fn subscribe(&self) -> broadcast::Receiver<Option<Identity>> {
        self.sessions.subscribe()
    }
}

/// Map an error response to `GatewayError::Remote`, carrying the service's
/// own message verbatim when one can be extracted.
pub(crate) async fn remote_error(response: reqwest::Response) -> GatewayError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| format!("{status}: {body}"));
    GatewayError::Remote(message)
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GatewayError> {
    response
        .json()
        .await
        .map_err(|e| GatewayError::Decode(e.to_string()))
}
