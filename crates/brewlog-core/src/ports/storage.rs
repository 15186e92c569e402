use async_trait::async_trait;

use crate::error::GatewayError;

/// An image file handed to the engine by the presentation layer.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Object storage port for post images.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, path: &str, image: &ImageUpload) -> Result<(), GatewayError>;

    /// Publicly reachable URL for an object path. Pure string composition,
    /// no network call.
    fn public_url(&self, path: &str) -> String;

    async fn remove(&self, paths: &[String]) -> Result<(), GatewayError>;

    /// Derive the object path back out of a stored public URL, or `None`
    /// if the URL does not reference this storage.
    fn object_path(&self, public_url: &str) -> Option<String>;
}

/// Locate the bucket segment inside a public URL and return everything
/// after it. Shared by the storage adapters.
pub fn object_path_from_url(public_url: &str, bucket: &str) -> Option<String> {
    let segments: Vec<&str> = public_url.split('/').collect();
    let marker = segments.iter().position(|s| *s == bucket)?;
    let rest = &segments[marker + 1..];
    if rest.is_empty() {
        return None;
    }
    Some(rest.join("/"))
}
