use async_trait::async_trait;

use crate::domain::NewBeer;
use crate::error::GatewayError;

/// Text-generation port: produces a short tasting description for a beer
/// draft. A draft helper only - the suggestion lands in the form, where
/// the user is free to edit or discard it before the post is created.
#[async_trait]
pub trait DescriptionGenerator: Send + Sync {
    async fn describe_beer(&self, draft: &NewBeer) -> Result<String, GatewayError>;
}
