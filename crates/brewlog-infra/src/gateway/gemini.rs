//! Gemini adapter for the description generator port.
//!
//! Calls the Google generative-language REST API to draft a tasting
//! description from the fields of a beer being composed.

use async_trait::async_trait;
use serde_json::json;

use brewlog_core::domain::NewBeer;
use brewlog_core::error::GatewayError;
use brewlog_core::ports::DescriptionGenerator;

use crate::config::DescriberConfig;
use crate::gateway::rest::remote_error;

pub struct GeminiDescriber {
    http: reqwest::Client,
    config: DescriberConfig,
}

impl GeminiDescriber {
    pub fn new(config: DescriberConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.config.model
        )
    }
}

fn prompt_for(draft: &NewBeer) -> String {
    format!(
        "Write a short, enticing, sommelier-style description for a beer \
         with these characteristics. Be creative and use evocative language.\n\
         \n\
         Name: {}\n\
         Brewery: {}\n\
         Nation: {}\n\
         Style: {}\n\
         ABV: {}%\n\
         \n\
         Description:",
        draft.name, draft.brewery, draft.nation, draft.style, draft.abv
    )
}

/// Pull the generated text out of a `generateContent` response body
/// (first candidate, first part).
fn generated_text(body: &serde_json::Value) -> Option<String> {
    let text = body
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()?;
    Some(text.trim().to_string())
}

#[async_trait]
impl DescriptionGenerator for GeminiDescriber {
    async fn describe_beer(&self, draft: &NewBeer) -> Result<String, GatewayError> {
        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt_for(draft) }] }]
            }))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        generated_text(&body)
            .ok_or_else(|| GatewayError::Decode("No generated text in the response".to_string()))
    }
}
