//! Gateway configuration loaded from environment variables.

use std::env;

/// Connection settings for the remote backend-as-a-service.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the service, e.g. `https://abc.supabase.co`.
    pub url: String,
    /// Public API key sent with every request.
    pub anon_key: String,
    /// Storage bucket holding post images.
    pub bucket: String,
    /// Address whose sign-ins receive the admin role claim.
    pub admin_email: Option<String>,
}

impl GatewayConfig {
    /// Load configuration from environment variables, reading a `.env`
    /// file first if one is present. Returns `None` when `GATEWAY_URL` is
    /// unset, in which case callers fall back to the in-memory gateway.
    pub fn load() -> Option<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Option<Self> {
        let url = env::var("GATEWAY_URL").ok()?;
        Some(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: env::var("GATEWAY_ANON_KEY").unwrap_or_default(),
            bucket: env::var("STORAGE_BUCKET").unwrap_or_else(|_| "posts-images".to_string()),
            admin_email: env::var("ADMIN_EMAIL").ok(),
        })
    }
}

/// Settings for the text-generation service behind the description port.
#[derive(Debug, Clone)]
pub struct DescriberConfig {
    /// API key for the generative-language service.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
}

impl DescriberConfig {
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash";

    /// Returns `None` when `GEMINI_API_KEY` is unset, in which case callers
    /// fall back to the in-memory describer.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            api_key: env::var("GEMINI_API_KEY").ok()?,
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| Self::DEFAULT_MODEL.to_string()),
        })
    }
}
