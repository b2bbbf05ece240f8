// ABOUTME: Instagram Graph API client covering token exchange, profile, and media endpoints
// ABOUTME: Implements the InstagramApi trait with bounded request timeouts
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Instagram Graph API Client
//!
//! HTTP client for the provider endpoints the growth core needs: the
//! authorization-code exchange, the long-lived token exchange, the profile
//! fetch, and the media list. Every request carries a conservative timeout;
//! a hung provider call is surfaced as an error, never awaited forever.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::InstagramConfig;
use crate::errors::{AppError, AppResult};

/// Fixed page size for media list requests
pub const MEDIA_PAGE_SIZE: usize = 50;

/// Fields requested from the media endpoint
const MEDIA_FIELDS: &str = "id,caption,media_type,media_url,timestamp,like_count,comments_count";

/// Provider endpoint URLs, overridable for tests
#[derive(Debug, Clone)]
pub struct InstagramEndpoints {
    /// Facebook OAuth dialog for the authorization redirect
    pub authorize_url: String,
    /// Short-lived token endpoint
    pub token_url: String,
    /// Graph API base URL (long-lived exchange, profile, media)
    pub graph_url: String,
}

impl Default for InstagramEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: "https://www.facebook.com/v18.0/dialog/oauth".to_string(),
            token_url: "https://api.instagram.com/oauth/access_token".to_string(),
            graph_url: "https://graph.instagram.com".to_string(),
        }
    }
}

/// A long-lived access token with its provider-reported lifetime
#[derive(Debug, Clone)]
pub struct LongLivedToken {
    /// The token itself
    pub access_token: String,
    /// Lifetime in seconds from the moment of exchange
    pub expires_in: i64,
}

/// The provider profile of the authorizing creator
#[derive(Debug, Clone)]
pub struct InstagramProfile {
    /// Instagram-assigned user id
    pub id: String,
    /// Instagram handle
    pub username: String,
}

/// One media item as returned by the provider, before normalization
#[derive(Debug, Clone, Deserialize)]
pub struct MediaItem {
    /// Instagram-assigned media id
    pub id: String,
    /// Caption, absent for caption-less posts
    pub caption: Option<String>,
    /// Media type (IMAGE, VIDEO, CAROUSEL_ALBUM)
    pub media_type: Option<String>,
    /// Media URL
    pub media_url: Option<String>,
    /// Publish timestamp as reported by the provider
    pub timestamp: Option<String>,
    /// Like count, absent for some media kinds
    pub like_count: Option<i64>,
    /// Comment count, absent for some media kinds
    pub comments_count: Option<i64>,
}

/// Provider API surface consumed by the linking flow and the sync engine
#[async_trait]
pub trait InstagramApi: Send + Sync {
    /// Build the authorization URL embedding the signed state value
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for a short-lived access token
    async fn exchange_code(&self, code: &str) -> AppResult<String>;

    /// Exchange a short-lived token for a long-lived one
    async fn exchange_long_lived(&self, short_lived_token: &str) -> AppResult<LongLivedToken>;

    /// Fetch the authorizing creator's profile
    async fn get_profile(&self, access_token: &str) -> AppResult<InstagramProfile>;

    /// List the account's most recent media, up to `limit` items
    async fn list_media(&self, access_token: &str, limit: usize) -> AppResult<Vec<MediaItem>>;
}

/// Short-lived token response format
#[derive(Debug, Deserialize)]
struct ShortLivedTokenResponse {
    access_token: String,
}

/// Long-lived token response format
#[derive(Debug, Deserialize)]
struct LongLivedTokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Profile response format
#[derive(Debug, Deserialize)]
struct ProfileResponse {
    id: String,
    username: String,
}

/// Media list response format
#[derive(Debug, Deserialize)]
struct MediaListResponse {
    data: Option<Vec<MediaItem>>,
}

/// Instagram Graph API client
pub struct InstagramClient {
    client: Client,
    endpoints: InstagramEndpoints,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: Vec<String>,
}

impl InstagramClient {
    /// Create a client from the Instagram app configuration
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ConfigMissing`] when app credentials are absent,
    /// or [`AppError::ExternalApi`] if the HTTP client cannot be built.
    pub fn new(config: &InstagramConfig, http_timeout: Duration) -> AppResult<Self> {
        Self::with_endpoints(config, http_timeout, InstagramEndpoints::default())
    }

    /// Create a client pointing at custom endpoints (used by tests)
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ConfigMissing`] when app credentials are absent,
    /// or [`AppError::ExternalApi`] if the HTTP client cannot be built.
    pub fn with_endpoints(
        config: &InstagramConfig,
        http_timeout: Duration,
        endpoints: InstagramEndpoints,
    ) -> AppResult<Self> {
        let client_id = config
            .client_id
            .clone()
            .ok_or(AppError::ConfigMissing("INSTAGRAM_CLIENT_ID"))?;
        let client_secret = config
            .client_secret
            .clone()
            .ok_or(AppError::ConfigMissing("INSTAGRAM_CLIENT_SECRET"))?;
        let redirect_uri = config
            .redirect_uri
            .clone()
            .ok_or(AppError::ConfigMissing("INSTAGRAM_REDIRECT_URI"))?;

        let client = Client::builder()
            .timeout(http_timeout)
            .build()
            .map_err(|e| AppError::ExternalApi(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoints,
            client_id,
            client_secret,
            redirect_uri,
            scopes: config.scopes.clone(),
        })
    }
}

#[async_trait]
impl InstagramApi for InstagramClient {
    fn authorization_url(&self, state: &str) -> String {
        let scope = self.scopes.join(",");
        format!(
            "{}?client_id={}&redirect_uri={}&scope={}&response_type=code&state={}",
            self.endpoints.authorize_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(&self, code: &str) -> AppResult<String> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("code", code),
        ];

        let response = self
            .client
            .post(&self.endpoints.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::ExchangeFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::ExchangeFailed(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let token: ShortLivedTokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExchangeFailed(format!("unexpected token response: {e}")))?;

        Ok(token.access_token)
    }

    async fn exchange_long_lived(&self, short_lived_token: &str) -> AppResult<LongLivedToken> {
        let url = format!("{}/access_token", self.endpoints.graph_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("grant_type", "ig_exchange_token"),
                ("client_secret", self.client_secret.as_str()),
                ("access_token", short_lived_token),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExchangeFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::ExchangeFailed(format!(
                "long-lived exchange returned {}",
                response.status()
            )));
        }

        let token: LongLivedTokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExchangeFailed(format!("unexpected token response: {e}")))?;

        Ok(LongLivedToken {
            access_token: token.access_token,
            expires_in: token.expires_in,
        })
    }

    async fn get_profile(&self, access_token: &str) -> AppResult<InstagramProfile> {
        let url = format!("{}/me", self.endpoints.graph_url);

        let response = self
            .client
            .get(&url)
            .query(&[("fields", "id,username"), ("access_token", access_token)])
            .send()
            .await
            .map_err(|e| AppError::ProfileFetchFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::ProfileFetchFailed(format!(
                "profile endpoint returned {}",
                response.status()
            )));
        }

        let profile: ProfileResponse = response
            .json()
            .await
            .map_err(|e| AppError::ProfileFetchFailed(format!("unexpected profile response: {e}")))?;

        Ok(InstagramProfile {
            id: profile.id,
            username: profile.username,
        })
    }

    async fn list_media(&self, access_token: &str, limit: usize) -> AppResult<Vec<MediaItem>> {
        let url = format!("{}/me/media", self.endpoints.graph_url);
        let limit = limit.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("fields", MEDIA_FIELDS),
                ("access_token", access_token),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "media endpoint returned {}",
                response.status()
            )));
        }

        let media: MediaListResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalApi(format!("unexpected media response: {e}")))?;

        Ok(media.data.unwrap_or_default())
    }
}
