//! HTTP client for the remote data store and the dashboard home API.
//!
//! The data store speaks PostgREST-style table queries under `/rest/v1`
//! and password auth under `/auth/v1`; the home API is a small REST
//! surface on its own base URL. One `ApiClient` serves both, sharing a
//! connection pool and bearer token.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::{header, Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::SessionData;
use crate::config::Config;
use crate::models::{CustomerPayload, CustomerRecord, LessonRow, ProfileRow, Store};

use super::home::{HomeQuery, HomeResponse};
use super::query::{SortOrder, TableQuery};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// Long enough for a slow store query, short enough that a dead network
/// doesn't pin the loading indicator forever.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting, doubled on
/// each retry.
const INITIAL_BACKOFF_MS: u64 = 1000;

#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: String,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

/// API client. Clone is cheap - reqwest::Client and the token are both
/// reference counted.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    home_url: String,
    api_key: String,
    token: Option<Arc<String>>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config
            .api_url
            .clone()
            .context("api_url is not configured (set LESSONDESK_API_URL or edit config.json)")?;
        let api_key = config
            .api_key
            .clone()
            .context("api_key is not configured (set LESSONDESK_API_KEY or edit config.json)")?;
        // The home API usually rides on the same host
        let home_url = config.home_api_url.clone().unwrap_or_else(|| base_url.clone());

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            home_url: home_url.trim_end_matches('/').to_string(),
            api_key,
            token: None,
        })
    }

    /// A copy of this client carrying the given bearer token, sharing
    /// the connection pool.
    pub fn with_token(&self, token: Arc<String>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            home_url: self.home_url.clone(),
            api_key: self.api_key.clone(),
            token: Some(token),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert("apikey", header::HeaderValue::from_str(&self.api_key)?);
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if the response is successful. Returns Ok(Some) for
    /// success, Ok(None) for rate limiting (retry), Err otherwise.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Issue a request with 429 backoff, parsing the JSON body.
    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        params: &[(String, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<T> {
        let response = self.request_raw(method, url, params, body, true).await?;
        let response = response.context("Response body expected but none was kept")?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// Issue a request with 429 backoff, discarding any body.
    async fn request_no_content(
        &self,
        method: Method,
        url: &str,
        params: &[(String, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<()> {
        self.request_raw(method, url, params, body, false).await?;
        Ok(())
    }

    async fn request_raw(
        &self,
        method: Method,
        url: &str,
        params: &[(String, String)],
        body: Option<&serde_json::Value>,
        keep_body: bool,
    ) -> Result<Option<reqwest::Response>> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let mut request = self
                .client
                .request(method.clone(), url)
                .headers(self.auth_headers()?)
                .query(params);
            if let Some(body) = body {
                // Mutations don't need the row echoed back; the list is
                // refetched afterwards anyway
                request = request.header("Prefer", "return=minimal").json(body);
            }

            let response = request
                .send()
                .await
                .with_context(|| format!("Failed to send {} request to {}", method, url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return Ok(if keep_body { Some(response) } else { None });
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url, retry = retries, backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    async fn select_rows<T: DeserializeOwned>(&self, query: TableQuery) -> Result<Vec<T>> {
        let url = self.rest_url(query.table_name());
        let params = query.into_params();
        self.request_json(Method::GET, &url, &params, None).await
    }

    // ===== Authentication =====

    /// Sign in with email/password, then resolve the principal's profile
    /// (role and store scope) from the users table.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionData> {
        let url = format!("{}/auth/v1/token", self.base_url);

        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .query(&[("grant_type", "password")])
            .json(&PasswordGrant { email, password })
            .send()
            .await
            .context("Failed to send authentication request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body).into());
        }

        let auth: AuthResponse = response
            .json()
            .await
            .context("Failed to parse auth response")?;

        let authed = self.with_token(Arc::new(auth.access_token.clone()));
        let profile = authed.fetch_profile(&auth.user.id).await?;

        Ok(SessionData {
            access_token: auth.access_token,
            user_id: auth.user.id,
            email: auth.user.email.unwrap_or_else(|| email.to_string()),
            name: profile.name.clone().unwrap_or_default(),
            role: profile.role.clone(),
            store_ids: profile.to_principal().store_ids,
            created_at: Utc::now(),
        })
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<ProfileRow> {
        let query = TableQuery::table("users")
            .select("id,name,role,store_id,store_ids")
            .eq("id", user_id);
        let mut rows: Vec<ProfileRow> = self.select_rows(query).await?;
        debug!(user_id, found = rows.len(), "Profile rows fetched");
        if rows.is_empty() {
            return Err(ApiError::NotFound(format!("No profile for user {}", user_id)).into());
        }
        Ok(rows.swap_remove(0))
    }

    // ===== Data store =====

    pub async fn fetch_stores(&self) -> Result<Vec<Store>> {
        let query = TableQuery::table("stores")
            .select("id,name")
            .order("name", SortOrder::Ascending);
        let stores: Vec<Store> = self.select_rows(query).await?;
        debug!(count = stores.len(), "Stores fetched");
        Ok(stores)
    }

    pub async fn fetch_lesson_rows(&self, query: TableQuery) -> Result<Vec<LessonRow>> {
        let rows: Vec<LessonRow> = self.select_rows(query).await?;
        debug!(count = rows.len(), "Lesson rows fetched");
        Ok(rows)
    }

    pub async fn fetch_customer_records(&self) -> Result<Vec<CustomerRecord>> {
        let query = TableQuery::table("customers")
            .select("*")
            .order("kana", SortOrder::Ascending);
        let records: Vec<CustomerRecord> = self.select_rows(query).await?;
        debug!(count = records.len(), "Customer records fetched");
        Ok(records)
    }

    pub async fn insert_customer(&self, payload: &CustomerPayload) -> Result<()> {
        let url = self.rest_url("customers");
        let body = serde_json::to_value(payload)?;
        self.request_no_content(Method::POST, &url, &[], Some(&body))
            .await
    }

    pub async fn update_customer(&self, id: &str, payload: &CustomerPayload) -> Result<()> {
        let url = self.rest_url("customers");
        let params = vec![("id".to_string(), format!("eq.{}", id))];
        let body = serde_json::to_value(payload)?;
        self.request_no_content(Method::PATCH, &url, &params, Some(&body))
            .await
    }

    pub async fn delete_customer(&self, id: &str) -> Result<()> {
        let url = self.rest_url("customers");
        let params = vec![("id".to_string(), format!("eq.{}", id))];
        self.request_no_content(Method::DELETE, &url, &params, None)
            .await
    }

    // ===== Home API =====

    pub async fn fetch_admin_home(&self, query: HomeQuery) -> Result<HomeResponse> {
        let url = format!("{}/admin/home", self.home_url);
        self.request_json(Method::GET, &url, &query.to_params(), None)
            .await
    }

    pub async fn fetch_manager_home(
        &self,
        store_id: &str,
        query: HomeQuery,
    ) -> Result<HomeResponse> {
        let url = format!("{}/manager/home/{}", self.home_url, store_id);
        self.request_json(Method::GET, &url, &query.to_params(), None)
            .await
    }
}

#[async_trait::async_trait]
impl crate::cache::StoreSource for ApiClient {
    async fn fetch_stores(&self) -> Result<Vec<Store>> {
        ApiClient::fetch_stores(self).await
    }
}
