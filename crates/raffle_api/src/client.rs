use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use common::config::ApiConfig;
use http::{header, Method, Request};
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::StorefrontApiError;
use crate::metrics;
use crate::transport::{HttpExec, ReqwestExecutor};

/// Raw access to the storefront backend. Responses are returned untouched;
/// shaping them is the normalizer's job.
#[async_trait]
pub trait StorefrontClient: Send + Sync {
    async fn authenticate_user(&self, phone: &str, password: &str) -> Result<Value>;
    async fn register_user(&self, registration: &Value) -> Result<Value>;
    /// `Ok(None)` when the backend reports the phone as unknown.
    async fn find_user_by_phone(&self, phone: &str) -> Result<Option<Value>>;
    async fn list_raffles(&self) -> Result<Value>;
    async fn list_instant_prizes(&self, raffle_id: &str) -> Result<Value>;
    async fn list_winners(&self, raffle_id: &str) -> Result<Value>;
    async fn create_purchase(&self, order: &Value) -> Result<Value>;
    async fn purchase_status(&self, purchase_id: &str) -> Result<Value>;
    async fn get_purchase(&self, purchase_id: &str) -> Result<Value>;
    async fn my_numbers(&self, user_id: &str) -> Result<Value>;
    async fn dashboard(&self) -> Result<Value>;
}

pub struct RestStorefrontClient {
    exec: Arc<dyn HttpExec>,
    base: Url,
    user_agent: String,
}

impl RestStorefrontClient {
    pub fn new(exec: Arc<dyn HttpExec>, base_url: &str, user_agent: String) -> Result<Self> {
        let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;
        if base.cannot_be_a_base() {
            return Err(anyhow!("storefront base url cannot carry paths: {base_url}"));
        }
        Ok(Self {
            exec,
            base,
            user_agent,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let exec = ReqwestExecutor::new(
            &config.user_agent,
            Duration::from_secs(config.timeout_secs),
        )?;
        Self::new(
            Arc::new(exec),
            &config.base_url,
            config.user_agent.clone(),
        )
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("storefront base url cannot carry paths"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn with_query(url: &mut Url, params: &[(&str, &str)]) {
        let mut query_pairs = url.query_pairs_mut();
        for (key, val) in params {
            query_pairs.append_pair(key, val);
        }
    }

    async fn get_json(&self, endpoint: &'static str, url: Url) -> Result<Value> {
        self.send(endpoint, Method::GET, url, None).await
    }

    async fn post_json(&self, endpoint: &'static str, url: Url, body: &Value) -> Result<Value> {
        self.send(endpoint, Method::POST, url, Some(body)).await
    }

    #[instrument(skip(self, url, body), fields(url = %url))]
    async fn send(
        &self,
        endpoint: &'static str,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<Value> {
        debug!(endpoint, method = %method, "dispatching storefront request");
        let started = Instant::now();
        let result = self.execute(endpoint, method, url, body).await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(err) => match err.downcast_ref::<StorefrontApiError>() {
                Some(api_err) if api_err.is_not_found() => "not_found",
                Some(StorefrontApiError::Http { .. }) => "http_error",
                Some(StorefrontApiError::Decode { .. }) => "decode_error",
                None => "transport_error",
            },
        };
        metrics::record_request(endpoint, outcome, started.elapsed().as_secs_f64());
        result
    }

    async fn execute(
        &self,
        endpoint: &'static str,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut builder = Request::builder()
            .method(method)
            .uri(url.as_str())
            .header(header::USER_AGENT, self.user_agent.as_str())
            .header(header::ACCEPT, "application/json");
        let payload = match body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                serde_json::to_vec(body)?
            }
            None => Vec::new(),
        };
        let request = builder.body(payload)?;

        let response = self.exec.execute(request).await?;
        let status = response.status();
        let bytes = response.into_body();
        if status.is_success() {
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Value::Null);
            }
            return serde_json::from_slice(&bytes).map_err(|source| {
                StorefrontApiError::Decode {
                    endpoint: endpoint.to_string(),
                    source,
                }
                .into()
            });
        }

        let message = error_message(&bytes);
        warn!(endpoint, status = %status, message = %message, "storefront request failed");
        Err(StorefrontApiError::status(status, endpoint, message).into())
    }
}

/// Pulls `message` (or `error`) out of an error body; falls back to a short
/// preview of the raw text.
fn error_message(body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(Value::as_str) {
                return text.to_string();
            }
        }
    }
    let text = String::from_utf8_lossy(body);
    text.chars().take(200).collect::<String>().trim().to_string()
}

#[async_trait]
impl StorefrontClient for RestStorefrontClient {
    async fn authenticate_user(&self, phone: &str, password: &str) -> Result<Value> {
        let url = self.url(&["login"])?;
        let body = json!({ "phone": phone, "password": password });
        self.post_json("login", url, &body).await
    }

    async fn register_user(&self, registration: &Value) -> Result<Value> {
        let url = self.url(&["user"])?;
        self.post_json("register", url, registration).await
    }

    async fn find_user_by_phone(&self, phone: &str) -> Result<Option<Value>> {
        let mut url = self.url(&["user"])?;
        Self::with_query(&mut url, &[("phone", phone)]);
        match self.get_json("user_by_phone", url).await {
            Ok(Value::Null) => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(err)
                if err
                    .downcast_ref::<StorefrontApiError>()
                    .is_some_and(StorefrontApiError::is_not_found) =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn list_raffles(&self) -> Result<Value> {
        let url = self.url(&["raffles"])?;
        self.get_json("raffles", url).await
    }

    async fn list_instant_prizes(&self, raffle_id: &str) -> Result<Value> {
        if raffle_id.trim().is_empty() {
            warn!("instant prizes requested without a raffle id");
            return Ok(Value::Array(Vec::new()));
        }
        let mut url = self.url(&["instantprizes"])?;
        Self::with_query(&mut url, &[("raffleId", raffle_id)]);
        self.get_json("instant_prizes", url).await
    }

    async fn list_winners(&self, raffle_id: &str) -> Result<Value> {
        let mut url = self.url(&["winners"])?;
        Self::with_query(&mut url, &[("raffleId", raffle_id)]);
        self.get_json("winners", url).await
    }

    async fn create_purchase(&self, order: &Value) -> Result<Value> {
        let url = self.url(&["purchases"])?;
        self.post_json("create_purchase", url, order).await
    }

    async fn purchase_status(&self, purchase_id: &str) -> Result<Value> {
        let url = self.url(&["purchases", purchase_id, "status"])?;
        self.get_json("purchase_status", url).await
    }

    async fn get_purchase(&self, purchase_id: &str) -> Result<Value> {
        let url = self.url(&["purchases", purchase_id])?;
        self.get_json("purchase", url).await
    }

    async fn my_numbers(&self, user_id: &str) -> Result<Value> {
        let mut url = self.url(&["meus-numeros"])?;
        Self::with_query(&mut url, &[("userId", user_id)]);
        self.get_json("my_numbers", url).await
    }

    async fn dashboard(&self) -> Result<Value> {
        let url = self.url(&["dashboard"])?;
        self.get_json("dashboard", url).await
    }
}
