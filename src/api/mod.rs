//! REST client for the inference backend and the community catalog
//!
//! Both services expose the same preset/model resources; the local backend
//! additionally serves the `/inference` endpoints.

pub mod community;
pub mod inference;
pub mod models;
pub mod presets;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

pub use community::CommunityClient;
pub use inference::{ActivationStatus, CurrentModel};

/// Errors raised by REST calls
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("Request to {context} failed: {source}")]
    Transport {
        context: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{context} returned status {status}")]
    Status { context: String, status: StatusCode },
    #[error("Failed to decode response from {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{0}")]
    Backend(String),
}

impl ApiError {
    /// True when the backend answered 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

/// Thin JSON client bound to one backend base URL
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let invalid = |reason: String| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };

        let mut base = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("not a base URL".to_string()));
        }
        // Url::join drops the last segment unless the path ends with a slash
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("llm-manager/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ApiError::Transport {
                context: "HTTP client setup".to_string(),
                source,
            })?;

        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve a path relative to the base, e.g. `presets/3`
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidBaseUrl {
                url: self.base.to_string(),
                reason: e.to_string(),
            })
    }

    fn request(&self, method: Method, path: &str) -> Result<(RequestBuilder, String), ApiError> {
        let url = self.endpoint(path)?;
        let context = format!("{} {}", method, url);
        Ok((self.http.request(method, url), context))
    }

    async fn execute(&self, builder: RequestBuilder, context: &str) -> Result<Response, ApiError> {
        tracing::debug!("-> {}", context);
        let response = builder.send().await.map_err(|source| ApiError::Transport {
            context: context.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                context: context.to_string(),
                status,
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response, context: &str) -> Result<T, ApiError> {
        response.json::<T>().await.map_err(|source| ApiError::Decode {
            context: context.to_string(),
            source,
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let (builder, context) = self.request(Method::GET, path)?;
        let response = self.execute(builder, &context).await?;
        Self::decode(response, &context).await
    }

    pub async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (builder, context) = self.request(method, path)?;
        let response = self.execute(builder.json(body), &context).await?;
        Self::decode(response, &context).await
    }

    /// POST without a body, decoding the JSON reply
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let (builder, context) = self.request(Method::POST, path)?;
        let response = self.execute(builder, &context).await?;
        Self::decode(response, &context).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let (builder, context) = self.request(Method::DELETE, path)?;
        self.execute(builder, &context).await?;
        Ok(())
    }

    /// GET that only reports whether the resource answered 2xx
    pub async fn exists(&self, path: &str) -> Result<bool, ApiError> {
        let (builder, context) = self.request(Method::GET, path)?;
        match self.execute(builder, &context).await {
            Ok(_) => Ok(true),
            Err(ApiError::Status { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_join_without_trailing_slash() {
        let api = client("http://127.0.0.1:8000");
        assert_eq!(
            api.endpoint("presets/3").unwrap().as_str(),
            "http://127.0.0.1:8000/presets/3"
        );
    }

    #[test]
    fn test_endpoint_join_keeps_prefix() {
        let api = client("http://example.test/backend");
        assert_eq!(
            api.endpoint("/inference/load/2").unwrap().as_str(),
            "http://example.test/backend/inference/load/2"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ApiClient::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_not_found_classification() {
        let err = ApiError::Status {
            context: "GET /presets/9".into(),
            status: StatusCode::NOT_FOUND,
        };
        assert!(err.is_not_found());
        assert!(!ApiError::Backend("boom".into()).is_not_found());
    }
}
