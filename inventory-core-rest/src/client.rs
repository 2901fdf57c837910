use reqwest::{Response, Url};
use serde::{de::DeserializeOwned, Serialize};

use crate::config::RestConfig;
use crate::error::RestError;

const USER_AGENT: &str = concat!("inventory-core/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP handle for every REST repository.
///
/// Cheap to clone: `reqwest::Client` is reference counted, so all
/// repositories built from one factory share a connection pool.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RestClient {
    pub fn new(config: &RestConfig) -> Result<Self, RestError> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| RestError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(RestError::InvalidUrl(config.base_url.clone()));
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `<base>/api/<segments...>`, each segment percent-encoded
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, RestError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RestError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    pub(crate) async fn get_json<R: DeserializeOwned>(&self, url: Url) -> Result<R, RestError> {
        tracing::debug!(url = %url, "GET");
        let response = self.http.get(url.clone()).send().await?;
        let response = Self::check("GET", &url, response).await?;
        Ok(response.json().await?)
    }

    /// Like `get_json`, but a 404 answer is `None` instead of an error
    pub(crate) async fn get_optional<R: DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<Option<R>, RestError> {
        match self.get_json(url).await {
            Ok(body) => Ok(Some(body)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub(crate) async fn post_json<B, R>(&self, url: Url, body: &B) -> Result<R, RestError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        tracing::debug!(url = %url, "POST");
        let response = self.http.post(url.clone()).json(body).send().await?;
        let response = Self::check("POST", &url, response).await?;
        Ok(response.json().await?)
    }

    /// POST whose response body is not needed
    pub(crate) async fn post_discard<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<(), RestError> {
        tracing::debug!(url = %url, "POST");
        let response = self.http.post(url.clone()).json(body).send().await?;
        Self::check("POST", &url, response).await?;
        Ok(())
    }

    /// PUT whose response body is not needed. The backend may echo the
    /// updated row or answer with an empty 2xx.
    pub(crate) async fn put_discard<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<(), RestError> {
        tracing::debug!(url = %url, "PUT");
        let response = self.http.put(url.clone()).json(body).send().await?;
        Self::check("PUT", &url, response).await?;
        Ok(())
    }

    async fn check(method: &'static str, url: &Url, response: Response) -> Result<Response, RestError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(RestError::Status {
            method,
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}
