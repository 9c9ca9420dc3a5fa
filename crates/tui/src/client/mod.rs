use std::time::Duration;

use api_types::{
    ErrorBody,
    record::{Record, RecordNew, RecordPatch},
};
use reqwest::{Response, Url};

use crate::{
    error::{AppError, Result},
    provider::RecordsApi,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("record not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid record: {0}")]
    Validation(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("server unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// HTTP client for the `/records` API.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|err| AppError::BaseUrl(format!("{base_url}: {err}")))?;
        if parsed.cannot_be_a_base() {
            return Err(AppError::BaseUrl(format!("{base_url}: not a base url")));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: parsed,
            http,
        })
    }

    /// `<base>/records`, or `<base>/records/<id>` with `id` percent-encoded.
    /// Any path of the base url is kept, with or without a trailing slash.
    fn endpoint(&self, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejected urls that cannot carry path segments.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("records");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    async fn error_for(res: Response) -> ClientError {
        let status = res.status();
        let body = res
            .json::<ErrorBody>()
            .await
            .map(|err| err.error)
            .unwrap_or_else(|_| "unknown error".to_string());

        match status.as_u16() {
            404 => ClientError::NotFound,
            409 => ClientError::Conflict(body),
            400 | 415 | 422 => ClientError::Validation(body),
            _ => ClientError::Server(format!("{status}: {body}")),
        }
    }
}

impl RecordsApi for Client {
    async fn list(&self) -> std::result::Result<Vec<Record>, ClientError> {
        let res = self.http.get(self.endpoint(None)).send().await?;

        if res.status().is_success() {
            return Ok(res.json::<Vec<Record>>().await?);
        }
        Err(Self::error_for(res).await)
    }

    async fn create(&self, new: &RecordNew) -> std::result::Result<Record, ClientError> {
        let res = self
            .http
            .post(self.endpoint(None))
            .json(new)
            .send()
            .await?;

        if res.status().is_success() {
            return Ok(res.json::<Record>().await?);
        }
        Err(Self::error_for(res).await)
    }

    async fn update(
        &self,
        id: &str,
        patch: &RecordPatch,
    ) -> std::result::Result<Record, ClientError> {
        let res = self
            .http
            .put(self.endpoint(Some(id)))
            .json(patch)
            .send()
            .await?;

        if res.status().is_success() {
            return Ok(res.json::<Record>().await?);
        }
        Err(Self::error_for(res).await)
    }

    async fn delete(&self, id: &str) -> std::result::Result<(), ClientError> {
        let res = self
            .http
            .delete(self.endpoint(Some(id)))
            .send()
            .await?;

        if res.status().is_success() {
            return Ok(());
        }
        Err(Self::error_for(res).await)
    }
}
