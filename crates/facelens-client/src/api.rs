//! JSON-over-HTTP access to the recognition API.
//!
//! Every call goes through [`ApiClient::fetch`]: one request, one JSON
//! decode. A non-success status is not an error here; it comes back as
//! [`Reply::Status`] and the caller decides what it means.

use crate::config::Config;
use crate::error::ClientError;
use facelens_core::format::DateRange;
use facelens_core::types::{DetectionRequest, PersonUpdate};
use facelens_core::{DetectionRecord, DetectionReport, PersonRecord};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

const PERSON_PATH: &str = "/FR/person";
const DETECTION_PATH: &str = "/FR/detection";

/// Decoded body of a successful response, or the status code of a failed one.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Data(T),
    Status(u16),
}

impl<T> Reply<T> {
    pub fn data(self) -> Option<T> {
        match self {
            Reply::Data(data) => Some(data),
            Reply::Status(_) => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Reply::Data(_) => None,
            Reply::Status(code) => Some(*code),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        match self {
            Reply::Data(data) => Reply::Data(f(data)),
            Reply::Status(code) => Reply::Status(code),
        }
    }

    /// Treat a status reply as [`ClientError::Status`].
    pub fn into_result(self) -> Result<T, ClientError> {
        match self {
            Reply::Data(data) => Ok(data),
            Reply::Status(code) => Err(ClientError::Status(code)),
        }
    }
}

/// Clone-safe handle to the recognition API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let base_url = config.api_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidUrl(config.api_url.clone()));
        }
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one request and decode the JSON response.
    ///
    /// A body, when given, is sent as JSON with `Content-Type: application/json`.
    /// An empty response body decodes as JSON `null`.
    pub async fn fetch<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Reply<T>, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url).query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%method, path, ?query, "api request");
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            tracing::warn!(
                %method,
                path,
                status = status.as_u16(),
                body = %String::from_utf8_lossy(&bytes),
                "api request unsuccessful"
            );
            return Ok(Reply::Status(status.as_u16()));
        }

        let payload: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };
        let data = serde_json::from_slice(payload)?;
        Ok(Reply::Data(data))
    }

    /// `GET /FR/person?name=..&limit=..&offset=..`: substring search.
    pub async fn search_persons(
        &self,
        name: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Reply<Vec<PersonRecord>>, ClientError> {
        let query = [
            ("name", name.to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];
        self.fetch(Method::GET, PERSON_PATH, &query, NO_BODY).await
    }

    /// `GET /FR/person?name=..&exact_match=True`: one record by exact name.
    pub async fn get_person(
        &self,
        name: &str,
    ) -> Result<Reply<Option<PersonRecord>>, ClientError> {
        let query = [
            ("name", name.to_string()),
            ("exact_match", "True".to_string()),
        ];
        let reply: Reply<Vec<PersonRecord>> =
            self.fetch(Method::GET, PERSON_PATH, &query, NO_BODY).await?;
        Ok(reply.map(|records| records.into_iter().next()))
    }

    /// `PATCH /FR/person?name=..`: rename, replace or append images.
    pub async fn update_person(
        &self,
        name: &str,
        update: &PersonUpdate,
    ) -> Result<Reply<PersonRecord>, ClientError> {
        let query = [("name", name.to_string())];
        self.fetch(Method::PATCH, PERSON_PATH, &query, Some(update)).await
    }

    /// `DELETE /FR/person?name=..`. The response body carries no required data.
    pub async fn delete_person(&self, name: &str) -> Result<Reply<()>, ClientError> {
        let query = [("name", name.to_string())];
        let reply: Reply<serde_json::Value> =
            self.fetch(Method::DELETE, PERSON_PATH, &query, NO_BODY).await?;
        Ok(reply.map(|_| ()))
    }

    /// `GET /FR/detection?[dateRange=..]&limit=..&offset=..`: detection history.
    pub async fn list_detections(
        &self,
        range: Option<&DateRange>,
        offset: usize,
        limit: usize,
    ) -> Result<Reply<Vec<DetectionRecord>>, ClientError> {
        let mut query = Vec::with_capacity(3);
        if let Some(range) = range {
            query.push(("dateRange", range.to_string()));
        }
        query.push(("limit", limit.to_string()));
        query.push(("offset", offset.to_string()));
        self.fetch(Method::GET, DETECTION_PATH, &query, NO_BODY).await
    }

    /// `GET /FR/detection?id=..`: one stored detection.
    pub async fn get_detection(
        &self,
        id: &str,
    ) -> Result<Reply<Option<DetectionRecord>>, ClientError> {
        let query = [("id", id.to_string())];
        let reply: Reply<Vec<DetectionRecord>> =
            self.fetch(Method::GET, DETECTION_PATH, &query, NO_BODY).await?;
        Ok(reply.map(|records| records.into_iter().next()))
    }

    /// `POST /FR/detection?top_n=..`: detect and identify faces in a base64 image.
    pub async fn submit_detection(
        &self,
        image_data: String,
        top_n: usize,
    ) -> Result<Reply<DetectionReport>, ClientError> {
        let query = [("top_n", top_n.to_string())];
        let body = DetectionRequest { image_data };
        let reply: Reply<Option<DetectionReport>> =
            self.fetch(Method::POST, DETECTION_PATH, &query, Some(&body)).await?;
        Ok(reply.map(Option::unwrap_or_default))
    }
}

const NO_BODY: Option<&()> = None;
