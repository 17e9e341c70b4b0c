//! Client for the external car-info ("search help") service.
//!
//! Given registration numbers, the service answers with the full car records
//! (mark, model, year and owner) that are then stored by `/car/save`.

use crate::domain::Car;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Failure modes of a car-info lookup. Each one is reported separately so the
/// caller can tell a slow service from a broken one.
#[derive(Debug, Error)]
pub enum CarInfoError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("timeout reached")]
    Timeout,

    #[error("can't connect to server: {0}")]
    Connection(String),

    #[error("server fatal error: {0}")]
    ServerFatal(String),

    #[error("bad response: {0}")]
    BadResponse(String),
}

/// Resolves registration numbers into car records.
#[async_trait]
pub trait CarInfoResolver: Send + Sync {
    async fn resolve(&self, reg_nums: &[String]) -> Result<Vec<Car>, CarInfoError>;
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CarInfoRequest<'a> {
    reg_nums: &'a [String],
}

#[derive(Deserialize, Debug)]
struct CarInfoResponse {
    #[serde(default, alias = "Cars")]
    cars: Vec<Car>,
}

/// `CarInfoResolver` over HTTP: `GET {base_url}/info` with a JSON body.
#[derive(Clone)]
pub struct HttpCarInfoClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpCarInfoClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn info_url(&self) -> String {
        format!("{}/info", self.base_url)
    }
}

fn classify_transport_error(err: reqwest::Error) -> CarInfoError {
    if err.is_timeout() {
        CarInfoError::Timeout
    } else if err.is_builder() {
        CarInfoError::BadRequest(err.to_string())
    } else {
        CarInfoError::Connection(err.to_string())
    }
}

#[async_trait]
impl CarInfoResolver for HttpCarInfoClient {
    async fn resolve(&self, reg_nums: &[String]) -> Result<Vec<Car>, CarInfoError> {
        let body = serde_json::to_vec(&CarInfoRequest { reg_nums })
            .map_err(|e| CarInfoError::BadRequest(e.to_string()))?;

        let response = self
            .client
            .get(self.info_url())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let raw = response.bytes().await.map_err(classify_transport_error)?;

        match status {
            StatusCode::BAD_REQUEST => {
                return Err(CarInfoError::BadRequest(
                    String::from_utf8_lossy(&raw).into_owned(),
                ))
            }
            s if s.is_server_error() => {
                return Err(CarInfoError::ServerFatal(format!(
                    "{}: {}",
                    s,
                    String::from_utf8_lossy(&raw)
                )))
            }
            s if !s.is_success() => {
                return Err(CarInfoError::BadResponse(format!("unexpected status {s}")))
            }
            _ => {}
        }

        let parsed: CarInfoResponse =
            serde_json::from_slice(&raw).map_err(|e| CarInfoError::BadResponse(e.to_string()))?;
        Ok(parsed.cars)
    }
}
