//! Remote data gateway.
//!
//! Wraps every network exchange with the two content backends and normalizes
//! success, legitimate negatives and failure into one result shape. The rest
//! of the app talks to the [`RemoteGateway`] trait; [`HttpGateway`] is the
//! production implementation.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use kerbside::prelude::{CarDatabase, Order, Review, UserProfile};

use crate::config::AppConfig;

pub mod wire;

pub use wire::{CorePayload as CoreData, HomepagePayload as HomepageData, UserData};

use wire::{CarDataPayload, ReviewsPayload, WriteRequest};

/// Errors raised by gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backend required by the operation has no configured URL.
    #[error("the {0} backend URL is not configured")]
    NotConfigured(&'static str),

    /// Transport-level failure (connection, TLS, timeout).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered outside the 2xx range.
    #[error("server responded with {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body text, for the log line.
        body: String,
    },

    /// The backend reported a failure status in its envelope.
    #[error("backend error: {0}")]
    Backend(String),

    /// The response body was not the expected JSON shape.
    #[error("malformed response body: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

/// Every remote operation the app performs, normalized per §the wire
/// contract: reads are GETs discriminated by an `action` query parameter,
/// writes are POSTs of `{action, payload}`.
#[automock]
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Homepage media (reels, testimonials, banners). Non-fatal when it
    /// fails; the caller degrades to empty sections.
    async fn fetch_homepage_data(&self) -> Result<HomepageData, GatewayError>;

    /// The core catalog and vehicle database. Fatal to startup when it fails.
    async fn fetch_core_data(&self) -> Result<CoreData, GatewayError>;

    /// Published reviews. Never blocks app usability: configuration misses
    /// and failures degrade to an empty list.
    async fn fetch_reviews(&self) -> Vec<Review>;

    /// Profile and order history for a mobile number. `Ok(None)` when the
    /// user does not exist yet (`notFound`).
    async fn fetch_user_data(&self, mobile: &str) -> Result<Option<UserData>, GatewayError>;

    /// Just the vehicle database.
    async fn fetch_car_database(&self) -> Result<Option<CarDatabase>, GatewayError>;

    /// Saves a freshly placed order, seeding its tracking history with the
    /// initial `Placed` entry. Returns the order as saved, or `None` when the
    /// backend answered `notFound`.
    async fn save_new_order(&self, order: Order) -> Result<Option<Order>, GatewayError>;

    /// Publishes a composed review.
    async fn save_review(&self, review: Review) -> Result<(), GatewayError>;

    /// Saves the full profile object.
    async fn save_profile(&self, profile: &UserProfile) -> Result<(), GatewayError>;
}

/// Production gateway over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: Client,
    main_url: Option<String>,
    user_data_url: Option<String>,
}

impl HttpGateway {
    /// Builds a gateway from the app configuration; unconfigured URLs stay
    /// unconfigured and fail the operations that need them.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        HttpGateway {
            http: Client::new(),
            main_url: config.main_backend().map(str::to_string),
            user_data_url: config.user_data_backend().map(str::to_string),
        }
    }

    async fn get_json(
        &self,
        base: Option<&str>,
        which: &'static str,
        action: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, GatewayError> {
        let base = base.ok_or(GatewayError::NotConfigured(which))?;

        let mut request = self.http.get(base).query(&[("action", action)]);
        for pair in params {
            request = request.query(&[pair]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    async fn post_json<T: Serialize + Sync>(
        &self,
        base: Option<&str>,
        which: &'static str,
        action: &str,
        payload: &T,
    ) -> Result<Value, GatewayError> {
        let base = base.ok_or(GatewayError::NotConfigured(which))?;

        let body = serde_json::to_string(&WriteRequest { action, payload })?;

        // The hosted script runtime only accepts simple requests, hence the
        // plain-text content type for a JSON body.
        let response = self
            .http
            .post(base)
            .header(CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    fn main(&self) -> Option<&str> {
        self.main_url.as_deref()
    }

    fn user_data(&self) -> Option<&str> {
        self.user_data_url.as_deref()
    }
}

fn require<T>(payload: Option<T>) -> Result<T, GatewayError> {
    payload.ok_or_else(|| GatewayError::Backend("unexpected notFound response".to_string()))
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn fetch_homepage_data(&self) -> Result<HomepageData, GatewayError> {
        let body = self
            .get_json(self.main(), "main", "getHomepageData", &[])
            .await?;
        require(wire::decode(body)?)
    }

    async fn fetch_core_data(&self) -> Result<CoreData, GatewayError> {
        let body = self
            .get_json(self.main(), "main", "getCoreData", &[])
            .await?;
        require(wire::decode(body)?)
    }

    async fn fetch_reviews(&self) -> Vec<Review> {
        if self.user_data().is_none() {
            warn!("user-data backend URL not configured; cannot fetch reviews");
            return Vec::new();
        }

        let reviews = async {
            let body = self
                .get_json(self.user_data(), "user-data", "getReviews", &[])
                .await?;
            let payload: ReviewsPayload = require(wire::decode(body)?)?;
            Ok::<_, GatewayError>(payload.reviews)
        }
        .await;

        match reviews {
            Ok(reviews) => reviews,
            Err(error) => {
                warn!("failed to fetch reviews in background: {error}");
                Vec::new()
            }
        }
    }

    async fn fetch_user_data(&self, mobile: &str) -> Result<Option<UserData>, GatewayError> {
        let body = self
            .get_json(
                self.user_data(),
                "user-data",
                "getUserData",
                &[("mobile", mobile)],
            )
            .await?;

        wire::decode(body)
    }

    async fn fetch_car_database(&self) -> Result<Option<CarDatabase>, GatewayError> {
        let body = self.get_json(self.main(), "main", "getCarData", &[]).await?;
        let payload: CarDataPayload = require(wire::decode(body)?)?;

        Ok(payload.car_data)
    }

    async fn save_new_order(&self, mut order: Order) -> Result<Option<Order>, GatewayError> {
        order.seed_tracking(Timestamp::now());

        // The backend appends a single order, sent in an array.
        let body = self
            .post_json(
                self.user_data(),
                "user-data",
                "saveOrders",
                &[order.clone()],
            )
            .await?;

        Ok(wire::decode::<Value>(body)?.map(|_| order))
    }

    async fn save_review(&self, review: Review) -> Result<(), GatewayError> {
        let body = self
            .post_json(self.user_data(), "user-data", "saveReview", &review)
            .await?;

        // A `notFound` from a write is kept as a non-error per the shared
        // status contract.
        wire::decode::<Value>(body)?;

        Ok(())
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<(), GatewayError> {
        let body = self
            .post_json(self.user_data(), "user-data", "saveUserData", profile)
            .await?;

        wire::decode::<Value>(body)?;

        Ok(())
    }
}
