//! Gateway wire envelope.
//!
//! Both backends speak the same minimal protocol: every response is a JSON
//! object carrying a `status` discriminator alongside action-specific payload
//! fields, and every write is a POST of `{action, payload}` declared as plain
//! text (the hosted script runtime rejects preflighted content types).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use kerbside::content::{Banner, Reel, Testimonial};
use kerbside::prelude::{CarDatabase, Order, Review, Service, UserProfile};

use super::GatewayError;

/// Response status discriminator.
///
/// `NotFound` is a legitimate negative result (a profile lookup miss), not a
/// failure; anything other than the two known values is a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseStatus {
    /// The action succeeded and the payload fields are present.
    Success,
    /// The action completed with a legitimate negative result.
    NotFound,
    /// Any unrecognised status.
    #[serde(other)]
    Failed,
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    #[serde(default = "unrecognised")]
    status: ResponseStatus,
    #[serde(default)]
    message: Option<String>,
}

fn unrecognised() -> ResponseStatus {
    ResponseStatus::Failed
}

/// The POST body for every write action.
#[derive(Debug, Serialize)]
pub struct WriteRequest<'a, T> {
    /// Action discriminator.
    pub action: &'a str,
    /// Action-specific payload.
    pub payload: T,
}

/// Decodes a response body against the status contract.
///
/// `success` parses the body into the payload type; `notFound` yields
/// `Ok(None)`; anything else fails with the backend's message when it sent
/// one.
///
/// # Errors
///
/// [`GatewayError::Backend`] for a failure status,
/// [`GatewayError::MalformedBody`] when a success payload does not parse.
pub fn decode<T>(body: Value) -> Result<Option<T>, GatewayError>
where
    T: serde::de::DeserializeOwned,
{
    let envelope: StatusEnvelope =
        serde_json::from_value(body.clone()).unwrap_or(StatusEnvelope {
            status: ResponseStatus::Failed,
            message: None,
        });

    match envelope.status {
        ResponseStatus::Success => Ok(Some(serde_json::from_value(body)?)),
        ResponseStatus::NotFound => Ok(None),
        ResponseStatus::Failed => Err(GatewayError::Backend(
            envelope
                .message
                .unwrap_or_else(|| "an unknown error occurred on the backend".to_string()),
        )),
    }
}

/// Payload of `getHomepageData`.
#[derive(Debug, Default, Deserialize)]
pub struct HomepagePayload {
    /// Promotional reels.
    #[serde(default)]
    pub reels: Vec<Reel>,
    /// Customer testimonials.
    #[serde(default)]
    pub testimonials: Vec<Testimonial>,
    /// Placement banners.
    #[serde(default)]
    pub banners: Vec<Banner>,
}

/// Payload of `getCoreData`.
#[derive(Debug, Default, Deserialize)]
pub struct CorePayload {
    /// The full service catalog.
    #[serde(default)]
    pub services: Vec<Service>,
    /// The vehicle database.
    #[serde(default, rename = "carData")]
    pub car_data: Option<CarDatabase>,
}

/// Payload of `getReviews`.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewsPayload {
    /// Published reviews.
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// Payload of `getUserData`; doubles as the persisted session blob, which is
/// this exact shape written to durable storage at login.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UserData {
    /// The user's profile.
    pub profile: UserProfile,
    /// The user's order history.
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// Payload of `getCarData`.
#[derive(Debug, Default, Deserialize)]
pub struct CarDataPayload {
    /// The vehicle database.
    #[serde(default, rename = "carData")]
    pub car_data: Option<CarDatabase>,
}
