//! Service reviews

use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::wire;

/// A published review as returned by the user-data backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Review {
    /// Reviewed service id.
    pub service_id: String,
    /// Reviewer's id (mobile number).
    #[serde(deserialize_with = "wire::string_or_number")]
    pub user_id: String,
    /// Reviewer's display name.
    pub user_name: String,
    /// Star rating, 1–5.
    #[serde(deserialize_with = "rating_or_zero")]
    pub rating: u8,
    /// Free-text comment.
    pub comment: String,
}

fn rating_or_zero<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0),
        Value::Number(n) => Ok(n.as_u64().map_or(0, |n| u8::try_from(n).unwrap_or(0))),
        Value::String(s) => Ok(s.trim().parse().unwrap_or(0)),
        other => Err(D::Error::custom(format!("expected rating, got {other}"))),
    }
}

/// A review composed locally, before the reviewer identity is attached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    /// Reviewed service id.
    pub service_id: String,
    /// Star rating, 1–5.
    pub rating: u8,
    /// Free-text comment.
    pub comment: String,
}

/// Review submission errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewError {
    /// No star rating was selected.
    #[error("a star rating must be selected")]
    MissingRating,

    /// The rating is outside the 1–5 range.
    #[error("rating {0} is out of range")]
    OutOfRange(u8),
}

impl NewReview {
    /// Validates the submission.
    ///
    /// # Errors
    ///
    /// [`ReviewError::MissingRating`] for a zero rating,
    /// [`ReviewError::OutOfRange`] above five stars.
    pub fn validate(&self) -> Result<(), ReviewError> {
        match self.rating {
            0 => Err(ReviewError::MissingRating),
            1..=5 => Ok(()),
            out_of_range => Err(ReviewError::OutOfRange(out_of_range)),
        }
    }
}

/// Aggregated rating data for one service's review list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSummary {
    /// Number of reviews.
    pub count: usize,
    /// Mean rating to one decimal place; zero when there are no reviews.
    pub average: Decimal,
    /// Mean rating rounded to the nearest half star, for star displays.
    pub half_star_average: Decimal,
}

/// Summarizes the reviews recorded against a service.
#[must_use]
pub fn summarize(reviews: &[Review], service_id: &str) -> ReviewSummary {
    let ratings: Vec<u8> = reviews
        .iter()
        .filter(|review| review.service_id == service_id)
        .map(|review| review.rating)
        .collect();

    if ratings.is_empty() {
        return ReviewSummary {
            count: 0,
            average: Decimal::ZERO,
            half_star_average: Decimal::ZERO,
        };
    }

    let sum: u32 = ratings.iter().map(|&r| u32::from(r)).sum();
    let average = (Decimal::from(sum) / Decimal::from(ratings.len() as u64)).round_dp(1);
    let half_star_average = ((average * Decimal::TWO).round()) / Decimal::TWO;

    ReviewSummary {
        count: ratings.len(),
        average,
        half_star_average,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(service_id: &str, rating: u8) -> Review {
        Review {
            service_id: service_id.to_string(),
            user_id: "919812345678".to_string(),
            user_name: "Asha Rao".to_string(),
            rating,
            comment: "Quick and tidy.".to_string(),
        }
    }

    #[test]
    fn zero_rating_is_rejected() {
        let submission = NewReview {
            service_id: "s1".to_string(),
            rating: 0,
            comment: String::new(),
        };

        assert_eq!(submission.validate(), Err(ReviewError::MissingRating));
    }

    #[test]
    fn six_stars_is_out_of_range() {
        let submission = NewReview {
            service_id: "s1".to_string(),
            rating: 6,
            comment: String::new(),
        };

        assert_eq!(submission.validate(), Err(ReviewError::OutOfRange(6)));
    }

    #[test]
    fn summary_averages_only_the_requested_service() {
        let reviews = vec![review("s1", 5), review("s1", 4), review("s2", 1)];

        let summary = summarize(&reviews, "s1");

        assert_eq!(summary.count, 2);
        assert_eq!(summary.average, Decimal::new(45, 1));
        assert_eq!(summary.half_star_average, Decimal::new(45, 1));
    }

    #[test]
    fn half_star_rounding_snaps_to_halves() {
        let reviews = vec![review("s1", 5), review("s1", 4), review("s1", 4)];

        let summary = summarize(&reviews, "s1");

        // 13/3 = 4.3 → nearest half star is 4.5.
        assert_eq!(summary.average, Decimal::new(43, 1));
        assert_eq!(summary.half_star_average, Decimal::new(45, 1));
    }

    #[test]
    fn no_reviews_yields_an_empty_summary() {
        let summary = summarize(&[], "s1");

        assert_eq!(summary.count, 0);
        assert_eq!(summary.average, Decimal::ZERO);
    }

    #[test]
    fn rating_deserializes_from_string_or_number() {
        let a: Review = serde_json::from_str(r#"{"serviceId": "s1", "rating": 4}"#).unwrap();
        let b: Review = serde_json::from_str(r#"{"serviceId": "s1", "rating": "4"}"#).unwrap();

        assert_eq!(a.rating, 4);
        assert_eq!(b.rating, 4);
    }
}
