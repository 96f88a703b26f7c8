//! User profiles

use serde::{Deserialize, Serialize};

use crate::vehicles::VehicleVariant;
use crate::wire;

/// A customer profile as held in the store and exchanged with the user-data
/// backend.
///
/// The mobile number is a string end-to-end: the backend is spreadsheet-backed
/// and happily returns it as a number, which loses leading digits and picks up
/// locale formatting, so ingestion coerces it exactly once. The selected
/// vehicle variant likewise arrives either structured or as a pre-serialized
/// JSON string; a string that fails to parse degrades to "no vehicle
/// selected".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    /// Canonical mobile number, always text.
    #[serde(deserialize_with = "wire::string_or_number")]
    pub mobile: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Street address.
    pub street: String,
    /// City.
    pub city: String,
    /// Postal code, always text for the same reason as the mobile number.
    #[serde(deserialize_with = "wire::string_or_number")]
    pub pincode: String,
    /// Display string for the selected car (`"Maruti Swift"`).
    pub car_brand_model: String,
    /// Registration plate.
    pub car_number: String,
    /// Selected vehicle variant; tolerates the persisted-string form.
    #[serde(deserialize_with = "wire::lenient_json")]
    pub selected_variant: Option<VehicleVariant>,
}

impl UserProfile {
    /// A fresh profile carrying only a mobile number (first login of a new
    /// customer).
    #[must_use]
    pub fn with_mobile(mobile: impl Into<String>) -> Self {
        UserProfile {
            mobile: mobile.into(),
            ..UserProfile::default()
        }
    }

    /// First and last name joined, trimmed of stray whitespace.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Whether the profile is complete enough to check out: a first name and
    /// a full street/city/pincode address.
    #[must_use]
    pub fn has_complete_address(&self) -> bool {
        !self.first_name.trim().is_empty()
            && !self.street.trim().is_empty()
            && !self.city.trim().is_empty()
            && !self.pincode.trim().is_empty()
    }

    /// Single-line shipping address snapshot for an order.
    #[must_use]
    pub fn shipping_address(&self) -> String {
        format!("{}, {}, {}", self.street, self.city, self.pincode)
    }

    /// Commits a confirmed vehicle selection to the profile.
    pub fn set_vehicle(&mut self, vehicle: VehicleVariant) {
        self.car_brand_model = vehicle.display_name();
        self.selected_variant = Some(vehicle);
    }
}
