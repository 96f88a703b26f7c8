//! Vehicle database & selection wizard

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::wire;

/// Front tyre dimensions recorded against a variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TyreSize {
    /// Section width in mm.
    #[serde(deserialize_with = "wire::string_or_number")]
    pub width: String,
    /// Aspect profile.
    #[serde(deserialize_with = "wire::string_or_number")]
    pub profile: String,
    /// Rim radius in inches.
    #[serde(deserialize_with = "wire::string_or_number")]
    pub radius: String,
}

/// A fully selected vehicle configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleVariant {
    /// Brand name, canonical casing from the database.
    pub brand: String,
    /// Model name as chosen.
    pub model: String,
    /// Variant trim name.
    pub name: String,
    /// Fuel type.
    pub fuel: String,
    /// Transmission type.
    pub transmission: String,
    /// Front tyre dimensions, when the database records them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub front_tyres: Option<TyreSize>,
}

impl VehicleVariant {
    /// Display string for the selected vehicle (`"Maruti Swift"`).
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model).trim().to_string()
    }
}

/// A vehicle selection made without an authenticated session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuestVehicle {
    /// The selected variant; tolerates the persisted-string form.
    #[serde(deserialize_with = "wire::lenient_json")]
    pub selected_variant: Option<VehicleVariant>,
    /// Display string for the selection.
    pub car_brand_model: String,
}

/// One entry in a model's variant list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantRecord {
    /// Variant trim name.
    pub name: String,
    /// Fuel type.
    pub fuel: String,
    /// Transmission type.
    pub transmission: String,
    /// Front tyre dimensions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub front_tyres: Option<TyreSize>,
}

/// A model under a brand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarModel {
    /// Model hero image URL.
    pub image: String,
    /// Variant list; the backend sends either an array or a name-keyed map.
    #[serde(deserialize_with = "variants_map_or_list")]
    pub variants: Vec<VariantRecord>,
}

/// A brand with its models, keyed by model name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarBrand {
    /// Brand name.
    pub name: String,
    /// Brand logo URL.
    pub image: String,
    /// Models keyed by display name.
    pub models: BTreeMap<String, CarModel>,
}

/// Accepts a variant list as an array or as a name-keyed object, yielding one
/// canonical list with names filled in from the keys.
fn variants_map_or_list<'de, D>(deserializer: D) -> Result<Vec<VariantRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::Array(values) => Ok(values
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect()),
        Value::Object(entries) => Ok(entries
            .into_iter()
            .filter_map(|(name, value)| {
                let mut record: VariantRecord = serde_json::from_value(value).ok()?;
                if record.name.is_empty() {
                    record.name = name;
                }
                Some(record)
            })
            .collect()),
        other => Err(D::Error::custom(format!(
            "expected variant list or map, got {other}"
        ))),
    }
}

/// The brand → model → variant database behind the selection wizard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarDatabase {
    brands: Vec<CarBrand>,
}

impl CarDatabase {
    /// Builds a database from a brand list (tests and fixtures).
    #[must_use]
    pub fn new(brands: Vec<CarBrand>) -> Self {
        CarDatabase { brands }
    }

    /// All brands, in backend order.
    #[must_use]
    pub fn brands(&self) -> &[CarBrand] {
        &self.brands
    }

    /// Case-insensitive brand lookup.
    #[must_use]
    pub fn brand(&self, name: &str) -> Option<&CarBrand> {
        self.brands
            .iter()
            .find(|brand| brand.name.eq_ignore_ascii_case(name))
    }

    /// Case-insensitive model lookup under a brand.
    #[must_use]
    pub fn model(&self, brand: &str, model: &str) -> Option<&CarModel> {
        self.brand(brand)?
            .models
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(model))
            .map(|(_, details)| details)
    }

    /// Model names offered for a brand; empty when the brand is unknown.
    #[must_use]
    pub fn model_names(&self, brand: &str) -> Vec<String> {
        self.brand(brand)
            .map(|brand| brand.models.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Variants offered for a model; empty when the chain does not resolve.
    #[must_use]
    pub fn variants(&self, brand: &str, model: &str) -> &[VariantRecord] {
        self.model(brand, model)
            .map_or(&[], |model| model.variants.as_slice())
    }

    /// Case-insensitive variant lookup.
    #[must_use]
    pub fn variant(&self, brand: &str, model: &str, name: &str) -> Option<&VariantRecord> {
        self.variants(brand, model)
            .iter()
            .find(|variant| variant.name.eq_ignore_ascii_case(name))
    }

    /// Hero image for a model, when recorded.
    #[must_use]
    pub fn model_image(&self, brand: &str, model: &str) -> Option<&str> {
        let image = self.model(brand, model)?.image.as_str();
        (!image.is_empty()).then_some(image)
    }

    /// Composes the confirmed (brand, model, variant) chain into a
    /// [`VehicleVariant`], injecting the brand's canonical name. `None` when
    /// any link of the chain does not resolve.
    #[must_use]
    pub fn compose_variant(
        &self,
        brand: &str,
        model: &str,
        variant: &str,
    ) -> Option<VehicleVariant> {
        let brand_record = self.brand(brand)?;
        let record = self.variant(brand, model, variant)?;

        Some(VehicleVariant {
            brand: brand_record.name.clone(),
            model: model.to_string(),
            name: record.name.clone(),
            fuel: record.fuel.clone(),
            transmission: record.transmission.clone(),
            front_tyres: record.front_tyres.clone(),
        })
    }
}

/// Wizard step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionStep {
    /// Choosing the brand.
    #[default]
    Brand,
    /// Choosing the model.
    Model,
    /// Choosing the variant.
    Variant,
    /// Reviewing the composed selection.
    Confirmation,
}

/// Wizard progress: the current step plus the identifiers chosen so far.
///
/// The machine is strictly linear: each choice advances one step, `back`
/// retreats one step without discarding prior choices, and opening the wizard
/// resets to the brand step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    /// Current step.
    pub step: SelectionStep,
    /// Chosen brand id.
    pub brand: Option<String>,
    /// Chosen model id.
    pub model: Option<String>,
    /// Chosen variant id.
    pub variant: Option<String>,
}

impl SelectionState {
    /// Returns to the brand step with all choices cleared.
    pub fn reset(&mut self) {
        *self = SelectionState::default();
    }

    /// Records `id` as the current step's choice and advances one step.
    /// A choice on the confirmation step is ignored.
    pub fn choose(&mut self, id: &str) {
        match self.step {
            SelectionStep::Brand => {
                self.brand = Some(id.to_string());
                self.step = SelectionStep::Model;
            }
            SelectionStep::Model => {
                self.model = Some(id.to_string());
                self.step = SelectionStep::Variant;
            }
            SelectionStep::Variant => {
                self.variant = Some(id.to_string());
                self.step = SelectionStep::Confirmation;
            }
            SelectionStep::Confirmation => {}
        }
    }

    /// Steps back once, retaining every recorded choice. A no-op on the
    /// brand step.
    pub fn back(&mut self) {
        self.step = match self.step {
            SelectionStep::Brand | SelectionStep::Model => SelectionStep::Brand,
            SelectionStep::Variant => SelectionStep::Model,
            SelectionStep::Confirmation => SelectionStep::Variant,
        };
    }

    /// "Change" from the confirmation view: returns to the variant step
    /// without discarding the brand or model.
    pub fn revise(&mut self) {
        if self.step == SelectionStep::Confirmation {
            self.step = SelectionStep::Variant;
        }
    }

    /// The choices offered at the current step. A nonexistent chosen id
    /// yields an empty list, never an error.
    #[must_use]
    pub fn options(&self, db: &CarDatabase) -> StepOptions {
        match self.step {
            SelectionStep::Brand => StepOptions::Brands(
                db.brands().iter().map(|brand| brand.name.clone()).collect(),
            ),
            SelectionStep::Model => StepOptions::Models(
                self.brand
                    .as_deref()
                    .map(|brand| db.model_names(brand))
                    .unwrap_or_default(),
            ),
            SelectionStep::Variant => StepOptions::Variants(
                match (self.brand.as_deref(), self.model.as_deref()) {
                    (Some(brand), Some(model)) => db
                        .variants(brand, model)
                        .iter()
                        .map(|variant| variant.name.clone())
                        .collect(),
                    _ => Vec::new(),
                },
            ),
            SelectionStep::Confirmation => StepOptions::Confirmation(self.confirm(db)),
        }
    }

    /// Composes the confirmed selection, when every chosen id resolves.
    #[must_use]
    pub fn confirm(&self, db: &CarDatabase) -> Option<VehicleVariant> {
        db.compose_variant(
            self.brand.as_deref()?,
            self.model.as_deref()?,
            self.variant.as_deref()?,
        )
    }
}

/// The list of choices offered at a wizard step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOptions {
    /// Brand names.
    Brands(Vec<String>),
    /// Model names for the chosen brand.
    Models(Vec<String>),
    /// Variant names for the chosen model.
    Variants(Vec<String>),
    /// The composed selection, or `None` when the chain does not resolve.
    Confirmation(Option<VehicleVariant>),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_db() -> CarDatabase {
        let raw = r#"[
            {
                "name": "Maruti",
                "image": "https://cdn/maruti.png",
                "models": {
                    "Swift": {
                        "image": "https://cdn/swift.png",
                        "variants": [
                            {
                                "name": "VXI",
                                "fuel": "Petrol",
                                "transmission": "Manual",
                                "front_tyres": {"width": 185, "profile": 65, "radius": 15}
                            },
                            {"name": "ZXI AMT", "fuel": "Petrol", "transmission": "Automatic"}
                        ]
                    },
                    "Baleno": {
                        "image": "https://cdn/baleno.png",
                        "variants": {
                            "Sigma": {"fuel": "Petrol", "transmission": "Manual"}
                        }
                    }
                }
            }
        ]"#;

        serde_json::from_str(raw).expect("fixture database should parse")
    }

    #[test]
    fn variants_parse_from_array_and_map_shapes() {
        let db = fixture_db();

        assert_eq!(db.variants("Maruti", "Swift").len(), 2);

        let sigma = db
            .variant("Maruti", "Baleno", "Sigma")
            .expect("map-shaped variant should be named from its key");
        assert_eq!(sigma.fuel, "Petrol");
    }

    #[test]
    fn lookups_are_case_insensitive() {
        let db = fixture_db();

        assert!(db.brand("maruti").is_some());
        assert!(db.model("MARUTI", "swift").is_some());
        assert!(db.variant("maruti", "SWIFT", "vxi").is_some());
    }

    #[test]
    fn unknown_brand_yields_empty_model_list() {
        let db = fixture_db();
        let mut state = SelectionState::default();
        state.choose("Tata");

        assert_eq!(state.options(&db), StepOptions::Models(Vec::new()));
    }

    #[test]
    fn choices_advance_and_are_retained() {
        let mut state = SelectionState::default();

        state.choose("Maruti");
        state.choose("Swift");

        assert_eq!(state.step, SelectionStep::Variant);
        assert_eq!(state.brand.as_deref(), Some("Maruti"));
        assert_eq!(state.model.as_deref(), Some("Swift"));
    }

    #[test]
    fn back_retreats_one_step_without_discarding_choices() {
        let mut state = SelectionState::default();
        state.choose("Maruti");
        state.choose("Swift");

        state.back();

        assert_eq!(state.step, SelectionStep::Model);
        assert_eq!(state.brand.as_deref(), Some("Maruti"));
        assert_eq!(state.model.as_deref(), Some("Swift"));
    }

    #[test]
    fn back_on_brand_step_stays_put() {
        let mut state = SelectionState::default();

        state.back();

        assert_eq!(state.step, SelectionStep::Brand);
    }

    #[test]
    fn revise_returns_to_variant_step_only_from_confirmation() {
        let mut state = SelectionState::default();
        state.choose("Maruti");
        state.choose("Swift");
        state.choose("VXI");
        assert_eq!(state.step, SelectionStep::Confirmation);

        state.revise();
        assert_eq!(state.step, SelectionStep::Variant);
        assert_eq!(state.brand.as_deref(), Some("Maruti"));
        assert_eq!(state.model.as_deref(), Some("Swift"));

        state.revise();
        assert_eq!(state.step, SelectionStep::Variant);
    }

    #[test]
    fn confirm_composes_the_variant_with_canonical_brand() {
        let db = fixture_db();
        let mut state = SelectionState::default();
        state.choose("maruti");
        state.choose("Swift");
        state.choose("VXI");

        let vehicle = state.confirm(&db).expect("chain should resolve");

        assert_eq!(vehicle.brand, "Maruti");
        assert_eq!(vehicle.model, "Swift");
        assert_eq!(vehicle.name, "VXI");
        assert_eq!(
            vehicle.front_tyres,
            Some(TyreSize {
                width: "185".to_string(),
                profile: "65".to_string(),
                radius: "15".to_string(),
            })
        );
        assert_eq!(vehicle.display_name(), "Maruti Swift");
    }

    #[test]
    fn confirm_with_unresolvable_variant_is_none() {
        let db = fixture_db();
        let mut state = SelectionState::default();
        state.choose("Maruti");
        state.choose("Swift");
        state.choose("LXI");

        assert_eq!(state.confirm(&db), None);
    }

    #[test]
    fn reset_returns_to_a_pristine_brand_step() {
        let mut state = SelectionState::default();
        state.choose("Maruti");
        state.choose("Swift");

        state.reset();

        assert_eq!(state, SelectionState::default());
    }

    #[test]
    fn guest_vehicle_round_trips_with_string_variant() {
        let raw = r#"{
            "selectedVariant": "{\"brand\":\"Maruti\",\"model\":\"Swift\",\"name\":\"VXI\",\"fuel\":\"Petrol\",\"transmission\":\"Manual\"}",
            "carBrandModel": "Maruti Swift"
        }"#;

        let guest: GuestVehicle = serde_json::from_str(raw).expect("guest vehicle should parse");
        let variant = guest.selected_variant.expect("variant should normalize");

        assert_eq!(variant.brand, "Maruti");
        assert_eq!(variant.transmission, "Manual");
    }
}
