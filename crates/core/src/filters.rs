//! Tyre filters

use serde::{Deserialize, Serialize};

use crate::catalog::Service;
use crate::vehicles::VehicleVariant;

/// Filter values for the tyre listing. An empty string means "unset"; unset
/// fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TyreFilters {
    /// Tyre manufacturer filter. Independent of the vehicle; only an explicit
    /// user choice or a full reset touches it.
    pub brand: String,
    /// Section width filter.
    pub width: String,
    /// Aspect profile filter.
    pub profile: String,
    /// Rim radius filter.
    pub radius: String,
}

impl TyreFilters {
    /// Clears every field.
    pub fn reset(&mut self) {
        *self = TyreFilters::default();
    }

    /// Recomputes the size fields from the active vehicle. A vehicle with
    /// recorded front-tyre dimensions sets width/profile/radius and leaves
    /// the brand untouched; no vehicle (or no recorded dimensions) resets
    /// all four fields.
    pub fn apply_vehicle(&mut self, vehicle: Option<&VehicleVariant>) {
        match vehicle.and_then(|v| v.front_tyres.as_ref()) {
            Some(tyres) => {
                self.width = tyres.width.clone();
                self.profile = tyres.profile.clone();
                self.radius = tyres.radius.clone();
            }
            None => self.reset(),
        }
    }

    /// Whether every field is unset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.brand.is_empty()
            && self.width.is_empty()
            && self.profile.is_empty()
            && self.radius.is_empty()
    }

    /// Whether a tyre service passes the filter. Each set field must match
    /// its attribute; the brand comparison is case-insensitive.
    #[must_use]
    pub fn matches(&self, service: &Service) -> bool {
        let field_matches = |filter: &str, value: Option<&String>| {
            filter.is_empty()
                || value.is_some_and(|value| value.trim() == filter.trim())
        };

        let brand_matches = self.brand.is_empty()
            || service
                .tyre_brand
                .as_deref()
                .is_some_and(|brand| brand.eq_ignore_ascii_case(&self.brand));

        brand_matches
            && field_matches(&self.width, service.tyre_width.as_ref())
            && field_matches(&self.profile, service.tyre_profile.as_ref())
            && field_matches(&self.radius, service.tyre_radius.as_ref())
    }
}

/// The distinct filter choices offered by the tyre catalog: brands sorted
/// lexically, dimensions sorted numerically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TyreFilterOptions {
    /// Distinct tyre brands.
    pub brands: Vec<String>,
    /// Distinct section widths.
    pub widths: Vec<String>,
    /// Distinct aspect profiles.
    pub profiles: Vec<String>,
    /// Distinct rim radii.
    pub radii: Vec<String>,
}

impl TyreFilterOptions {
    /// Collects the option sets from the tyre catalog entries.
    pub fn from_services<'a>(services: impl Iterator<Item = &'a Service>) -> Self {
        let mut options = TyreFilterOptions::default();

        for service in services {
            push_distinct(&mut options.brands, service.tyre_brand.as_deref());
            push_distinct(&mut options.widths, service.tyre_width.as_deref());
            push_distinct(&mut options.profiles, service.tyre_profile.as_deref());
            push_distinct(&mut options.radii, service.tyre_radius.as_deref());
        }

        options.brands.sort();
        sort_numeric(&mut options.widths);
        sort_numeric(&mut options.profiles);
        sort_numeric(&mut options.radii);

        options
    }
}

fn push_distinct(values: &mut Vec<String>, value: Option<&str>) {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return;
    };

    if !values.iter().any(|existing| existing == value) {
        values.push(value.to_string());
    }
}

fn sort_numeric(values: &mut [String]) {
    values.sort_by_key(|value| value.parse::<u32>().unwrap_or(u32::MAX));
}
