//! Service catalog

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::slug::slugify;
use crate::wire;

/// Catalog category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Doorstep car wash packages (bookable).
    CarWash,
    /// Battery supply and fitting.
    BatteryReplacement,
    /// Tyre supply and fitting.
    TyreReplacement,
    /// Detailing and other car care services.
    CarCare,
}

impl Segment {
    /// Every segment, in display order.
    pub const ALL: [Segment; 4] = [
        Segment::CarWash,
        Segment::BatteryReplacement,
        Segment::TyreReplacement,
        Segment::CarCare,
    ];

    /// Parses a backend label such as `"Car Wash"`, tolerating surrounding
    /// whitespace and arbitrary casing.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "car wash" => Some(Segment::CarWash),
            "battery replacement" => Some(Segment::BatteryReplacement),
            "tyre replacement" => Some(Segment::TyreReplacement),
            "car care" => Some(Segment::CarCare),
            _ => None,
        }
    }

    /// Parses a URL path segment such as `"car-wash"`.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Segment::ALL.into_iter().find(|s| s.slug() == slug)
    }

    /// Canonical display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Segment::CarWash => "Car Wash",
            Segment::BatteryReplacement => "Battery Replacement",
            Segment::TyreReplacement => "Tyre Replacement",
            Segment::CarCare => "Car Care",
        }
    }

    /// Canonical URL slug.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Segment::CarWash => "car-wash",
            Segment::BatteryReplacement => "battery-replacement",
            Segment::TyreReplacement => "tyre-replacement",
            Segment::CarCare => "car-care",
        }
    }
}

/// Media kind behind a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image.
    #[default]
    Image,
    /// Video clip.
    Video,
}

/// Infers the media kind from a URL (anything carrying `.mp4` is video).
#[must_use]
pub fn media_kind(url: &str) -> MediaKind {
    if url.to_lowercase().contains(".mp4") {
        MediaKind::Video
    } else {
        MediaKind::Image
    }
}

/// A single catalog entry as delivered by the content backend.
///
/// Prices stay in their raw backend representation (`"₹1,499"`); the numeric
/// value is derived on demand via [`numeric_price`] so a malformed price only
/// fails the operation that needs the number.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Service {
    /// Backend-issued unique id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// URL slug, derived from the title once at ingestion time.
    pub slug: String,
    /// Raw segment label as sent by the backend.
    pub segment: String,
    /// Raw price representation.
    #[serde(deserialize_with = "wire::opt_string_or_number")]
    pub price: Option<String>,
    /// Raw list price, when the service is discounted.
    #[serde(deserialize_with = "wire::opt_string_or_number")]
    pub mrp: Option<String>,
    /// Gallery media URLs.
    #[serde(rename = "galleryUrls")]
    pub gallery_urls: Vec<String>,
    /// Image URLs; the backend sometimes sends a single bare string.
    #[serde(rename = "imageUrls", deserialize_with = "wire::string_list_or_single")]
    pub image_urls: Vec<String>,
    /// Standalone video URL.
    #[serde(rename = "videoSrc")]
    pub video_src: Option<String>,
    /// Marketing feature bullets.
    pub features: Vec<String>,
    /// Structured key→value specifications.
    #[serde(deserialize_with = "wire::string_map")]
    pub specifications: BTreeMap<String, String>,
    /// Tyre manufacturer, for tyre-replacement entries.
    pub tyre_brand: Option<String>,
    /// Tyre width in mm.
    #[serde(deserialize_with = "wire::opt_string_or_number")]
    pub tyre_width: Option<String>,
    /// Tyre aspect profile.
    #[serde(deserialize_with = "wire::opt_string_or_number")]
    pub tyre_profile: Option<String>,
    /// Rim radius in inches.
    #[serde(deserialize_with = "wire::opt_string_or_number")]
    pub tyre_radius: Option<String>,
}

impl Service {
    /// The parsed segment, when the backend label matches a known category.
    #[must_use]
    pub fn parsed_segment(&self) -> Option<Segment> {
        Segment::from_label(&self.segment)
    }

    /// Slug form of the raw segment label, as used in detail-page URLs.
    #[must_use]
    pub fn segment_slug(&self) -> String {
        slugify(&self.segment)
    }

    /// The first available media reference: gallery, then images, then video.
    #[must_use]
    pub fn primary_media(&self) -> Option<&str> {
        self.gallery_urls
            .first()
            .or_else(|| self.image_urls.first())
            .map(String::as_str)
            .or(self.video_src.as_deref())
    }

    /// Price presentation data, when the price carries a numeric value.
    #[must_use]
    pub fn price_display(&self) -> Option<PriceDisplay> {
        let price = numeric_price(self.price.as_deref()?).ok()?;
        let mrp = self.mrp.as_deref().and_then(|raw| numeric_price(raw).ok());

        let discount_percent = match mrp {
            Some(mrp) if mrp > price && !mrp.is_zero() => ((mrp - price) / mrp
                * Decimal::from(100))
            .round()
            .to_u32()
            .unwrap_or(0),
            _ => 0,
        };

        Some(PriceDisplay {
            price,
            mrp,
            discount_percent,
        })
    }
}

/// Price presentation data for a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceDisplay {
    /// Effective offer price.
    pub price: Decimal,
    /// Struck-through list price, when present.
    pub mrp: Option<Decimal>,
    /// Whole-percent discount off the list price.
    pub discount_percent: u32,
}

/// A backend price representation that carries no usable numeric value.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("price {0:?} is not a valid amount")]
pub struct PriceError(pub String);

/// Extracts the numeric value from a raw price representation by stripping
/// every character that is not a digit or a decimal point.
///
/// # Errors
///
/// Returns [`PriceError`] when nothing parseable remains.
pub fn numeric_price(raw: &str) -> Result<Decimal, PriceError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    cleaned
        .parse::<Decimal>()
        .map_err(|_| PriceError(raw.to_string()))
}

/// The full service catalog, bulk-replaced on every (re)fetch.
#[derive(Debug, Default)]
pub struct Catalog {
    services: Vec<Service>,
    by_id: FxHashMap<String, usize>,
}

impl Catalog {
    /// Replaces the entire catalog, deriving each entry's slug from its title
    /// and rebuilding the id index. Entries are immutable until the next
    /// replace.
    pub fn replace(&mut self, mut services: Vec<Service>) {
        for service in &mut services {
            service.slug = slugify(&service.title);
        }

        self.by_id = services
            .iter()
            .enumerate()
            .map(|(index, service)| (service.id.clone(), index))
            .collect();
        self.services = services;
    }

    /// Looks up a service by its backend id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Service> {
        self.by_id.get(id).and_then(|&index| self.services.get(index))
    }

    /// Looks up the service whose segment slug and item slug both match, as
    /// resolved from a detail-page URL.
    #[must_use]
    pub fn by_slugs(&self, segment_slug: &str, service_slug: &str) -> Option<&Service> {
        self.services
            .iter()
            .find(|s| s.segment_slug() == segment_slug && s.slug == service_slug)
    }

    /// All entries in a segment, in catalog order.
    pub fn in_segment(&self, segment: Segment) -> impl Iterator<Item = &Service> {
        self.services
            .iter()
            .filter(move |s| s.parsed_segment() == Some(segment))
    }

    /// Tyre-replacement entries that carry tyre attributes, the population
    /// behind the filter bar.
    pub fn tyres(&self) -> impl Iterator<Item = &Service> {
        self.in_segment(Segment::TyreReplacement)
            .filter(|s| s.tyre_brand.is_some())
    }

    /// Iterates over every entry.
    pub fn iter(&self) -> impl Iterator<Item = &Service> {
        self.services.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether the catalog holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// Structured details parsed from a standard tyre title such as
/// `"CEAT SecuraDrive 185/65 R15 88T"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TyreTitle {
    /// Tyre manufacturer (first word of the title).
    pub brand: String,
    /// Model name, possibly multi-word.
    pub model: String,
    /// Section width in mm.
    pub width: String,
    /// Aspect profile.
    pub profile: String,
    /// Rim radius in inches.
    pub radius: String,
    /// Load index.
    pub load_index: String,
    /// Speed rating letter, uppercased.
    pub speed_rating: String,
}

static TYRE_SPEC: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?P<width>\d+)/(?P<profile>\d+)\s*R(?P<radius>\d+)\s+(?P<load>\d+)(?P<speed>[A-Za-z])$").ok()
});

/// Parses a standard tyre title into its structured parts, robust to
/// multi-word model names. Returns `None` when the title does not follow the
/// `<brand> <model…> <width>/<profile> R<radius> <load><speed>` convention.
#[must_use]
pub fn parse_tyre_title(title: &str) -> Option<TyreTitle> {
    let spec = TYRE_SPEC.as_ref()?;
    let captures = spec.captures(title)?;
    let spec_start = captures.get(0)?.start();

    let mut brand_model = title.get(..spec_start)?.trim().split_whitespace();
    let brand = brand_model.next()?;
    let model = brand_model.collect::<Vec<_>>().join(" ");
    if model.is_empty() {
        return None;
    }

    Some(TyreTitle {
        brand: brand.to_string(),
        model,
        width: captures.name("width")?.as_str().to_string(),
        profile: captures.name("profile")?.as_str().to_string(),
        radius: captures.name("radius")?.as_str().to_string(),
        load_index: captures.name("load")?.as_str().to_string(),
        speed_rating: captures.name("speed")?.as_str().to_uppercase(),
    })
}
