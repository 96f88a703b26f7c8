//! Homepage content

use serde::{Deserialize, Serialize};

use crate::catalog::{MediaKind, media_kind};

/// A short promotional video clip shown on the home page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Reel {
    /// Clip title overlay.
    pub title: String,
    /// Video URL.
    pub video_url: String,
}

/// A customer testimonial, backed by either an image or a video clip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Testimonial {
    /// Customer's display name.
    pub customer_name: String,
    /// Quoted text.
    pub text: String,
    /// Image or video URL.
    pub media_url: String,
}

impl Testimonial {
    /// Whether the media reference is a video clip.
    #[must_use]
    pub fn media_kind(&self) -> MediaKind {
        media_kind(&self.media_url)
    }
}

/// How a banner image scales inside its frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerScaling {
    /// Contain within the frame.
    Fit,
    /// Cover the frame.
    Fill,
    /// Stretch to the frame (the backend default).
    #[default]
    #[serde(other)]
    Stretch,
}

/// A promotional banner slotted into a page placement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Banner {
    /// Banner title / alt text.
    pub title: String,
    /// Banner image URL.
    pub image_url: String,
    /// Optional click-through URL.
    pub link_url: String,
    /// Publication status; only `"active"` banners render.
    pub status: String,
    /// Page placement key (`"home"`, `"tyre-replacement"`, …).
    pub placement: String,
    /// Image scaling mode.
    pub scaling: BannerScaling,
}

impl Banner {
    /// Whether the banner is published.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    /// Whether the banner carries a click-through link.
    #[must_use]
    pub fn has_link(&self) -> bool {
        !self.link_url.trim().is_empty()
    }
}

/// The active banners for one page placement, in backend order.
#[must_use]
pub fn active_banners<'a>(banners: &'a [Banner], placement: &str) -> Vec<&'a Banner> {
    banners
        .iter()
        .filter(|banner| banner.is_active() && banner.placement == placement)
        .collect()
}
