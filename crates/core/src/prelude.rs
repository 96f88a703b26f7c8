//! Kerbside prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{BookingSlot, Cart, CartError, CartItem, Totals, tax_rate},
    catalog::{
        Catalog, MediaKind, PriceDisplay, PriceError, Segment, Service, TyreTitle, media_kind,
        numeric_price, parse_tyre_title,
    },
    content::{Banner, BannerScaling, Reel, Testimonial, active_banners},
    filters::{TyreFilterOptions, TyreFilters},
    orders::{Order, OrderStatus, PaymentMethod, TrackingEvent, latest, sorted_newest_first},
    pagination::{PRODUCTS_PER_PAGE, PageSlice, Pagination, paginate},
    profile::UserProfile,
    reviews::{NewReview, Review, ReviewError, ReviewSummary, summarize},
    slug::slugify,
    vehicles::{
        CarBrand, CarDatabase, CarModel, GuestVehicle, SelectionState, SelectionStep, StepOptions,
        TyreSize, VariantRecord, VehicleVariant,
    },
};
