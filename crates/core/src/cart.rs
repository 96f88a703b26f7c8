//! Shopping cart

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{MediaKind, Service, media_kind, numeric_price};

/// A booked (date, time) pair attached to a schedulable cart line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingSlot {
    /// ISO date (`YYYY-MM-DD`).
    pub date: String,
    /// Display time slot (`"09:00 AM"`).
    pub time: String,
}

/// Errors raised while mutating the cart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// The referenced service id is not in the catalog.
    #[error("service {0} was not found")]
    UnknownService(String),

    /// The service's stored price has no numeric value.
    #[error("service price {0:?} is invalid")]
    InvalidPrice(String),

    /// The same service is already booked for this exact slot.
    #[error("this service and slot is already in the cart")]
    AlreadyBooked,
}

/// One cart line: a service snapshot plus quantity and optional booking slot.
///
/// The wire field names follow the order `itemsJson` convention so a cart
/// snapshot round-trips through a saved order unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartItem {
    /// Referenced service id.
    pub id: String,
    /// Title snapshot at add time.
    pub name: String,
    /// Unit price snapshot at add time.
    pub price: Decimal,
    /// Thumbnail snapshot at add time.
    pub thumbnail_src: String,
    /// Whether the thumbnail is an image or a video clip.
    pub item_type: MediaKind,
    /// Number of units; the line is removed before this reaches zero.
    pub quantity: u32,
    /// Booked date, for schedulable segments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_date: Option<String>,
    /// Booked time slot, for schedulable segments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_time: Option<String>,
}

impl Default for CartItem {
    fn default() -> Self {
        CartItem {
            id: String::new(),
            name: String::new(),
            price: Decimal::ZERO,
            thumbnail_src: String::new(),
            item_type: MediaKind::Image,
            quantity: 1,
            booking_date: None,
            booking_time: None,
        }
    }
}

impl CartItem {
    /// The line's booking slot, when both halves are present.
    #[must_use]
    pub fn booking(&self) -> Option<BookingSlot> {
        match (&self.booking_date, &self.booking_time) {
            (Some(date), Some(time)) => Some(BookingSlot {
                date: date.clone(),
                time: time.clone(),
            }),
            _ => None,
        }
    }

    /// Price × quantity for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    fn matches(&self, id: &str, booking: Option<&BookingSlot>) -> bool {
        if self.id != id {
            return false;
        }

        match booking {
            Some(slot) => {
                self.booking_date.as_deref() == Some(slot.date.as_str())
                    && self.booking_time.as_deref() == Some(slot.time.as_str())
            }
            None => self.booking_date.is_none(),
        }
    }
}

/// Order totals at the fixed 18% tax rate, rounded to two decimal places.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Totals {
    /// Sum of line totals.
    pub subtotal: Decimal,
    /// 18% of the subtotal.
    pub tax: Decimal,
    /// Subtotal plus tax.
    pub total: Decimal,
}

/// The fixed tax rate applied to every order.
#[must_use]
pub fn tax_rate() -> Percentage {
    Percentage::from(0.18)
}

/// The shopping cart. Lines are identified by (service id, booking slot):
/// the same service booked for two different slots is two distinct lines,
/// while slotless adds of the same service collapse into one line.
#[derive(Debug, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Adds a service to the cart, snapshotting its price and thumbnail.
    ///
    /// A slotless add of a service already present increments that line's
    /// quantity. An add with a booking slot either creates a new line or is
    /// rejected when the identical (service, slot) line already exists.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidPrice`] when the service price carries no
    /// numeric value, or [`CartError::AlreadyBooked`] for a duplicate slot.
    pub fn add(
        &mut self,
        service: &Service,
        booking: Option<BookingSlot>,
    ) -> Result<&CartItem, CartError> {
        let raw_price = service.price.clone().unwrap_or_default();
        let price =
            numeric_price(&raw_price).map_err(|_| CartError::InvalidPrice(raw_price.clone()))?;

        if let Some(index) = self
            .items
            .iter()
            .position(|item| item.matches(&service.id, booking.as_ref()))
        {
            if booking.is_some() {
                return Err(CartError::AlreadyBooked);
            }

            if let Some(item) = self.items.get_mut(index) {
                item.quantity += 1;
            }

            return self
                .items
                .get(index)
                .ok_or_else(|| CartError::UnknownService(service.id.clone()));
        }

        let thumbnail = service.primary_media().unwrap_or_default().to_string();

        self.items.push(CartItem {
            id: service.id.clone(),
            name: service.title.clone(),
            price,
            item_type: media_kind(&thumbnail),
            thumbnail_src: thumbnail,
            quantity: 1,
            booking_date: booking.as_ref().map(|slot| slot.date.clone()),
            booking_time: booking.as_ref().map(|slot| slot.time.clone()),
        });

        self.items
            .last()
            .ok_or_else(|| CartError::UnknownService(service.id.clone()))
    }

    /// Adjusts a line's quantity by `delta`; the line is removed entirely
    /// when the quantity would drop to zero or below. Returns whether a line
    /// was found.
    pub fn change_quantity(
        &mut self,
        id: &str,
        booking: Option<&BookingSlot>,
        delta: i32,
    ) -> bool {
        let Some(index) = self.items.iter().position(|item| item.matches(id, booking)) else {
            return false;
        };

        let Some(item) = self.items.get_mut(index) else {
            return false;
        };

        let quantity = i64::from(item.quantity) + i64::from(delta);
        if quantity <= 0 {
            self.items.remove(index);
        } else {
            item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }

        true
    }

    /// Removes a line outright, regardless of quantity.
    pub fn remove(&mut self, id: &str, booking: Option<&BookingSlot>) -> bool {
        let before = self.items.len();
        self.items.retain(|item| !item.matches(id, booking));
        self.items.len() != before
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replaces the cart contents wholesale (session hand-off).
    pub fn set_items(&mut self, items: Vec<CartItem>) {
        self.items = items;
    }

    /// The current lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of lines (not units).
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Computes subtotal, tax and total for the current contents.
    #[must_use]
    pub fn totals(&self) -> Totals {
        let subtotal: Decimal = self.items.iter().map(CartItem::line_total).sum();
        let subtotal = subtotal.round_dp(2);
        let tax = (tax_rate() * subtotal).round_dp(2);
        let total = (subtotal + tax).round_dp(2);

        Totals {
            subtotal,
            tax,
            total,
        }
    }
}
