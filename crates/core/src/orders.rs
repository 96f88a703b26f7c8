//! Orders

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartItem};
use crate::catalog::Catalog;
use crate::profile::UserProfile;
use crate::wire;

/// Order lifecycle status. `Placed` is the only status created client-side;
/// anything later is applied by the operations backend and carried through
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Initial status at creation time.
    Placed,
    /// A status applied externally after placement.
    #[serde(untagged)]
    Other(String),
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Placed => f.write_str("Placed"),
            OrderStatus::Other(status) => f.write_str(status),
        }
    }
}

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    #[serde(rename = "COD")]
    Cod,
    /// UPI / QR code.
    #[serde(rename = "UPI")]
    Upi,
}

/// One step of an order's tracking history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    /// Status reached.
    pub status: OrderStatus,
    /// When it was reached.
    pub timestamp: Timestamp,
}

/// A placed order: an immutable snapshot of the cart, buyer and totals at
/// placement time.
///
/// On the wire the item snapshots travel under `itemsJson`, which the backend
/// returns either as the original embedded JSON string or as a re-parsed
/// array; both deserialize into the same list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    /// Time-derived unique token (epoch milliseconds).
    pub order_id: String,
    /// Buyer's mobile number.
    pub user_id: String,
    /// Buyer's display name at placement time.
    pub user_name: String,
    /// Placement instant.
    pub order_date: Timestamp,
    /// Cart snapshot.
    #[serde(
        rename = "itemsJson",
        serialize_with = "wire::as_json_string",
        deserialize_with = "wire::from_json_string_or_value"
    )]
    pub items: Vec<CartItem>,
    /// Grand total, tax included.
    pub total_amount: Decimal,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Current status.
    pub status: OrderStatus,
    /// Shipping address snapshot.
    pub shipping_address: String,
    /// Deduplicated segment labels of the ordered services, comma-joined.
    pub service_types: String,
    /// Append-only tracking history; seeded with `Placed` when the order is
    /// sent to the backend.
    pub tracking_history: Vec<TrackingEvent>,
}

impl Default for Order {
    fn default() -> Self {
        Order {
            order_id: String::new(),
            user_id: String::new(),
            user_name: String::new(),
            order_date: Timestamp::UNIX_EPOCH,
            items: Vec::new(),
            total_amount: Decimal::ZERO,
            payment_method: PaymentMethod::default(),
            status: OrderStatus::Placed,
            shipping_address: String::new(),
            service_types: String::new(),
            tracking_history: Vec::new(),
        }
    }
}

impl Order {
    /// Composes a new order from the cart contents at placement time.
    ///
    /// The order id is derived from `placed_at` (epoch milliseconds), the
    /// item list and totals are snapshotted from the cart, and the service
    /// types are the deduplicated segment labels of the ordered services
    /// (`"Unknown"` for ids no longer in the catalog). The tracking history
    /// starts empty; the gateway seeds it when the order is saved.
    #[must_use]
    pub fn draft(
        cart: &Cart,
        catalog: &Catalog,
        profile: &UserProfile,
        payment_method: PaymentMethod,
        placed_at: Timestamp,
    ) -> Self {
        let mut service_types: Vec<String> = Vec::new();
        for item in cart.items() {
            let label = catalog
                .get(&item.id)
                .map_or_else(|| "Unknown".to_string(), |s| s.segment.clone());
            if !service_types.contains(&label) {
                service_types.push(label);
            }
        }

        Order {
            order_id: placed_at.as_millisecond().to_string(),
            user_id: profile.mobile.clone(),
            user_name: profile.full_name(),
            order_date: placed_at,
            items: cart.items().to_vec(),
            total_amount: cart.totals().total,
            payment_method,
            status: OrderStatus::Placed,
            shipping_address: profile.shipping_address(),
            service_types: service_types.join(", "),
            tracking_history: Vec::new(),
        }
    }

    /// Appends the initial `Placed` tracking entry. Called once, immediately
    /// before the order is sent to the backend.
    pub fn seed_tracking(&mut self, at: Timestamp) {
        self.tracking_history.push(TrackingEvent {
            status: OrderStatus::Placed,
            timestamp: at,
        });
    }
}

/// The most recently placed order, by order date.
#[must_use]
pub fn latest(orders: &[Order]) -> Option<&Order> {
    orders.iter().max_by_key(|order| order.order_date)
}

/// Orders sorted newest-first for the orders-list page.
#[must_use]
pub fn sorted_newest_first(orders: &[Order]) -> Vec<&Order> {
    let mut sorted: Vec<&Order> = orders.iter().collect();
    sorted.sort_by(|a, b| b.order_date.cmp(&a.order_date));
    sorted
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::catalog::Service;

    use super::*;

    fn catalog_with(services: Vec<Service>) -> Catalog {
        let mut catalog = Catalog::default();
        catalog.replace(services);
        catalog
    }

    fn service(id: &str, segment: &str, price: &str) -> Service {
        Service {
            id: id.to_string(),
            title: format!("Service {id}"),
            segment: segment.to_string(),
            price: Some(price.to_string()),
            ..Service::default()
        }
    }

    fn buyer() -> UserProfile {
        let mut profile = UserProfile::with_mobile("919812345678");
        profile.first_name = "Asha".to_string();
        profile.last_name = "Rao".to_string();
        profile.street = "12 MG Road".to_string();
        profile.city = "Bengaluru".to_string();
        profile.pincode = "560001".to_string();
        profile
    }

    #[test]
    fn draft_snapshots_cart_and_buyer() -> TestResult {
        let catalog = catalog_with(vec![
            service("s1", "Car Wash", "1000"),
            service("s2", "Car Care", "500"),
        ]);
        let mut cart = Cart::default();
        cart.add(catalog.get("s1").expect("s1 indexed"), None)?;
        cart.add(catalog.get("s2").expect("s2 indexed"), None)?;

        let placed_at: Timestamp = "2025-03-01T10:00:00Z".parse()?;
        let order = Order::draft(
            &cart,
            &catalog,
            &buyer(),
            PaymentMethod::Cod,
            placed_at,
        );

        assert_eq!(order.order_id, placed_at.as_millisecond().to_string());
        assert_eq!(order.user_id, "919812345678");
        assert_eq!(order.user_name, "Asha Rao");
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.total_amount, Decimal::new(177_000, 2));
        assert_eq!(order.shipping_address, "12 MG Road, Bengaluru, 560001");
        assert_eq!(order.service_types, "Car Wash, Car Care");
        assert!(order.tracking_history.is_empty());

        Ok(())
    }

    #[test]
    fn draft_deduplicates_service_types() -> TestResult {
        let catalog = catalog_with(vec![
            service("s1", "Car Wash", "100"),
            service("s2", "Car Wash", "200"),
        ]);
        let mut cart = Cart::default();
        cart.add(catalog.get("s1").expect("s1 indexed"), None)?;
        cart.add(catalog.get("s2").expect("s2 indexed"), None)?;

        let order = Order::draft(
            &cart,
            &catalog,
            &buyer(),
            PaymentMethod::Upi,
            Timestamp::UNIX_EPOCH,
        );

        assert_eq!(order.service_types, "Car Wash");

        Ok(())
    }

    #[test]
    fn items_serialize_as_embedded_json_string() -> TestResult {
        let catalog = catalog_with(vec![service("s1", "Car Wash", "499")]);
        let mut cart = Cart::default();
        cart.add(catalog.get("s1").expect("s1 indexed"), None)?;

        let order = Order::draft(
            &cart,
            &catalog,
            &buyer(),
            PaymentMethod::Cod,
            Timestamp::UNIX_EPOCH,
        );

        let value = serde_json::to_value(&order)?;
        assert!(
            value["itemsJson"].is_string(),
            "itemsJson should be an embedded string, got {value:?}"
        );

        let restored: Order = serde_json::from_value(value)?;
        assert_eq!(restored.items, order.items);

        Ok(())
    }

    #[test]
    fn items_deserialize_from_reparsed_array_form() {
        let raw = r#"{
            "orderId": "1740800000000",
            "userId": "919812345678",
            "userName": "Asha Rao",
            "orderDate": "2025-03-01T10:00:00Z",
            "itemsJson": [{"id": "s1", "name": "Service s1", "price": 499, "quantity": 1}],
            "totalAmount": 588.82,
            "paymentMethod": "COD",
            "status": "Placed",
            "shippingAddress": "12 MG Road, Bengaluru, 560001",
            "serviceTypes": "Car Wash"
        }"#;

        let order: Order = serde_json::from_str(raw).unwrap();

        assert_eq!(order.items.len(), 1);
        assert_eq!(order.status, OrderStatus::Placed);
    }

    #[test]
    fn external_status_is_carried_verbatim() {
        let status: OrderStatus = serde_json::from_str(r#""Out for Service""#).unwrap();

        assert_eq!(status, OrderStatus::Other("Out for Service".to_string()));
        assert_eq!(status.to_string(), "Out for Service");
    }

    #[test]
    fn seed_tracking_appends_placed_entry() {
        let mut order = Order::default();
        let at: Timestamp = "2025-03-01T10:00:00Z".parse().unwrap();

        order.seed_tracking(at);

        assert_eq!(order.tracking_history.len(), 1);
        assert_eq!(order.tracking_history[0].status, OrderStatus::Placed);
        assert_eq!(order.tracking_history[0].timestamp, at);
    }

    #[test]
    fn latest_picks_most_recent_order_date() {
        let mut first = Order::default();
        first.order_id = "1".to_string();
        first.order_date = "2025-03-01T10:00:00Z".parse().unwrap();

        let mut second = Order::default();
        second.order_id = "2".to_string();
        second.order_date = "2025-03-02T10:00:00Z".parse().unwrap();

        let orders = vec![first, second];

        assert_eq!(latest(&orders).map(|o| o.order_id.as_str()), Some("2"));

        let sorted = sorted_newest_first(&orders);
        assert_eq!(sorted[0].order_id, "2");
        assert_eq!(sorted[1].order_id, "1");
    }
}
