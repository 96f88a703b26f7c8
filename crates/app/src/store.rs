//! Central state store.
//!
//! One owned context holds every piece of client state (catalog, session,
//! cart, wizard progress, filters, pagination) and is the single source of
//! truth the router and renderers read. Mutation happens only through the
//! named methods here, each of which applies the normalization and invariant
//! rules (login supersedes the guest vehicle, logout empties the cart, tyre
//! filters follow the active vehicle) before committing, and mirrors the
//! session-relevant subset into durable storage.
//!
//! The store has no locking: the app is cooperatively scheduled and callbacks
//! never run concurrently. Anything porting this onto a multi-threaded
//! runtime must serialize mutations (single writer or an actor in front).

use tracing::warn;

use kerbside::cart::{BookingSlot, Cart, CartError};
use kerbside::catalog::{Catalog, Segment, Service};
use kerbside::content::{Banner, Reel, Testimonial};
use kerbside::filters::{TyreFilterOptions, TyreFilters};
use kerbside::orders::{Order, PaymentMethod};
use kerbside::pagination::Pagination;
use kerbside::profile::UserProfile;
use kerbside::reviews::Review;
use kerbside::vehicles::{CarDatabase, GuestVehicle, SelectionState, VehicleVariant};

use crate::gateway::UserData;
use crate::session::{GUEST_CAR_KEY, SESSION_KEY, SessionStorage};

/// The central application state.
pub struct Store {
    storage: Box<dyn SessionStorage>,

    catalog: Catalog,
    car_database: Option<CarDatabase>,
    reviews: Vec<Review>,
    reels: Vec<Reel>,
    testimonials: Vec<Testimonial>,
    banners: Vec<Banner>,

    logged_in: bool,
    user_details: Option<UserProfile>,
    user_orders: Vec<Order>,
    cart: Cart,
    guest_car: Option<GuestVehicle>,

    selection: SelectionState,
    tyre_filters: TyreFilters,
    pagination: Pagination,
    payment_method: PaymentMethod,
}

impl Store {
    /// An empty store backed by the given durable storage.
    #[must_use]
    pub fn new(storage: Box<dyn SessionStorage>) -> Self {
        Store {
            storage,
            catalog: Catalog::default(),
            car_database: None,
            reviews: Vec::new(),
            reels: Vec::new(),
            testimonials: Vec::new(),
            banners: Vec::new(),
            logged_in: false,
            user_details: None,
            user_orders: Vec::new(),
            cart: Cart::default(),
            guest_car: None,
            selection: SelectionState::default(),
            tyre_filters: TyreFilters::default(),
            pagination: Pagination::default(),
            payment_method: PaymentMethod::default(),
        }
    }

    // --- catalog & content ---

    /// Replaces the full catalog (slugs are derived during the replace).
    pub fn set_services(&mut self, services: Vec<Service>) {
        self.catalog.replace(services);
    }

    /// Replaces the vehicle database.
    pub fn set_car_database(&mut self, database: Option<CarDatabase>) {
        self.car_database = database;
    }

    /// Replaces the published reviews.
    pub fn set_reviews(&mut self, reviews: Vec<Review>) {
        self.reviews = reviews;
    }

    /// Replaces the homepage reels.
    pub fn set_reels(&mut self, reels: Vec<Reel>) {
        self.reels = reels;
    }

    /// Replaces the homepage testimonials.
    pub fn set_testimonials(&mut self, testimonials: Vec<Testimonial>) {
        self.testimonials = testimonials;
    }

    /// Replaces the placement banners.
    pub fn set_banners(&mut self, banners: Vec<Banner>) {
        self.banners = banners;
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn car_database(&self) -> Option<&CarDatabase> {
        self.car_database.as_ref()
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn reels(&self) -> &[Reel] {
        &self.reels
    }

    pub fn testimonials(&self) -> &[Testimonial] {
        &self.testimonials
    }

    pub fn banners(&self) -> &[Banner] {
        &self.banners
    }

    // --- session ---

    /// Sets the login status.
    ///
    /// Logging in normalizes and installs the profile and order history,
    /// clears any guest vehicle (the user's car always supersedes it),
    /// persists the session and recomputes the tyre filters from the newly
    /// active vehicle. Logging out clears the profile, orders and cart,
    /// removes the persisted session and recomputes the filters from any
    /// remaining guest vehicle.
    pub fn set_logged_in(&mut self, status: bool, details: Option<UserData>) {
        match (status, details) {
            (true, Some(details)) => {
                // The user's own car supersedes any guest selection; drop it
                // before the filters recompute so they settle once, against
                // the profile's vehicle.
                self.guest_car = None;
                self.storage.remove(GUEST_CAR_KEY);

                self.logged_in = true;
                self.user_details = Some(details.profile);
                self.user_orders = details.orders;
                self.persist_session();
                self.refresh_tyre_filters();
            }
            _ => {
                self.logged_in = false;
                self.user_details = None;
                self.user_orders.clear();
                self.cart.clear();
                self.storage.remove(SESSION_KEY);
                self.refresh_tyre_filters();
            }
        }
    }

    /// Installs a session restored from durable storage (no network round
    /// trip, no re-persist).
    pub fn restore_session(&mut self, details: UserData) {
        self.logged_in = true;
        self.user_details = Some(details.profile);
        self.user_orders = details.orders;
        self.refresh_tyre_filters();
    }

    /// Best-effort startup restore: a parseable stored session logs the user
    /// straight in; a corrupt entry is deleted and ignored. The guest vehicle
    /// is restored only when no session restore occurred.
    pub fn restore_persisted(&mut self) {
        if let Some(raw) = self.storage.load(SESSION_KEY) {
            match serde_json::from_str::<UserData>(&raw) {
                Ok(details) => self.restore_session(details),
                Err(error) => {
                    warn!("failed to parse saved session, discarding: {error}");
                    self.storage.remove(SESSION_KEY);
                }
            }
        }

        if !self.logged_in {
            if let Some(raw) = self.storage.load(GUEST_CAR_KEY) {
                match serde_json::from_str::<GuestVehicle>(&raw) {
                    Ok(car) => self.set_guest_selected_car(Some(car)),
                    Err(error) => {
                        warn!("failed to parse guest car entry, discarding: {error}");
                        self.storage.remove(GUEST_CAR_KEY);
                    }
                }
            }
        }
    }

    /// Replaces the profile. Re-persists the merged session while logged in
    /// and recomputes the tyre filters (the selected vehicle may have
    /// changed).
    pub fn set_user_details(&mut self, details: Option<UserProfile>) {
        self.user_details = details;

        if self.logged_in && self.user_details.is_some() {
            self.persist_session();
        }

        self.refresh_tyre_filters();
    }

    /// Sets or clears the guest vehicle, mirroring it into durable storage
    /// and recomputing the tyre filters.
    pub fn set_guest_selected_car(&mut self, car: Option<GuestVehicle>) {
        match &car {
            Some(car) => match serde_json::to_string(car) {
                Ok(raw) => self.storage.save(GUEST_CAR_KEY, &raw),
                Err(error) => warn!("failed to serialize guest car: {error}"),
            },
            None => self.storage.remove(GUEST_CAR_KEY),
        }

        self.guest_car = car;
        self.refresh_tyre_filters();
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn user_details(&self) -> Option<&UserProfile> {
        self.user_details.as_ref()
    }

    pub fn user_orders(&self) -> &[Order] {
        &self.user_orders
    }

    pub fn guest_car(&self) -> Option<&GuestVehicle> {
        self.guest_car.as_ref()
    }

    /// The vehicle driving tyre-filter defaults: the profile's selection
    /// when present, otherwise the guest selection.
    pub fn active_vehicle(&self) -> Option<&VehicleVariant> {
        self.user_details
            .as_ref()
            .and_then(|profile| profile.selected_variant.as_ref())
            .or_else(|| {
                self.guest_car
                    .as_ref()
                    .and_then(|guest| guest.selected_variant.as_ref())
            })
    }

    fn persist_session(&self) {
        let Some(profile) = &self.user_details else {
            return;
        };

        let session = UserData {
            profile: profile.clone(),
            orders: self.user_orders.clone(),
        };

        match serde_json::to_string(&session) {
            Ok(raw) => self.storage.save(SESSION_KEY, &raw),
            Err(error) => warn!("failed to serialize session: {error}"),
        }
    }

    // --- cart & orders ---

    /// Adds a service to the cart by id, with an optional booking slot.
    ///
    /// # Errors
    ///
    /// [`CartError::UnknownService`] for an id not in the catalog, plus the
    /// cart's own price and duplicate-slot errors.
    pub fn add_to_cart(
        &mut self,
        service_id: &str,
        booking: Option<BookingSlot>,
    ) -> Result<(), CartError> {
        let service = self
            .catalog
            .get(service_id)
            .cloned()
            .ok_or_else(|| CartError::UnknownService(service_id.to_string()))?;

        self.cart.add(&service, booking)?;

        Ok(())
    }

    /// Adjusts a cart line's quantity; the line disappears at zero.
    pub fn change_cart_quantity(
        &mut self,
        service_id: &str,
        booking: Option<&BookingSlot>,
        delta: i32,
    ) -> bool {
        self.cart.change_quantity(service_id, booking, delta)
    }

    /// Removes a cart line outright.
    pub fn remove_cart_line(&mut self, service_id: &str, booking: Option<&BookingSlot>) -> bool {
        self.cart.remove(service_id, booking)
    }

    /// Records a successfully saved order: appends it to the in-memory list
    /// and empties the cart. Only called once the backend confirmed the save.
    pub fn record_order(&mut self, order: Order) {
        self.user_orders.push(order);
        self.cart.clear();
    }

    /// Remembers the payment method chosen on the checkout payment step.
    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn payment_method(&self) -> &PaymentMethod {
        &self.payment_method
    }

    // --- vehicle selection wizard ---

    /// Opens the wizard: a hard reset back to the brand step.
    pub fn open_wizard(&mut self) {
        self.selection.reset();
    }

    /// Records the chosen id for the wizard's current step and advances.
    pub fn choose_wizard_option(&mut self, id: &str) {
        self.selection.choose(id);
    }

    /// Steps the wizard back once, keeping prior choices.
    pub fn wizard_back(&mut self) {
        self.selection.back();
    }

    /// "Change" from the confirmation view: back to the variant step.
    pub fn revise_vehicle(&mut self) {
        self.selection.revise();
    }

    /// Commits the wizard's composed selection as the active vehicle, onto
    /// the profile when logged in (persisting the session) and as the guest
    /// vehicle otherwise, then recomputes the tyre filters and resets the
    /// wizard.
    ///
    /// Returns the committed vehicle, or `None` when the selection chain does
    /// not resolve against the database (the wizard state is then left for
    /// the user to revise).
    pub fn confirm_vehicle(&mut self) -> Option<VehicleVariant> {
        let database = self.car_database.as_ref()?;
        let vehicle = self.selection.confirm(database)?;

        if self.logged_in && self.user_details.is_some() {
            if let Some(profile) = self.user_details.as_mut() {
                profile.set_vehicle(vehicle.clone());
            }
            self.persist_session();
            self.refresh_tyre_filters();
        } else {
            self.set_guest_selected_car(Some(GuestVehicle {
                selected_variant: Some(vehicle.clone()),
                car_brand_model: vehicle.display_name(),
            }));
        }

        self.selection.reset();

        Some(vehicle)
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    // --- filters & pagination ---

    /// Replaces the tyre filter set and resets the tyre listing to page 1.
    pub fn set_tyre_filters(&mut self, filters: TyreFilters) {
        self.pagination.reset(Segment::TyreReplacement);
        self.tyre_filters = filters;
    }

    /// Clears every tyre filter and resets the tyre listing to page 1.
    pub fn reset_tyre_filters(&mut self) {
        self.pagination.reset(Segment::TyreReplacement);
        self.tyre_filters.reset();
    }

    fn refresh_tyre_filters(&mut self) {
        let vehicle = self.active_vehicle().cloned();
        self.tyre_filters.apply_vehicle(vehicle.as_ref());
    }

    /// Sets a segment's listing page by URL slug; unknown slugs are ignored.
    pub fn set_page_for_slug(&mut self, slug: &str, page: usize) {
        self.pagination.set_page_for_slug(slug, page);
    }

    pub fn tyre_filters(&self) -> &TyreFilters {
        &self.tyre_filters
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// The catalog entries of one segment, in catalog order.
    pub fn segment_services(&self, segment: Segment) -> Vec<&Service> {
        self.catalog.in_segment(segment).collect()
    }

    /// Tyre entries passing the current filter set.
    pub fn filtered_tyres(&self) -> Vec<&Service> {
        self.catalog
            .in_segment(Segment::TyreReplacement)
            .filter(|service| self.tyre_filters.matches(service))
            .collect()
    }

    /// The distinct filter choices offered by the tyre catalog.
    pub fn tyre_filter_options(&self) -> TyreFilterOptions {
        TyreFilterOptions::from_services(self.catalog.tyres())
    }
}

#[cfg(test)]
mod tests {
    use kerbside::vehicles::TyreSize;

    use crate::session::MemoryStorage;

    use super::*;

    fn seeded_store(storage: MemoryStorage) -> Store {
        let mut store = Store::new(Box::new(storage));
        store.set_services(vec![
            Service {
                id: "wash-1".to_string(),
                title: "Premium Car Wash".to_string(),
                segment: "Car Wash".to_string(),
                price: Some("₹499".to_string()),
                ..Service::default()
            },
            Service {
                id: "tyre-1".to_string(),
                title: "CEAT SecuraDrive 185/65 R15 88T".to_string(),
                segment: "Tyre Replacement".to_string(),
                price: Some("₹4,500".to_string()),
                tyre_brand: Some("CEAT".to_string()),
                tyre_width: Some("185".to_string()),
                tyre_profile: Some("65".to_string()),
                tyre_radius: Some("15".to_string()),
                ..Service::default()
            },
            Service {
                id: "tyre-2".to_string(),
                title: "MRF ZLX 175/65 R14 82T".to_string(),
                segment: "Tyre Replacement".to_string(),
                price: Some("₹3,200".to_string()),
                tyre_brand: Some("MRF".to_string()),
                tyre_width: Some("175".to_string()),
                tyre_profile: Some("65".to_string()),
                tyre_radius: Some("14".to_string()),
                ..Service::default()
            },
        ]);
        store
    }

    fn swift_vxi() -> VehicleVariant {
        VehicleVariant {
            brand: "Maruti".to_string(),
            model: "Swift".to_string(),
            name: "VXI".to_string(),
            fuel: "Petrol".to_string(),
            transmission: "Manual".to_string(),
            front_tyres: Some(TyreSize {
                width: "185".to_string(),
                profile: "65".to_string(),
                radius: "15".to_string(),
            }),
        }
    }

    fn logged_in_details(vehicle: Option<VehicleVariant>) -> UserData {
        let mut profile = UserProfile::with_mobile("919812345678");
        profile.first_name = "Asha".to_string();
        if let Some(vehicle) = vehicle {
            profile.set_vehicle(vehicle);
        }

        UserData {
            profile,
            orders: Vec::new(),
        }
    }

    #[test]
    fn login_supersedes_and_clears_the_guest_vehicle() {
        let mut store = seeded_store(MemoryStorage::new());
        store.set_guest_selected_car(Some(GuestVehicle {
            selected_variant: Some(swift_vxi()),
            car_brand_model: "Maruti Swift".to_string(),
        }));
        assert!(store.guest_car().is_some());

        store.set_logged_in(true, Some(logged_in_details(None)));

        assert!(store.guest_car().is_none());
        assert!(store.is_logged_in());
    }

    #[test]
    fn login_persists_the_session_blob() {
        let mut store = seeded_store(MemoryStorage::new());

        store.set_logged_in(true, Some(logged_in_details(None)));

        let raw = store
            .storage
            .load(SESSION_KEY)
            .expect("session should be persisted on login");
        let session: UserData = serde_json::from_str(&raw).expect("blob should parse");
        assert_eq!(session.profile.mobile, "919812345678");
    }

    #[test]
    fn logout_clears_cart_profile_and_persisted_session() {
        let mut store = seeded_store(MemoryStorage::new());
        store.set_logged_in(true, Some(logged_in_details(Some(swift_vxi()))));
        store.add_to_cart("wash-1", None).expect("add should succeed");
        assert!(!store.cart().is_empty());

        store.set_logged_in(false, None);

        assert!(store.cart().is_empty());
        assert!(store.user_details().is_none());
        assert!(store.user_orders().is_empty());
        assert_eq!(store.storage.load(SESSION_KEY), None);
    }

    #[test]
    fn selecting_a_vehicle_sets_tyre_size_filters_and_keeps_brand() {
        let mut store = seeded_store(MemoryStorage::new());
        store.set_tyre_filters(TyreFilters {
            brand: "CEAT".to_string(),
            ..TyreFilters::default()
        });

        store.set_logged_in(true, Some(logged_in_details(Some(swift_vxi()))));

        assert_eq!(store.tyre_filters().brand, "CEAT");
        assert_eq!(store.tyre_filters().width, "185");
        assert_eq!(store.tyre_filters().profile, "65");
        assert_eq!(store.tyre_filters().radius, "15");
    }

    #[test]
    fn clearing_the_guest_vehicle_resets_all_filters() {
        let mut store = seeded_store(MemoryStorage::new());
        store.set_guest_selected_car(Some(GuestVehicle {
            selected_variant: Some(swift_vxi()),
            car_brand_model: "Maruti Swift".to_string(),
        }));
        assert_eq!(store.tyre_filters().width, "185");

        store.set_guest_selected_car(None);

        assert!(store.tyre_filters().is_empty());
    }

    #[test]
    fn guest_vehicle_is_mirrored_into_durable_storage() {
        let mut store = seeded_store(MemoryStorage::new());

        store.set_guest_selected_car(Some(GuestVehicle {
            selected_variant: Some(swift_vxi()),
            car_brand_model: "Maruti Swift".to_string(),
        }));
        assert!(store.storage.load(GUEST_CAR_KEY).is_some());

        store.set_guest_selected_car(None);
        assert_eq!(store.storage.load(GUEST_CAR_KEY), None);
    }

    #[test]
    fn corrupt_session_entry_is_deleted_and_ignored() {
        let storage = MemoryStorage::with_entries([(
            SESSION_KEY.to_string(),
            "{not valid json".to_string(),
        )]);
        let mut store = seeded_store(storage);

        store.restore_persisted();

        assert!(!store.is_logged_in());
        assert_eq!(store.storage.load(SESSION_KEY), None);
    }

    #[test]
    fn stored_session_restores_without_a_network_round_trip() {
        let session = UserData {
            profile: UserProfile::with_mobile("919812345678"),
            orders: Vec::new(),
        };
        let storage = MemoryStorage::with_entries([(
            SESSION_KEY.to_string(),
            serde_json::to_string(&session).expect("session should serialize"),
        )]);
        let mut store = seeded_store(storage);

        store.restore_persisted();

        assert!(store.is_logged_in());
        assert_eq!(
            store.user_details().map(|p| p.mobile.as_str()),
            Some("919812345678")
        );
    }

    #[test]
    fn guest_vehicle_restore_is_skipped_when_a_session_restored() {
        let session = UserData {
            profile: UserProfile::with_mobile("9"),
            orders: Vec::new(),
        };
        let guest = GuestVehicle {
            selected_variant: Some(swift_vxi()),
            car_brand_model: "Maruti Swift".to_string(),
        };
        let storage = MemoryStorage::with_entries([
            (
                SESSION_KEY.to_string(),
                serde_json::to_string(&session).expect("session should serialize"),
            ),
            (
                GUEST_CAR_KEY.to_string(),
                serde_json::to_string(&guest).expect("guest car should serialize"),
            ),
        ]);
        let mut store = seeded_store(storage);

        store.restore_persisted();

        assert!(store.is_logged_in());
        assert!(store.guest_car().is_none());
    }

    #[test]
    fn profile_edit_re_persists_the_session_while_logged_in() {
        let mut store = seeded_store(MemoryStorage::new());
        store.set_logged_in(true, Some(logged_in_details(None)));

        let mut profile = store.user_details().cloned().expect("profile present");
        profile.city = "Bengaluru".to_string();
        store.set_user_details(Some(profile));

        let raw = store.storage.load(SESSION_KEY).expect("session persisted");
        assert!(raw.contains("Bengaluru"), "persisted blob should carry the edit");
    }

    #[test]
    fn confirm_vehicle_as_guest_commits_and_resets_the_wizard() {
        let db: CarDatabase = serde_json::from_str(
            r#"[{
                "name": "Maruti",
                "models": {
                    "Swift": {
                        "variants": [{
                            "name": "VXI",
                            "fuel": "Petrol",
                            "transmission": "Manual",
                            "front_tyres": {"width": "185", "profile": "65", "radius": "15"}
                        }]
                    }
                }
            }]"#,
        )
        .expect("database should parse");

        let mut store = seeded_store(MemoryStorage::new());
        store.set_car_database(Some(db));

        store.open_wizard();
        store.choose_wizard_option("Maruti");
        store.choose_wizard_option("Swift");
        store.choose_wizard_option("VXI");

        let vehicle = store.confirm_vehicle().expect("selection should resolve");

        assert_eq!(vehicle.display_name(), "Maruti Swift");
        assert_eq!(store.selection(), &SelectionState::default());
        assert!(store.guest_car().is_some());
        assert_eq!(store.tyre_filters().width, "185");
    }

    #[test]
    fn unresolvable_confirmation_keeps_the_wizard_state() {
        let mut store = seeded_store(MemoryStorage::new());
        store.set_car_database(Some(CarDatabase::default()));
        store.open_wizard();
        store.choose_wizard_option("Maruti");
        store.choose_wizard_option("Swift");
        store.choose_wizard_option("VXI");

        assert_eq!(store.confirm_vehicle(), None);
        assert!(store.selection().brand.is_some());
    }

    #[test]
    fn unknown_service_id_fails_the_cart_add() {
        let mut store = seeded_store(MemoryStorage::new());

        let result = store.add_to_cart("ghost", None);

        assert_eq!(
            result,
            Err(CartError::UnknownService("ghost".to_string()))
        );
    }

    #[test]
    fn filter_changes_reset_the_tyre_page() {
        let mut store = seeded_store(MemoryStorage::new());
        store.set_page_for_slug("tyre-replacement", 3);

        store.set_tyre_filters(TyreFilters {
            width: "185".to_string(),
            ..TyreFilters::default()
        });

        assert_eq!(store.pagination().page(Segment::TyreReplacement), 1);
        let filtered = store.filtered_tyres();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "tyre-1");
    }

    #[test]
    fn unknown_pagination_slug_is_ignored() {
        let mut store = seeded_store(MemoryStorage::new());

        store.set_page_for_slug("bike-wash", 9);

        for segment in Segment::ALL {
            assert_eq!(store.pagination().page(segment), 1);
        }
    }

    #[test]
    fn tyre_filter_options_come_from_the_tyre_catalog() {
        let store = seeded_store(MemoryStorage::new());

        let options = store.tyre_filter_options();

        assert_eq!(options.brands, vec!["CEAT", "MRF"]);
        assert_eq!(options.widths, vec!["175", "185"]);
    }
}
