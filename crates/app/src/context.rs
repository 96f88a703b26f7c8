//! App Context

use std::sync::Arc;

use jiff::Timestamp;
use thiserror::Error;
use tracing::{error, warn};

use kerbside::orders::{Order, PaymentMethod};
use kerbside::profile::UserProfile;
use kerbside::reviews::{NewReview, Review, ReviewError};
use kerbside::vehicles::VehicleVariant;

use crate::config::AppConfig;
use crate::gateway::{GatewayError, HttpGateway, RemoteGateway, UserData};
use crate::router::Router;
use crate::session::{FileStorage, SessionStorage};
use crate::store::Store;

/// Errors that abort application startup.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The core catalog fetch failed; the app cannot become interactive and
    /// shows the persistent failure state inviting a refresh.
    #[error("could not load essential app data")]
    CoreData(#[source] GatewayError),
}

/// Errors surfaced by the checkout confirmation step. Any failure leaves the
/// cart intact so the user can retry.
#[derive(Debug, Error)]
pub enum OrderError {
    /// No signed-in profile to bill the order to.
    #[error("a signed-in profile is required to place an order")]
    NotSignedIn,

    /// The save request itself failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The backend did not confirm the save.
    #[error("the order was not accepted")]
    NotAccepted,
}

/// Errors surfaced by review submission.
#[derive(Debug, Error)]
pub enum SubmitReviewError {
    /// Reviews are tied to an account.
    #[error("you must be logged in to leave a review")]
    NotSignedIn,

    /// The submission failed local validation.
    #[error(transparent)]
    Invalid(#[from] ReviewError),

    /// The publish request failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Outcome of the checkout step-1 advancement gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutAdvance {
    /// Advanced to the payment step.
    Advanced,
    /// The profile is missing its name or address; the view routes into
    /// profile editing instead of advancing.
    ProfileIncomplete,
}

/// The application: gateway, store and router, plus the user-level operations
/// the event layer dispatches into.
pub struct AppContext {
    gateway: Arc<dyn RemoteGateway>,
    /// The central state store.
    pub store: Store,
    /// The page controller.
    pub router: Router,
}

impl AppContext {
    /// Builds and hydrates the app from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError`] when the core catalog cannot be loaded.
    pub async fn init(config: &AppConfig) -> Result<Self, StartupError> {
        let gateway: Arc<dyn RemoteGateway> = Arc::new(HttpGateway::new(config));
        let storage = Box::new(FileStorage::new(config.data_dir.clone()));

        Self::init_with(gateway, storage).await
    }

    /// Startup with explicit collaborators (tests inject mocks here).
    ///
    /// The homepage and core fetches run concurrently and commit
    /// independently: a homepage failure only logs and leaves those sections
    /// empty, while a core failure aborts startup. A stored session is then
    /// restored without any network round trip, and the guest vehicle only
    /// when no session restored.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError`] when the core catalog cannot be loaded.
    pub async fn init_with(
        gateway: Arc<dyn RemoteGateway>,
        storage: Box<dyn SessionStorage>,
    ) -> Result<Self, StartupError> {
        let mut store = Store::new(storage);

        let (homepage, core) = tokio::join!(
            gateway.fetch_homepage_data(),
            gateway.fetch_core_data()
        );

        match homepage {
            Ok(data) => {
                store.set_reels(data.reels);
                store.set_testimonials(data.testimonials);
                store.set_banners(data.banners);
            }
            Err(err) => warn!("failed to load homepage data: {err}"),
        }

        let core = match core {
            Ok(core) => core,
            Err(err) => {
                error!("failed to load core data: {err}");
                return Err(StartupError::CoreData(err));
            }
        };
        store.set_services(core.services);
        store.set_car_database(core.car_data);

        store.restore_persisted();

        Ok(AppContext {
            gateway,
            store,
            router: Router::new(),
        })
    }

    /// The deliberately decoupled reviews afterload: runs after first render
    /// and never fails (the gateway degrades to an empty list). The caller
    /// re-renders once it returns.
    pub async fn load_reviews(&mut self) {
        let reviews = self.gateway.fetch_reviews().await;
        self.store.set_reviews(reviews);
    }

    /// Completes authentication for a verified mobile number: fetches the
    /// profile and order history, treating `notFound` as a brand-new customer
    /// with a fresh profile.
    ///
    /// # Errors
    ///
    /// Returns the gateway error when the lookup itself fails (the session
    /// state is left unchanged).
    pub async fn login(&mut self, mobile: &str) -> Result<(), GatewayError> {
        let details = self
            .gateway
            .fetch_user_data(mobile)
            .await?
            .unwrap_or_else(|| UserData {
                profile: UserProfile::with_mobile(mobile),
                orders: Vec::new(),
            });

        self.store.set_logged_in(true, Some(details));

        Ok(())
    }

    /// Ends the session: clears profile, orders and cart and removes the
    /// persisted session entry.
    pub fn logout(&mut self) {
        self.store.set_logged_in(false, None);
    }

    /// Commits an edited profile locally (persisting the session while
    /// logged in), then saves it remotely. The local commit stands even when
    /// the remote save fails.
    ///
    /// # Errors
    ///
    /// Returns the gateway error from the remote save.
    pub async fn save_profile(&mut self, profile: UserProfile) -> Result<(), GatewayError> {
        self.store.set_user_details(Some(profile.clone()));
        self.gateway.save_profile(&profile).await
    }

    /// Checkout step-1 gate: advancement to the payment step requires a
    /// complete profile (name plus full address).
    pub fn proceed_to_payment(&mut self) -> CheckoutAdvance {
        let complete = self
            .store
            .user_details()
            .is_some_and(UserProfile::has_complete_address);

        if complete {
            self.router.navigate(&mut self.store, "/payment-method");
            CheckoutAdvance::Advanced
        } else {
            CheckoutAdvance::ProfileIncomplete
        }
    }

    /// Confirms the order: drafts it from the cart, saves it remotely, and
    /// only on confirmed success records it locally, empties the cart and
    /// moves to the confirmation page. A failed save leaves the cart intact
    /// so the user can retry.
    ///
    /// # Errors
    ///
    /// [`OrderError::NotSignedIn`] without a profile, [`OrderError::Gateway`]
    /// on transport failure, [`OrderError::NotAccepted`] when the backend
    /// answered without confirming.
    pub async fn place_order(&mut self, payment_method: PaymentMethod) -> Result<Order, OrderError> {
        let Some(profile) = self.store.user_details().cloned() else {
            return Err(OrderError::NotSignedIn);
        };

        self.store.set_payment_method(payment_method.clone());

        let draft = Order::draft(
            self.store.cart(),
            self.store.catalog(),
            &profile,
            payment_method,
            Timestamp::now(),
        );

        match self.gateway.save_new_order(draft).await? {
            Some(order) => {
                self.store.record_order(order.clone());
                self.router.navigate(&mut self.store, "/order-confirmation");
                Ok(order)
            }
            None => Err(OrderError::NotAccepted),
        }
    }

    /// Publishes a review under the signed-in user's identity, then refreshes
    /// the review list.
    ///
    /// # Errors
    ///
    /// Validation, authentication and gateway errors per
    /// [`SubmitReviewError`].
    pub async fn submit_review(&mut self, review: NewReview) -> Result<(), SubmitReviewError> {
        review.validate()?;

        let Some(user) = self.store.user_details() else {
            return Err(SubmitReviewError::NotSignedIn);
        };

        let review = Review {
            service_id: review.service_id,
            user_id: user.mobile.clone(),
            user_name: user.full_name(),
            rating: review.rating,
            comment: review.comment,
        };

        self.gateway.save_review(review).await?;
        self.load_reviews().await;

        Ok(())
    }

    /// Commits the wizard's confirmed selection and, for a signed-in user,
    /// pushes the updated profile to the backend (best-effort; the local
    /// commit stands regardless).
    pub async fn confirm_vehicle(&mut self) -> Option<VehicleVariant> {
        let vehicle = self.store.confirm_vehicle()?;

        if self.store.is_logged_in() {
            if let Some(profile) = self.store.user_details() {
                if let Err(err) = self.gateway.save_profile(profile).await {
                    warn!("failed to save profile after vehicle selection: {err}");
                }
            }
        }

        Some(vehicle)
    }

    /// Re-fetches just the vehicle database.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the current database is left in place.
    pub async fn refresh_car_database(&mut self) -> Result<(), GatewayError> {
        let database = self.gateway.fetch_car_database().await?;
        self.store.set_car_database(database);

        Ok(())
    }
}
