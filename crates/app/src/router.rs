//! Router / page controller.
//!
//! Maps URL paths onto the closed set of client-side pages, applies the
//! transition side effects that accompany every page change, and keeps a
//! browser-style history so back/forward re-run the same resolution
//! idempotently. Rendering itself belongs to the view layer; the router only
//! says *which* page is active.

use kerbside::catalog::Segment;
use kerbside::orders;

use crate::store::Store;

const MAX_REDIRECT_HOPS: usize = 4;

/// A renderable page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    /// Landing page.
    Home,
    /// About-us page.
    About,
    /// A service-category listing.
    Listing(Segment),
    /// The detail page for one service, matched by segment and item slug.
    ServiceDetail {
        /// Slug of the service's segment label.
        segment_slug: String,
        /// The service's own slug.
        service_slug: String,
    },
    /// Explicit not-found view for a detail URL whose slugs match nothing.
    ServiceNotFound,
    /// The cart (`/my-order`).
    Cart,
    /// Past orders list (guarded: requires a session).
    OrdersList,
    /// Checkout step 1: shipping details.
    OrderDetails,
    /// Checkout step 2: payment method.
    PaymentMethod,
    /// Checkout step 3: confirmation.
    OrderConfirmation,
}

impl Page {
    /// Whether the page belongs to the shopping/checkout sequence. Transient
    /// guest profile details survive only while the user stays inside it.
    #[must_use]
    pub fn in_checkout_sequence(&self) -> bool {
        matches!(
            self,
            Page::Cart | Page::OrderDetails | Page::PaymentMethod | Page::OrderConfirmation
        )
    }
}

/// The outcome of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Activate this page.
    Show(Page),
    /// The orders-list guard fired while logged out: the destination never
    /// activates and the view should open the authentication flow instead.
    RequiresAuth,
}

enum Resolved {
    Page(Page),
    Redirect(&'static str),
    Auth,
}

fn resolve_raw(path: &str, store: &Store) -> Resolved {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        [] | ["home"] => Resolved::Page(Page::Home),
        ["about-us"] => Resolved::Page(Page::About),
        ["my-order"] => Resolved::Page(Page::Cart),
        ["my-orders-list"] => {
            if store.is_logged_in() {
                Resolved::Page(Page::OrdersList)
            } else {
                Resolved::Auth
            }
        }
        ["order-details"] => Resolved::Page(Page::OrderDetails),
        ["payment-method"] => Resolved::Page(Page::PaymentMethod),
        ["order-confirmation"] => {
            // Defensive: the confirmation page shows the latest order, so
            // reaching it with none recorded falls back home.
            if orders::latest(store.user_orders()).is_some() {
                Resolved::Page(Page::OrderConfirmation)
            } else {
                Resolved::Redirect("/home")
            }
        }
        ["services"] => Resolved::Redirect("/services/car-wash"),
        ["services", segment] => match Segment::from_slug(segment) {
            Some(segment) => Resolved::Page(Page::Listing(segment)),
            None => Resolved::Page(Page::Home),
        },
        ["services", segment_slug, service_slug] => {
            if store.catalog().by_slugs(segment_slug, service_slug).is_some() {
                Resolved::Page(Page::ServiceDetail {
                    segment_slug: (*segment_slug).to_string(),
                    service_slug: (*service_slug).to_string(),
                })
            } else {
                Resolved::Page(Page::ServiceNotFound)
            }
        }
        _ => Resolved::Page(Page::Home),
    }
}

/// History-integrated page controller.
pub struct Router {
    history: Vec<String>,
    position: usize,
    current: Option<Page>,
}

impl Default for Router {
    fn default() -> Self {
        Router::new()
    }
}

impl Router {
    /// A router positioned at the root path with nothing shown yet.
    #[must_use]
    pub fn new() -> Self {
        Router {
            history: vec!["/".to_string()],
            position: 0,
            current: None,
        }
    }

    /// The path of the active history entry.
    #[must_use]
    pub fn current_path(&self) -> &str {
        self.history
            .get(self.position)
            .map_or("/", String::as_str)
    }

    /// The page most recently activated, if any.
    #[must_use]
    pub fn current_page(&self) -> Option<&Page> {
        self.current.as_ref()
    }

    /// Resolves a path against the store with no history or store effects.
    /// Redirects are followed to their destination.
    #[must_use]
    pub fn resolve(path: &str, store: &Store) -> Resolution {
        let mut path = path;
        for _ in 0..MAX_REDIRECT_HOPS {
            match resolve_raw(path, store) {
                Resolved::Page(page) => return Resolution::Show(page),
                Resolved::Auth => return Resolution::RequiresAuth,
                Resolved::Redirect(next) => path = next,
            }
        }

        Resolution::Show(Page::Home)
    }

    /// Explicit navigation: pushes a history entry only when the target path
    /// differs from the current one (each redirect hop enters history, as a
    /// location change would), applies the transition side effects, and
    /// returns what to show.
    pub fn navigate(&mut self, store: &mut Store, path: &str) -> Resolution {
        let mut path = path.to_string();

        for _ in 0..MAX_REDIRECT_HOPS {
            if self.current_path() != path {
                self.push(path.clone());
            }

            match resolve_raw(&path, store) {
                Resolved::Page(page) => return self.activate(store, Resolution::Show(page)),
                Resolved::Auth => return self.activate(store, Resolution::RequiresAuth),
                Resolved::Redirect(next) => path = next.to_string(),
            }
        }

        self.activate(store, Resolution::Show(Page::Home))
    }

    /// History back: re-resolves the previous entry. `None` at the start of
    /// history.
    pub fn back(&mut self, store: &mut Store) -> Option<Resolution> {
        if self.position == 0 {
            return None;
        }

        self.position -= 1;
        Some(self.re_resolve(store))
    }

    /// History forward counterpart of [`Router::back`].
    pub fn forward(&mut self, store: &mut Store) -> Option<Resolution> {
        if self.position + 1 >= self.history.len() {
            return None;
        }

        self.position += 1;
        Some(self.re_resolve(store))
    }

    fn push(&mut self, path: String) {
        self.history.truncate(self.position + 1);
        self.history.push(path);
        self.position = self.history.len() - 1;
    }

    fn re_resolve(&mut self, store: &mut Store) -> Resolution {
        let path = self.current_path().to_string();
        let resolution = Router::resolve(&path, store);

        self.activate(store, resolution)
    }

    /// Side effects applied on every page change: transient guest profile
    /// data is cleared the moment a logged-out user leaves the checkout
    /// sequence. Page-local timers and scroll position are view concerns and
    /// reset there.
    fn activate(&mut self, store: &mut Store, resolution: Resolution) -> Resolution {
        let staying_in_checkout = matches!(
            &resolution,
            Resolution::Show(page) if page.in_checkout_sequence()
        );

        if !store.is_logged_in() && !staying_in_checkout {
            store.set_user_details(None);
        }

        if let Resolution::Show(page) = &resolution {
            self.current = Some(page.clone());
        }

        resolution
    }
}
