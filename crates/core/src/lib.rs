//! Kerbside
//!
//! Kerbside is the headless engine for a doorstep car-care storefront: a typed
//! service catalog, a booking-aware shopping cart with fixed-rate totals, order
//! snapshots, user profiles, a vehicle database with a step-wise selection
//! wizard, and the tyre-filter/pagination bookkeeping the listing pages read.
//!
//! Everything in this crate is synchronous and IO-free; fetching, persistence
//! and page control live in the companion application crate.

pub mod cart;
pub mod catalog;
pub mod content;
pub mod filters;
pub mod orders;
pub mod pagination;
pub mod prelude;
pub mod profile;
pub mod reviews;
pub mod slug;
pub mod vehicles;
pub mod wire;
