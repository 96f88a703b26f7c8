//! Kerbside application shell: configuration, the remote data gateway, durable
//! session storage, the central state store and the router that a view layer
//! drives.

pub mod config;
pub mod context;
pub mod gateway;
pub mod router;
pub mod session;
pub mod store;
