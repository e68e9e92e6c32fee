//! Provisioning handlers for a statically hosted web application.
//!
//! Two Lambda-deployable handlers react to create/update/delete
//! lifecycle events from the provisioning engine: one mirrors the site
//! content from a source bucket into the hosting bucket and publishes
//! the runtime configuration the front end loads at startup, the other
//! only publishes the configuration. On delete, mirrored content is
//! removed again.

pub mod client;
pub mod event;
pub mod handler;
pub mod sync;
pub mod webconfig;

#[cfg(test)]
pub(crate) mod test_util;
