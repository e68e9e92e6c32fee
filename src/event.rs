//! Defines the lifecycle event delivered by the provisioning engine,
//! the input for the handling of one stack operation.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The request kinds the dispatcher recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Create,
    Update,
    Delete,
}

/// A create/update/delete notification for the managed static content.
/// The request kind is kept as delivered so that an unrecognized value
/// is rejected by the dispatcher with a descriptive error instead of
/// failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// The raw request kind.
    #[serde(rename = "RequestType")]
    pub request_type: String,

    /// String-valued resource properties configured on the custom
    /// resource. Extra keys added by the engine are carried but unused.
    #[serde(rename = "ResourceProperties", default)]
    pub resource_properties: HashMap<String, String>,
}

impl LifecycleEvent {
    /// Classify the raw request kind.
    pub fn kind(&self) -> Result<RequestKind> {
        match self.request_type.as_str() {
            "Create" => Ok(RequestKind::Create),
            "Update" => Ok(RequestKind::Update),
            "Delete" => Ok(RequestKind::Delete),
            other => Err(anyhow!("Invalid request type: {:?}", other)),
        }
    }

    /// A resource property that must be present and non-empty.
    pub fn required(&self, name: &str) -> Result<&str> {
        match self.resource_properties.get(name) {
            Some(value) if !value.is_empty() => Ok(value),
            Some(_) => Err(anyhow!("Resource property {:?} must not be empty", name)),
            None => Err(anyhow!("Missing required resource property {:?}", name)),
        }
    }

    /// A resource property that defaults to the empty string when
    /// absent.
    pub fn optional(&self, name: &str) -> &str {
        self.resource_properties
            .get(name)
            .map(String::as_str)
            .unwrap_or("")
    }
}
