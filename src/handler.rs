//! Dispatches lifecycle events to the provisioning operations.

use crate::client::ObjectStore;
use crate::event::{LifecycleEvent, RequestKind};
use crate::sync;
use crate::webconfig::{self, SiteConfig};
use anyhow::{Context, Result};
use tracing::{error, info};

/// Handler for the content-mirroring deployable: on create and update
/// the source tree is copied into the hosting bucket and the runtime
/// configuration is published; on delete the mirrored objects are
/// removed again.
pub async fn copy_and_configure(event: &LifecycleEvent, store: &dyn ObjectStore) -> Result<()> {
    log_event(event);
    let outcome = match event.kind()? {
        RequestKind::Create | RequestKind::Update => provision(event, store).await,
        RequestKind::Delete => teardown(event, store).await,
    };
    if let Err(e) = &outcome {
        error!("Failed to handle lifecycle event: {:?}", e);
    }
    outcome
}

/// Handler for the configuration-only deployable: create and update
/// publish the runtime configuration; delete has nothing to clean up
/// since the hosting bucket's own lifecycle removes its contents.
pub async fn configure(event: &LifecycleEvent, store: &dyn ObjectStore) -> Result<()> {
    log_event(event);
    let outcome = match event.kind()? {
        RequestKind::Create | RequestKind::Update => publish_config(event, store).await,
        RequestKind::Delete => Ok(()),
    };
    if let Err(e) = &outcome {
        error!("Failed to handle lifecycle event: {:?}", e);
    }
    outcome
}

/// Log the raw event before dispatching, for operational traceability.
fn log_event(event: &LifecycleEvent) {
    info!(
        "Received event: {}",
        serde_json::to_string(event).unwrap_or_else(|_| format!("{:?}", event))
    );
}

/// Read the configuration scalars off the event.
fn site_config(event: &LifecycleEvent) -> Result<SiteConfig> {
    Ok(SiteConfig {
        user_pool_id: event.required("UserPool")?.to_string(),
        user_pool_client_id: event.required("Client")?.to_string(),
        region: event.required("Region")?.to_string(),
        invoke_url: event.required("RestApi")?.to_string(),
    })
}

/// Mirror the source tree, then publish the configuration. The order
/// matters: copying first means the bulk copy can never clobber the
/// freshly published configuration document.
async fn provision(event: &LifecycleEvent, store: &dyn ObjectStore) -> Result<()> {
    let source_bucket = event.required("SourceBucket")?;
    let source_prefix = event.optional("SourcePrefix");
    let bucket = event.required("Bucket")?;
    let prefix = event.optional("Prefix");
    let config = site_config(event)?;

    sync::copy_tree(store, source_bucket, source_prefix, bucket, prefix)
        .await
        .with_context(|| {
            format!(
                "Failed to mirror content from bucket {:?} into bucket {:?}",
                source_bucket, bucket
            )
        })?;
    webconfig::publish(store, bucket, &config)
        .await
        .with_context(|| format!("Failed to publish runtime configuration to bucket {:?}", bucket))
}

async fn teardown(event: &LifecycleEvent, store: &dyn ObjectStore) -> Result<()> {
    let bucket = event.required("Bucket")?;
    let prefix = event.optional("Prefix");
    sync::delete_tree(store, bucket, prefix)
        .await
        .with_context(|| format!("Failed to remove content from bucket {:?}", bucket))
}

async fn publish_config(event: &LifecycleEvent, store: &dyn ObjectStore) -> Result<()> {
    let bucket = event.required("Bucket")?;
    let config = site_config(event)?;
    webconfig::publish(store, bucket, &config)
        .await
        .with_context(|| format!("Failed to publish runtime configuration to bucket {:?}", bucket))
}
