use anyhow::{anyhow, Result};
use lambda_runtime::{run, service_fn, LambdaEvent};
use static_content_provisioner::event::LifecycleEvent;
use static_content_provisioner::{client, handler};

/// Handle one lifecycle event through the content-mirroring handler.
async fn function_handler(event: LambdaEvent<LifecycleEvent>) -> Result<()> {
    handler::copy_and_configure(&event.payload, client::current()).await
}

/// Run an AWS Lambda function that reacts to stack lifecycle events by
/// mirroring the static site content from the source bucket into the
/// hosting bucket and publishing the front end's runtime
/// configuration, and by removing the mirrored content on delete.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();
    client::init().await?;

    run(service_fn(function_handler))
        .await
        .map_err(|e| anyhow!("{:?}", e))
}
