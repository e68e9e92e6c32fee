//! Renders and publishes the runtime configuration document that the
//! static front end loads to discover its backend.

use crate::client::ObjectStore;
use anyhow::Result;
use tracing::instrument;

/// Where the front end expects the configuration, relative to the
/// bucket root. Deliberately outside the content prefix.
pub const CONFIG_KEY: &str = "js/config.js";

/// The scalar values substituted into the configuration template. They
/// are passed through verbatim, without validation or escaping.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub user_pool_id: String,
    pub user_pool_client_id: String,
    pub region: String,
    pub invoke_url: String,
}

impl SiteConfig {
    /// Renders the configuration document.
    pub fn render(&self) -> String {
        format!(
            "
    var _config = {{
        cognito: {{
            userPoolId: '{}',
            userPoolClientId: '{}',
            region: '{}',
        }},
        api: {{
            invokeUrl: '{}',
        }}
    }};
",
            self.user_pool_id, self.user_pool_client_id, self.region, self.invoke_url
        )
    }
}

/// Uploads the rendered configuration to its fixed key in the bucket,
/// overwriting whatever is already there.
#[instrument(skip(store, config))]
pub async fn publish(store: &dyn ObjectStore, bucket: &str, config: &SiteConfig) -> Result<()> {
    store
        .put(bucket, CONFIG_KEY, config.render().into_bytes())
        .await
}
