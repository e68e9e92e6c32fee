//! Mirrors an object tree from a source bucket/prefix into a
//! destination bucket/prefix, and tears it down again on delete.

use crate::client::ObjectStore;
use anyhow::Result;
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

/// Enumerate every key under the given bucket and prefix, following
/// continuation tokens until the listing is exhausted. A key repeated
/// at a page boundary collapses into the set.
pub async fn collect_keys(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
) -> Result<BTreeSet<String>> {
    let mut keys = BTreeSet::new();
    let mut next: Option<String> = None;
    loop {
        let (page, token) = store.list_page(bucket, prefix, next.as_deref()).await?;
        keys.extend(page);
        if token.is_none() {
            break;
        }
        next = token;
    }
    Ok(keys)
}

/// Computes the destination key for a source key: the key's suffix
/// relative to the source prefix, joined onto the destination prefix.
/// This is pure string arithmetic, never filesystem path resolution; a
/// prefix that doesn't end on the delimiter just loses that many
/// characters, and no `..` segment is ever interpreted.
pub fn destination_key(dest_prefix: &str, source_prefix: &str, key: &str) -> String {
    let relative = key.strip_prefix(source_prefix).unwrap_or(key);
    let relative = relative.strip_prefix('/').unwrap_or(relative);
    if dest_prefix.is_empty() {
        relative.to_string()
    } else if dest_prefix.ends_with('/') {
        format!("{}{}", dest_prefix, relative)
    } else {
        format!("{}/{}", dest_prefix, relative)
    }
}

/// Copies every object under (source_bucket, source_prefix) to the
/// corresponding key under (bucket, prefix), one server-side copy per
/// key. Directory placeholders (keys ending in the delimiter) carry no
/// content and are skipped. Completed copies are not rolled back if a
/// later one fails.
#[instrument(skip(store))]
pub async fn copy_tree(
    store: &dyn ObjectStore,
    source_bucket: &str,
    source_prefix: &str,
    bucket: &str,
    prefix: &str,
) -> Result<()> {
    let keys = collect_keys(store, source_bucket, source_prefix).await?;
    for key in &keys {
        if key.ends_with('/') {
            continue;
        }
        let destination = destination_key(prefix, source_prefix, key);
        debug!(source = %key, destination = %destination, "copying object");
        store.copy(source_bucket, key, bucket, &destination).await?;
    }
    Ok(())
}

/// Removes every object under (bucket, prefix) with one bulk delete.
/// When nothing matches the prefix, the delete call is skipped
/// entirely. An empty prefix removes the whole bucket's contents.
#[instrument(skip(store))]
pub async fn delete_tree(store: &dyn ObjectStore, bucket: &str, prefix: &str) -> Result<()> {
    let keys = collect_keys(store, bucket, prefix).await?;
    if keys.is_empty() {
        info!("no objects under prefix, skipping delete");
        return Ok(());
    }
    store.delete_all(bucket, keys.into_iter().collect()).await
}
