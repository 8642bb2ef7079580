//! Process-wide registry of revocable object URLs.
//!
//! An object URL is a short opaque string (`blob:pdf2png/<id>`) that stands
//! for a [`Blob`] held in memory. The converter creates one per successful
//! conversion and never revokes it; whoever displays the image owns the URL
//! and should call [`revoke_object_url`] once it is no longer needed.

use crate::output::Blob;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Scheme + authority shared by every URL this registry hands out.
pub const OBJECT_URL_PREFIX: &str = "blob:pdf2png/";

static NEXT_ID: AtomicU64 = AtomicU64::new(1);
static REGISTRY: Lazy<Mutex<HashMap<String, Blob>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Register `blob` and return a URL that resolves to it until revoked.
pub fn create_object_url(blob: &Blob) -> String {
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let url = format!("{OBJECT_URL_PREFIX}{id:016x}");
    REGISTRY
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(url.clone(), blob.clone());
    debug!("Created object URL {} ({} bytes)", url, blob.size());
    url
}

/// Look up the blob behind `url`, if it has not been revoked.
pub fn resolve_object_url(url: &str) -> Option<Blob> {
    REGISTRY
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(url)
        .cloned()
}

/// Release `url`. Returns `false` if it was unknown or already revoked.
pub fn revoke_object_url(url: &str) -> bool {
    let removed = REGISTRY
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(url)
        .is_some();
    if removed {
        debug!("Revoked object URL {}", url);
    }
    removed
}

/// Number of URLs currently registered.
pub fn live_object_urls() -> usize {
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner).len()
}
