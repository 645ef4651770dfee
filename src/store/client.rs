use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::debug;

use super::{Item, StoreConfig, StoreError};

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE_MS: u64 = 1_000;
const BACKOFF_CAP_MS: u64 = 10_000;

pub fn fetch_items(store: &StoreConfig) -> Result<Vec<Item>, StoreError> {
    let url = format!("{}/items", store.base_url);
    debug!("fetching items from {url}");

    let response = with_backoff(|| authorized(store, "GET", &url).call().map_err(map_ureq_error))?;

    response
        .into_json::<Vec<Item>>()
        .map_err(|error| StoreError::Malformed(error.to_string()))
}

pub fn update_item_position(
    store: &StoreConfig,
    item_id: &str,
    x: f32,
    y: f32,
) -> Result<(), StoreError> {
    let url = format!("{}/items/{item_id}", store.base_url);
    debug!("patching position of {item_id} to ({x:.1}, {y:.1})");

    with_backoff(|| {
        authorized(store, "PATCH", &url)
            .send_json(serde_json::json!({ "x": x, "y": y }))
            .map_err(map_ureq_error)
    })?;

    Ok(())
}

fn authorized(store: &StoreConfig, method: &str, url: &str) -> ureq::Request {
    let request = store.agent().request(method, url);
    match &store.api_key {
        Some(key) => request.set("Authorization", &format!("Bearer {key}")),
        None => request,
    }
}

// Rate-limit retries live here in the client; the map core only ever sees
// the final success or failure.
fn with_backoff<T>(mut operation: impl FnMut() -> Result<T, StoreError>) -> Result<T, StoreError> {
    let mut attempt = 0;
    loop {
        match operation() {
            Err(StoreError::RateLimited) if attempt + 1 < MAX_ATTEMPTS => {
                attempt += 1;
                thread::sleep(backoff_delay(attempt));
            }
            other => return other,
        }
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    let base = BACKOFF_BASE_MS
        .saturating_mul(1 << attempt.min(16))
        .min(BACKOFF_CAP_MS);
    let jitter = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::from(elapsed.subsec_millis()) % 250)
        .unwrap_or(0);
    Duration::from_millis(base + jitter)
}

fn map_ureq_error(error: ureq::Error) -> StoreError {
    match error {
        ureq::Error::Status(429, _) => StoreError::RateLimited,
        ureq::Error::Status(401 | 403, _) => StoreError::Unauthorized,
        ureq::Error::Status(404 | 410, _) => StoreError::NotFound,
        ureq::Error::Status(code, _) => StoreError::Http(code),
        ureq::Error::Transport(transport) => StoreError::Network(transport.to_string()),
    }
}
