//! LocalStorage persistence for small JSON documents (wasm32 only)
//!
//! A missing key, an unavailable store and corrupt JSON all read as `None`;
//! writes that fail are logged and dropped.

use serde::Serialize;
use serde::de::DeserializeOwned;
use web_sys::Storage;

fn local_storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// Read and parse the document stored under `key`
pub(crate) fn load<T: DeserializeOwned>(key: &str) -> Option<T> {
    let json = local_storage()?.get_item(key).ok().flatten()?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Discarding corrupt `{}`: {}", key, e);
            None
        }
    }
}

/// Serialize `value` under `key`. Returns whether it was written.
pub(crate) fn save<T: Serialize>(key: &str, value: &T) -> bool {
    let Some(storage) = local_storage() else {
        return false;
    };
    let written = serde_json::to_string(value)
        .map_err(|e| e.to_string())
        .and_then(|json| {
            storage
                .set_item(key, &json)
                .map_err(|_| "storage rejected the write".to_string())
        });
    if let Err(e) = &written {
        log::warn!("Could not save `{}`: {}", key, e);
    }
    written.is_ok()
}
