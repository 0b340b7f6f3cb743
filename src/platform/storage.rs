//! Key-value persistence
//!
//! LocalStorage on the web. Natively nothing is persisted: reads come back
//! empty and writes are dropped.

/// Read a stored string
#[cfg(target_arch = "wasm32")]
pub fn load(key: &str) -> Option<String> {
    let storage = web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()?;
    match storage.get_item(key) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("LocalStorage read of {} failed: {:?}", key, e);
            None
        }
    }
}

/// Store a string, returns whether it was written
#[cfg(target_arch = "wasm32")]
pub fn save(key: &str, value: &str) -> bool {
    let storage = web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten();

    match storage {
        Some(storage) => match storage.set_item(key, value) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("LocalStorage write of {} failed: {:?}", key, e);
                false
            }
        },
        None => false,
    }
}

/// Native stubs
#[cfg(not(target_arch = "wasm32"))]
pub fn load(_key: &str) -> Option<String> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save(_key: &str, _value: &str) -> bool {
    false
}

/// Load and deserialize a JSON value
pub fn load_json<T: serde::de::DeserializeOwned>(key: &str) -> Option<T> {
    let json = load(key)?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring unreadable {}: {}", key, e);
            None
        }
    }
}

/// Serialize and store a JSON value
pub fn save_json<T: serde::Serialize>(key: &str, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(json) => save(key, &json),
        Err(e) => {
            log::warn!("Could not serialize {}: {}", key, e);
            false
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_native_storage_is_empty() {
        assert!(!save("broadside_test", "1"));
        assert_eq!(load("broadside_test"), None);
        assert_eq!(load_json::<u64>("broadside_test"), None);
    }
}
