//! Build-time backend configuration with an optional runtime override. The
//! runtime config is read from `window.REGISTRO_CONFIG` (if present) so
//! static deployments can change endpoints without rebuilding. The
//! publishable key is a public client credential; no secrets belong here.

/// Frontend configuration derived from build-time environment variables.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub backend_url: String,
    pub publishable_key: String,
    /// Absolute URL confirmation emails link back to, when set.
    pub site_url: Option<String>,
}

impl AppConfig {
    /// Loads config from build-time environment variables and applies runtime overrides.
    pub fn load() -> Self {
        let backend_url = option_env!("REGISTRO_BACKEND_URL").unwrap_or("");
        let publishable_key = option_env!("REGISTRO_PUBLISHABLE_KEY").unwrap_or("");
        let site_url = option_env!("REGISTRO_SITE_URL").unwrap_or("");

        let mut config = Self {
            backend_url: backend_url.to_string(),
            publishable_key: publishable_key.to_string(),
            site_url: normalize_runtime_value(site_url),
        };

        if let Some(runtime) = runtime_config() {
            apply_runtime_overrides(&mut config, runtime);
        }

        config
    }
}

#[derive(Default)]
struct RuntimeConfig {
    backend_url: Option<String>,
    publishable_key: Option<String>,
    site_url: Option<String>,
}

fn apply_runtime_overrides(config: &mut AppConfig, runtime: RuntimeConfig) {
    if let Some(value) = runtime.backend_url {
        config.backend_url = value;
    }
    if let Some(value) = runtime.publishable_key {
        config.publishable_key = value;
    }
    if let Some(value) = runtime.site_url {
        config.site_url = Some(value);
    }
}

#[cfg(target_arch = "wasm32")]
fn runtime_config() -> Option<RuntimeConfig> {
    use js_sys::{Object, Reflect};
    use wasm_bindgen::JsValue;

    let window = web_sys::window()?;
    let config = Reflect::get(&window, &JsValue::from_str("REGISTRO_CONFIG")).ok()?;
    if config.is_null() || config.is_undefined() {
        return None;
    }
    let object = Object::from(config);

    Some(RuntimeConfig {
        backend_url: read_runtime_value(&object, "backend_url"),
        publishable_key: read_runtime_value(&object, "publishable_key"),
        site_url: read_runtime_value(&object, "site_url"),
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn runtime_config() -> Option<RuntimeConfig> {
    None
}

#[cfg(target_arch = "wasm32")]
fn read_runtime_value(object: &js_sys::Object, key: &str) -> Option<String> {
    let value = js_sys::Reflect::get(object, &wasm_bindgen::JsValue::from_str(key))
        .ok()?
        .as_string()?;
    normalize_runtime_value(&value)
}

fn normalize_runtime_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
