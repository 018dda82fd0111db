//! One-shot flash messages carried in a cookie.
//!
//! Messages queued while handling a POST survive the redirect, are rendered
//! on the next page, and the cookie is cleared in the same response. The
//! payload is a base64url JSON array so it survives cookie value rules.

use axum::http::HeaderMap;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use crate::session::cookie_value;

pub const FLASH_COOKIE: &str = "vac_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Success,
}

impl Level {
    pub const fn css_class(&self) -> &'static str {
        match self {
            Level::Error => "flash-error",
            Level::Success => "flash-success",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

impl Flash {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }
}

/// Read pending flashes from the request. Garbage decodes as "no flashes".
pub fn take(headers: &HeaderMap) -> Vec<Flash> {
    let Some(raw) = cookie_value(headers, FLASH_COOKIE) else {
        return Vec::new();
    };
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(raw.as_bytes()) else {
        return Vec::new();
    };
    serde_json::from_slice(&bytes).unwrap_or_default()
}

/// `Set-Cookie` value carrying the given flashes to the next request.
pub fn set_cookie(flashes: &[Flash]) -> String {
    // Serializing a slice of plain structs cannot fail.
    let json = serde_json::to_vec(flashes).unwrap_or_default();
    let encoded = URL_SAFE_NO_PAD.encode(json);
    format!("{FLASH_COOKIE}={encoded}; Path=/; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value that clears any pending flashes.
pub fn clear_cookie() -> String {
    format!("{FLASH_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum::http::header::COOKIE;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn set_then_take_roundtrip() {
        let flashes = vec![
            Flash::error("dates overlap an existing booking"),
            Flash::success("booking saved"),
        ];
        let cookie = set_cookie(&flashes);
        let value = cookie.split(';').next().unwrap();
        let headers = headers_with_cookie(value);
        assert_eq!(take(&headers), flashes);
    }

    #[test]
    fn missing_or_garbage_cookie_yields_nothing() {
        assert!(take(&HeaderMap::new()).is_empty());
        let headers = headers_with_cookie("vac_flash=not!base64!");
        assert!(take(&headers).is_empty());
    }

    #[test]
    fn level_css_classes() {
        assert_eq!(Level::Error.css_class(), "flash-error");
        assert_eq!(Level::Success.css_class(), "flash-success");
    }
}
