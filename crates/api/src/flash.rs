//! One-shot messages carried across a redirect in a cookie.
//!
//! The cookie holds base64url-encoded JSON so that any declared name survives
//! the trip without cookie-value escaping concerns. Anything that fails to
//! decode is ignored.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

/// Cookie name.
pub const FLASH_COOKIE: &str = "flash";

/// Flash severity, also used as the CSS class on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    /// Success notice.
    Message,
    /// Failure notice.
    Error,
}

/// A message shown once on the next page render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    /// Severity.
    pub level: FlashLevel,
    /// Text shown to the user.
    pub text: String,
}

impl Flash {
    /// Success notice.
    #[must_use]
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Message,
            text: text.into(),
        }
    }

    /// Failure notice.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            text: text.into(),
        }
    }

    /// Encode as a cookie value.
    #[must_use]
    pub fn encode(&self) -> String {
        // Serializing a struct of strings cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a cookie value.
    #[must_use]
    pub fn decode(value: &str) -> Option<Self> {
        let json = URL_SAFE_NO_PAD.decode(value).ok()?;
        serde_json::from_slice(&json).ok()
    }
}

/// Store a flash for the next request.
#[must_use]
pub fn put(jar: CookieJar, flash: &Flash) -> CookieJar {
    jar.add(
        Cookie::build((FLASH_COOKIE, flash.encode()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Read and clear the pending flash, if any.
#[must_use]
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let Some(flash) = jar.get(FLASH_COOKIE).map(|c| Flash::decode(c.value())) else {
        return (jar, None);
    };
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    (jar, flash)
}
