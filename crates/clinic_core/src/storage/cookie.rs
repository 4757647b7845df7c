//! Cookie-style encoding for the full-list store.
//!
//! # Responsibility
//! - Percent-encode values before they hit the backing medium, and decode
//!   them on read.
//! - Render `Set-Cookie` header values for hosts that mirror the list into a
//!   real browser cookie.
//!
//! # Invariants
//! - Values that fail to decode are returned raw; the caller's JSON parse
//!   then treats them as malformed.
//! - Oversized cookies are logged, never rejected.
//! - Expiry dates saturate at the latest representable instant.

use super::{KeyValueBackend, StorageResult};
use crate::config::CookieConfig;
use chrono::{DateTime, TimeDelta, Utc};
use log::warn;

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Wraps a backend so stored values are cookie-encoded.
#[derive(Debug, Clone)]
pub struct CookieBackend<B> {
    inner: B,
    config: CookieConfig,
}

impl<B: KeyValueBackend> CookieBackend<B> {
    pub fn new(inner: B, config: CookieConfig) -> Self {
        Self { inner, config }
    }

    pub fn config(&self) -> &CookieConfig {
        &self.config
    }

    pub fn into_inner(self) -> B {
        self.inner
    }

    /// `Set-Cookie` value for the stored entry, or `None` when absent.
    pub fn set_cookie_header(&self, name: &str) -> StorageResult<Option<String>> {
        let encoded = self.inner.get_item(name)?;
        Ok(encoded.map(|value| format_set_cookie(name, &value, &self.config, Utc::now())))
    }
}

impl<B: KeyValueBackend> KeyValueBackend for CookieBackend<B> {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let Some(raw) = self.inner.get_item(key)? else {
            return Ok(None);
        };
        match decode_component(&raw) {
            Some(decoded) => Ok(Some(decoded)),
            None => {
                warn!("event=cookie_decode module=storage status=error key={key}");
                Ok(Some(raw))
            }
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let encoded = encode_component(value);
        let pair_bytes = key.len() + 1 + encoded.len();
        if pair_bytes > self.config.max_bytes {
            warn!(
                "event=cookie_capacity module=storage status=exceeded key={key} bytes={pair_bytes} max_bytes={}",
                self.config.max_bytes
            );
        }
        self.inner.set_item(key, &encoded)
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<bool> {
        self.inner.remove_item(key)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        self.inner.keys()
    }
}

/// Renders `name=value; expires=<HTTP date>; path=<path>; SameSite=<mode>`.
pub fn format_set_cookie(
    name: &str,
    encoded_value: &str,
    config: &CookieConfig,
    now: DateTime<Utc>,
) -> String {
    format!(
        "{name}={encoded_value}; expires={}; path={}; SameSite={}",
        cookie_expiry(now, config.max_age_days).format(HTTP_DATE_FORMAT),
        config.path,
        config.same_site
    )
}

fn cookie_expiry(now: DateTime<Utc>, max_age_days: u32) -> DateTime<Utc> {
    TimeDelta::try_days(i64::from(max_age_days))
        .and_then(|age| now.checked_add_signed(age))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Percent-encodes everything except ASCII alphanumerics and `-_.~`.
pub fn encode_component(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Reverses `encode_component`. Returns `None` when the decoded bytes are not
/// valid UTF-8; malformed escapes pass through literally.
pub fn decode_component(value: &str) -> Option<String> {
    urlencoding::decode(value).ok().map(|decoded| decoded.into_owned())
}
