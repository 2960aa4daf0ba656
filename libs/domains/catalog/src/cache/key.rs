//! Deterministic cache keys.
//!
//! A key is the resource prefix alone when no parameters are present, or
//! `prefix:<16 hex chars>` where the hex is the leading part of the SHA-256
//! of the sorted, `&`-joined `name=value` pairs.

use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

const DIGEST_HEX_LEN: usize = 16;

/// Parameter value with a fixed textual form
#[derive(Debug, Clone, PartialEq)]
pub enum KeyValue {
    Str(String),
    Int(i64),
    /// Rendered with four decimals so `100` and `100.0` collide
    Float(f64),
    Bool(bool),
}

impl KeyValue {
    fn canonical(&self) -> String {
        match self {
            KeyValue::Str(value) => value.clone(),
            KeyValue::Int(value) => value.to_string(),
            KeyValue::Float(value) => format!("{:.4}", value),
            KeyValue::Bool(value) => value.to_string(),
        }
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        KeyValue::Str(value.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        KeyValue::Str(value)
    }
}

impl From<i64> for KeyValue {
    fn from(value: i64) -> Self {
        KeyValue::Int(value)
    }
}

impl From<u32> for KeyValue {
    fn from(value: u32) -> Self {
        KeyValue::Int(i64::from(value))
    }
}

impl From<f64> for KeyValue {
    fn from(value: f64) -> Self {
        KeyValue::Float(value)
    }
}

impl From<bool> for KeyValue {
    fn from(value: bool) -> Self {
        KeyValue::Bool(value)
    }
}

/// Builder for a cache key. Absent parameters are dropped.
///
/// ```
/// use domain_catalog::cache::CacheKey;
///
/// let a = CacheKey::new("sneakers").param("brand", Some("Nike")).param("page", Some(1u32));
/// let b = CacheKey::new("sneakers").param("page", Some(1u32)).param("brand", Some("Nike"));
/// assert_eq!(a.build(), b.build());
/// assert_eq!(CacheKey::new("brands").build(), "brands");
/// ```
#[derive(Debug, Clone)]
pub struct CacheKey {
    prefix: String,
    params: BTreeSet<(String, String)>,
}

impl CacheKey {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            params: BTreeSet::new(),
        }
    }

    pub fn param<V: Into<KeyValue>>(mut self, name: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.params
                .insert((name.to_string(), value.into().canonical()));
        }
        self
    }

    pub fn build(&self) -> String {
        if self.params.is_empty() {
            return self.prefix.clone();
        }

        let canonical = self
            .params
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("&");
        let digest = format!("{:x}", Sha256::digest(canonical.as_bytes()));

        format!("{}:{}", self.prefix, &digest[..DIGEST_HEX_LEN])
    }
}

/// Functional form of [`CacheKey`].
pub fn cache_key<'a, I>(prefix: &str, params: I) -> String
where
    I: IntoIterator<Item = (&'a str, Option<KeyValue>)>,
{
    params
        .into_iter()
        .fold(CacheKey::new(prefix), |key, (name, value)| key.param(name, value))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_without_params_is_prefix() {
        assert_eq!(
            cache_key("brands", Vec::<(&str, Option<KeyValue>)>::new()),
            "brands"
        );
        assert_eq!(
            cache_key("brands", [("brand", None::<KeyValue>)]),
            "brands"
        );
    }

    #[test]
    fn test_key_shape() {
        let key = cache_key("sneakers", [("page", Some(KeyValue::Int(1)))]);
        let (prefix, digest) = key.split_once(':').unwrap();
        assert_eq!(prefix, "sneakers");
        assert_eq!(digest.len(), 16);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_key_matches_sha256_of_sorted_pairs() {
        // sha256("brand=Nike&page=1")
        let expected = format!("{:x}", Sha256::digest(b"brand=Nike&page=1"));
        let key = cache_key(
            "sneakers",
            [
                ("page", Some(KeyValue::Int(1))),
                ("brand", Some(KeyValue::from("Nike"))),
            ],
        );
        assert_eq!(key, format!("sneakers:{}", &expected[..16]));
    }

    #[test]
    fn test_param_order_does_not_matter() {
        let a = CacheKey::new("sneakers")
            .param("brand", Some("Nike"))
            .param("min_price", Some(100.0))
            .param("featured_only", Some(true));
        let b = CacheKey::new("sneakers")
            .param("featured_only", Some(true))
            .param("brand", Some("Nike"))
            .param("min_price", Some(100.0));
        assert_eq!(a.build(), b.build());
    }

    #[test]
    fn test_absent_params_are_dropped() {
        let with_none = CacheKey::new("sneakers")
            .param("brand", Some("Nike"))
            .param("category", None::<&str>);
        let without = CacheKey::new("sneakers").param("brand", Some("Nike"));
        assert_eq!(with_none.build(), without.build());
    }

    #[test]
    fn test_float_canonical_form() {
        let int_like = CacheKey::new("sneakers").param("min_price", Some(100.0));
        let precise = CacheKey::new("sneakers").param("min_price", Some(100.00001));
        assert_eq!(int_like.build(), precise.build());
        assert_eq!(KeyValue::Float(99.5).canonical(), "99.5000");
    }

    #[test]
    fn test_key_sensitivity() {
        let nike = CacheKey::new("sneakers").param("brand", Some("Nike")).build();
        let adidas = CacheKey::new("sneakers").param("brand", Some("Adidas")).build();
        let other_prefix = CacheKey::new("featured").param("brand", Some("Nike")).build();
        let flag_off = CacheKey::new("sneakers")
            .param("brand", Some("Nike"))
            .param("featured_only", Some(false))
            .build();

        assert_ne!(nike, adidas);
        assert_ne!(nike, other_prefix);
        assert_ne!(nike, flag_off);
    }

    #[test]
    fn test_string_values_are_case_sensitive() {
        let upper = CacheKey::new("sneakers").param("brand", Some("Nike")).build();
        let lower = CacheKey::new("sneakers").param("brand", Some("nike")).build();
        assert_ne!(upper, lower);
    }
}
