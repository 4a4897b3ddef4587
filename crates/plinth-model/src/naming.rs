//! Naming convention translation between storage columns and attributes.
//!
//! Storage rows use snake_case column names; in-memory attributes may use
//! camelCase. The transform is stateless and allocates a fresh map per
//! call, so it is safe from any number of callers.
//!
//! The round trip `underscore(camelize(k)) == k` holds for keys written
//! consistently in one convention. Keys mixing conventions (e.g.
//! `HTTPStatus_code`) do not round-trip; that is a known limitation and
//! deliberately not special-cased.

use plinth_schema::Attributes;

/// Rewrites a storage key into attribute convention.
///
/// Tokens are split at non-alphanumeric separators; the first token is
/// lowercased and every following token capitalized. Keys without
/// separators pass through unchanged, so the transform is idempotent on
/// already-converted keys.
#[must_use]
pub fn camelize(key: &str) -> String {
    if !key.contains(|c: char| !c.is_alphanumeric()) {
        return String::from(key);
    }
    let mut tokens = key
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty());
    let Some(first) = tokens.next() else {
        return String::new();
    };
    let mut out = first.to_lowercase();
    for token in tokens {
        let mut chars = token.chars();
        if let Some(head) = chars.next() {
            out.extend(head.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out
}

/// Rewrites an attribute key into storage convention.
///
/// Every uppercase letter starts a new token, so consecutive uppercase
/// letters (single-letter tokens like `aBC`) split letter by letter.
/// Already-snake keys pass through unchanged.
#[must_use]
pub fn underscore(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev_alnum = false;
    for ch in key.chars() {
        if ch.is_uppercase() {
            if prev_alnum {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            prev_alnum = true;
        } else if ch.is_alphanumeric() {
            out.push(ch);
            prev_alnum = true;
        } else {
            out.push('_');
            prev_alnum = false;
        }
    }
    out
}

/// Rewrites every key of a storage row into attribute convention.
///
/// Values pass through unchanged; a fresh map is allocated.
#[must_use]
pub fn to_internal(row: &Attributes) -> Attributes {
    row.iter().map(|(k, v)| (camelize(k), v.clone())).collect()
}

/// Rewrites every key of an attribute map into storage convention.
#[must_use]
pub fn to_external(attrs: &Attributes) -> Attributes {
    attrs
        .iter()
        .map(|(k, v)| (underscore(k), v.clone()))
        .collect()
}

/// The naming policy of a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Naming {
    /// Attribute names equal column names; no translation.
    #[default]
    Preserve,
    /// camelCase attributes over snake_case columns.
    CamelCase,
}

impl Naming {
    /// Translates a storage row into attribute keys (the read path).
    #[must_use]
    pub fn parse(self, row: &Attributes) -> Attributes {
        match self {
            Self::Preserve => row.clone(),
            Self::CamelCase => to_internal(row),
        }
    }

    /// Translates attributes into storage column keys (the write path).
    #[must_use]
    pub fn format(self, attrs: &Attributes) -> Attributes {
        match self {
            Self::Preserve => attrs.clone(),
            Self::CamelCase => to_external(attrs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plinth_schema::{attrs, Value};

    #[test]
    fn test_camelize() {
        assert_eq!(camelize("first_name"), "firstName");
        assert_eq!(camelize("created_at"), "createdAt");
        assert_eq!(camelize("id"), "id");
        assert_eq!(camelize("a_b_c"), "aBC");
    }

    #[test]
    fn test_camelize_idempotent_without_separators() {
        assert_eq!(camelize("firstName"), "firstName");
        assert_eq!(camelize(&camelize("first_name")), "firstName");
    }

    #[test]
    fn test_underscore() {
        assert_eq!(underscore("firstName"), "first_name");
        assert_eq!(underscore("createdAt"), "created_at");
        assert_eq!(underscore("id"), "id");
        assert_eq!(underscore("first_name"), "first_name");
        // consecutive uppercase letters are single-letter tokens
        assert_eq!(underscore("aBC"), "a_b_c");
    }

    #[test]
    fn test_round_trip_consistent_keys() {
        for key in ["first_name", "last_name", "id", "field2_name", "a_b_c"] {
            assert_eq!(underscore(&camelize(key)), key);
        }
    }

    #[test]
    fn test_map_transforms_preserve_values() {
        let row = attrs([("first_name", "hello"), ("last_name", "world")]);
        let parsed = Naming::CamelCase.parse(&row);
        assert_eq!(
            parsed.get("firstName"),
            Some(&Value::Text(String::from("hello")))
        );
        assert_eq!(Naming::CamelCase.format(&parsed), row);
    }

    #[test]
    fn test_preserve_is_identity() {
        let row = attrs([("first_name", "hello")]);
        assert_eq!(Naming::Preserve.parse(&row), row);
        assert_eq!(Naming::Preserve.format(&row), row);
    }
}
