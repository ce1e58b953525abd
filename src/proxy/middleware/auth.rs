// Credential extraction
//
// The relay never validates keys; it only requires that one is present and
// forwards it unchanged to the upstream.
use axum::http::{header, HeaderMap};

use crate::proxy::error::RelayError;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field(
                "api_key",
                &crate::proxy::common::common_utils::mask_key(&self.api_key),
            )
            .finish()
    }
}

/// 从请求中提取 API Key
///
/// Order: `Authorization: Bearer`, `x-goog-api-key`, `x-api-key`, then the
/// `key` query parameter (Gemini clients).
pub fn extract_api_key(headers: &HeaderMap, query: Option<&str>) -> Option<String> {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|s| strip_bearer(s.trim()))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| header_value("x-goog-api-key"))
        .or_else(|| header_value("x-api-key"))
        .or_else(|| query.and_then(query_key))
}

/// Drop a case-insensitive `Bearer` scheme; other values are taken as the raw key
fn strip_bearer(value: &str) -> &str {
    const SCHEME: &str = "bearer";
    match value.get(..SCHEME.len()) {
        Some(scheme) if scheme.eq_ignore_ascii_case(SCHEME) => {
            let rest = &value[SCHEME.len()..];
            if rest.is_empty() {
                ""
            } else if rest.starts_with(char::is_whitespace) {
                rest.trim()
            } else {
                value
            }
        }
        _ => value,
    }
}

fn query_key(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "key")
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve credentials from the request, falling back to the configured default key.
pub fn extract_credentials(
    headers: &HeaderMap,
    query: Option<&str>,
    default_key: Option<&str>,
) -> Result<Credentials, RelayError> {
    extract_api_key(headers, query)
        .or_else(|| {
            default_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
        })
        .map(|api_key| Credentials { api_key })
        .ok_or(RelayError::MissingCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use proptest::prelude::*;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_str(v).unwrap());
        }
        map
    }

    #[test]
    fn test_bearer_token() {
        let h = headers(&[("authorization", "Bearer sk-abc")]);
        assert_eq!(extract_api_key(&h, None).as_deref(), Some("sk-abc"));
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        for value in ["bearer sk-abc", "BEARER sk-abc", "Bearer   sk-abc"] {
            let h = headers(&[("authorization", value)]);
            assert_eq!(extract_api_key(&h, None).as_deref(), Some("sk-abc"));
        }

        // A key that merely starts with "bearer" is kept whole
        let h = headers(&[("authorization", "bearertoken")]);
        assert_eq!(extract_api_key(&h, None).as_deref(), Some("bearertoken"));
    }

    #[test]
    fn test_raw_authorization_value() {
        let h = headers(&[("authorization", "sk-raw")]);
        assert_eq!(extract_api_key(&h, None).as_deref(), Some("sk-raw"));
    }

    #[test]
    fn test_alternate_headers() {
        let h = headers(&[("x-goog-api-key", "goog-key")]);
        assert_eq!(extract_api_key(&h, None).as_deref(), Some("goog-key"));

        let h = headers(&[("x-api-key", "x-key")]);
        assert_eq!(extract_api_key(&h, None).as_deref(), Some("x-key"));

        // Authorization wins over alternates
        let h = headers(&[("authorization", "Bearer a"), ("x-goog-api-key", "b")]);
        assert_eq!(extract_api_key(&h, None).as_deref(), Some("a"));
    }

    #[test]
    fn test_query_key() {
        let h = HeaderMap::new();
        assert_eq!(
            extract_api_key(&h, Some("alt=sse&key=q-key")).as_deref(),
            Some("q-key")
        );
        assert_eq!(extract_api_key(&h, Some("alt=sse")), None);
    }

    #[test]
    fn test_empty_bearer_is_missing() {
        let h = headers(&[("authorization", "Bearer ")]);
        assert!(matches!(
            extract_credentials(&h, None, None),
            Err(RelayError::MissingCredentials)
        ));
    }

    #[test]
    fn test_default_key_fallback() {
        let h = HeaderMap::new();
        let creds = extract_credentials(&h, None, Some("sk-default")).unwrap();
        assert_eq!(creds.api_key, "sk-default");

        assert!(matches!(
            extract_credentials(&h, None, Some("  ")),
            Err(RelayError::MissingCredentials)
        ));
    }

    #[test]
    fn test_debug_masks_key() {
        let creds = Credentials { api_key: "sk-or-v1-secretsecret".into() };
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("secretsecret"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Whatever key the caller sends is forwarded unchanged.
        #[test]
        fn prop_bearer_key_forwarded_unchanged(key in "[A-Za-z0-9_-]{1,64}") {
            let value = format!("Bearer {}", key);
            let h = headers(&[("authorization", value.as_str())]);
            let creds = extract_credentials(&h, None, Some("default")).unwrap();
            prop_assert_eq!(creds.api_key, key);
        }
    }
}
