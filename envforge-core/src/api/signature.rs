//! Query-protocol request signing (HMAC-SHA256 over the canonical query).

use super::ApiCredentials;
use crate::constants;
use aws_lc_rs::hmac;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

// Unreserved characters are not escaped in the canonical query string.
const QUERY_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Build the full signed form body for one Query API call.
pub(crate) fn signed_query(
    credentials: &ApiCredentials,
    action: &str,
    params: &[(String, String)],
) -> Vec<(String, String)> {
    let mut query: Vec<(String, String)> = vec![
        ("Action".to_string(), action.to_string()),
        ("Version".to_string(), constants::API_VERSION.to_string()),
        (
            "AWSAccessKeyId".to_string(),
            credentials.access_key_id.clone(),
        ),
        (
            "Timestamp".to_string(),
            Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        ),
        ("SignatureVersion".to_string(), "2".to_string()),
        ("SignatureMethod".to_string(), "HmacSHA256".to_string()),
        ("ContentType".to_string(), "JSON".to_string()),
    ];
    query.extend(params.iter().cloned());

    let signature = sign(
        &credentials.secret_access_key,
        &credentials.endpoint,
        &query,
    );
    query.push(("Signature".to_string(), signature));
    query
}

fn sign(secret_key: &str, endpoint: &str, query: &[(String, String)]) -> String {
    let host = Url::parse(endpoint)
        .ok()
        .and_then(|url| url.host_str().map(str::to_owned))
        .unwrap_or_default();

    let mut sorted: Vec<&(String, String)> = query.iter().collect();
    sorted.sort();
    let canonical = sorted
        .iter()
        .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    let string_to_sign = format!("POST\n{host}\n/\n{canonical}");
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret_key.as_bytes());
    let tag = hmac::sign(&key, string_to_sign.as_bytes());
    STANDARD.encode(tag.as_ref())
}

fn encode(raw: &str) -> String {
    utf8_percent_encode(raw, QUERY_ENCODE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> ApiCredentials {
        ApiCredentials {
            access_key_id: "AKID".to_string(),
            secret_access_key: "secret".to_string(),
            endpoint: "https://envforge.us-east-1.cloudvine.io".to_string(),
        }
    }

    #[test]
    fn signed_query_carries_action_and_signature() {
        let query = signed_query(
            &credentials(),
            "CreateApplication",
            &[("ApplicationName".to_string(), "myapp".to_string())],
        );
        let keys: Vec<&str> = query.iter().map(|(key, _)| key.as_str()).collect();
        assert!(keys.contains(&"Action"));
        assert!(keys.contains(&"ApplicationName"));
        assert_eq!(query.last().map(|(key, _)| key.as_str()), Some("Signature"));
    }

    #[test]
    fn signature_is_deterministic_for_fixed_input() {
        let query = vec![
            ("Action".to_string(), "DescribeEnvironments".to_string()),
            ("Timestamp".to_string(), "2026-01-01T00:00:00.000Z".to_string()),
        ];
        let first = sign("secret", "https://envforge.us-east-1.cloudvine.io", &query);
        let second = sign("secret", "https://envforge.us-east-1.cloudvine.io", &query);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn encoding_escapes_reserved_characters() {
        assert_eq!(encode("a b/c"), "a%20b%2Fc");
        assert_eq!(encode("safe-chars_1.0~"), "safe-chars_1.0~");
    }
}
