//! OAuth 1.0 request signing (HMAC-SHA1, RFC 5849).

use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use oauth2::CsrfToken;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha1::Sha1;
use std::collections::HashMap;
use time::OffsetDateTime;
use url::Url;

use super::error::OAuthAuthenticationError;

type HmacSha1 = Hmac<Sha1>;

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const OAUTH_VERSION: &str = "1.0";

// RFC 3986 unreserved characters stay as they are
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

/// Protocol parameters of a single signed request.
#[derive(Debug, Clone)]
pub struct OAuthParameters {
    pub consumer_key: String,
    pub nonce: String,
    pub timestamp: String,
    pub token: Option<String>,
    pub callback: Option<String>,
    pub verifier: Option<String>,
}

impl OAuthParameters {
    /// Fresh parameters with a random nonce and the current timestamp.
    pub fn new(consumer_key: &str) -> Self {
        Self {
            consumer_key: consumer_key.to_string(),
            nonce: CsrfToken::new_random().secret().to_string(),
            timestamp: OffsetDateTime::now_utc().unix_timestamp().to_string(),
            token: None,
            callback: None,
            verifier: None,
        }
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn with_callback(mut self, callback: &str) -> Self {
        self.callback = Some(callback.to_string());
        self
    }

    pub fn with_verifier(mut self, verifier: &str) -> Self {
        self.verifier = Some(verifier.to_string());
        self
    }

    fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("oauth_consumer_key".to_string(), self.consumer_key.clone()),
            ("oauth_nonce".to_string(), self.nonce.clone()),
            ("oauth_signature_method".to_string(), SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp".to_string(), self.timestamp.clone()),
            ("oauth_version".to_string(), OAUTH_VERSION.to_string()),
        ];
        if let Some(token) = &self.token {
            pairs.push(("oauth_token".to_string(), token.clone()));
        }
        if let Some(callback) = &self.callback {
            pairs.push(("oauth_callback".to_string(), callback.clone()));
        }
        if let Some(verifier) = &self.verifier {
            pairs.push(("oauth_verifier".to_string(), verifier.clone()));
        }
        pairs
    }
}

/// Scheme, authority and path of `url`, without query or fragment.
/// Default ports are dropped by the `url` parser already.
pub fn base_string_uri(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, url.path()),
        None => format!("{}://{}{}", url.scheme(), host, url.path()),
    }
}

pub fn signature_base_string(method: &str, url: &Url, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(&base_string_uri(url)),
        encode(&normalized)
    )
}

pub fn sign(
    base_string: &str,
    consumer_secret: &str,
    token_secret: Option<&str>,
) -> Result<String, OAuthAuthenticationError> {
    let key = format!(
        "{}&{}",
        encode(consumer_secret),
        encode(token_secret.unwrap_or_default())
    );
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| OAuthAuthenticationError::Signing(e.to_string()))?;
    mac.update(base_string.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Builds the `Authorization` header value for a request.
///
/// `request_params` must hold every non-oauth parameter of the request
/// (query and form body); the query part of `url` itself is ignored.
pub fn authorization_header(
    method: &str,
    url: &Url,
    request_params: &HashMap<String, String>,
    oauth: &OAuthParameters,
    consumer_secret: &str,
    token_secret: Option<&str>,
) -> Result<String, OAuthAuthenticationError> {
    let mut oauth_pairs = oauth.pairs();

    let mut all_pairs: Vec<(String, String)> = request_params
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    all_pairs.extend(oauth_pairs.iter().cloned());

    let base_string = signature_base_string(method, url, &all_pairs);
    let signature = sign(&base_string, consumer_secret, token_secret)?;

    oauth_pairs.push(("oauth_signature".to_string(), signature));
    oauth_pairs.sort();

    let rendered = oauth_pairs
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!("OAuth {}", rendered))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_params() -> Vec<(String, String)> {
        [
            ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
            ("include_entities", "true"),
            ("oauth_consumer_key", "xvz1evFS4wEEPTGEFPHBog"),
            ("oauth_nonce", "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg"),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", "1318622958"),
            ("oauth_token", "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb"),
            ("oauth_version", "1.0"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_encode_reserved_characters() {
        assert_eq!(encode("a b+c/d~e_f.g-h"), "a%20b%2Bc%2Fd~e_f.g-h");
        assert_eq!(encode("!*'()"), "%21%2A%27%28%29");
        assert_eq!(encode("é"), "%C3%A9");
    }

    #[test]
    fn test_base_string_uri() {
        let url = Url::parse("HTTP://Example.COM:80/r%20v/X?id=123").unwrap();
        assert_eq!(base_string_uri(&url), "http://example.com/r%20v/X");

        let url = Url::parse("https://www.example.net:8080/?q=1").unwrap();
        assert_eq!(base_string_uri(&url), "https://www.example.net:8080/");
    }

    #[test]
    fn test_signature_base_string_reference() {
        let url = Url::parse("https://api.twitter.com/1/statuses/update.json").unwrap();
        let base = signature_base_string("post", &url, &reference_params());
        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.twitter.com%2F1%2Fstatuses%2Fupdate.json&include_entities%3Dtrue%26oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog%26oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1318622958%26oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb%26oauth_version%3D1.0%26status%3DHello%2520Ladies%2520%252B%2520Gentlemen%252C%2520a%2520signed%2520OAuth%2520request%2521"
        );
    }

    #[test]
    fn test_sign_reference() {
        let url = Url::parse("https://api.twitter.com/1/statuses/update.json").unwrap();
        let base = signature_base_string("POST", &url, &reference_params());
        let signature = sign(
            &base,
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            Some("LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE"),
        )
        .unwrap();
        assert_eq!(signature, "tnnArxj06cWHq44gCs1OSKk/jLY=");
    }

    #[test]
    fn test_authorization_header_reference() {
        let url = Url::parse("https://api.twitter.com/1/statuses/update.json").unwrap();
        let mut request_params = HashMap::new();
        request_params.insert(
            "status".to_string(),
            "Hello Ladies + Gentlemen, a signed OAuth request!".to_string(),
        );
        request_params.insert("include_entities".to_string(), "true".to_string());

        let oauth = OAuthParameters {
            consumer_key: "xvz1evFS4wEEPTGEFPHBog".to_string(),
            nonce: "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg".to_string(),
            timestamp: "1318622958".to_string(),
            token: None,
            callback: None,
            verifier: None,
        }
        .with_token("370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb");

        let header = authorization_header(
            "POST",
            &url,
            &request_params,
            &oauth,
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            Some("LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE"),
        )
        .unwrap();

        assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\", "));
        assert!(header.contains("oauth_signature=\"tnnArxj06cWHq44gCs1OSKk%2FjLY%3D\""));
        assert!(header.ends_with("oauth_version=\"1.0\""));
        assert!(!header.contains("status"));
    }

    #[test]
    fn test_fresh_parameters_are_unique() {
        let a = OAuthParameters::new("key");
        let b = OAuthParameters::new("key");
        assert_ne!(a.nonce, b.nonce);
        assert!(a.timestamp.parse::<i64>().unwrap() > 0);
    }
}
