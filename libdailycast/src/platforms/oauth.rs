//! OAuth 1.0a request signing (HMAC-SHA1)
//!
//! Only the parameters that take part in the signature are passed in: query
//! and form parameters. JSON and multipart bodies are never signed.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::distributions::Alphanumeric;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters stay literal, everything else is escaped
const RFC3986: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn encode(s: &str) -> String {
    utf8_percent_encode(s, RFC3986).to_string()
}

pub struct OAuth1Signer {
    consumer_key: SecretString,
    consumer_secret: SecretString,
    token: SecretString,
    token_secret: SecretString,
}

impl OAuth1Signer {
    pub fn new(
        consumer_key: SecretString,
        consumer_secret: SecretString,
        token: SecretString,
        token_secret: SecretString,
    ) -> Self {
        Self {
            consumer_key,
            consumer_secret,
            token,
            token_secret,
        }
    }

    /// `Authorization` header value for a request with a fresh nonce and timestamp
    pub fn authorization_header(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
    ) -> String {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let timestamp = chrono::Utc::now().timestamp();

        self.authorization_header_with(method, url, params, &nonce, timestamp)
    }

    fn authorization_header_with(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: i64,
    ) -> String {
        let timestamp = timestamp.to_string();
        let mut oauth_params = vec![
            ("oauth_consumer_key", self.consumer_key.expose_secret()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", self.token.expose_secret()),
            ("oauth_version", "1.0"),
        ];

        let mut all_params = params.to_vec();
        all_params.extend_from_slice(&oauth_params);
        let signature = self.signature(method, url, &all_params);
        oauth_params.push(("oauth_signature", signature.as_str()));

        let fields = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("OAuth {}", fields)
    }

    /// Base64 HMAC-SHA1 signature over the signature base string
    pub fn signature(&self, method: &str, url: &str, params: &[(&str, &str)]) -> String {
        let mut encoded: Vec<(String, String)> =
            params.iter().map(|(k, v)| (encode(k), encode(v))).collect();
        encoded.sort();

        let param_string = encoded
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let base = format!(
            "{}&{}&{}",
            method.to_uppercase(),
            encode(url),
            encode(&param_string)
        );
        let key = format!(
            "{}&{}",
            encode(self.consumer_secret.expose_secret()),
            encode(self.token_secret.expose_secret())
        );

        let mut mac =
            HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
        mac.update(base.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Worked example from Twitter's "Creating a signature" documentation
    const CONSUMER_KEY: &str = "xvz1evFS4wEEPTGEFPHBog";
    const CONSUMER_SECRET: &str = "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw";
    const TOKEN: &str = "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb";
    const TOKEN_SECRET: &str = "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE";
    const NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
    const TIMESTAMP: i64 = 1318622958;
    const URL: &str = "https://api.twitter.com/1.1/statuses/update.json";

    fn signer() -> OAuth1Signer {
        OAuth1Signer::new(
            SecretString::from(CONSUMER_KEY),
            SecretString::from(CONSUMER_SECRET),
            SecretString::from(TOKEN),
            SecretString::from(TOKEN_SECRET),
        )
    }

    const REQUEST_PARAMS: [(&str, &str); 2] = [
        ("include_entities", "true"),
        ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
    ];

    #[test]
    fn test_signature_matches_documented_example() {
        let timestamp = TIMESTAMP.to_string();
        let mut params = REQUEST_PARAMS.to_vec();
        params.extend_from_slice(&[
            ("oauth_consumer_key", CONSUMER_KEY),
            ("oauth_nonce", NONCE),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", TOKEN),
            ("oauth_version", "1.0"),
        ]);

        assert_eq!(
            signer().signature("post", URL, &params),
            "hCtSmYh+iHYCEqBWrE7C7hYmtUk="
        );
    }

    #[test]
    fn test_authorization_header_contains_encoded_signature() {
        let header =
            signer().authorization_header_with("POST", URL, &REQUEST_PARAMS, NONCE, TIMESTAMP);

        assert!(header.starts_with("OAuth "));
        assert!(header.contains(r#"oauth_signature="hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D""#));
        assert!(header.contains(r#"oauth_consumer_key="xvz1evFS4wEEPTGEFPHBog""#));
        assert!(header.contains(r#"oauth_version="1.0""#));
        // Request parameters are signed but not sent in the header
        assert!(!header.contains("include_entities"));
    }

    #[test]
    fn test_fresh_nonce_per_header() {
        let signer = signer();
        let a = signer.authorization_header("POST", URL, &[]);
        let b = signer.authorization_header("POST", URL, &[]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_encode_rfc3986() {
        assert_eq!(encode("a b+c/~-._!"), "a%20b%2Bc%2F~-._%21");
        assert_eq!(encode("é"), "%C3%A9");
    }
}
