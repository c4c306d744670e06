//! Token extraction at the identity provider callback

use reqwest::Url;
use thiserror::Error;

/// Base used to resolve callback locations given as a bare path
const LOCATION_BASE: &str = "http://localhost/";

/// Errors raised while handling the sign-in callback
#[derive(Error, Debug)]
pub enum CallbackError {
    #[error("Invalid callback location: {0}")]
    InvalidLocation(String),

    #[error("Callback listener error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out waiting for the sign-in callback")]
    TimedOut,
}

/// Pull the bearer token out of a callback location.
///
/// `location` may be a full URL or a path with query and fragment. The
/// `token` query parameter wins; otherwise the fragment is read as a query
/// string and `access_token` is taken, then `token`. Empty values count as
/// missing.
pub fn extract_token(location: &str) -> Result<Option<String>, CallbackError> {
    let url = resolve(location)?;

    if let Some(token) = first_non_empty(&url, "token") {
        return Ok(Some(token));
    }

    let fragment = match url.fragment() {
        Some(fragment) if !fragment.is_empty() => fragment,
        _ => return Ok(None),
    };

    let mut fragment_params = url.clone();
    fragment_params.set_fragment(None);
    fragment_params.set_query(Some(fragment));

    Ok(first_non_empty(&fragment_params, "access_token")
        .or_else(|| first_non_empty(&fragment_params, "token")))
}

/// Path component of a callback location
pub fn location_path(location: &str) -> Result<String, CallbackError> {
    Ok(resolve(location)?.path().to_string())
}

fn resolve(location: &str) -> Result<Url, CallbackError> {
    let base = Url::parse(LOCATION_BASE)
        .map_err(|e| CallbackError::InvalidLocation(e.to_string()))?;
    base.join(location.trim())
        .map_err(|e| CallbackError::InvalidLocation(format!("{}: {}", location, e)))
}

/// First value of `name` in the query, like `URLSearchParams::get`
fn first_non_empty(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_token() {
        let token = extract_token("/auth/callback?token=abc123").unwrap();
        assert_eq!(token.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_fragment_access_token() {
        let token = extract_token("https://app.syra.example/auth/callback#access_token=xyz&token=other").unwrap();
        assert_eq!(token.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_fragment_token_fallback() {
        let token = extract_token("/auth/callback#token=frag").unwrap();
        assert_eq!(token.as_deref(), Some("frag"));
    }

    #[test]
    fn test_query_beats_fragment() {
        let token = extract_token("/auth/callback?token=query#access_token=frag").unwrap();
        assert_eq!(token.as_deref(), Some("query"));
    }

    #[test]
    fn test_empty_query_token_falls_through() {
        let token = extract_token("/auth/callback?token=#access_token=frag").unwrap();
        assert_eq!(token.as_deref(), Some("frag"));

        let token = extract_token("/auth/callback#access_token=&token=second").unwrap();
        assert_eq!(token.as_deref(), Some("second"));
    }

    #[test]
    fn test_percent_encoded_token() {
        let token = extract_token("/auth/callback?token=a%2Bb%3Dc").unwrap();
        assert_eq!(token.as_deref(), Some("a+b=c"));
    }

    #[test]
    fn test_no_token() {
        assert_eq!(extract_token("/auth/callback").unwrap(), None);
        assert_eq!(extract_token("/auth/callback?state=1#").unwrap(), None);
        assert_eq!(extract_token("/auth/callback#error=access_denied").unwrap(), None);
    }

    #[test]
    fn test_location_path() {
        assert_eq!(location_path("/auth/callback?token=1").unwrap(), "/auth/callback");
        assert_eq!(location_path("https://app.syra.example/").unwrap(), "/");
    }
}
