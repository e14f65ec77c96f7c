//! Passage URL construction and origin checks.

use crate::config::PlanConfig;
use crate::error::{Error, Result};
use ::url::Url;

/// Hosts passages may be fetched from.
pub const ALLOWED_HOSTS: &[&str] = &["www.biblegateway.com", "biblegateway.com"];

/// Appends the search query, version and print layout to the configured base.
///
/// The base is used verbatim, so a custom endpoint is not validated here;
/// [`validate_url`] runs before anything is fetched.
///
/// # Example
///
/// ```
/// use bibleurl::config::PlanConfig;
/// use bibleurl::url::build_passage_url;
///
/// let url = build_passage_url("Genesis 1, Exodus 1", "NIV", &PlanConfig::default());
/// assert_eq!(
///     url,
///     "https://www.biblegateway.com/passage/?search=Genesis%201%2C%20Exodus%201&version=NIV&interface=print"
/// );
/// ```
pub fn build_passage_url(search: &str, version: &str, config: &PlanConfig) -> String {
    format!(
        "{}search={}&version={}&interface=print",
        config.base_url,
        urlencoding::encode(search),
        urlencoding::encode(version)
    )
}

/// Checks that `url` is https and points at one of `allowed_hosts`.
pub fn validate_url(url: &str, allowed_hosts: &[&str]) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|_| Error::InvalidUrl(url.to_string()))?;

    if parsed.scheme() != "https" {
        return Err(Error::InsecureScheme {
            scheme: parsed.scheme().to_string(),
            url: url.to_string(),
        });
    }

    let host = parsed.host_str().unwrap_or_default();
    if !allowed_hosts.contains(&host) {
        return Err(Error::HostNotAllowed {
            host: host.to_string(),
            allowed: allowed_hosts.join(", "),
        });
    }

    Ok(parsed)
}

/// Like [`validate_url`], for a base that query parameters get appended to.
///
/// A fragment would swallow everything appended after it, so one is rejected.
pub fn validate_base_url(base: &str, allowed_hosts: &[&str]) -> Result<Url> {
    let parsed = validate_url(base, allowed_hosts)?;
    if parsed.fragment().is_some() {
        return Err(Error::InvalidUrl(base.to_string()));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_default_url() {
        let url = build_passage_url("Genesis 1-3, Matthew 1, Acts 1", "ESV", &PlanConfig::default());
        assert_eq!(
            url,
            "https://www.biblegateway.com/passage/?search=Genesis%201-3%2C%20Matthew%201%2C%20Acts%201&version=ESV&interface=print"
        );
    }

    #[test]
    fn test_build_encodes_special_characters() {
        let url = build_passage_url("Song of Songs 1", "NIV&x=1", &PlanConfig::default());
        assert!(url.contains("search=Song%20of%20Songs%201"));
        assert!(url.contains("version=NIV%26x%3D1"));
    }

    #[test]
    fn test_build_custom_base_not_validated() {
        let config = PlanConfig {
            base_url: "https://custom.url/?".to_string(),
            ..PlanConfig::default()
        };
        assert_eq!(
            build_passage_url("John 3", "KJV", &config),
            "https://custom.url/?search=John%203&version=KJV&interface=print"
        );
    }

    #[test]
    fn test_validate_accepts_allowed_hosts() {
        assert!(validate_url("https://www.biblegateway.com/passage/?search=John%203", ALLOWED_HOSTS).is_ok());
        assert!(validate_url("https://biblegateway.com/passage/", ALLOWED_HOSTS).is_ok());
        assert!(validate_url("https://WWW.BibleGateway.com/passage/", ALLOWED_HOSTS).is_ok());
    }

    #[test]
    fn test_validate_rejects_http() {
        let err = validate_url("http://www.biblegateway.com/passage/", ALLOWED_HOSTS).unwrap_err();
        assert!(matches!(err, Error::InsecureScheme { ref scheme, .. } if scheme == "http"));
        assert!(err.to_string().contains("must use HTTPS"));
    }

    #[test]
    fn test_validate_rejects_other_hosts() {
        for url in [
            "https://evil.com/",
            "https://127.0.0.1/admin",
            "https://169.254.169.254/latest/meta-data/",
            "https://www.biblegateway.com.evil.com/",
            "https://localhost/",
        ] {
            let err = validate_url(url, ALLOWED_HOSTS).unwrap_err();
            assert!(matches!(err, Error::HostNotAllowed { .. }), "{url}");
        }
        let err = validate_url("https://evil.com/", ALLOWED_HOSTS).unwrap_err();
        assert!(err.to_string().contains("www.biblegateway.com, biblegateway.com"));
    }

    #[test]
    fn test_validate_rejects_garbage() {
        assert!(matches!(validate_url("not a url", ALLOWED_HOSTS), Err(Error::InvalidUrl(_))));
        assert!(matches!(validate_url("", ALLOWED_HOSTS), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_custom_allowlist() {
        assert!(validate_url("https://custom.url/?", &["custom.url"]).is_ok());
        assert!(validate_url("https://www.biblegateway.com/", &["custom.url"]).is_err());
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("https://www.biblegateway.com/passage/?", ALLOWED_HOSTS).is_ok());
        assert!(validate_base_url("https://www.biblegateway.com/passage/#x", ALLOWED_HOSTS).is_err());
        assert!(validate_base_url("ftp://www.biblegateway.com/", ALLOWED_HOSTS).is_err());
    }
}
