//! Validated listing location.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::InvalidLocation;

/// Absolute http(s) URL with a host.
///
/// Constructed only through [`Location::parse`], so holding one means the
/// input was checked before any I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location(Url);

impl Location {
    pub fn parse(input: &str) -> Result<Self, InvalidLocation> {
        let trimmed = input.trim();
        let invalid = |reason: String| InvalidLocation {
            input: input.to_string(),
            reason,
        };

        if trimmed.is_empty() {
            return Err(invalid("location is empty".into()));
        }

        let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
        }

        match url.host_str() {
            Some(host) if !host.is_empty() => Ok(Self(url)),
            _ => Err(invalid("URL has no host".into())),
        }
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for Location {
    type Err = InvalidLocation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_absolute_http_urls() {
        let location = Location::parse("https://www.yachtworld.com/yacht/2015-beneteau-49/").unwrap();
        assert_eq!(location.as_url().host_str(), Some("www.yachtworld.com"));

        assert!(Location::parse("http://example.com").is_ok());
        assert!(Location::parse("  https://example.com/boat  ").is_ok());
    }

    #[test]
    fn test_rejects_relative_and_hostless_input() {
        for input in ["", "   ", "/yacht/123", "www.example.com/boat", "https://"] {
            let err = Location::parse(input).unwrap_err();
            assert_eq!(err.input, input, "input should be preserved");
        }
    }

    #[test]
    fn test_rejects_non_http_schemes() {
        for input in ["ftp://example.com/boat", "file:///etc/passwd", "mailto:sales@example.com"] {
            assert!(Location::parse(input).is_err(), "{} should be rejected", input);
        }
    }

    #[test]
    fn test_from_str() {
        let location: Location = "https://example.com/a?b=1".parse().unwrap();
        assert_eq!(location.to_string(), "https://example.com/a?b=1");
    }
}
