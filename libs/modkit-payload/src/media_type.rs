use std::fmt;
use std::str::FromStr;

use mime::Mime;

use crate::error::PayloadError;

/// Parsed media type such as `text/plain; charset=utf-8`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MediaType(Mime);

impl MediaType {
    #[must_use]
    pub fn from_mime(mime: Mime) -> Self {
        Self(mime)
    }

    /// `text/plain; charset=utf-8`
    #[must_use]
    pub fn text_plain() -> Self {
        Self(mime::TEXT_PLAIN_UTF_8)
    }

    /// `application/json`
    #[must_use]
    pub fn json() -> Self {
        Self(mime::APPLICATION_JSON)
    }

    /// `application/octet-stream`
    #[must_use]
    pub fn octet_stream() -> Self {
        Self(mime::APPLICATION_OCTET_STREAM)
    }

    #[must_use]
    pub fn as_mime(&self) -> &Mime {
        &self.0
    }

    /// Type and subtype without parameters, e.g. `text/plain`.
    #[must_use]
    pub fn essence(&self) -> &str {
        self.0.essence_str()
    }

    /// The `charset` parameter, if present.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.0.get_param(mime::CHARSET).map(|name| name.as_str())
    }

    /// `application/json` or any `+json` structured syntax.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.0.subtype() == mime::JSON || self.0.suffix() == Some(mime::JSON)
    }

    /// `text/*` or JSON.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.0.type_() == mime::TEXT || self.is_json()
    }
}

impl FromStr for MediaType {
    type Err = PayloadError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .parse::<Mime>()
            .map(Self)
            .map_err(|source| PayloadError::InvalidMediaType {
                value: value.to_owned(),
                source,
            })
    }
}

impl From<Mime> for MediaType {
    fn from(mime: Mime) -> Self {
        Self(mime)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MediaType({})", self.0)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn parses_charset_parameter() {
        let media: MediaType = "text/html; charset=ISO-8859-1".parse().unwrap();
        assert_eq!(media.essence(), "text/html");
        assert!(media.charset().unwrap().eq_ignore_ascii_case("iso-8859-1"));
        assert!(media.is_text());
        assert!(!media.is_json());
    }

    #[test]
    fn json_and_json_suffix_are_text() {
        assert!(MediaType::json().is_json());
        assert!(MediaType::json().is_text());

        let problem: MediaType = "application/problem+json".parse().unwrap();
        assert!(problem.is_json());
        assert!(problem.charset().is_none());
    }

    #[test]
    fn binary_types_are_not_text() {
        assert!(!MediaType::octet_stream().is_text());
        let png: MediaType = "image/png".parse().unwrap();
        assert!(!png.is_text());
    }

    #[test]
    fn invalid_value_is_rejected() {
        let err = "not a media type".parse::<MediaType>().unwrap_err();
        match err {
            PayloadError::InvalidMediaType { value, .. } => assert_eq!(value, "not a media type"),
        }
    }

    #[test]
    fn display_round_trips_through_parse() {
        let media = MediaType::text_plain();
        let reparsed: MediaType = media.to_string().parse().unwrap();
        assert_eq!(media, reparsed);
    }
}
