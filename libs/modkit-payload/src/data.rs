use std::borrow::Cow;
use std::fmt;
use std::io;

use bytes::Bytes;

use crate::media_type::MediaType;

/// Read-only payload with an optional media type.
///
/// Only [`TypedData::content_type`] and [`TypedData::buffer`] are required;
/// the other accessors are derived from the buffer.
pub trait TypedData: Send + Sync {
    fn content_type(&self) -> Option<&MediaType>;

    /// Shared view of the payload bytes.
    fn buffer(&self) -> Bytes;

    /// Owned copy of the payload bytes.
    fn bytes(&self) -> Vec<u8> {
        self.buffer().to_vec()
    }

    /// Payload decoded with the charset of [`TypedData::content_type`].
    ///
    /// UTF-8 is assumed when no charset is advertised. Single-byte charsets
    /// (`us-ascii`, `iso-8859-1`, `latin1`) map each byte to the code point of
    /// the same value. Malformed UTF-8 is replaced, never rejected.
    fn text(&self) -> String {
        let charset = self.content_type().and_then(MediaType::charset);
        decode(&self.buffer(), charset).into_owned()
    }

    /// Writes the payload into `out` without flushing it.
    ///
    /// # Errors
    /// Propagates any error returned by `out`.
    fn write_to(&self, out: &mut dyn io::Write) -> io::Result<()> {
        out.write_all(&self.buffer())
    }

    /// Reader positioned at the start of the payload.
    fn reader(&self) -> Box<dyn io::Read + Send> {
        Box::new(io::Cursor::new(self.buffer()))
    }
}

fn decode<'a>(data: &'a [u8], charset: Option<&str>) -> Cow<'a, str> {
    let Some(charset) = charset else {
        return String::from_utf8_lossy(data);
    };
    let normalized = charset.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "utf-8" | "utf8" => String::from_utf8_lossy(data),
        "us-ascii" | "ascii" | "iso-8859-1" | "iso_8859-1" | "latin1" => {
            Cow::Owned(data.iter().copied().map(char::from).collect())
        }
        _ => {
            tracing::debug!(charset, "Unsupported payload charset, decoding as UTF-8");
            String::from_utf8_lossy(data)
        }
    }
}

/// In-memory payload backed by [`Bytes`].
#[derive(Clone, Default)]
pub struct ByteData {
    content_type: Option<MediaType>,
    data: Bytes,
}

impl ByteData {
    /// Untyped payload.
    #[must_use]
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            content_type: None,
            data: data.into(),
        }
    }

    /// `text/plain; charset=utf-8` payload.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(text.into()).with_content_type(MediaType::text_plain())
    }

    /// `application/json` payload.
    #[must_use]
    pub fn json(data: impl Into<Bytes>) -> Self {
        Self::new(data).with_content_type(MediaType::json())
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: MediaType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl TypedData for ByteData {
    fn content_type(&self) -> Option<&MediaType> {
        self.content_type.as_ref()
    }

    fn buffer(&self) -> Bytes {
        self.data.clone()
    }
}

impl fmt::Debug for ByteData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteData")
            .field("content_type", &self.content_type)
            .field("len", &self.data.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io::Read;
    use tracing_test::traced_test;

    fn typed(data: &'static [u8], content_type: &str) -> ByteData {
        ByteData::new(data).with_content_type(content_type.parse().unwrap())
    }

    #[test]
    fn untyped_payload_decodes_as_utf8() {
        let data = ByteData::new(String::from("h\u{e9}llo"));
        assert!(data.content_type().is_none());
        assert_eq!(data.text(), "h\u{e9}llo");
    }

    #[test]
    fn latin1_bytes_map_to_code_points() {
        let data = typed(b"caf\xe9", "text/plain; charset=ISO-8859-1");
        assert_eq!(data.text(), "caf\u{e9}");

        let data = typed(b"caf\xe9", "text/plain; charset=latin1");
        assert_eq!(data.text(), "caf\u{e9}");
    }

    #[test]
    fn malformed_utf8_is_replaced() {
        let data = typed(b"ok\xff", "text/plain; charset=utf-8");
        assert_eq!(data.text(), "ok\u{fffd}");
    }

    #[test]
    #[traced_test]
    fn unknown_charset_falls_back_to_utf8() {
        let data = typed(b"plain", "text/plain; charset=koi8-r");
        assert_eq!(data.text(), "plain");
        assert!(logs_contain("Unsupported payload charset"));
    }

    #[test]
    fn buffer_shares_storage() {
        let data = ByteData::json(r#"{"a":1}"#);
        let first = data.buffer();
        let second = data.buffer();
        assert_eq!(first.as_ptr(), second.as_ptr());
        assert_eq!(data.bytes(), br#"{"a":1}"#);
        assert_eq!(data.len(), 7);
    }

    #[test]
    fn write_to_and_reader_see_the_same_bytes() {
        let data = ByteData::from_text("stream me");

        let mut written = Vec::new();
        data.write_to(&mut written).unwrap();

        let mut read = Vec::new();
        data.reader().read_to_end(&mut read).unwrap();

        assert_eq!(written, b"stream me");
        assert_eq!(read, written);
    }

    #[test]
    fn empty_payload() {
        let data = ByteData::default();
        assert!(data.is_empty());
        assert_eq!(data.text(), "");
        assert!(data.bytes().is_empty());
    }
}
