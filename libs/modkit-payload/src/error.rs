#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("invalid media type '{value}'")]
    InvalidMediaType {
        value: String,
        #[source]
        source: mime::FromStrError,
    },
}
