//! Error type definitions for the EPG aggregator

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Feed fetching or parsing errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Source registry resolution errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Operation already in progress errors
    #[error("Operation already in progress: {operation_type} on {resource}")]
    OperationInProgress { operation_type: String, resource: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failures local to a single feed.
///
/// `Http`, `Transport` and `Timeout` are transport failures, `Parse` is a
/// parse failure. None of them abort the refresh cycle they occur in.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Non-success HTTP status from the feed host
    #[error("HTTP error: {status} {message} - URL: {url}")]
    Http { status: u16, url: String, message: String },

    /// Connection or body transfer failure
    #[error("Transport error: {url} - {message}")]
    Transport { url: String, message: String },

    /// Request exceeded the configured timeout
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Compressed body could not be decoded
    #[error("Decompression failed: {url} - {message}")]
    Decompression { url: String, message: String },

    /// Body was fetched but is not a valid XMLTV document
    #[error("Parse error: {url} - {source}")]
    Parse { url: String, source: ParseError },
}

/// Structural XMLTV parse errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Document has no root element at all
    #[error("document has no root element")]
    MissingRoot,

    /// Root element is not `<tv>`
    #[error("unexpected root element <{found}>, expected <tv>")]
    UnexpectedRoot { found: String },

    /// Malformed XML reported by the reader
    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    /// Element name, text or attribute is not valid UTF-8
    #[error("invalid UTF-8: {message}")]
    InvalidUtf8 { message: String },
}

/// Errors raised while building the source list from the country table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Country name could not be resolved to an ISO-2 code
    #[error("Unable to detect country code for {country}")]
    UnknownCountry { country: String },

    /// Feed URL is not an absolute http(s) URL
    #[error("Invalid feed URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an operation in progress error
    pub fn operation_in_progress<O: Into<String>, R: Into<String>>(
        operation_type: O,
        resource: R,
    ) -> Self {
        Self::OperationInProgress {
            operation_type: operation_type.into(),
            resource: resource.into(),
        }
    }
}

impl SourceError {
    /// Create a transport error
    pub fn transport<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Wrap a parse error with the feed it came from
    pub fn parse<U: Into<String>>(url: U, source: ParseError) -> Self {
        Self::Parse {
            url: url.into(),
            source,
        }
    }

    /// Short failure class used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "parse",
            Self::Http { .. } | Self::Transport { .. } | Self::Timeout { .. } => "transport",
            Self::Decompression { .. } => "decompression",
        }
    }

    /// Whether the feed host answered with a non-success status
    pub fn is_http_status(&self) -> bool {
        matches!(self, Self::Http { .. })
    }
}
