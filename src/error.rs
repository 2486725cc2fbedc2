use std::{fmt, time::Duration};

use thiserror::Error;
use url::Url;

/// Which remote document an error concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    ModLinks,
    ApiLinks,
    Overlay,
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Document::ModLinks => "mod links",
            Document::ApiLinks => "API links",
            Document::Overlay => "localization overlay",
        })
    }
}

/// Which endpoint of an [`Endpoint`](crate::fetch::Endpoint) was being tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Primary,
    Fallback,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Attempt::Primary => "primary",
            Attempt::Fallback => "fallback",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("{0}")]
    Transport(String),
    #[error("server responded with HTTP {0}")]
    Status(u16),
    #[error("cancelled")]
    Cancelled,
}

/// Terminal failure of a fetch, reported for the last endpoint tried.
#[derive(Debug, Clone, Error)]
#[error("{attempt} request to {uri} failed: {failure}")]
pub struct FetchError {
    pub attempt: Attempt,
    pub uri: Url,
    pub failure: FetchFailure,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed {encoding} payload: {source}")]
    Decompress {
        encoding: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::de::DeError),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("mod '{name}' has an invalid version: {source}")]
    Version {
        name: String,
        #[source]
        source: crate::version::InvalidVersion,
    },
    #[error("'{name}' has no download link for {platform}")]
    MissingLink { name: String, platform: String },
}

/// Failure of a whole refresh cycle. No catalog is produced when this is returned.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("timed out fetching {document}: {source}")]
    FetchTimeout {
        document: Document,
        #[source]
        source: FetchError,
    },
    #[error("failed to fetch {document}: {source}")]
    FetchTransport {
        document: Document,
        #[source]
        source: FetchError,
    },
    #[error("failed to decode {document}: {source}")]
    Decode {
        document: Document,
        #[source]
        source: DecodeError,
    },
    #[error("failed to parse {document}: {source}")]
    Parse {
        document: Document,
        #[source]
        source: ParseError,
    },
    #[error("refresh cancelled")]
    Cancelled,
}

impl CatalogError {
    pub fn fetch(document: Document, source: FetchError) -> Self {
        if matches!(source.failure, FetchFailure::Cancelled) {
            CatalogError::Cancelled
        } else if matches!(source.failure, FetchFailure::Timeout(_)) {
            CatalogError::FetchTimeout { document, source }
        } else {
            CatalogError::FetchTransport { document, source }
        }
    }

    pub fn document(&self) -> Option<Document> {
        match self {
            CatalogError::FetchTimeout { document, .. }
            | CatalogError::FetchTransport { document, .. }
            | CatalogError::Decode { document, .. }
            | CatalogError::Parse { document, .. } => Some(*document),
            CatalogError::Cancelled => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, CatalogError::FetchTimeout { .. })
    }

    /// Short explanation suitable for showing to a user.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::FetchTimeout { document, .. } => {
                format!("Fetching the {document} timed out. Check your connection and try again.")
            }
            CatalogError::FetchTransport { document, source } => match &source.failure {
                FetchFailure::Status(code) => {
                    format!("The server returned an error (HTTP {code}) for the {document}.")
                }
                other => format!("Could not reach the server for the {document}: {other}"),
            },
            CatalogError::Decode { document, .. } | CatalogError::Parse { document, .. } => {
                format!("The {document} document is malformed.")
            }
            CatalogError::Cancelled => "The refresh was cancelled.".to_string(),
        }
    }
}
