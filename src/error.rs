use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// A feed could not be retrieved while serving a cache lookup.
    /// Any previously cached articles for the feed are left in place.
    #[error("{description}: {source}")]
    Fetch {
        description: String,
        #[source]
        source: Box<Error>,
    },
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    pub fn fetch(description: impl Into<String>, source: Error) -> Self {
        Error::Fetch {
            description: description.into(),
            source: Box::new(source),
        }
    }

    pub fn is_temporary(&self) -> bool {
        match self {
            Error::HttpError(_) | Error::Timeout(_) | Error::Io(_) => true,
            Error::Fetch { source, .. } => source.is_temporary(),
            _ => false,
        }
    }

    pub fn is_user_error(&self) -> bool {
        match self {
            Error::InvalidUrl(_) | Error::Config(_) | Error::NotFound(_) | Error::AlreadyExists(_) => true,
            Error::Fetch { source, .. } => source.is_user_error(),
            _ => false,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Error::FeedParse(_) => "FEED_PARSE",
            Error::HttpError(_) => "HTTP_ERROR",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::Timeout(_) => "TIMEOUT",
            Error::Io(_) => "IO_ERROR",
            Error::Serialization(_) => "SERIALIZATION",
            Error::Config(_) => "CONFIG",
            Error::Storage(_) => "STORAGE",
            Error::NotFound(_) => "NOT_FOUND",
            Error::AlreadyExists(_) => "ALREADY_EXISTS",
            Error::Fetch { .. } => "FETCH",
        }
    }
}
