use thiserror::Error;

/// Caller-facing message prefixes for each failure kind.
pub mod messages {
    pub const FETCH_PROPERTIES: &str = "Failed to fetch properties";
    pub const FETCH_PROPERTY: &str = "Failed to fetch property";
    pub const CREATE_PROPERTY: &str = "Failed to create property";
    pub const DELETE_PROPERTY: &str = "Failed to delete property";
    pub const WEATHER_API: &str = "Failed to fetch weather data";
    pub const UNKNOWN: &str = "An unknown error occurred";
}

/// Failure reported by one of the external gateways (store or weather provider).
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{0}")]
    Transport(reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("{message}")]
    Store {
        code: Option<String>,
        message: String,
    },

    #[error("{info}")]
    Provider { code: Option<i64>, info: String },

    #[error("Invalid response body: {0}")]
    Decode(serde_json::Error),

    #[error("Expected at most {expected} row(s), store returned {actual}")]
    UnexpectedRows { expected: usize, actual: usize },

    #[error("{}", messages::UNKNOWN)]
    Unknown,
}

// Request URLs carry the weather access key; never keep them in the error.
impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.without_url())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err)
    }
}

impl GatewayError {
    /// Build a store error, falling back to `Unknown` when the store sent no message.
    pub fn store(code: Option<String>, message: Option<String>) -> Self {
        match message.filter(|m| !m.trim().is_empty()) {
            Some(message) => GatewayError::Store { code, message },
            None => GatewayError::Unknown,
        }
    }

    /// Build a provider error; an error object without `info` still counts as a provider error.
    pub fn provider(code: Option<i64>, info: Option<String>) -> Self {
        let info = info
            .filter(|i| !i.trim().is_empty())
            .unwrap_or_else(|| messages::UNKNOWN.to_string());
        GatewayError::Provider { code, info }
    }

    pub fn is_provider_error(&self) -> bool {
        matches!(self, GatewayError::Provider { .. })
    }
}

/// Step of the creation sequence that failed.
#[derive(Error, Debug)]
pub enum CreateStageError {
    #[error("{}: {source}", messages::WEATHER_API)]
    WeatherLookup {
        #[source]
        source: GatewayError,
    },

    /// The weather call itself failed (network, status, body); no provider verdict.
    #[error("{source}")]
    WeatherUnavailable {
        #[source]
        source: GatewayError,
    },

    #[error("{source}")]
    Insert {
        #[source]
        source: GatewayError,
    },

    #[error("store returned no rows for the inserted property")]
    EmptyInsert,
}

/// Classified failure of a property use case.
#[derive(Error, Debug)]
pub enum PropertyError {
    // The list path keeps the terse message without the cause; the cause stays in the chain.
    #[error("{}.", messages::FETCH_PROPERTIES)]
    FetchCollection {
        #[source]
        source: GatewayError,
    },

    #[error("{}: {source}", messages::FETCH_PROPERTY)]
    FetchItem {
        #[source]
        source: GatewayError,
    },

    #[error("{}: {source}", messages::CREATE_PROPERTY)]
    CreateProperty {
        #[source]
        source: CreateStageError,
    },

    #[error("{}: {source}", messages::DELETE_PROPERTY)]
    DeleteProperty {
        #[source]
        source: GatewayError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FetchCollection,
    FetchItem,
    CreateProperty,
    WeatherLookup,
    DeleteProperty,
    Unknown,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::FetchCollection => "FETCH_COLLECTION_ERROR",
            ErrorKind::FetchItem => "FETCH_ITEM_ERROR",
            ErrorKind::CreateProperty => "CREATE_PROPERTY_ERROR",
            ErrorKind::WeatherLookup => "WEATHER_LOOKUP_ERROR",
            ErrorKind::DeleteProperty => "DELETE_PROPERTY_ERROR",
            ErrorKind::Unknown => "UNKNOWN_ERROR",
        }
    }
}

impl PropertyError {
    /// Outermost classification, the one the caller sees.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PropertyError::FetchCollection { .. } => ErrorKind::FetchCollection,
            PropertyError::FetchItem { .. } => ErrorKind::FetchItem,
            PropertyError::CreateProperty { .. } => ErrorKind::CreateProperty,
            PropertyError::DeleteProperty { .. } => ErrorKind::DeleteProperty,
        }
    }

    /// Innermost classification. A provider-reported weather error inside create is
    /// `WeatherLookup`; a gateway failure without any message is `Unknown`.
    pub fn root_kind(&self) -> ErrorKind {
        match self {
            PropertyError::CreateProperty {
                source: CreateStageError::WeatherLookup { .. },
            } => ErrorKind::WeatherLookup,
            _ if matches!(self.gateway_error(), Some(GatewayError::Unknown)) => ErrorKind::Unknown,
            other => other.kind(),
        }
    }

    /// Gateway failure at the bottom of this error, if any.
    pub fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            PropertyError::FetchCollection { source }
            | PropertyError::FetchItem { source }
            | PropertyError::DeleteProperty { source } => Some(source),
            PropertyError::CreateProperty { source } => match source {
                CreateStageError::WeatherLookup { source }
                | CreateStageError::WeatherUnavailable { source }
                | CreateStageError::Insert { source } => Some(source),
                CreateStageError::EmptyInsert => None,
            },
        }
    }

    pub fn is_weather_lookup(&self) -> bool {
        self.root_kind() == ErrorKind::WeatherLookup
    }

    /// Full `a: b: c` chain of this error and its sources, for logs.
    pub fn chain(&self) -> String {
        let mut rendered = self.to_string();
        let mut current = std::error::Error::source(self);
        while let Some(cause) = current {
            rendered.push_str(" <- ");
            rendered.push_str(&cause.to_string());
            current = cause.source();
        }
        rendered
    }
}

/// Configuration loading and validation failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration parse error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, PropertyError>;
