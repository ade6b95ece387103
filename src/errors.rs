use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("session cookie is not a valid header value")]
    InvalidSessionCookie,
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} answered with status {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Error, Debug)]
pub enum ViewError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("quantity {0:?} is not an integer greater than zero")]
    InvalidQuantity(String),
    #[error("reservation {0} is not listed")]
    UnknownReservation(u32),
    #[error("reservation {0} is not being edited")]
    NotEditing(u32),
    #[error("reservation {0} already has a request in flight")]
    InFlight(u32),
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {var} has invalid value {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Error, Debug, PartialEq)]
pub enum CliError {
    #[error("usage: gas-views catalog | reservations | edit <id> <quantity> | delete <id> [--yes]")]
    Usage,
    #[error("{0:?} is not a reservation id")]
    InvalidId(String),
}
