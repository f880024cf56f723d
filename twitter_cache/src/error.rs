use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Fetching {operation} failed: {source}")]
    Fetch {
        operation: String,
        #[source]
        source: twitter_client::Error,
    },
    #[error("Client error: {0}")]
    Client(#[from] twitter_client::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Parse,
    NotFound,
    Other,
}

impl Error {
    pub(crate) fn fetch(operation: impl Into<String>, source: twitter_client::Error) -> Self {
        Error::Fetch {
            operation: operation.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Fetch { source, .. } | Error::Client(source) => classify(source),
            _ => ErrorKind::Other,
        }
    }
}

fn classify(error: &twitter_client::Error) -> ErrorKind {
    use twitter_client::Error as ClientError;
    match error {
        ClientError::NotFound(_) => ErrorKind::NotFound,
        ClientError::JSONError(_) => ErrorKind::Parse,
        ClientError::NetworkError(_) | ClientError::UrlError(_) | ClientError::IOError(_) => ErrorKind::Network,
        _ => ErrorKind::Other,
    }
}
