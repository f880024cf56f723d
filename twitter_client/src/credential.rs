use std::fmt::{Display, Formatter};
use std::io;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Credential attached to every request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Basic { username: String, password: String },
    Bearer(String),
}

impl Credential {
    /// Read a credential from an auth dotfile. The file holds a single line
    /// with two words: `username password`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Credential> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let line = content
            .lines()
            .find(|l| !l.trim().is_empty())
            .ok_or_else(|| Error::InvalidCredential(format!("{} is empty", path.as_ref().display())))?;
        line.parse()
    }

    /// Like [`Credential::from_file`], but a missing file means no credential.
    pub fn from_file_if_exists(path: impl AsRef<Path>) -> Result<Option<Credential>> {
        match Credential::from_file(path) {
            Ok(credential) => Ok(Some(credential)),
            Err(Error::IOError(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub(crate) fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Credential::Basic { username, password } => request.basic_auth(username, Some(password)),
            Credential::Bearer(token) => request.bearer_auth(token),
        }
    }
}

impl Display for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Basic { username, password } => write!(f, "{} {}", username, password),
            Credential::Bearer(token) => write!(f, "{}", token),
        }
    }
}

// Keep secrets out of logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Credential::Bearer(_) => f.debug_tuple("Bearer").field(&"***").finish(),
        }
    }
}

impl FromStr for Credential {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut words = s.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (Some(username), Some(password), None) => Ok(Credential::Basic {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => Err(Error::InvalidCredential(
                "expected a single line `username password`".to_string(),
            )),
        }
    }
}
