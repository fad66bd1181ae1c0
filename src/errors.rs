use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

pub use std::error::Error as StdError;

/// Result type returned from functions that can have our `Error`s.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type ErrorMsg = Cow<'static, str>;

/// What went wrong, coarsely. Everything except per-message decoding issues is fatal, and
/// per-message issues never become an `Error` in the first place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Could not open the bus connection
    Connection,
    /// The bus rejected a match rule or a method call needed to start monitoring
    Subscription,
    /// Bad configuration file, CLI flags or output template
    Configuration,
    /// Could not write a status line
    Output,
    Internal,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: ErrorMsg,
    pub cause: Option<Arc<dyn StdError + Send + Sync + 'static>>,
}

impl Error {
    pub fn new<T: Into<ErrorMsg>>(kind: ErrorKind, message: T) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    pub fn configuration<T: Into<ErrorMsg>>(message: T) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    fn with_cause<E>(kind: ErrorKind, message: ErrorMsg, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            kind,
            message,
            cause: Some(Arc::new(cause)),
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_deref().map(|e| e as _)
    }
}

pub trait ErrorContext<T> {
    fn connection_error<M: Into<ErrorMsg>>(self, message: M) -> Result<T>;
    fn subscription_error<M: Into<ErrorMsg>>(self, message: M) -> Result<T>;
    fn configuration_error<M: Into<ErrorMsg>>(self, message: M) -> Result<T>;
    fn output_error<M: Into<ErrorMsg>>(self, message: M) -> Result<T>;
    fn error<M: Into<ErrorMsg>>(self, message: M) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn connection_error<M: Into<ErrorMsg>>(self, message: M) -> Result<T> {
        self.map_err(|e| Error::with_cause(ErrorKind::Connection, message.into(), e))
    }

    fn subscription_error<M: Into<ErrorMsg>>(self, message: M) -> Result<T> {
        self.map_err(|e| Error::with_cause(ErrorKind::Subscription, message.into(), e))
    }

    fn configuration_error<M: Into<ErrorMsg>>(self, message: M) -> Result<T> {
        self.map_err(|e| Error::with_cause(ErrorKind::Configuration, message.into(), e))
    }

    fn output_error<M: Into<ErrorMsg>>(self, message: M) -> Result<T> {
        self.map_err(|e| Error::with_cause(ErrorKind::Output, message.into(), e))
    }

    fn error<M: Into<ErrorMsg>>(self, message: M) -> Result<T> {
        self.map_err(|e| Error::with_cause(ErrorKind::Internal, message.into(), e))
    }
}
