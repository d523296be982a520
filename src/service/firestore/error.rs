use gcp_auth::GCPAuthError;

#[derive(Debug)]
pub enum Error {
    Config(&'static str),
    Auth(GCPAuthError),
    InvalidUri(http::uri::InvalidUri),
    Transport(tonic::transport::Error),
    InvalidHeader(String),
    Status(tonic::Status),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Config(message) => write!(f, "invalid setting: {}", message),
            Error::Auth(e) => e.fmt(f),
            Error::InvalidUri(e) => e.fmt(f),
            Error::Transport(e) => e.fmt(f),
            Error::InvalidHeader(message) => write!(f, "invalid header value: {}", message),
            Error::Status(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Auth(e) => Some(e),
            Error::InvalidUri(e) => Some(e),
            Error::Transport(e) => Some(e),
            Error::Status(e) => Some(e),
            Error::Config(_) | Error::InvalidHeader(_) => None,
        }
    }
}

impl From<GCPAuthError> for Error {
    fn from(err: GCPAuthError) -> Self {
        Error::Auth(err)
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Error::InvalidUri(err)
    }
}

impl From<tonic::transport::Error> for Error {
    fn from(err: tonic::transport::Error) -> Self {
        Error::Transport(err)
    }
}

impl From<tonic::Status> for Error {
    fn from(err: tonic::Status) -> Self {
        Error::Status(err)
    }
}
