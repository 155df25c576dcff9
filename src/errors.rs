//
// Error type used throughout the crate, and its mapping
// to HTTP status codes.
//
use std::error::Error;
use std::fmt;
use std::io;

use http::StatusCode;

pub type DavResult<T> = Result<T, DavError>;

#[derive(Debug)]
pub enum DavError {
    NotFound,
    Forbidden,
    BadRequest(&'static str),
    UnknownDavMethod,
    Io(io::Error),
    XmlWrite(xml::writer::Error),
}

impl DavError {
    pub fn statuscode(&self) -> StatusCode {
        match self {
            DavError::NotFound => StatusCode::NOT_FOUND,
            DavError::Forbidden => StatusCode::FORBIDDEN,
            DavError::BadRequest(_) => StatusCode::BAD_REQUEST,
            DavError::UnknownDavMethod => StatusCode::NOT_IMPLEMENTED,
            DavError::Io(_) | DavError::XmlWrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for DavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DavError::NotFound => write!(f, "not found"),
            DavError::Forbidden => write!(f, "forbidden"),
            DavError::BadRequest(msg) => write!(f, "bad request: {msg}"),
            DavError::UnknownDavMethod => write!(f, "method not implemented"),
            DavError::Io(e) => write!(f, "io error: {e}"),
            DavError::XmlWrite(e) => write!(f, "xml write error: {e}"),
        }
    }
}

impl Error for DavError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DavError::Io(e) => Some(e),
            DavError::XmlWrite(e) => Some(e),
            _ => None,
        }
    }
}

// Maps the error kind at the point where a request target is first
// touched: a missing file is 404, an unreadable one 403, the rest 500.
impl From<io::Error> for DavError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            // an intermediate path segment that is a file lands here.
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => DavError::NotFound,
            io::ErrorKind::PermissionDenied => DavError::Forbidden,
            _ => DavError::Io(e),
        }
    }
}

impl From<xml::writer::Error> for DavError {
    fn from(e: xml::writer::Error) -> Self {
        DavError::XmlWrite(e)
    }
}
