use std::io::{Cursor, Write};

use bitflags::bitflags;
use bytes::Bytes;

use crate::errors::DavError;
use crate::DavResult;

/// The methods this server implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DavMethod {
    Options,
    Get,
    PropFind,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DavMethodSet: u32 {
        const OPTIONS = 0x0001;
        const GET = 0x0002;
        const PROPFIND = 0x0004;

        const WEBDAV_RO = Self::OPTIONS.bits() | Self::GET.bits() | Self::PROPFIND.bits();
    }
}

impl DavMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            DavMethod::Options => "OPTIONS",
            DavMethod::Get => "GET",
            DavMethod::PropFind => "PROPFIND",
        }
    }

    fn flag(self) -> DavMethodSet {
        match self {
            DavMethod::Options => DavMethodSet::OPTIONS,
            DavMethod::Get => DavMethodSet::GET,
            DavMethod::PropFind => DavMethodSet::PROPFIND,
        }
    }
}

impl DavMethodSet {
    pub fn contains_method(&self, m: DavMethod) -> bool {
        self.contains(m.flag())
    }

    /// Names of the methods in this set, for the `Allow` header.
    pub fn method_names(&self) -> Vec<&'static str> {
        let mut v = Vec::new();
        for m in [DavMethod::Options, DavMethod::Get, DavMethod::PropFind] {
            if self.contains_method(m) {
                v.push(m.as_str());
            }
        }
        v
    }
}

// translate the http method into our own enum. Anything we do not
// implement, webdav or plain http, maps to 501.
pub fn dav_method(m: &http::Method) -> DavResult<DavMethod> {
    match *m {
        http::Method::OPTIONS => Ok(DavMethod::Options),
        http::Method::GET => Ok(DavMethod::Get),
        _ => match m.as_str() {
            "PROPFIND" => Ok(DavMethod::PropFind),
            _ => Err(DavError::UnknownDavMethod),
        },
    }
}

// A buffer that implements "Write", for the XML event writer.
#[derive(Clone)]
pub struct MemBuffer(Cursor<Vec<u8>>);

impl MemBuffer {
    pub fn new() -> MemBuffer {
        MemBuffer(Cursor::new(Vec::new()))
    }

    pub fn take(&mut self) -> Bytes {
        let buf = std::mem::take(self.0.get_mut());
        self.0.set_position(0);
        Bytes::from(buf)
    }
}

impl Default for MemBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for MemBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
