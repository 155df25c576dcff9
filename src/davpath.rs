//! Request path as it came in over the wire.
//!
//! A [`DavPath`] is the percent-decoded, segment-normalized form of the
//! request target. Parsing rejects anything that could escape a share
//! root, so a `DavPath` can be joined onto a real directory without
//! further sanitization.

use std::fmt;

use percent_encoding::{percent_decode, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::errors::DavError;
use crate::DavResult;

// Characters percent-encoded when we generate hrefs.
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DavPath {
    segments: Vec<String>,
    // trailing slash on the wire.
    collection: bool,
}

impl DavPath {
    /// Parse a request target. Must be an absolute path; percent
    /// escapes are decoded, empty and `.` segments are dropped, and
    /// `..` segments are refused outright.
    pub fn parse(path: &str) -> DavResult<DavPath> {
        if !path.starts_with('/') {
            return Err(DavError::BadRequest("request target must be an absolute path"));
        }
        let collection = path.ends_with('/');
        let mut segments = Vec::new();
        for seg in path.split('/') {
            let seg = percent_decode(seg.as_bytes())
                .decode_utf8()
                .map_err(|_| DavError::BadRequest("path is not valid utf-8"))?;
            let s: &str = seg.as_ref();
            if s.is_empty() || s == "." {
                continue;
            }
            if s == ".." {
                return Err(DavError::BadRequest("path traversal"));
            }
            if s.contains('/') || s.contains('\0') {
                return Err(DavError::BadRequest("invalid character in path segment"));
            }
            segments.push(seg.into_owned());
        }
        let collection = collection || segments.is_empty();
        Ok(DavPath {
            segments,
            collection,
        })
    }

    /// The virtual root, `/`.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Did the path carry a trailing slash.
    pub fn is_collection(&self) -> bool {
        self.collection
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Alias segment plus share-relative remainder, unless this is the root.
    pub fn split_first(&self) -> Option<(&str, &[String])> {
        self.segments
            .split_first()
            .map(|(first, rest)| (first.as_str(), rest))
    }

    /// Last segment; the entry's base name.
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(|s| s.as_str())
    }

    /// Percent-encoded url form, with the trailing slash preserved.
    pub fn as_url_string(&self) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        let mut s = String::new();
        for seg in &self.segments {
            s.push('/');
            s.push_str(&encode_segment(seg));
        }
        if self.collection {
            s.push('/');
        }
        s
    }
}

impl fmt::Display for DavPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_url_string())
    }
}

/// Percent-encode one path segment for use in an href.
pub fn encode_segment(seg: &str) -> String {
    utf8_percent_encode(seg, PATH_ENCODE_SET).to_string()
}
