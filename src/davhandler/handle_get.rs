use std::io;
use std::path::PathBuf;

use async_stream::try_stream;
use bytes::{Bytes, BytesMut};
use futures_util::stream::Stream;
use headers::HeaderMapExt;
use http::{Response, StatusCode};
use tokio::io::AsyncReadExt;

use crate::body::Body;
use crate::davpath::DavPath;
use crate::errors::DavError;
use crate::registry::ResolvedTarget;
use crate::DavResult;

pub(crate) const READ_BUF_SIZE: usize = 65536;

impl crate::DavHandler {
    /// GET. A file is streamed back; a directory answers with the
    /// same multistatus document PROPFIND would produce, so shares
    /// can be browsed with a plain http client.
    pub(crate) async fn handle_get(&self, path: &DavPath) -> DavResult<Response<Body>> {
        let target = self.registry.resolve(path).ok_or(DavError::NotFound)?;
        let real: PathBuf = match target {
            ResolvedTarget::VirtualRoot => return self.handle_propfind(path).await,
            ResolvedTarget::ShareRoot(share) => share.path.clone(),
            ResolvedTarget::Entry { real, .. } => real,
        };

        let meta = tokio::fs::metadata(&real).await?;
        if meta.is_dir() {
            return self.handle_propfind(path).await;
        }
        // a trailing slash cannot name a file.
        if path.is_collection() {
            return Err(DavError::NotFound);
        }

        // open before answering; an unreadable file is a 403, and the
        // Content-Length comes from metadata, not from buffering.
        let file = tokio::fs::File::open(&real).await?;
        trace!("FS: open {real:?}");

        let mut res = Response::builder()
            .status(StatusCode::OK)
            .body(Body::stream(file_stream(file)))
            .unwrap();
        res.headers_mut().typed_insert(headers::ContentLength(meta.len()));
        res.headers_mut().typed_insert(headers::ContentType::from(
            mime_guess::from_path(&real).first_or_octet_stream(),
        ));
        Ok(res)
    }
}

// Read the file in chunks, yielding each chunk to the connection as
// it arrives. Memory use is bounded by READ_BUF_SIZE per transfer.
fn file_stream(mut file: tokio::fs::File) -> impl Stream<Item = io::Result<Bytes>> + Send {
    try_stream! {
        let mut buf = BytesMut::with_capacity(READ_BUF_SIZE);
        loop {
            buf.reserve(READ_BUF_SIZE);
            let n = file.read_buf(&mut buf).await?;
            if n == 0 {
                break;
            }
            yield buf.split().freeze();
        }
    }
}
