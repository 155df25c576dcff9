use std::path::Path;

use bytes::Bytes;
use headers::HeaderMapExt;
use http::{Response, StatusCode};
use xml::writer::{EmitterConfig, EventWriter, XmlEvent};

use crate::body::Body;
use crate::davpath::{encode_segment, DavPath};
use crate::errors::DavError;
use crate::registry::ResolvedTarget;
use crate::util::MemBuffer;
use crate::DavResult;

const XML_CONTENT_TYPE: &str = "application/xml; charset=\"utf-8\"";

// Entries carry a fixed status; there is no per-entry error
// reporting. A failure while rendering fails the whole response.
const ENTRY_STATUS: &str = "HTTP/1.1 200 OK";

impl crate::DavHandler {
    /// PROPFIND. The Depth header is not distinguished; the answer is
    /// always the target plus its immediate children.
    pub(crate) async fn handle_propfind(&self, path: &DavPath) -> DavResult<Response<Body>> {
        let xml = self.multistatus_body(path).await?;

        let mut res = Response::builder()
            .status(StatusCode::MULTI_STATUS)
            .header("Content-Type", XML_CONTENT_TYPE)
            .body(Body::from(xml.clone()))
            .unwrap();
        res.headers_mut()
            .typed_insert(headers::ContentLength(xml.len() as u64));
        Ok(res)
    }

    /// Render the multistatus document for a request path. Shared by
    /// PROPFIND and by GET on a directory.
    pub(crate) async fn multistatus_body(&self, path: &DavPath) -> DavResult<Bytes> {
        let target = self.registry.resolve(path).ok_or(DavError::NotFound)?;
        let mut ms = MultiStatus::new()?;

        match target {
            ResolvedTarget::VirtualRoot => {
                ms.collection("/", "/")?;
                for share in self.registry.shares() {
                    let href = format!("/{}/", encode_segment(&share.alias));
                    ms.collection(&href, &share.alias)?;
                }
            }
            ResolvedTarget::ShareRoot(share) => {
                // the metadata call distinguishes 404 from 500.
                tokio::fs::metadata(&share.path).await?;
                let href = format!("/{}/", encode_segment(&share.alias));
                ms.collection(&href, &share.alias)?;
                list_children(&mut ms, &href, &share.path).await?;
            }
            ResolvedTarget::Entry { share: _, real } => {
                let meta = tokio::fs::metadata(&real).await?;
                let name = path.file_name().unwrap_or("/");
                if meta.is_dir() {
                    // a directory without a trailing slash is rendered
                    // as if the slash were present. No redirect.
                    let mut href = path.as_url_string();
                    if !href.ends_with('/') {
                        href.push('/');
                    }
                    ms.collection(&href, name)?;
                    list_children(&mut ms, &href, &real).await?;
                } else {
                    // a trailing slash cannot name a file.
                    if path.is_collection() {
                        return Err(DavError::NotFound);
                    }
                    let href = path.as_url_string();
                    ms.file(&href, name, meta.len(), &content_type(&real))?;
                }
            }
        }

        ms.finish()
    }
}

// One entry per immediate child, non-recursive. Any filesystem error
// here fails the whole listing with a 500; no partial results.
//
// Names that are not valid UTF-8 are skipped: they cannot appear in an
// href that would resolve back through DavPath.
async fn list_children(ms: &mut MultiStatus, parent_href: &str, dir: &Path) -> DavResult<()> {
    let mut rd = tokio::fs::read_dir(dir).await.map_err(DavError::Io)?;
    while let Some(entry) = rd.next_entry().await.map_err(DavError::Io)? {
        let meta = entry.metadata().await.map_err(DavError::Io)?;
        let name = entry.file_name();
        let name = match name.to_str() {
            Some(name) => name,
            None => {
                debug!("skipping non-utf8 name in {dir:?}");
                continue;
            }
        };
        let href = format!("{}{}", parent_href, encode_segment(name));
        if meta.is_dir() {
            ms.collection(&format!("{href}/"), name)?;
        } else {
            ms.file(&href, name, meta.len(), &content_type(&entry.path()))?;
        }
    }
    Ok(())
}

fn content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

/// Incremental writer for a `multistatus` document. All text content
/// goes through the XML event writer, which entity-escapes it.
struct MultiStatus {
    w: EventWriter<MemBuffer>,
}

impl MultiStatus {
    fn new() -> DavResult<MultiStatus> {
        let mut w = EmitterConfig::new()
            .write_document_declaration(true)
            .create_writer(MemBuffer::new());
        w.write(XmlEvent::start_element("d:multistatus").ns("d", "DAV:"))?;
        Ok(MultiStatus { w })
    }

    fn collection(&mut self, href: &str, name: &str) -> DavResult<()> {
        self.response(href, name, None)
    }

    fn file(&mut self, href: &str, name: &str, len: u64, content_type: &str) -> DavResult<()> {
        self.response(href, name, Some((len, content_type)))
    }

    fn response(&mut self, href: &str, name: &str, file: Option<(u64, &str)>) -> DavResult<()> {
        let w = &mut self.w;
        w.write(XmlEvent::start_element("d:response"))?;

        w.write(XmlEvent::start_element("d:href"))?;
        w.write(XmlEvent::characters(href))?;
        w.write(XmlEvent::end_element())?;

        w.write(XmlEvent::start_element("d:propstat"))?;
        w.write(XmlEvent::start_element("d:prop"))?;

        w.write(XmlEvent::start_element("d:displayname"))?;
        w.write(XmlEvent::characters(name))?;
        w.write(XmlEvent::end_element())?;

        w.write(XmlEvent::start_element("d:resourcetype"))?;
        if file.is_none() {
            w.write(XmlEvent::start_element("d:collection"))?;
            w.write(XmlEvent::end_element())?;
        }
        w.write(XmlEvent::end_element())?;

        if let Some((len, content_type)) = file {
            w.write(XmlEvent::start_element("d:getcontentlength"))?;
            w.write(XmlEvent::characters(&len.to_string()))?;
            w.write(XmlEvent::end_element())?;

            w.write(XmlEvent::start_element("d:getcontenttype"))?;
            w.write(XmlEvent::characters(content_type))?;
            w.write(XmlEvent::end_element())?;
        }

        w.write(XmlEvent::end_element())?; // prop

        w.write(XmlEvent::start_element("d:status"))?;
        w.write(XmlEvent::characters(ENTRY_STATUS))?;
        w.write(XmlEvent::end_element())?;

        w.write(XmlEvent::end_element())?; // propstat
        w.write(XmlEvent::end_element())?; // response
        Ok(())
    }

    fn finish(mut self) -> DavResult<Bytes> {
        self.w.write(XmlEvent::end_element())?; // multistatus
        Ok(self.w.into_inner().take())
    }
}
