//
// This module contains the main entry point of the crate,
// DavHandler.
//
use std::sync::Arc;

use http::{Request, Response};

use crate::body::Body;
use crate::davpath::DavPath;
use crate::registry::ShareRegistry;
use crate::util::{dav_method, DavMethod, DavMethodSet};
use crate::DavResult;

pub mod handle_get;
pub mod handle_options;
pub mod handle_propfind;

/// The webdav handler struct.
///
/// Turns one `http::Request` into one `http::Response`, translating
/// between the webdav wire protocol and the configured shares. Cheap
/// to clone; all clones serve the same registry.
#[derive(Clone)]
pub struct DavHandler {
    pub(crate) registry: Arc<ShareRegistry>,
    pub(crate) allow: DavMethodSet,
}

impl DavHandler {
    pub fn new(registry: ShareRegistry) -> DavHandler {
        DavHandler {
            registry: Arc::new(registry),
            allow: DavMethodSet::WEBDAV_RO,
        }
    }

    /// Handle a request. The request body, if any, is ignored: the
    /// only body-carrying method we implement is PROPFIND, and we
    /// always answer it with depth-1 semantics.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Body> {
        match self.handle2(&req).await {
            Ok(resp) => {
                debug!("== END REQUEST result OK");
                resp
            }
            Err(err) => {
                debug!("== END REQUEST result {:?}", err);
                Response::builder()
                    .status(err.statuscode())
                    .header("Content-Length", "0")
                    .body(Body::empty())
                    .unwrap()
            }
        }
    }

    // internal dispatcher.
    async fn handle2<B>(&self, req: &Request<B>) -> DavResult<Response<Body>> {
        let method = match dav_method(req.method()) {
            Ok(m) => m,
            Err(e) => {
                debug!("refusing method {} request {}", req.method(), req.uri());
                return Err(e);
            }
        };

        // OPTIONS answers the same fixed set of headers no matter
        // what the path looks like.
        if method == DavMethod::Options {
            return self.handle_options(req);
        }

        // make sure the request path is valid.
        let path = DavPath::parse(req.uri().path())?;

        debug!("== START REQUEST {:?} {}", method, path);

        match method {
            DavMethod::PropFind => self.handle_propfind(&path).await,
            _ => self.handle_get(&path).await,
        }
    }
}
