use headers::HeaderMapExt;
use http::{Request, Response};

use crate::body::Body;
use crate::DavResult;

impl crate::DavHandler {
    pub(crate) fn handle_options<B>(&self, _req: &Request<B>) -> DavResult<Response<Body>> {
        let mut res = Response::new(Body::empty());

        let h = res.headers_mut();

        // Compliance class 2 is what clients expect to see from a
        // webdav server, even though LOCK/UNLOCK are not served from
        // this part of the URL space.
        h.insert("DAV", "1,2".parse().unwrap());
        h.insert("MS-Author-Via", "DAV".parse().unwrap());
        h.typed_insert(headers::ContentLength(0));

        // Only advertise the methods we actually implement.
        let allow = self.allow.method_names().join(", ");
        h.insert("Allow", allow.parse().unwrap());

        Ok(res)
    }
}
