//! Handler-level tests: one http::Request in, one http::Response out,
//! against shares living in a temp directory.

use std::path::Path;

use futures_util::StreamExt;
use http::{Request, Response, StatusCode};
use tempfile::TempDir;
use xmltree::Element;

use davshare::{body::Body, DavHandler, Share, ShareRegistry};

fn handler_for(shares: &[(&str, &Path)]) -> DavHandler {
    let shares = shares
        .iter()
        .map(|(alias, path)| Share {
            path: path.to_path_buf(),
            alias: alias.to_string(),
            read_only: false,
        })
        .collect();
    DavHandler::new(ShareRegistry::new(shares).unwrap())
}

/// A "public" share containing readme.txt ("hi") and docs/guide.html.
fn fixture() -> (TempDir, DavHandler) {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("readme.txt"), "hi").unwrap();
    std::fs::create_dir(tmp.path().join("docs")).unwrap();
    std::fs::write(tmp.path().join("docs").join("guide.html"), "<html></html>").unwrap();
    let handler = handler_for(&[("public", tmp.path())]);
    (tmp, handler)
}

async fn request(handler: &DavHandler, method: &str, path: &str) -> Response<Body> {
    let req = Request::builder()
        .method(method)
        .uri(path)
        .body(())
        .unwrap();
    handler.handle(req).await
}

async fn body_bytes(res: Response<Body>) -> Vec<u8> {
    let mut body = res.into_body();
    let mut out = Vec::new();
    while let Some(chunk) = body.next().await {
        out.extend_from_slice(&chunk.unwrap());
    }
    out
}

fn header<'a>(res: &'a Response<Body>, name: &str) -> &'a str {
    res.headers().get(name).unwrap().to_str().unwrap()
}

fn responses(multistatus: &Element) -> Vec<&Element> {
    assert_eq!(multistatus.name, "multistatus");
    multistatus
        .children
        .iter()
        .filter_map(|n| n.as_element())
        .filter(|e| e.name == "response")
        .collect()
}

fn child_text(el: &Element, path: &[&str]) -> String {
    let mut cur = el;
    for name in path {
        cur = cur.get_child(*name).unwrap_or_else(|| panic!("missing <{name}>"));
    }
    cur.get_text().unwrap_or_default().into_owned()
}

fn href(resp: &Element) -> String {
    child_text(resp, &["href"])
}

fn is_collection(resp: &Element) -> bool {
    resp.get_child("propstat")
        .and_then(|p| p.get_child("prop"))
        .and_then(|p| p.get_child("resourcetype"))
        .map(|r| r.get_child("collection").is_some())
        .unwrap()
}

async fn multistatus(res: Response<Body>) -> Element {
    assert_eq!(res.status(), StatusCode::MULTI_STATUS);
    assert_eq!(
        header(&res, "content-type"),
        "application/xml; charset=\"utf-8\""
    );
    let body = body_bytes(res).await;
    Element::parse(&body[..]).expect("response is well-formed XML")
}

#[tokio::test]
async fn options_fixed_headers() {
    let (_tmp, handler) = fixture();
    // same answer whether or not the path resolves.
    for path in ["/", "/public/readme.txt", "/no/such/share"] {
        let res = request(&handler, "OPTIONS", path).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(header(&res, "dav"), "1,2");
        assert_eq!(header(&res, "allow"), "OPTIONS, GET, PROPFIND");
        assert_eq!(header(&res, "content-length"), "0");
        assert!(body_bytes(res).await.is_empty());
    }
}

#[tokio::test]
async fn get_file() {
    let (_tmp, handler) = fixture();
    let res = request(&handler, "GET", "/public/readme.txt").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(header(&res, "content-type"), "text/plain");
    assert_eq!(header(&res, "content-length"), "2");
    assert_eq!(body_bytes(res).await, b"hi");
}

#[tokio::test]
async fn get_file_mime_is_case_insensitive() {
    let (tmp, handler) = fixture();
    std::fs::write(tmp.path().join("PHOTO.PNG"), [0u8; 4]).unwrap();
    let res = request(&handler, "GET", "/public/PHOTO.PNG").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(header(&res, "content-type"), "image/png");
}

#[tokio::test]
async fn get_unknown_extension_is_octet_stream() {
    let (tmp, handler) = fixture();
    std::fs::write(tmp.path().join("blob.weird"), b"x").unwrap();
    let res = request(&handler, "GET", "/public/blob.weird").await;
    assert_eq!(header(&res, "content-type"), "application/octet-stream");
}

#[tokio::test]
async fn get_directory_answers_multistatus() {
    let (_tmp, handler) = fixture();
    let res = request(&handler, "GET", "/public/").await;
    let ms = multistatus(res).await;
    let hrefs: Vec<_> = responses(&ms).iter().map(|r| href(r)).collect();
    assert_eq!(hrefs.len(), 3);
    assert_eq!(hrefs[0], "/public/");
    assert!(hrefs.contains(&"/public/readme.txt".to_string()));
    assert!(hrefs.contains(&"/public/docs/".to_string()));
}

#[tokio::test]
async fn propfind_virtual_root() {
    let tmp_a = TempDir::new().unwrap();
    let tmp_b = TempDir::new().unwrap();
    // registry order, not alphabetical order.
    let handler = handler_for(&[("zeta", tmp_a.path()), ("alpha", tmp_b.path())]);
    let res = request(&handler, "PROPFIND", "/").await;
    let ms = multistatus(res).await;
    let rs = responses(&ms);
    assert_eq!(rs.len(), 3);
    assert_eq!(href(rs[0]), "/");
    assert_eq!(href(rs[1]), "/zeta/");
    assert_eq!(href(rs[2]), "/alpha/");
    assert!(rs.iter().all(|r| is_collection(r)));
    assert_eq!(child_text(rs[1], &["propstat", "prop", "displayname"]), "zeta");
}

#[tokio::test]
async fn propfind_share_lists_immediate_children() {
    let (_tmp, handler) = fixture();
    let res = request(&handler, "PROPFIND", "/public/").await;
    let ms = multistatus(res).await;
    let rs = responses(&ms);
    assert_eq!(rs.len(), 3);
    assert_eq!(href(rs[0]), "/public/");
    assert!(is_collection(rs[0]));

    let readme = rs
        .iter()
        .find(|r| href(r) == "/public/readme.txt")
        .expect("readme.txt listed");
    assert!(!is_collection(readme));
    assert_eq!(
        child_text(readme, &["propstat", "prop", "getcontentlength"]),
        "2"
    );
    assert_eq!(
        child_text(readme, &["propstat", "prop", "getcontenttype"]),
        "text/plain"
    );
    assert_eq!(child_text(readme, &["propstat", "status"]), "HTTP/1.1 200 OK");

    let docs = rs
        .iter()
        .find(|r| href(r) == "/public/docs/")
        .expect("docs listed");
    assert!(is_collection(docs));
    // children are immediate only; guide.html is not in this listing.
    assert!(!rs.iter().any(|r| href(r).contains("guide.html")));
}

#[tokio::test]
async fn propfind_single_file() {
    let (_tmp, handler) = fixture();
    let res = request(&handler, "PROPFIND", "/public/readme.txt").await;
    let ms = multistatus(res).await;
    let rs = responses(&ms);
    assert_eq!(rs.len(), 1);
    assert_eq!(href(rs[0]), "/public/readme.txt");
    assert!(!is_collection(rs[0]));
    assert_eq!(
        child_text(rs[0], &["propstat", "prop", "displayname"]),
        "readme.txt"
    );
}

#[tokio::test]
async fn propfind_directory_without_trailing_slash() {
    let (_tmp, handler) = fixture();
    let res = request(&handler, "PROPFIND", "/public/docs").await;
    let ms = multistatus(res).await;
    let rs = responses(&ms);
    // rendered as if the slash were present.
    assert_eq!(href(rs[0]), "/public/docs/");
    assert_eq!(href(rs[1]), "/public/docs/guide.html");
}

#[tokio::test]
async fn filenames_are_xml_escaped() {
    let (tmp, handler) = fixture();
    let name = "a&b <c> \"d\".txt";
    std::fs::write(tmp.path().join(name), b"x").unwrap();
    let res = request(&handler, "PROPFIND", "/public/").await;
    // multistatus() already asserts the document parses.
    let ms = multistatus(res).await;
    let found = responses(&ms)
        .iter()
        .any(|r| child_text(r, &["propstat", "prop", "displayname"]) == name);
    assert!(found, "escaped filename round-trips through the XML");
}

#[tokio::test]
async fn unknown_alias_is_404() {
    let (_tmp, handler) = fixture();
    for method in ["GET", "PROPFIND"] {
        let res = request(&handler, method, "/missing/x").await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(body_bytes(res).await.is_empty());
    }
}

#[tokio::test]
async fn missing_file_is_404() {
    let (_tmp, handler) = fixture();
    let res = request(&handler, "GET", "/public/nope.txt").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = request(&handler, "PROPFIND", "/public/nope/").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn trailing_slash_on_file_is_404() {
    let (_tmp, handler) = fixture();
    for method in ["GET", "PROPFIND"] {
        let res = request(&handler, method, "/public/readme.txt/").await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{method}");
        assert!(body_bytes(res).await.is_empty());
    }
    // without the slash the file is still served.
    let res = request(&handler, "GET", "/public/readme.txt").await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn file_as_intermediate_segment_is_404() {
    let (_tmp, handler) = fixture();
    let res = request(&handler, "GET", "/public/readme.txt/nested").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dangling_share_root_is_404() {
    let tmp = TempDir::new().unwrap();
    let gone = tmp.path().join("gone");
    let handler = handler_for(&[("public", &gone)]);
    for (method, path) in [
        ("PROPFIND", "/public/"),
        ("GET", "/public/"),
        ("PROPFIND", "/public/file.txt"),
        ("GET", "/public/file.txt"),
    ] {
        let res = request(&handler, method, path).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{method} {path}");
        assert!(body_bytes(res).await.is_empty());
    }
    // the virtual root lists the share regardless; existence is only
    // checked when the share itself is the target.
    let res = request(&handler, "PROPFIND", "/").await;
    let ms = multistatus(res).await;
    assert_eq!(responses(&ms).len(), 2);
}

#[cfg(unix)]
#[tokio::test]
async fn non_utf8_names_are_skipped() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let (tmp, handler) = fixture();
    std::fs::write(tmp.path().join(OsStr::from_bytes(b"bad\xff.txt")), b"x").unwrap();
    let res = request(&handler, "PROPFIND", "/public/").await;
    let ms = multistatus(res).await;
    let rs = responses(&ms);
    // the listing stays well-formed and the entry is simply absent.
    assert_eq!(rs.len(), 3);
    assert!(!rs.iter().any(|r| href(r).contains("bad")));
}

#[tokio::test]
async fn unimplemented_methods_are_501() {
    let (_tmp, handler) = fixture();
    for method in ["PUT", "DELETE", "HEAD", "POST", "MKCOL", "LOCK"] {
        let res = request(&handler, method, "/public/readme.txt").await;
        assert_eq!(res.status(), StatusCode::NOT_IMPLEMENTED, "{method}");
        assert!(body_bytes(res).await.is_empty());
    }
}

#[tokio::test]
async fn traversal_is_rejected() {
    let (_tmp, handler) = fixture();
    for path in ["/public/../secret", "/public/%2e%2e/secret", "/%2e%2e/x"] {
        let res = request(&handler, "GET", path).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{path}");
        let res = request(&handler, "PROPFIND", path).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{path}");
    }
}

#[tokio::test]
async fn hrefs_are_percent_encoded() {
    let (tmp, handler) = fixture();
    std::fs::write(tmp.path().join("hello world.txt"), b"x").unwrap();
    let res = request(&handler, "PROPFIND", "/public/").await;
    let ms = multistatus(res).await;
    assert!(responses(&ms)
        .iter()
        .any(|r| href(r) == "/public/hello%20world.txt"));
    // and the encoded form resolves back to the file.
    let res = request(&handler, "GET", "/public/hello%20world.txt").await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn get_virtual_root_browses_shares() {
    let (_tmp, handler) = fixture();
    let res = request(&handler, "GET", "/").await;
    let ms = multistatus(res).await;
    assert_eq!(responses(&ms).len(), 2);
}

#[tokio::test]
async fn large_file_is_streamed_intact() {
    let (tmp, handler) = fixture();
    // bigger than one read buffer.
    let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    std::fs::write(tmp.path().join("big.bin"), &data).unwrap();
    let res = request(&handler, "GET", "/public/big.bin").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(header(&res, "content-length"), data.len().to_string());
    assert_eq!(body_bytes(res).await, data);
}
