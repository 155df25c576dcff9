//! The hyper server loop.
//!
//! Each connection runs as its own tokio task; a slow client cannot
//! hold up unrelated requests. The handler (and with it the share
//! registry) is shared by all connections.

use std::convert::Infallible;
use std::error::Error;
use std::net::SocketAddr;
use std::time::Duration;

use http::{Response, StatusCode};
use hyper::service::{make_service_fn, service_fn};

use crate::body::Body;
use crate::registry::ShareRegistry;
use crate::DavHandler;

// Clients that stall while sending their request headers are cut off.
const HEADER_READ_TIMEOUT: Duration = Duration::from_secs(30);

// Bound on resolving and rendering one request. Streaming a file body
// after the headers went out is not covered; disconnects cancel it.
const DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Bind and serve. Runs until the process is killed; a bind failure
/// is returned (and is fatal to the caller).
pub async fn serve(registry: ShareRegistry, port: u16) -> Result<(), Box<dyn Error>> {
    for share in registry.shares() {
        info!(
            "share /{} -> {}{}",
            share.alias,
            share.path.display(),
            if share.read_only { " (read-only)" } else { "" }
        );
    }

    let handler = DavHandler::new(registry);
    let make_service = make_service_fn(move |_| {
        let handler = handler.clone();
        async move {
            let func = move |req| {
                let handler = handler.clone();
                async move {
                    let res = match tokio::time::timeout(DISPATCH_TIMEOUT, handler.handle(req)).await {
                        Ok(res) => res,
                        Err(_) => {
                            debug!("request timed out");
                            Response::builder()
                                .status(StatusCode::INTERNAL_SERVER_ERROR)
                                .header("Content-Length", "0")
                                .body(Body::empty())
                                .unwrap()
                        }
                    };
                    Ok::<_, Infallible>(res)
                }
            };
            Ok::<_, Infallible>(service_fn(func))
        }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let server = hyper::Server::try_bind(&addr)?
        .http1_header_read_timeout(HEADER_READ_TIMEOUT)
        .serve(make_service);

    info!("listening on {addr}");
    println!("Serving on {addr}");

    server.await?;
    Ok(())
}
