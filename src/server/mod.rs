//! Worker HTTP server.
//!
//! Each worker builds its own asset registry, then serves the inherited
//! listener on a fixed thread pool:
//!
//! ```text
//! request ──► intercept (Negotiator) ──► 200 / 304 / 404
//!                    │
//!               fall through
//!                    ▼
//!              Application::handle
//! ```

mod app;
mod limit;
mod listener;
mod request;
mod response;

pub use app::{Application, NotFoundApp};
pub use listener::{bind, inherit, share};

use anyhow::{Context, Result, anyhow};
use std::net::TcpListener;
use std::sync::Arc;
use tiny_http::{Request, Server};

use crate::asset::{AssetScanner, CompressionPrecomputer, MinifierRegistry};
use crate::config::{ResourcesConfig, cfg};
use crate::core::{is_shutdown, register_server};
use crate::negotiate::{DebugBypass, Negotiator, Outcome};
use crate::{error, log, warn};
use limit::InFlight;
use request::RequestHeaders;

/// Bind the static resources, if configured.
///
/// Cached mode scans the whole tree and starts background compression
/// before returning. Debug mode only records where to read from.
pub fn build_negotiator(resources: &ResourcesConfig) -> Result<Option<Negotiator>> {
    let Some(root) = resources.dir.as_deref() else {
        return Ok(None);
    };
    let minifiers = MinifierRegistry::with_defaults();

    if resources.debug {
        log!("assets"; "debug mode: serving `{}` uncached", root.display());
        let bypass = DebugBypass::new(root, minifiers);
        return Ok(Some(Negotiator::debug(resources.prefix.as_str(), bypass)));
    }

    let registry = AssetScanner::new(root, &resources.prefix, &minifiers)
        .scan()
        .context("failed to bind static resources")?;
    // Requests are served identity until compression catches up
    drop(CompressionPrecomputer::default().precompute(&registry));
    Ok(Some(Negotiator::cached(registry)))
}

/// Serve `listener` until shutdown. Blocks.
pub fn run_worker(listener: TcpListener, app: Arc<dyn Application>) -> Result<()> {
    let config = cfg();

    if let Err(e) = app.prepare() {
        error!("serve"; "application setup failed: {e:#}");
    }
    let negotiator = build_negotiator(&config.resources)?.map(Arc::new);

    let addr = listener.local_addr()?;
    let server = Server::from_listener(listener, None)
        .map_err(|e| anyhow!("failed to start server on {addr}: {e}"))?;
    let server = Arc::new(server);
    register_server(Arc::clone(&server));

    log!("serve"; "worker {} listening on http://{addr}", std::process::id());
    let limit = InFlight::new(config.serve.max_connections);
    run_request_loop(&server, negotiator, app, config.serve.threads, &limit)
}

fn run_request_loop(
    server: &Server,
    negotiator: Option<Arc<Negotiator>>,
    app: Arc<dyn Application>,
    threads: usize,
    limit: &InFlight,
) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("hearth-http-{i}"))
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        if is_shutdown() {
            break;
        }
        let Some(slot) = limit.try_acquire() else {
            warn!("serve"; "{} requests in flight, rejecting {}", limit.held(), request.url());
            if let Err(e) = response::unavailable(request) {
                error!("serve"; "request error: {e:#}");
            }
            continue;
        };
        let negotiator = negotiator.clone();
        let app = Arc::clone(&app);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, negotiator.as_deref(), app.as_ref()) {
                error!("serve"; "request error: {e:#}");
            }
            drop(slot);
        });
    }
    Ok(())
}

fn handle_request(
    request: Request,
    negotiator: Option<&Negotiator>,
    app: &dyn Application,
) -> Result<()> {
    let request = match negotiator {
        Some(negotiator) => match intercept(negotiator, request)? {
            Some(request) => request,
            None => return Ok(()),
        },
        None => request,
    };
    app.handle(request)
}

/// Answer `request` from the static cache if it is a static request.
///
/// Returns the request untouched when it falls through.
pub fn intercept(negotiator: &Negotiator, request: Request) -> Result<Option<Request>> {
    let headers = RequestHeaders::from_request(&request);
    let method = request.method().to_string();
    let outcome = negotiator.negotiate(&headers.view(&method, request.url()));

    match outcome {
        Outcome::FallThrough => return Ok(Some(request)),
        Outcome::NotFound => response::not_found(request)?,
        Outcome::NotModified(validators) => response::not_modified(request, &validators)?,
        Outcome::Ok(repr) => response::representation(request, repr)?,
    }
    Ok(None)
}
