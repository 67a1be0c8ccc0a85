//! Application fall-through.

use anyhow::Result;
use tiny_http::Request;

use super::response;

/// Everything a worker serves that is not a static asset.
///
/// `prepare` runs once per worker before it listens (database connections,
/// mail transport). `handle` must respond to the request it is given.
pub trait Application: Send + Sync {
    fn prepare(&self) -> Result<()> {
        Ok(())
    }

    fn handle(&self, request: Request) -> Result<()>;
}

/// Answers every request with 404.
#[derive(Debug, Default, Clone, Copy)]
pub struct NotFoundApp;

impl Application for NotFoundApp {
    fn handle(&self, request: Request) -> Result<()> {
        response::not_found(request)
    }
}
