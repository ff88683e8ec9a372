use std::future::Future;

use async_trait::async_trait;

use crate::node::{CoapError, Request, Response};

/// Handler for one method of one resource.  Any `async fn(Request<E>) -> Result<Response,
/// CoapError>` (or closure returning such a future) qualifies.
#[async_trait]
pub trait RequestHandler<Endpoint>: 'static {
    async fn handle(&self, request: Request<Endpoint>) -> Result<Response, CoapError>;
}

#[async_trait]
impl<Endpoint, F, R> RequestHandler<Endpoint> for F
where
    Endpoint: Send + Sync + 'static,
    F: Fn(Request<Endpoint>) -> R + Sync + Send + 'static,
    R: Future<Output = Result<Response, CoapError>> + Send,
{
    async fn handle(&self, request: Request<Endpoint>) -> Result<Response, CoapError> {
        (self)(request).await
    }
}
