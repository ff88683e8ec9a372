use std::collections::HashMap;

use crate::node::request_handler::RequestHandler;
use crate::node::request_type_key::RequestTypeKey;
use crate::node::{CoapError, Request, Response};

pub(crate) type BoxedRequestHandler<Endpoint> = Box<dyn RequestHandler<Endpoint> + Send + Sync>;

/// Per-method handlers registered for one path.
pub(crate) struct ResourceHandler<Endpoint> {
    pub handlers: HashMap<RequestTypeKey, BoxedRequestHandler<Endpoint>>,
}

impl<Endpoint: 'static> ResourceHandler<Endpoint> {
    /// Dispatch on the request method, falling back to the default handler if one was set.
    pub async fn handle(&self, request: Request<Endpoint>) -> Result<Response, CoapError> {
        let method = *request.original.get_method();
        let handler = self
            .handlers
            .get(&RequestTypeKey::from(method))
            .or_else(|| self.handlers.get(&RequestTypeKey::new_match_all()));

        match handler {
            Some(handler) => handler.handle(request).await,
            None => Err(CoapError::method_not_allowed()),
        }
    }
}
