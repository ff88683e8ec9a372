use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use coap_lite::ContentFormat;

use crate::node::{self, CoapError, DataFormat, Request, ResourceBuilder, Response};

/// Count of requests the node itself has sent out.
#[derive(Debug, Clone, Default)]
pub struct RequestCounter(Arc<AtomicU64>);

impl RequestCounter {
    /// Returns the new count.
    pub fn increment(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// `GET /cli/stats`: decimal count of outgoing requests.
#[derive(Debug, Clone)]
pub struct Stats {
    sent: RequestCounter,
}

impl Stats {
    pub const PATH: &'static str = "/cli/stats";

    pub fn new(sent: RequestCounter) -> Self {
        Self { sent }
    }

    pub fn into_resource<Endpoint: Send + Sync + 'static>(self) -> ResourceBuilder<Endpoint> {
        node::resource(Self::PATH)
            .data_format(DataFormat::Unspecified)
            .get(move |request: Request<Endpoint>| {
                let stats = self.clone();
                async move { stats.handle_get(request) }
            })
    }

    fn handle_get<Endpoint>(&self, request: Request<Endpoint>) -> Result<Response, CoapError> {
        request.reject_subpath()?;
        let mut response = request.new_response();
        response.message.payload = self.sent.get().to_string().into_bytes();
        response
            .message
            .set_content_format(ContentFormat::TextPlain);
        Ok(response)
    }
}
