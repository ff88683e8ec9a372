use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use coap_lite::{ContentFormat, ResponseType};

use crate::node::coap_utils;
use crate::node::request_handler::RequestHandler;
use crate::node::{CoapError, Request, ResourceBuilder, Response};

pub const WELL_KNOWN_CORE: &str = "/.well-known/core";

/// Resource as listed in `/.well-known/core`.
#[derive(Debug, Clone)]
pub(crate) struct DiscoverableResource {
    /// Preformatted link so the listing is a plain join.
    pub link_str: String,

    /// Attribute values for `GET /.well-known/core?rt=boolean` style filtering.
    pub attributes_as_string: HashMap<&'static str, String>,
}

#[derive(Clone)]
pub(crate) struct DiscoveryHandler {
    resources: Arc<Vec<DiscoverableResource>>,
}

impl DiscoveryHandler {
    pub fn new_resource_builder<Endpoint: Send + Sync + 'static>(
        resources: Vec<DiscoverableResource>,
    ) -> ResourceBuilder<Endpoint> {
        let me = Self {
            resources: Arc::new(resources),
        };
        ResourceBuilder::new(WELL_KNOWN_CORE)
            .not_discoverable()
            .get(me)
    }
}

#[async_trait]
impl<Endpoint: Send + 'static> RequestHandler<Endpoint> for DiscoveryHandler {
    async fn handle(&self, request: Request<Endpoint>) -> Result<Response, CoapError> {
        let queries = coap_utils::request_get_queries(&request.original);

        let mut response = request.new_response();
        response.message.payload = self
            .resources
            .iter()
            .filter(|&r| filter_by_query(r, &queries))
            .map(|r| r.link_str.as_str())
            .collect::<Vec<_>>()
            .join(",")
            .into_bytes();
        response.set_status(ResponseType::Content);
        response
            .message
            .set_content_format(ContentFormat::ApplicationLinkFormat);
        Ok(response)
    }
}

/// All queries must match.  A trailing `*` makes the value a prefix match (RFC 6690 section 4.1).
fn filter_by_query(resource: &DiscoverableResource, queries: &HashMap<String, String>) -> bool {
    queries.iter().all(|(key, value)| {
        let Some(actual) = resource.attributes_as_string.get(key.as_str()) else {
            return false;
        };
        match value.strip_suffix('*') {
            Some(prefix) => actual.starts_with(prefix),
            None => actual == value,
        }
    })
}
