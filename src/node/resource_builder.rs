use std::collections::HashMap;

use coap_lite::link_format::LINK_ATTR_RESOURCE_TYPE;
use coap_lite::RequestType;
use log::warn;

use crate::node::core_link::{CoreLink, LinkAttr};
use crate::node::discovery::DiscoverableResource;
use crate::node::request_handler::RequestHandler;
use crate::node::request_type_key::RequestTypeKey;
use crate::node::resource_handler::{BoxedRequestHandler, ResourceHandler};
use crate::node::DataFormat;

/// Configure one resource of the node, with distinct per-method handlers.
pub struct ResourceBuilder<Endpoint> {
    path: String,
    discoverable: Option<bool>,
    data_format: Option<DataFormat>,
    attributes: CoreLink,
    handlers: HashMap<RequestTypeKey, BoxedRequestHandler<Endpoint>>,
}

impl<Endpoint: Send + Sync + 'static> ResourceBuilder<Endpoint> {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            discoverable: None,
            data_format: None,
            attributes: CoreLink::new(path),
            handlers: HashMap::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Kind of value this resource exchanges.  Sets the `rt` link attribute and makes the
    /// resource part of the node's advertisement.
    pub fn data_format(mut self, format: DataFormat) -> Self {
        self.data_format = Some(format);
        self.attributes.attr(LINK_ATTR_RESOURCE_TYPE, format);
        self
    }

    pub fn get_data_format(&self) -> Option<DataFormat> {
        self.data_format
    }

    /// Leave this resource out of `/.well-known/core` even if the node is discoverable.
    pub fn not_discoverable(mut self) -> Self {
        self.discoverable = Some(false);
        self
    }

    /// Add an attribute to this resource's CoRE link.  See
    /// [RFC 6690](https://datatracker.ietf.org/doc/html/rfc6690).
    pub fn link_attr(mut self, attr_name: &'static str, value: impl Into<LinkAttr>) -> Self {
        self.attributes.attr(attr_name, value);
        self
    }

    /// Catch-all handler for methods without a more specific handler, replacing the default
    /// "4.05 Method Not Allowed".
    pub fn default_handler(self, handler: impl RequestHandler<Endpoint> + Send + Sync) -> Self {
        self.handler(RequestTypeKey::new_match_all(), handler)
    }

    pub fn get(self, handler: impl RequestHandler<Endpoint> + Send + Sync) -> Self {
        self.handler(RequestType::Get.into(), handler)
    }

    pub fn put(self, handler: impl RequestHandler<Endpoint> + Send + Sync) -> Self {
        self.handler(RequestType::Put.into(), handler)
    }

    fn handler(
        mut self,
        key: RequestTypeKey,
        handler: impl RequestHandler<Endpoint> + Send + Sync,
    ) -> Self {
        self.handlers.insert(key, Box::new(handler));
        self
    }

    pub(crate) fn build(self, node_discoverable: bool) -> Resource<Endpoint> {
        let discoverable = if self.discoverable.unwrap_or(node_discoverable) {
            match self.attributes.format_single_link() {
                Ok(link_str) => Some(DiscoverableResource {
                    link_str,
                    attributes_as_string: self.attributes.attributes_as_strings(),
                }),
                Err(e) => {
                    warn!("Cannot format link for {}, hiding from discovery: {e}", self.path);
                    None
                }
            }
        } else {
            None
        };

        Resource {
            path: self.path,
            discoverable,
            handler: ResourceHandler {
                handlers: self.handlers,
            },
        }
    }
}

pub(crate) struct Resource<Endpoint> {
    pub path: String,
    pub discoverable: Option<DiscoverableResource>,
    pub handler: ResourceHandler<Endpoint>,
}
