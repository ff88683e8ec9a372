use std::fmt::Debug;

use crate::advertise::ServiceEntry;
use crate::node::node_handler::NodeHandler;
use crate::node::ResourceBuilder;
use crate::packet_handler::IntoHandler;

/// Collects the node's resources before serving.
pub struct NodeBuilder<Endpoint> {
    pub(crate) discoverable: bool,
    pub(crate) resources: Vec<ResourceBuilder<Endpoint>>,
}

impl<Endpoint> Default for NodeBuilder<Endpoint> {
    fn default() -> Self {
        Self {
            discoverable: true,
            resources: Vec::new(),
        }
    }
}

impl<Endpoint: Send + Sync + 'static> NodeBuilder<Endpoint> {
    pub fn new() -> Self {
        Default::default()
    }

    /// Turn off `/.well-known/core` entirely.  Individual resources can also opt out with
    /// [`ResourceBuilder::not_discoverable`].
    pub fn not_discoverable(mut self) -> Self {
        self.discoverable = false;
        self
    }

    /// Register a resource.  A later resource with the same path replaces the earlier one.
    pub fn resource(mut self, resource: ResourceBuilder<Endpoint>) -> Self {
        self.resources.retain(|r| r.path() != resource.path());
        self.resources.push(resource);
        self
    }

    /// Resources that declared a data format, in registration order.  This is what the node
    /// announces to the testbed.
    pub fn service_entries(&self) -> Vec<ServiceEntry> {
        self.resources
            .iter()
            .filter_map(|r| {
                r.get_data_format()
                    .map(|format| ServiceEntry::new(r.path(), format))
            })
            .collect()
    }
}

impl<Endpoint> IntoHandler<NodeHandler<Endpoint>, Endpoint> for NodeBuilder<Endpoint>
where
    Endpoint: Debug + Clone + Send + Sync + 'static,
{
    fn into_handler(self) -> NodeHandler<Endpoint> {
        NodeHandler::from_builder(self)
    }
}
