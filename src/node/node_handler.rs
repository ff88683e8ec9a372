use std::fmt::Debug;
use std::pin::Pin;
use std::sync::Arc;

use coap_lite::{CoapRequest, CoapResponse, MessageClass, MessageType, Packet};
use futures::{stream, Stream, StreamExt};
use log::{debug, warn};

use crate::node::builder::NodeBuilder;
use crate::node::coap_utils::new_pong_message;
use crate::node::discovery::DiscoveryHandler;
use crate::node::path_matcher::{key_from_path, MatchedResult, PathMatcher};
use crate::node::resource_handler::ResourceHandler;
use crate::node::{CoapError, Request, Response};
use crate::packet_handler::PacketHandler;

/// Packet handler serving a node's resource tree.
pub struct NodeHandler<Endpoint> {
    handlers_by_path: Arc<PathMatcher<ResourceHandler<Endpoint>>>,
}

impl<Endpoint> Clone for NodeHandler<Endpoint> {
    fn clone(&self) -> Self {
        Self {
            handlers_by_path: self.handlers_by_path.clone(),
        }
    }
}

impl<Endpoint: Debug + Clone + Send + Sync + 'static> PacketHandler<Endpoint>
    for NodeHandler<Endpoint>
{
    fn handle<'a>(
        &'a self,
        packet: Packet,
        peer: Endpoint,
    ) -> Pin<Box<dyn Stream<Item = Packet> + Send + 'a>> {
        let replies = self.handle_packet(packet, peer);
        Box::pin(stream::once(replies).flat_map(stream::iter))
    }
}

impl<Endpoint: Debug + Clone + Send + Sync + 'static> NodeHandler<Endpoint> {
    pub fn from_builder(builder: NodeBuilder<Endpoint>) -> Self {
        let mut discoverable_resources = Vec::new();
        let mut handlers = Vec::new();
        for resource_builder in builder.resources {
            let resource = resource_builder.build(builder.discoverable);
            if let Some(discoverable) = resource.discoverable {
                discoverable_resources.push(discoverable);
            }
            handlers.push((resource.path, resource.handler));
        }

        if builder.discoverable {
            let core = DiscoveryHandler::new_resource_builder(discoverable_resources).build(false);
            handlers.push((core.path, core.handler));
        }

        Self {
            handlers_by_path: Arc::new(PathMatcher::from_path_strings(handlers)),
        }
    }

    async fn handle_packet(&self, packet: Packet, peer: Endpoint) -> Vec<Packet> {
        match packet.header.code {
            MessageClass::Request(_) => {
                self.handle_request(packet, peer).await.into_iter().collect()
            }
            MessageClass::Response(_) => {
                warn!("Spurious response message from {peer:?}, ignoring...");
                vec![]
            }
            MessageClass::Empty => match packet.header.get_type() {
                MessageType::Confirmable => vec![new_pong_message(&packet)],
                t => {
                    debug!("Ignoring empty {t:?} message from {peer:?}");
                    vec![]
                }
            },
            code => {
                warn!("Unhandled message code {code:?} from {peer:?}, ignoring...");
                vec![]
            }
        }
    }

    async fn handle_request(&self, packet: Packet, peer: Endpoint) -> Option<Packet> {
        // Only Confirmable and Non-confirmable requests can be answered.
        let Some(response_template) = CoapResponse::new(&packet) else {
            let t = packet.header.get_type();
            debug!("Ignoring request carried in a {t:?} message from {peer:?}");
            return None;
        };

        let request = CoapRequest::from_packet(packet, peer);
        let response = match self.dispatch(&request, response_template.clone()).await {
            Ok(response) => response,
            Err(e) => {
                debug!("Request from {:?} failed: {e}", request.source);
                e.into_response(response_template)
            }
        };
        Some(response.message)
    }

    async fn dispatch(
        &self,
        request: &CoapRequest<Endpoint>,
        response_template: Response,
    ) -> Result<Response, CoapError> {
        let paths = key_from_path(&request.get_path());

        let resource = self.handlers_by_path.lookup(&paths);
        if log::log_enabled!(log::Level::Debug) {
            let peer = &request.source;
            let method = request.get_method();
            let path = paths.join("/");
            let handler_label = resource
                .as_ref()
                .map_or_else(|| ": <no resource>!", |_| ": matched resource...");
            debug!("Received from [{peer:?}]: {method:?} /{path}{handler_label}");
        }

        match resource {
            Some(MatchedResult {
                matched_index,
                value,
            }) => {
                let wrapped_request = Request::new(
                    request.clone(),
                    paths[matched_index..].to_vec(),
                    response_template,
                );
                value.handle(wrapped_request).await
            }
            None => Err(CoapError::not_found()),
        }
    }
}
