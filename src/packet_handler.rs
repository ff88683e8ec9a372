use std::pin::Pin;

use coap_lite::Packet;
use futures::Stream;

/// Raw packet callback: a packet has arrived from `peer`, and any number of packets may be sent
/// back to it in reply.
///
/// The node's own resources go through [`crate::node::new`], which takes care of protocol norms
/// such as piggybacked responses and ping replies.  Implement this directly only when a test or
/// tool needs to see the wire traffic untouched.
pub trait PacketHandler<Endpoint>: Clone {
    fn handle<'a>(
        &'a self,
        packet: Packet,
        peer: Endpoint,
    ) -> Pin<Box<dyn Stream<Item = Packet> + Send + 'a>>;
}

pub trait IntoHandler<Handler, Endpoint>
where
    Handler: PacketHandler<Endpoint> + Send + 'static,
{
    fn into_handler(self) -> Handler;
}

impl<Handler, Endpoint> IntoHandler<Handler, Endpoint> for Handler
where
    Handler: PacketHandler<Endpoint> + Send + 'static,
{
    fn into_handler(self) -> Handler {
        self
    }
}
