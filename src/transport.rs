use std::fmt::Debug;
use std::io;
use std::pin::Pin;

use async_trait::async_trait;
use coap_lite::error::MessageError;
use coap_lite::Packet;
use futures::{Sink, Stream};

/// Source of CoAP packets for the node.  UDP is the only transport the testbed uses today, but
/// keeping this seam means tests (or a future DTLS binding) can feed packets without a socket.
#[async_trait]
pub trait Transport {
    type Endpoint: Debug + Send + Clone;

    /// Begin accepting data from this transport.  The binding is a continuous stream of
    /// (Packet, Endpoint) pairs, with the endpoint distinguishing each remote peer.
    async fn bind(self) -> Result<BoxedFramedBinding<Self::Endpoint>, TransportError>;
}

pub type BoxedFramedBinding<Endpoint> = Pin<Box<dyn FramedBinding<Endpoint>>>;

/// A bound transport exposed as both a stream of incoming packets and a sink of outgoing ones.
pub trait FramedBinding<Endpoint>:
    Send
    + Stream<Item = Result<FramedItem<Endpoint>, FramedReadError<Endpoint>>>
    + Sink<FramedItem<Endpoint>, Error = FramedWriteError>
{
    /// Address the binding is reachable at, if the transport has such a notion.
    fn local_endpoint(&self) -> Option<Endpoint>;
}

/// Parsed CoAP packet and the remote peer it came from (or is going to).
pub type FramedItem<Endpoint> = (Packet, Endpoint);

/// Error when receiving.  The endpoint is absent when the failure is not tied to any one peer,
/// for example when the bound socket itself has failed.
pub type FramedReadError<Endpoint> = (TransportError, Option<Endpoint>);

/// Error when sending.  The caller already knows which peer it was sending to.
pub type FramedWriteError = TransportError;

/// Transport-related failures.  Most are non-fatal and the node keeps serving other peers.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("packet was malformed: {0:?}")]
    MalformedPacket(MessageError),
}

impl From<MessageError> for TransportError {
    fn from(x: MessageError) -> Self {
        Self::MalformedPacket(x)
    }
}
