use std::fmt::Debug;

use coap_lite::Packet;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use log::{error, trace, warn};
use tokio::sync::mpsc::{self, Receiver, Sender};

use crate::packet_handler::{IntoHandler, PacketHandler};
use crate::transport::{BoxedFramedBinding, FramedItem, Transport, TransportError};

/// Replies waiting for the socket.  Handlers block on a full queue rather than drop replies.
const REPLY_QUEUE_DEPTH: usize = 32;

type ReplySink<Endpoint> = SplitSink<BoxedFramedBinding<Endpoint>, FramedItem<Endpoint>>;

/// A node bound to its transport, ready to serve.
pub struct NodeServer<Endpoint> {
    binding: BoxedFramedBinding<Endpoint>,
}

impl<Endpoint: Debug + Send + Clone + 'static> NodeServer<Endpoint> {
    /// Bind to a source of incoming packets.  The testbed uses [`crate::udp::UdpTransport`].
    pub async fn bind<T: Transport<Endpoint = Endpoint>>(
        transport: T,
    ) -> Result<Self, TransportError> {
        let binding = transport.bind().await?;
        Ok(Self { binding })
    }

    pub fn local_endpoint(&self) -> Option<Endpoint> {
        self.binding.local_endpoint()
    }

    /// Serve until the binding fails.  Each request is answered from its own task while a
    /// single writer task owns the sending half of the binding.  A datagram that can't be
    /// parsed is dropped and the node carries on.
    pub async fn serve<Handler>(
        self,
        handler: impl IntoHandler<Handler, Endpoint>,
    ) -> Result<(), FatalServerError>
    where
        Handler: PacketHandler<Endpoint> + Send + 'static,
    {
        let handler = handler.into_handler();
        let (sink, mut incoming) = self.binding.split();
        let (reply_tx, reply_rx) = mpsc::channel(REPLY_QUEUE_DEPTH);
        tokio::spawn(send_replies(sink, reply_rx));

        while let Some(item) = incoming.next().await {
            match item {
                Ok((packet, peer)) => {
                    trace!("Incoming packet from {peer:?}: {packet:?}");
                    tokio::spawn(reply_to(handler.clone(), packet, peer, reply_tx.clone()));
                }
                Err((e, Some(peer))) => warn!("Dropping datagram from {peer:?}: {e}"),
                Err((e, None)) => {
                    error!("Transport failed: {e}");
                    return Err(e.into());
                }
            }
        }

        Err(FatalServerError::BindingClosed)
    }
}

async fn reply_to<Handler, Endpoint>(
    handler: Handler,
    packet: Packet,
    peer: Endpoint,
    reply_tx: Sender<FramedItem<Endpoint>>,
) where
    Handler: PacketHandler<Endpoint>,
    Endpoint: Debug + Clone,
{
    let mut replies = handler.handle(packet, peer.clone());
    while let Some(reply) = replies.next().await {
        if reply_tx.send((reply, peer.clone())).await.is_err() {
            warn!("Server stopped before reply to {peer:?} could be sent");
            break;
        }
    }
}

async fn send_replies<Endpoint: Debug + Clone>(
    mut sink: ReplySink<Endpoint>,
    mut replies: Receiver<FramedItem<Endpoint>>,
) {
    while let Some((packet, peer)) = replies.recv().await {
        trace!("Outgoing packet to {peer:?}: {packet:?}");
        if let Err(e) = sink.send((packet, peer.clone())).await {
            error!("Error sending to {peer:?}: {e}");
        }
    }
}

/// Error that stops the node from serving.
#[derive(thiserror::Error, Debug)]
pub enum FatalServerError {
    /// Transport error not tied to any peer.  The binding can't be used any more.
    #[error("fatal transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("transport binding closed")]
    BindingClosed,
}
