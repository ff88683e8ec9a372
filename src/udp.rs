use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::BytesMut;
use coap_lite::Packet;
use futures::{ready, Sink, Stream};
use log::debug;
use pin_project::pin_project;
use tokio::net::{ToSocketAddrs, UdpSocket};
use tokio_util::codec::{Decoder, Encoder};
use tokio_util::udp::UdpFramed;

use crate::transport::{BoxedFramedBinding, FramedBinding, Transport, TransportError};

/// All-CoAP-nodes group for IPv4 (RFC 7252 section 12.8).
const ALL_COAP_NODES_V4: Ipv4Addr = Ipv4Addr::new(224, 0, 1, 187);

/// All-CoAP-nodes groups for IPv6, link-local and site-local scope.
const ALL_COAP_NODES_V6_LINK: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 0xfd);
const ALL_COAP_NODES_V6_SITE: Ipv6Addr = Ipv6Addr::new(0xff05, 0, 0, 0, 0, 0, 0, 0xfd);

/// CoAP over plain UDP as defined in RFC 7252.
pub struct UdpTransport<A: ToSocketAddrs> {
    addresses: A,
    multicast: bool,
}

impl<A: ToSocketAddrs> UdpTransport<A> {
    pub fn new(addresses: A) -> Self {
        Self {
            addresses,
            multicast: false,
        }
    }

    /// Join the all-CoAP-nodes groups of the bound address family so that testbed controllers
    /// can discover the node without knowing its address.
    pub fn enable_multicast(mut self) -> Self {
        self.multicast = true;
        self
    }
}

#[async_trait]
impl<A: ToSocketAddrs + Sync + Send> Transport for UdpTransport<A> {
    type Endpoint = SocketAddr;

    async fn bind(self) -> Result<BoxedFramedBinding<Self::Endpoint>, TransportError> {
        let socket = UdpSocket::bind(self.addresses).await?;
        let local_addr = socket.local_addr()?;
        if self.multicast {
            join_all_coap_nodes(&socket, local_addr)?;
        }
        debug!("Bound UDP transport to {local_addr}");
        let binding = UdpBinding {
            framed_socket: UdpFramed::new(socket, Codec),
            local_addr,
        };
        Ok(Box::pin(binding))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MulticastGroup {
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
}

fn join_all_coap_nodes(socket: &UdpSocket, local_addr: SocketAddr) -> io::Result<()> {
    let (ipv4_interface, ipv6_interface) = match local_addr {
        SocketAddr::V4(local) => (*local.ip(), 0),
        SocketAddr::V6(local) => (Ipv4Addr::UNSPECIFIED, local.scope_id()),
    };
    for group in default_groups(local_addr) {
        debug!("Joining {group:?}...");
        match group {
            MulticastGroup::Ipv4(addr) => socket.join_multicast_v4(addr, ipv4_interface)?,
            MulticastGroup::Ipv6(addr) => socket.join_multicast_v6(&addr, ipv6_interface)?,
        }
    }
    Ok(())
}

fn default_groups(local_addr: SocketAddr) -> Vec<MulticastGroup> {
    match local_addr {
        SocketAddr::V4(_) => vec![MulticastGroup::Ipv4(ALL_COAP_NODES_V4)],
        SocketAddr::V6(_) => vec![
            MulticastGroup::Ipv6(ALL_COAP_NODES_V6_LINK),
            MulticastGroup::Ipv6(ALL_COAP_NODES_V6_SITE),
        ],
    }
}

#[pin_project]
struct UdpBinding {
    #[pin]
    framed_socket: UdpFramed<Codec>,
    local_addr: SocketAddr,
}

impl FramedBinding<SocketAddr> for UdpBinding {
    fn local_endpoint(&self) -> Option<SocketAddr> {
        Some(self.local_addr)
    }
}

impl Stream for UdpBinding {
    type Item = Result<(Packet, SocketAddr), (TransportError, Option<SocketAddr>)>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let item = match ready!(self.project().framed_socket.poll_next(cx)) {
            Some(Ok((Ok(packet), peer))) => Some(Ok((packet, peer))),
            Some(Ok((Err(e), peer))) => Some(Err((e, Some(peer)))),
            Some(Err(e)) => Some(Err((e, None))),
            None => None,
        };
        Poll::Ready(item)
    }
}

impl Sink<(Packet, SocketAddr)> for UdpBinding {
    type Error = TransportError;

    fn poll_ready(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.project().framed_socket.poll_ready(cx)
    }

    fn start_send(self: Pin<&mut Self>, item: (Packet, SocketAddr)) -> Result<(), Self::Error> {
        self.project().framed_socket.start_send(item)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.project().framed_socket.poll_flush(cx)
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.project().framed_socket.poll_close(cx)
    }
}

/// One datagram is one CoAP message.  Parse failures are yielded as items rather than codec
/// errors so that the peer address survives and a single bad datagram can't end the stream.
struct Codec;

impl Decoder for Codec {
    type Item = Result<Packet, TransportError>;
    type Error = TransportError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, TransportError> {
        if buf.is_empty() {
            return Ok(None);
        }
        let result = Packet::from_bytes(buf).map_err(TransportError::from);
        buf.clear();
        Ok(Some(result))
    }
}

impl Encoder<Packet> for Codec {
    type Error = TransportError;

    fn encode(&mut self, packet: Packet, buf: &mut BytesMut) -> Result<(), TransportError> {
        buf.extend_from_slice(&packet.to_bytes()?[..]);
        Ok(())
    }
}
