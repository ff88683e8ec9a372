//! Startup of a complete testbed node: CoAP endpoint first, advertising second.

use std::net::SocketAddr;

use crate::advertise::{AdvertiseError, Advertiser};
use crate::config::NodeConfig;
use crate::node::NodeBuilder;
use crate::resources::stats::RequestCounter;
use crate::resources::TestbedResources;
use crate::server::{FatalServerError, NodeServer};
use crate::transport::TransportError;
use crate::udp::UdpTransport;

#[derive(thiserror::Error, Debug)]
pub enum StartupError {
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: TransportError,
    },

    #[error("cannot set up advertising: {0}")]
    Advertise(#[from] AdvertiseError),
}

/// A node whose endpoint is bound but which isn't serving or advertising yet.
pub struct TestbedNode {
    server: NodeServer<SocketAddr>,
    node: NodeBuilder<SocketAddr>,
    resources: TestbedResources,
    advertiser: Option<Advertiser>,
}

impl TestbedNode {
    /// The advertiser is only set up once the endpoint is bound, so a node that can't serve
    /// never announces itself.
    pub async fn bind(config: &NodeConfig) -> Result<Self, StartupError> {
        let mut transport = UdpTransport::new(config.bind);
        if config.multicast {
            transport = transport.enable_multicast();
        }
        let server = NodeServer::bind(transport)
            .await
            .map_err(|source| StartupError::Bind {
                addr: config.bind,
                source,
            })?;

        let sent = RequestCounter::default();
        let resources = TestbedResources::from_config(config, sent.clone());
        let node = resources.clone().into_node();
        let advertiser = match &config.advertise {
            Some(advertise) => {
                Some(Advertiser::bind(advertise.clone(), &node.service_entries(), sent).await?)
            }
            None => None,
        };

        Ok(Self {
            server,
            node,
            resources,
            advertiser,
        })
    }

    pub fn local_endpoint(&self) -> Option<SocketAddr> {
        self.server.local_endpoint()
    }

    /// Handles sharing state with the resources about to be served.
    pub fn resources(&self) -> &TestbedResources {
        &self.resources
    }

    /// Start advertising, then serve until the endpoint fails.
    pub async fn run(self) -> Result<(), FatalServerError> {
        if let Some(advertiser) = self.advertiser {
            tokio::spawn(advertiser.run());
        }
        self.server.serve(self.node).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use coap_lite::{CoapRequest, Packet, RequestType};
    use tokio::net::UdpSocket;
    use tokio::time::timeout;

    use super::*;
    use crate::config::AdvertiseConfig;

    fn config(bind: SocketAddr, display_node: SocketAddr) -> NodeConfig {
        NodeConfig {
            bind,
            advertise: Some(AdvertiseConfig {
                target: display_node,
                interval: Duration::from_secs(1),
                ..AdvertiseConfig::default()
            }),
            ..NodeConfig::default()
        }
    }

    #[tokio::test]
    async fn test_bind_failure_is_not_advertised() {
        let occupied = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let display_node = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let config = config(
            occupied.local_addr().unwrap(),
            display_node.local_addr().unwrap(),
        );

        let result = TestbedNode::bind(&config).await;
        assert!(matches!(result, Err(StartupError::Bind { .. })));

        let mut buf = [0u8; 1152];
        let heard = timeout(Duration::from_millis(300), display_node.recv_from(&mut buf)).await;
        assert!(heard.is_err(), "display node heard from a node that never served");
    }

    #[tokio::test]
    async fn test_advertises_once_serving() {
        let display_node = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let config = config(
            "127.0.0.1:0".parse().unwrap(),
            display_node.local_addr().unwrap(),
        );

        let node = TestbedNode::bind(&config).await.unwrap();
        assert!(node.local_endpoint().is_some());
        tokio::spawn(node.run());

        let mut buf = [0u8; 1152];
        let (n, from) = timeout(Duration::from_secs(5), display_node.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();
        let request = CoapRequest::from_packet(Packet::from_bytes(&buf[..n]).unwrap(), from);
        assert_eq!(*request.get_method(), RequestType::Post);
        assert_eq!(request.get_path(), "devices");
        assert_eq!(
            request.message.payload,
            b"/actuator/led:boolean,/cli/stats:unspecified,/sensor/temperature:number,"
        );
    }
}
