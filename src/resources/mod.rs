//! The resources a testbed node offers.

use crate::config::NodeConfig;
use crate::node::{self, NodeBuilder};

pub mod led;
pub mod stats;
pub mod temperature;

use led::Led;
use stats::{RequestCounter, Stats};
use temperature::{SimulatedThermometer, Temperature};

/// Handles to the node's resources.  Clones share state with what is being served.
#[derive(Clone)]
pub struct TestbedResources {
    pub led: Led,
    pub temperature: Temperature,
    pub stats: Stats,
}

impl TestbedResources {
    pub fn from_config(config: &NodeConfig, sent: RequestCounter) -> Self {
        Self {
            led: Led::new(config.initial_led),
            temperature: Temperature::new(SimulatedThermometer::new(
                config.temperature_range.clone(),
            )),
            stats: Stats::new(sent),
        }
    }

    /// Resources in path order, which is also the order they are advertised in.
    pub fn into_node<Endpoint: Send + Sync + 'static>(self) -> NodeBuilder<Endpoint> {
        node::new()
            .resource(self.led.into_resource())
            .resource(self.stats.into_resource())
            .resource(self.temperature.into_resource())
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use coap_lite::{CoapRequest, MessageClass, MessageType, Packet, RequestType, ResponseType};
    use futures::StreamExt;

    use super::*;
    use crate::advertise::service_string;
    use crate::node::NodeHandler;
    use crate::packet_handler::{IntoHandler, PacketHandler};

    async fn get(handler: &NodeHandler<SocketAddr>, path: &str) -> Packet {
        let mut request: CoapRequest<SocketAddr> = CoapRequest::new();
        request.message.header.set_type(MessageType::NonConfirmable);
        request.set_method(RequestType::Get);
        request.set_path(path);
        let peer = "127.0.0.1:50001".parse().unwrap();
        let replies: Vec<_> = handler.handle(request.message, peer).collect().await;
        replies.into_iter().next().unwrap()
    }

    fn body(packet: &Packet) -> String {
        String::from_utf8(packet.payload.clone()).unwrap()
    }

    fn setup() -> (TestbedResources, RequestCounter, NodeHandler<SocketAddr>) {
        let config = NodeConfig {
            temperature_range: 20..=22,
            ..NodeConfig::default()
        };
        let counter = RequestCounter::default();
        let resources = TestbedResources::from_config(&config, counter.clone());
        let handler = resources.clone().into_node().into_handler();
        (resources, counter, handler)
    }

    #[test]
    fn test_advertised_in_path_order() {
        let (resources, _, _) = setup();
        let node: NodeBuilder<SocketAddr> = resources.into_node();
        assert_eq!(
            service_string(&node.service_entries()),
            "/actuator/led:boolean,/cli/stats:unspecified,/sensor/temperature:number,"
        );
    }

    #[tokio::test]
    async fn test_temperature_in_configured_range() {
        let (_, _, handler) = setup();
        let reply = get(&handler, "/sensor/temperature").await;
        assert_eq!(reply.header.code, MessageClass::Response(ResponseType::Content));
        // Non-confirmable requests get non-confirmable responses.
        assert_eq!(reply.header.get_type(), MessageType::NonConfirmable);
        let reading: i16 = body(&reply).parse().unwrap();
        assert!((20..=22).contains(&reading));
    }

    #[tokio::test]
    async fn test_stats_follow_counter() {
        let (_, counter, handler) = setup();
        assert_eq!(body(&get(&handler, "/cli/stats").await), "0");
        counter.increment();
        counter.increment();
        assert_eq!(body(&get(&handler, "/cli/stats").await), "2");
    }

    #[tokio::test]
    async fn test_led_handle_shares_state() {
        let (resources, _, handler) = setup();
        assert_eq!(body(&get(&handler, "/actuator/led").await), "off");
        resources.led.set(led::LedState::On).await.unwrap();
        assert_eq!(body(&get(&handler, "/actuator/led").await), "on");
    }

    #[tokio::test]
    async fn test_discovery_lists_all() {
        let (_, _, handler) = setup();
        assert_eq!(
            body(&get(&handler, "/.well-known/core").await),
            concat!(
                r#"</actuator/led>;rt="boolean";ct=0,"#,
                r#"</cli/stats>;rt="unspecified","#,
                r#"</sensor/temperature>;rt="number""#
            )
        );
    }

    #[tokio::test]
    async fn test_subpaths_not_found() {
        let (_, _, handler) = setup();
        for path in ["/sensor/temperature/x", "/cli/stats/x", "/actuator/led/x"] {
            let reply = get(&handler, path).await;
            assert_eq!(
                reply.header.code,
                MessageClass::Response(ResponseType::NotFound),
                "{path}"
            );
        }
    }
}
