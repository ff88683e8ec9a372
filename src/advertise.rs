//! Periodic self-advertisement to the testbed display node.
//!
//! The node POSTs its service string to `/devices` on the display node, which records the
//! sender's address and the resources it offers.  Nothing is expected back.

use std::fmt::Write;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use coap_lite::error::MessageError;
use coap_lite::{CoapRequest, ContentFormat, MessageType, RequestType};
use log::{debug, info, warn};
use rand::Rng;
use tokio::net::UdpSocket;
use tokio::time::MissedTickBehavior;

use crate::config::AdvertiseConfig;
use crate::node::DataFormat;
use crate::resources::stats::RequestCounter;

/// One advertised resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEntry {
    pub path: String,
    pub format: DataFormat,
}

impl ServiceEntry {
    pub fn new(path: &str, format: DataFormat) -> Self {
        Self {
            path: path.to_string(),
            format,
        }
    }
}

/// `<path>:<format>,` for every entry, in order.  The trailing comma is part of the format the
/// display node parses.
pub fn service_string(entries: &[ServiceEntry]) -> String {
    entries.iter().fold(String::new(), |mut out, entry| {
        let _ = write!(out, "{}:{},", entry.path, entry.format);
        out
    })
}

#[derive(thiserror::Error, Debug)]
pub enum AdvertiseError {
    #[error("node has no resources with a data format to advertise")]
    NothingToAdvertise,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cannot encode advertisement: {0:?}")]
    Encode(MessageError),

    #[error("short send: {sent} of {expected} bytes")]
    ShortSend { sent: usize, expected: usize },
}

impl From<MessageError> for AdvertiseError {
    fn from(e: MessageError) -> Self {
        Self::Encode(e)
    }
}

pub struct Advertiser {
    socket: UdpSocket,
    config: AdvertiseConfig,
    payload: String,
    sent: RequestCounter,
}

impl Advertiser {
    /// Bind an ephemeral socket of the target's address family.
    pub async fn bind(
        config: AdvertiseConfig,
        entries: &[ServiceEntry],
        sent: RequestCounter,
    ) -> Result<Self, AdvertiseError> {
        if entries.is_empty() {
            return Err(AdvertiseError::NothingToAdvertise);
        }
        let local: SocketAddr = match config.target {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(local).await?;
        let payload = service_string(entries);
        info!("Service string: {payload}");
        Ok(Self {
            socket,
            config,
            payload,
            sent,
        })
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Advertise now and then every interval, forever.  Failed sends are retried on the next
    /// tick.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            info!("Advertising to {}", self.config.target);
            if let Err(e) = self.advertise_once().await {
                warn!("Advertisement failed, will re-advertise: {e}");
            }
        }
    }

    pub async fn advertise_once(&self) -> Result<(), AdvertiseError> {
        let bytes = self.encode()?;
        let sent = self.socket.send_to(&bytes, self.config.target).await?;
        if sent != bytes.len() {
            return Err(AdvertiseError::ShortSend {
                sent,
                expected: bytes.len(),
            });
        }
        let total = self.sent.increment();
        debug!("Advertisement sent ({sent} bytes, {total} requests so far)");
        Ok(())
    }

    fn encode(&self) -> Result<Vec<u8>, AdvertiseError> {
        let mut rng = rand::thread_rng();
        let mut request: CoapRequest<SocketAddr> = CoapRequest::new();
        // Usually multicast, so there is nobody to acknowledge a Confirmable.
        request.message.header.set_type(MessageType::NonConfirmable);
        request.message.header.message_id = rng.gen();
        request.message.set_token(rng.gen::<[u8; 4]>().to_vec());
        request.set_method(RequestType::Post);
        request.set_path(&self.config.path);
        request
            .message
            .set_content_format(ContentFormat::TextPlain);
        request.message.payload = self.payload.clone().into_bytes();
        Ok(request.message.to_bytes()?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use coap_lite::Packet;

    use super::*;

    fn entries() -> Vec<ServiceEntry> {
        vec![
            ServiceEntry::new("/actuator/led", DataFormat::Boolean),
            ServiceEntry::new("/cli/stats", DataFormat::Unspecified),
            ServiceEntry::new("/sensor/temperature", DataFormat::Number),
        ]
    }

    #[test]
    fn test_service_string() {
        assert_eq!(
            service_string(&entries()),
            "/actuator/led:boolean,/cli/stats:unspecified,/sensor/temperature:number,"
        );
        assert_eq!(service_string(&[]), "");
    }

    #[tokio::test]
    async fn test_nothing_to_advertise() {
        let config = AdvertiseConfig {
            target: "127.0.0.1:6666".parse().unwrap(),
            ..AdvertiseConfig::default()
        };
        let result = Advertiser::bind(config, &[], RequestCounter::default()).await;
        assert!(matches!(result, Err(AdvertiseError::NothingToAdvertise)));
    }

    #[tokio::test]
    async fn test_advertise_once() {
        let display_node = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let config = AdvertiseConfig {
            target: display_node.local_addr().unwrap(),
            ..AdvertiseConfig::default()
        };
        let counter = RequestCounter::default();
        let advertiser = Advertiser::bind(config, &entries(), counter.clone())
            .await
            .unwrap();

        advertiser.advertise_once().await.unwrap();

        let mut buf = [0u8; 1152];
        let (n, from) = display_node.recv_from(&mut buf).await.unwrap();
        let packet = Packet::from_bytes(&buf[..n]).unwrap();
        assert_eq!(packet.header.get_type(), MessageType::NonConfirmable);
        assert_eq!(packet.get_content_format(), Some(ContentFormat::TextPlain));
        assert_eq!(packet.payload, advertiser.payload().as_bytes());

        let request = CoapRequest::from_packet(packet, from);
        assert_eq!(*request.get_method(), RequestType::Post);
        assert_eq!(request.get_path(), "devices");
        assert_eq!(counter.get(), 1);
    }

    /// Limited broadcast without `SO_BROADCAST` is refused by the kernel.
    fn refused_target() -> AdvertiseConfig {
        AdvertiseConfig {
            target: (Ipv4Addr::BROADCAST, 6666).into(),
            interval: Duration::from_secs(10),
            ..AdvertiseConfig::default()
        }
    }

    #[tokio::test]
    async fn test_failed_send_not_counted() {
        let counter = RequestCounter::default();
        let advertiser = Advertiser::bind(refused_target(), &entries(), counter.clone())
            .await
            .unwrap();

        let result = advertiser.advertise_once().await;
        assert!(matches!(result, Err(AdvertiseError::Io(_))));
        assert_eq!(counter.get(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_keeps_retrying_after_failures() {
        let counter = RequestCounter::default();
        let advertiser = Advertiser::bind(refused_target(), &entries(), counter.clone())
            .await
            .unwrap();

        let task = tokio::spawn(advertiser.run());
        tokio::time::sleep(Duration::from_secs(35)).await;

        assert!(!task.is_finished());
        assert_eq!(counter.get(), 0);
        task.abort();
    }
}
