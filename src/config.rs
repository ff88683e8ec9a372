use std::net::{Ipv6Addr, SocketAddr, SocketAddrV6};
use std::ops::RangeInclusive;
use std::time::Duration;

use clap::Parser;

use crate::resources::led::LedState;

/// Default CoAP port (RFC 7252).
pub const DEFAULT_COAP_PORT: u16 = 5683;

/// Port the testbed display node listens on for advertisements.
pub const DEFAULT_DISPLAY_PORT: u16 = 6666;

pub const DEFAULT_ADVERTISE_INTERVAL: Duration = Duration::from_secs(10);

pub const DEFAULT_ADVERTISE_PATH: &str = "/devices";

/// Simulated CoAP device node for the IoT testbed.
#[derive(Parser, Debug, Clone)]
#[command(name = "testbed-node", version)]
pub struct NodeArgs {
    /// Address to serve CoAP on
    #[arg(long, env = "TESTBED_NODE_BIND", default_value_t = default_bind())]
    pub bind: SocketAddr,

    /// Join the all-CoAP-nodes multicast groups
    #[arg(long, env = "TESTBED_NODE_MULTICAST", default_value_t = false)]
    pub multicast: bool,

    /// Where to send advertisements
    #[arg(
        long,
        env = "TESTBED_NODE_ADVERTISE_TARGET",
        default_value_t = default_advertise_target()
    )]
    pub advertise_target: SocketAddr,

    /// Seconds between advertisements
    #[arg(
        long,
        env = "TESTBED_NODE_ADVERTISE_INTERVAL",
        default_value_t = DEFAULT_ADVERTISE_INTERVAL.as_secs()
    )]
    pub advertise_interval: u64,

    /// Do not advertise the node at all
    #[arg(long, env = "TESTBED_NODE_NO_ADVERTISE", default_value_t = false)]
    pub no_advertise: bool,

    /// LED state at startup (on or off)
    #[arg(long, env = "TESTBED_NODE_INITIAL_LED", default_value = "off")]
    pub initial_led: LedState,

    /// Lowest simulated temperature reading, degrees Celsius
    #[arg(
        long,
        env = "TESTBED_NODE_TEMPERATURE_MIN",
        default_value_t = 18,
        allow_negative_numbers = true
    )]
    pub temperature_min: i16,

    /// Highest simulated temperature reading, degrees Celsius
    #[arg(
        long,
        env = "TESTBED_NODE_TEMPERATURE_MAX",
        default_value_t = 26,
        allow_negative_numbers = true
    )]
    pub temperature_max: i16,
}

fn default_bind() -> SocketAddr {
    SocketAddr::V6(SocketAddrV6::new(Ipv6Addr::UNSPECIFIED, DEFAULT_COAP_PORT, 0, 0))
}

/// All-nodes link-local multicast.
fn default_advertise_target() -> SocketAddr {
    let all_nodes = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 1);
    SocketAddr::V6(SocketAddrV6::new(all_nodes, DEFAULT_DISPLAY_PORT, 0, 0))
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("advertise interval must be at least one second")]
    ZeroAdvertiseInterval,

    #[error("temperature range is empty: min {min} > max {max}")]
    EmptyTemperatureRange { min: i16, max: i16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertiseConfig {
    pub target: SocketAddr,
    pub interval: Duration,
    pub path: String,
}

impl Default for AdvertiseConfig {
    fn default() -> Self {
        Self {
            target: default_advertise_target(),
            interval: DEFAULT_ADVERTISE_INTERVAL,
            path: DEFAULT_ADVERTISE_PATH.to_string(),
        }
    }
}

/// Validated node configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    pub bind: SocketAddr,
    pub multicast: bool,
    /// `None` when advertising is switched off.
    pub advertise: Option<AdvertiseConfig>,
    pub initial_led: LedState,
    pub temperature_range: RangeInclusive<i16>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            multicast: false,
            advertise: Some(AdvertiseConfig::default()),
            initial_led: LedState::Off,
            temperature_range: 18..=26,
        }
    }
}

impl TryFrom<NodeArgs> for NodeConfig {
    type Error = ConfigError;

    fn try_from(args: NodeArgs) -> Result<Self, Self::Error> {
        if args.temperature_min > args.temperature_max {
            return Err(ConfigError::EmptyTemperatureRange {
                min: args.temperature_min,
                max: args.temperature_max,
            });
        }
        let advertise = if args.no_advertise {
            None
        } else {
            if args.advertise_interval == 0 {
                return Err(ConfigError::ZeroAdvertiseInterval);
            }
            Some(AdvertiseConfig {
                target: args.advertise_target,
                interval: Duration::from_secs(args.advertise_interval),
                path: DEFAULT_ADVERTISE_PATH.to_string(),
            })
        };

        Ok(Self {
            bind: args.bind,
            multicast: args.multicast,
            advertise,
            initial_led: args.initial_led,
            temperature_range: args.temperature_min..=args.temperature_max,
        })
    }
}
