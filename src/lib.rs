//! Simulated device node for a CoAP-based IoT testbed.
//!
//! A node serves a handful of resources over CoAP (an LED actuator, a temperature sensor and
//! request statistics), lists them at `/.well-known/core`, and periodically advertises itself
//! to the testbed's display node.
//!
//! # Examples
//! ```no_run
//! use testbed_node::resources::led::{Led, LedState};
//! use testbed_node::{node, FatalServerError, NodeServer, UdpTransport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), FatalServerError> {
//!     let server = NodeServer::bind(UdpTransport::new("[::]:5683")).await?;
//!     server
//!         .serve(node::new().resource(Led::new(LedState::Off).into_resource()))
//!         .await
//! }
//! ```

pub use server::FatalServerError;
pub use server::NodeServer;
pub use udp::UdpTransport;

pub mod advertise;
pub mod config;
pub mod node;
pub mod packet_handler;
pub mod resources;
pub mod server;
pub mod testbed;
pub mod transport;
pub mod udp;
