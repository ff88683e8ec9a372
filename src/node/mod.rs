//! Resource tree of a testbed node: registration by path, per-method dispatch, and
//! `/.well-known/core` discovery.

pub use builder::NodeBuilder;
pub use data_format::DataFormat;
pub use error::CoapError;
pub use node_handler::NodeHandler;
pub use request::Request;
pub use request_handler::RequestHandler;
pub use resource_builder::ResourceBuilder;
pub use response::Response;

pub mod builder;
mod coap_utils;
mod core_link;
pub mod data_format;
mod discovery;
pub mod error;
mod node_handler;
mod path_matcher;
pub mod request;
mod request_handler;
mod request_type_key;
pub mod resource_builder;
mod resource_handler;
pub mod response;

pub fn new<Endpoint: Send + Sync + 'static>() -> NodeBuilder<Endpoint> {
    NodeBuilder::new()
}

pub fn resource<Endpoint: Send + Sync + 'static>(path: &str) -> ResourceBuilder<Endpoint> {
    ResourceBuilder::new(path)
}
