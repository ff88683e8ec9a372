use std::ops::RangeInclusive;
use std::sync::Arc;

use coap_lite::ContentFormat;
use rand::Rng;

use crate::node::{self, CoapError, DataFormat, Request, ResourceBuilder, Response};

/// Anything that can produce a temperature reading in whole degrees Celsius.
pub trait TemperatureSource: Send + Sync + 'static {
    fn read_celsius(&self) -> i16;
}

/// Uniformly random readings within a range.
#[derive(Debug, Clone)]
pub struct SimulatedThermometer {
    range: RangeInclusive<i16>,
}

impl SimulatedThermometer {
    pub fn new(range: RangeInclusive<i16>) -> Self {
        Self { range }
    }
}

impl TemperatureSource for SimulatedThermometer {
    fn read_celsius(&self) -> i16 {
        rand::thread_rng().gen_range(self.range.clone())
    }
}

#[derive(Clone)]
pub struct Temperature {
    source: Arc<dyn TemperatureSource>,
}

impl Temperature {
    pub const PATH: &'static str = "/sensor/temperature";

    pub fn new(source: impl TemperatureSource) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    pub fn into_resource<Endpoint: Send + Sync + 'static>(self) -> ResourceBuilder<Endpoint> {
        node::resource(Self::PATH)
            .data_format(DataFormat::Number)
            .get(move |request: Request<Endpoint>| {
                let sensor = self.clone();
                async move { sensor.handle_get(request) }
            })
    }

    fn handle_get<Endpoint>(&self, request: Request<Endpoint>) -> Result<Response, CoapError> {
        request.reject_subpath()?;
        let mut response = request.new_response();
        response.message.payload = self.source.read_celsius().to_string().into_bytes();
        response
            .message
            .set_content_format(ContentFormat::TextPlain);
        Ok(response)
    }
}
