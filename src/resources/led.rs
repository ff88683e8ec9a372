//! Simulated LED actuator.
//!
//! `GET` reports `on` or `off`.  `PUT` with `on`/`off` (or the numeric `1`/`0` other testbed
//! nodes use) switches it, logging one line per write.

use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::Arc;

use coap_lite::link_format::LINK_ATTR_CONTENT_FORMAT;
use coap_lite::{ContentFormat, ResponseType};
use log::{debug, info, warn};
use tokio::sync::Mutex;

use crate::node::{self, CoapError, DataFormat, Request, ResourceBuilder, Response};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedState {
    On,
    #[default]
    Off,
}

impl LedState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for LedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown LED command {0:?}, expected on or off")]
pub struct ParseLedStateError(String);

impl FromStr for LedState {
    type Err = ParseLedStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let command = s.trim();
        if command.eq_ignore_ascii_case("on") || command == "1" {
            Ok(Self::On)
        } else if command.eq_ignore_ascii_case("off") || command == "0" {
            Ok(Self::Off)
        } else {
            Err(ParseLedStateError(command.to_string()))
        }
    }
}

/// Whatever actually lights up.  Called with the LED's lock held, so switches are applied in
/// the same order as the state changes.
pub trait LedDriver: Send + Sync + 'static {
    fn switch(&self, state: LedState) -> io::Result<()>;
}

/// Driver for nodes without an LED.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedLed;

impl LedDriver for SimulatedLed {
    fn switch(&self, state: LedState) -> io::Result<()> {
        debug!("Simulated LED switched {state}");
        Ok(())
    }
}

#[derive(Clone)]
pub struct Led {
    state: Arc<Mutex<LedState>>,
    driver: Arc<dyn LedDriver>,
}

impl Led {
    pub const PATH: &'static str = "/actuator/led";

    pub fn new(initial: LedState) -> Self {
        Self::with_driver(initial, SimulatedLed)
    }

    /// The driver is not switched to `initial`; it is assumed to already be there.
    pub fn with_driver(initial: LedState, driver: impl LedDriver) -> Self {
        Self {
            state: Arc::new(Mutex::new(initial)),
            driver: Arc::new(driver),
        }
    }

    pub async fn state(&self) -> LedState {
        *self.state.lock().await
    }

    pub async fn set(&self, state: LedState) -> io::Result<()> {
        let mut current = self.state.lock().await;
        self.driver.switch(state)?;
        *current = state;
        match state {
            LedState::On => info!("LED ON"),
            LedState::Off => info!("LED OFF"),
        }
        Ok(())
    }

    pub fn into_resource<Endpoint: Send + Sync + 'static>(self) -> ResourceBuilder<Endpoint> {
        let getter = self.clone();
        node::resource(Self::PATH)
            .data_format(DataFormat::Boolean)
            .link_attr(LINK_ATTR_CONTENT_FORMAT, ContentFormat::TextPlain)
            .get(move |request: Request<Endpoint>| {
                let led = getter.clone();
                async move { led.handle_get(request).await }
            })
            .put(move |request: Request<Endpoint>| {
                let led = self.clone();
                async move { led.handle_put(request).await }
            })
    }

    async fn handle_get<Endpoint>(
        &self,
        request: Request<Endpoint>,
    ) -> Result<Response, CoapError> {
        request.reject_subpath()?;
        let state = self.state().await;
        Ok(state_response(&request, state))
    }

    async fn handle_put<Endpoint>(
        &self,
        request: Request<Endpoint>,
    ) -> Result<Response, CoapError> {
        request.reject_subpath()?;
        let command = request.payload_text().map_err(|e| {
            let len = request.original.message.payload.len();
            warn!("Unknown command: <{len} bytes of non-UTF-8>");
            e
        })?;
        let state = command.parse::<LedState>().map_err(|e| {
            warn!("Unknown command: {}", command.trim());
            CoapError::bad_request(e)
        })?;

        self.set(state)
            .await
            .map_err(|e| CoapError::internal(format!("LED driver failed: {e}")))?;

        let mut response = state_response(&request, state);
        response.set_status(ResponseType::Changed);
        Ok(response)
    }
}

fn state_response<Endpoint>(request: &Request<Endpoint>, state: LedState) -> Response {
    let mut response = request.new_response();
    response.message.payload = state.as_str().as_bytes().to_vec();
    response
        .message
        .set_content_format(ContentFormat::TextPlain);
    response
}
