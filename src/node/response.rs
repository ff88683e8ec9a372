use coap_lite::CoapResponse;

/// Responses are plain `coap_lite` responses; handlers set the status and payload directly.
pub type Response = CoapResponse;
