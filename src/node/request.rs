use coap_lite::{CoapRequest, RequestType, ResponseType};

use crate::node::{CoapError, Response};

/// Incoming request as seen by a resource handler.
#[derive(Debug, Clone)]
pub struct Request<Endpoint> {
    pub original: CoapRequest<Endpoint>,

    /// Path segments left over after the longest registered prefix matched, e.g. `["x"]` for
    /// `/actuator/led/x` when only `/actuator/led` is registered.
    pub unmatched_path: Vec<String>,

    /// Empty response already addressed to the peer (message ID, token, message type).
    response_template: Response,
}

impl<Endpoint> Request<Endpoint> {
    pub(crate) fn new(
        original: CoapRequest<Endpoint>,
        unmatched_path: Vec<String>,
        response_template: Response,
    ) -> Self {
        Self {
            original,
            unmatched_path,
            response_template,
        }
    }

    /// Response with the default success code for the request method.
    pub fn new_response(&self) -> Response {
        let mut response = self.response_template.clone();
        response.message.payload = Vec::new();
        let default_code = match self.original.get_method() {
            RequestType::Get => ResponseType::Content,
            RequestType::Post => ResponseType::Created,
            RequestType::Put => ResponseType::Changed,
            RequestType::Delete => ResponseType::Deleted,
            _ => ResponseType::Valid,
        };
        response.set_status(default_code);
        response
    }

    /// `4.04` for paths below the resource, which single-value resources don't have.
    pub fn reject_subpath(&self) -> Result<(), CoapError> {
        if self.unmatched_path.is_empty() {
            Ok(())
        } else {
            Err(CoapError::not_found())
        }
    }

    /// Request payload as UTF-8 text.
    pub fn payload_text(&self) -> Result<&str, CoapError> {
        std::str::from_utf8(&self.original.message.payload)
            .map_err(|e| CoapError::bad_request(format!("Payload is not UTF-8: {e}")))
    }
}
