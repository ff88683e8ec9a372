use coap_lite::ResponseType;

use crate::node::Response;

/// Error that turns into a CoAP error response, so handlers can use `?` and still always answer
/// the peer.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{code:?}: {message}")]
pub struct CoapError {
    pub code: ResponseType,
    pub message: String,
}

impl CoapError {
    pub fn internal(msg: impl ToString) -> Self {
        Self::for_code(ResponseType::InternalServerError, msg)
    }

    pub fn bad_request(msg: impl ToString) -> Self {
        Self::for_code(ResponseType::BadRequest, msg)
    }

    pub fn not_found() -> Self {
        Self::for_code(ResponseType::NotFound, "Not found")
    }

    pub fn method_not_allowed() -> Self {
        Self::for_code(ResponseType::MethodNotAllowed, "Method not allowed")
    }

    pub fn for_code(code: ResponseType, msg: impl ToString) -> Self {
        Self {
            code,
            message: msg.to_string(),
        }
    }

    /// Fill `response` (already addressed to the peer) with this error's code and diagnostic
    /// payload.
    pub(crate) fn into_response(self, mut response: Response) -> Response {
        response.set_status(self.code);
        response.message.payload = self.message.into_bytes();
        response
    }
}
