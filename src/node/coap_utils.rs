use std::collections::HashMap;

use coap_lite::{CoapOption, CoapRequest, MessageClass, MessageType, Packet};

/// `Uri-Query` options of the request as key/value pairs.  Queries that aren't `key=value` or
/// aren't UTF-8 are skipped.
pub fn request_get_queries<Endpoint>(request: &CoapRequest<Endpoint>) -> HashMap<String, String> {
    request
        .message
        .get_option(CoapOption::UriQuery)
        .map(|options| {
            options
                .iter()
                .filter_map(|raw| {
                    let query = std::str::from_utf8(raw).ok()?;
                    let (key, value) = query.split_once('=')?;
                    Some((key.to_string(), value.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Reset in reply to an empty Confirmable message, the CoAP "ping".
pub fn new_pong_message(ping: &Packet) -> Packet {
    let mut pong = Packet::new();
    pong.header.set_type(MessageType::Reset);
    pong.header.code = MessageClass::Empty;
    pong.header.message_id = ping.header.message_id;
    pong
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use super::*;

    #[test]
    fn test_queries() {
        let mut request: CoapRequest<SocketAddr> = CoapRequest::new();
        request.message.add_option(CoapOption::UriQuery, b"rt=boolean".to_vec());
        request.message.add_option(CoapOption::UriQuery, b"novalue".to_vec());

        let queries = request_get_queries(&request);
        assert_eq!(queries.len(), 1);
        assert_eq!(queries.get("rt").map(String::as_str), Some("boolean"));
    }

    #[test]
    fn test_pong() {
        let mut ping = Packet::new();
        ping.header.set_type(MessageType::Confirmable);
        ping.header.code = MessageClass::Empty;
        ping.header.message_id = 4242;
        ping.set_token(vec![0xAB]);

        let pong = new_pong_message(&ping);
        assert_eq!(pong.header.get_type(), MessageType::Reset);
        assert_eq!(pong.header.message_id, 4242);
        assert_eq!(pong.header.code, MessageClass::Empty);
        assert!(pong.get_token().is_empty());

        // Reset is 0x70, code 0.00, no token.
        let wire = pong.to_bytes().unwrap();
        assert_eq!(wire, vec![0x70, 0x00, 0x10, 0x92]);
    }
}
