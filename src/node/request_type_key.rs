use coap_lite::RequestType;

/// Hashable stand-in for [`RequestType`], with a wildcard slot for default handlers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct RequestTypeKey(u8);

impl From<RequestType> for RequestTypeKey {
    fn from(t: RequestType) -> Self {
        Self(match t {
            RequestType::Get => 1,
            RequestType::Post => 2,
            RequestType::Put => 3,
            RequestType::Delete => 4,
            RequestType::Fetch => 5,
            RequestType::Patch => 6,
            RequestType::IPatch => 7,
            _ => 0,
        })
    }
}

impl RequestTypeKey {
    pub fn new_match_all() -> Self {
        Self(0)
    }
}
