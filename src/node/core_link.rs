use std::collections::HashMap;
use std::fmt::Error;

use coap_lite::link_format::LinkFormatWrite;
use coap_lite::ContentFormat;

use crate::node::DataFormat;

/// CoRE link (RFC 6690) for one resource, built up attribute by attribute.
#[derive(Debug, Clone)]
pub struct CoreLink {
    path: String,
    attributes: Vec<(&'static str, LinkAttr)>,
}

/// Value of a single link attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAttr {
    Quoted(String),
    Number(u32),
}

impl CoreLink {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            attributes: Vec::new(),
        }
    }

    /// Set `key`, replacing any earlier value so each attribute appears once in the link.
    pub fn attr(&mut self, key: &'static str, value: impl Into<LinkAttr>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn format_single_link(&self) -> Result<String, Error> {
        let mut buf = String::new();
        let mut write = LinkFormatWrite::new(&mut buf);
        write = self.write_link(write)?;
        write.finish()?;
        Ok(buf)
    }

    fn write_link<'a>(
        &self,
        mut write: LinkFormatWrite<'a, String>,
    ) -> Result<LinkFormatWrite<'a, String>, Error> {
        let mut link = write.link(&self.path);
        for (key, value) in &self.attributes {
            link = match value {
                LinkAttr::Quoted(s) => link.attr_quoted(key, s),
                LinkAttr::Number(n) => link.attr_u32(key, *n),
            };
        }
        link.finish().map(|_| write)
    }

    /// Attribute values as plain strings, for matching `?key=value` filter queries.
    pub fn attributes_as_strings(&self) -> HashMap<&'static str, String> {
        self.attributes
            .iter()
            .map(|(k, v)| {
                let s = match v {
                    LinkAttr::Quoted(s) => s.clone(),
                    LinkAttr::Number(n) => n.to_string(),
                };
                (*k, s)
            })
            .collect()
    }
}

impl From<&str> for LinkAttr {
    fn from(s: &str) -> Self {
        Self::Quoted(s.to_string())
    }
}

impl From<ContentFormat> for LinkAttr {
    fn from(format: ContentFormat) -> Self {
        Self::Number(usize::from(format) as u32)
    }
}

impl From<DataFormat> for LinkAttr {
    fn from(format: DataFormat) -> Self {
        Self::Quoted(format.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use coap_lite::link_format::{
        LinkFormatWrite, LINK_ATTR_CONTENT_FORMAT, LINK_ATTR_RESOURCE_TYPE,
    };
    use coap_lite::ContentFormat;

    use super::*;

    #[test]
    fn test_multiple() {
        let mut led = CoreLink::new("/actuator/led");
        led.attr(LINK_ATTR_RESOURCE_TYPE, DataFormat::Boolean);
        led.attr(LINK_ATTR_CONTENT_FORMAT, ContentFormat::TextPlain);

        let mut stats = CoreLink::new("/cli/stats");
        stats.attr(LINK_ATTR_RESOURCE_TYPE, DataFormat::Unspecified);

        let mut out = String::new();
        let mut write = LinkFormatWrite::new(&mut out);
        write = led.write_link(write).unwrap();
        stats.write_link(write).unwrap();

        assert_eq!(out, r#"</actuator/led>;rt="boolean";ct=0,</cli/stats>;rt="unspecified""#);
    }

    #[test]
    fn test_attr_replaces() {
        let mut led = CoreLink::new("/actuator/led");
        led.attr(LINK_ATTR_RESOURCE_TYPE, "light");
        led.attr(LINK_ATTR_RESOURCE_TYPE, DataFormat::Boolean);

        assert_eq!(
            led.format_single_link().unwrap(),
            r#"</actuator/led>;rt="boolean""#
        );
        assert_eq!(
            led.attributes_as_strings().get(LINK_ATTR_RESOURCE_TYPE),
            Some(&"boolean".to_string())
        );
    }
}
