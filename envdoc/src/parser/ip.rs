use std::net::IpAddr;

use super::Parser;
use crate::error::ParseError;

/// IPv4 or IPv6 address, `net.IP` in descriptions.
///
/// There is no zero address to fall back to, so the accessor returns
/// `Option<IpAddr>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IpParser;

impl Parser for IpParser {
    type Output = IpAddr;

    fn type_name(&self) -> String {
        "net.IP".to_string()
    }

    fn parse(&self, raw: &str) -> Result<IpAddr, ParseError> {
        raw.parse().map_err(|source| ParseError::Ip {
            raw: raw.to_string(),
            source,
        })
    }

    fn render(&self, value: &IpAddr) -> serde_json::Value {
        value.to_string().into()
    }
}
