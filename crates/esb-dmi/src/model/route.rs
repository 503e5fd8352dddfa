// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Routes between service-instance ports.
//!
//! # Selector Encoding
//!
//! ```text
//! legacy:  count (>= 0) | (kind:utf, text:utf){count}
//! current: -1 | count | (kind:utf, XPathDmi record | text:utf){count}
//! ```
//!
//! Both encodings are read; only the current one is written. In the current
//! encoding the value layout is chosen by the selector kind: `body` and
//! `application-context` carry a full `XPathDmi` record, every other kind a
//! plain string.

use super::require;
use crate::codec::{
    read_bool, read_count, read_int, read_long, read_opt_str, read_optional, read_seq,
    read_utf, validate_all, write_bool, write_count, write_int, write_long, write_opt_str,
    write_optional, write_seq, write_utf, DmiObject,
};
use crate::constants::{
    is_xpath_selector, SELECTOR_CURRENT_FORMAT_MARKER, TYPE_ALTERNATE_DESTINATION, TYPE_ROUTE,
    TYPE_ROUTES, TYPE_XPATH,
};
use crate::error::{DmiError, DmiResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};

/// JMS default message priority.
pub const DEFAULT_PRIORITY: i32 = 4;

/// XPath expression with its namespace prefix bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XPathDmi {
    pub xpath: Option<String>,
    /// Prefix -> namespace URI.
    pub namespaces: BTreeMap<String, String>,
}

impl XPathDmi {
    pub fn new(xpath: impl Into<String>) -> Self {
        Self {
            xpath: Some(xpath.into()),
            namespaces: BTreeMap::new(),
        }
    }

    /// Bind a namespace prefix.
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.insert(prefix.into(), uri.into());
        self
    }
}

impl DmiObject for XPathDmi {
    const TYPE_ID: i32 = TYPE_XPATH;
    const NAME: &'static str = "XPathDmi";

    fn write_body<W: Write>(&self, out: &mut W, _version: i32) -> DmiResult<()> {
        write_opt_str(out, self.xpath.as_deref())?;
        write_count(out, self.namespaces.len())?;
        for (prefix, uri) in &self.namespaces {
            write_utf(out, prefix)?;
            write_utf(out, uri)?;
        }
        Ok(())
    }

    fn read_body<R: Read>(input: &mut R, _version: i32) -> DmiResult<Self> {
        let xpath = read_opt_str(input)?;
        let count = read_count(input, "XPathDmi.namespaces")?;
        let mut namespaces = BTreeMap::new();
        for _ in 0..count {
            let prefix = read_utf(input)?;
            let uri = read_utf(input)?;
            namespaces.insert(prefix, uri);
        }
        Ok(Self { xpath, namespaces })
    }

    fn validate(&self) -> DmiResult<()> {
        require(Self::NAME, "xpath", &self.xpath)
    }
}

/// Value of a route selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum SelectorValue {
    /// Plain key/value filter.
    PlainText(String),
    /// Structured XPath filter.
    XPath(XPathDmi),
}

impl SelectorValue {
    /// Expression text, whichever the variant.
    pub fn expression(&self) -> &str {
        match self {
            Self::PlainText(text) => text,
            Self::XPath(xpath) => xpath.xpath.as_deref().unwrap_or(""),
        }
    }

    /// The XPath form of this value; plain text becomes an XPath without
    /// namespace bindings.
    pub fn to_xpath(&self) -> XPathDmi {
        match self {
            Self::PlainText(text) => XPathDmi::new(text.clone()),
            Self::XPath(xpath) => xpath.clone(),
        }
    }
}

impl From<&str> for SelectorValue {
    fn from(text: &str) -> Self {
        Self::PlainText(text.to_string())
    }
}

impl From<XPathDmi> for SelectorValue {
    fn from(xpath: XPathDmi) -> Self {
        Self::XPath(xpath)
    }
}

/// Fallback target used when a route's primary target is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlternateDestination {
    pub node_name: Option<String>,
    pub service_instance: Option<String>,
    pub port_name: Option<String>,
}

impl AlternateDestination {
    pub fn new(
        node_name: impl Into<String>,
        service_instance: impl Into<String>,
        port_name: impl Into<String>,
    ) -> Self {
        Self {
            node_name: Some(node_name.into()),
            service_instance: Some(service_instance.into()),
            port_name: Some(port_name.into()),
        }
    }
}

impl DmiObject for AlternateDestination {
    const TYPE_ID: i32 = TYPE_ALTERNATE_DESTINATION;
    const NAME: &'static str = "AlternateDestination";

    fn write_body<W: Write>(&self, out: &mut W, _version: i32) -> DmiResult<()> {
        write_opt_str(out, self.node_name.as_deref())?;
        write_opt_str(out, self.service_instance.as_deref())?;
        write_opt_str(out, self.port_name.as_deref())
    }

    fn read_body<R: Read>(input: &mut R, _version: i32) -> DmiResult<Self> {
        Ok(Self {
            node_name: read_opt_str(input)?,
            service_instance: read_opt_str(input)?,
            port_name: read_opt_str(input)?,
        })
    }

    fn validate(&self) -> DmiResult<()> {
        require(Self::NAME, "service_instance", &self.service_instance)?;
        require(Self::NAME, "port_name", &self.port_name)
    }
}

/// Directed link from an output port to an input port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Route {
    pub route_guid: Option<String>,
    pub src_serv_inst: Option<String>,
    pub src_port_name: Option<String>,
    pub trgt_serv_inst: Option<String>,
    pub trgt_port_name: Option<String>,
    /// Stylesheet applied to messages crossing the route.
    pub transformation_xsl: Option<String>,
    pub durable: bool,
    /// Point-to-point (queue) rather than publish/subscribe.
    pub p2p: bool,
    pub priority: i32,
    /// Message time-to-live in milliseconds, 0 = unlimited.
    pub time_to_live: i64,
    /// Selector kind -> value.
    pub selectors: BTreeMap<String, SelectorValue>,
    pub alternate_destination: Option<AlternateDestination>,
}

impl Default for Route {
    fn default() -> Self {
        Self {
            route_guid: None,
            src_serv_inst: None,
            src_port_name: None,
            trgt_serv_inst: None,
            trgt_port_name: None,
            transformation_xsl: None,
            durable: false,
            p2p: false,
            priority: DEFAULT_PRIORITY,
            time_to_live: 0,
            selectors: BTreeMap::new(),
            alternate_destination: None,
        }
    }
}

impl Route {
    pub fn new(
        route_guid: impl Into<String>,
        src_serv_inst: impl Into<String>,
        src_port_name: impl Into<String>,
        trgt_serv_inst: impl Into<String>,
        trgt_port_name: impl Into<String>,
    ) -> Self {
        Self {
            route_guid: Some(route_guid.into()),
            src_serv_inst: Some(src_serv_inst.into()),
            src_port_name: Some(src_port_name.into()),
            trgt_serv_inst: Some(trgt_serv_inst.into()),
            trgt_port_name: Some(trgt_port_name.into()),
            ..Default::default()
        }
    }

    /// Set a selector. Plain text under an XPath kind is stored as an XPath.
    pub fn add_selector(&mut self, kind: impl Into<String>, value: impl Into<SelectorValue>) {
        let kind = kind.into();
        let value = value.into();
        let value = if is_xpath_selector(&kind) {
            SelectorValue::XPath(value.to_xpath())
        } else {
            value
        };
        self.selectors.insert(kind, value);
    }

    pub fn selector(&self, kind: &str) -> Option<&SelectorValue> {
        self.selectors.get(kind)
    }

    pub fn remove_selector(&mut self, kind: &str) -> Option<SelectorValue> {
        self.selectors.remove(kind)
    }

    fn write_selectors<W: Write>(&self, out: &mut W, version: i32) -> DmiResult<()> {
        write_int(out, SELECTOR_CURRENT_FORMAT_MARKER)?;
        write_count(out, self.selectors.len())?;
        for (kind, value) in &self.selectors {
            write_utf(out, kind)?;
            if is_xpath_selector(kind) {
                match value {
                    SelectorValue::XPath(xpath) => xpath.to_stream(out, version)?,
                    SelectorValue::PlainText(_) => value.to_xpath().to_stream(out, version)?,
                }
            } else {
                write_utf(out, value.expression())?;
            }
        }
        Ok(())
    }

    fn read_selectors<R: Read>(
        input: &mut R,
        version: i32,
    ) -> DmiResult<BTreeMap<String, SelectorValue>> {
        let lead = read_int(input)?;
        let mut selectors = BTreeMap::new();

        if lead >= 0 {
            if lead > 0 {
                tracing::debug!(count = lead, "reading legacy route selector encoding");
            }
            for _ in 0..lead {
                let kind = read_utf(input)?;
                let text = read_utf(input)?;
                selectors.insert(kind, SelectorValue::PlainText(text));
            }
        } else if lead == SELECTOR_CURRENT_FORMAT_MARKER {
            let count = read_count(input, "Route.selectors")?;
            for _ in 0..count {
                let kind = read_utf(input)?;
                let value = if is_xpath_selector(&kind) {
                    SelectorValue::XPath(XPathDmi::from_stream(input, version)?)
                } else {
                    SelectorValue::PlainText(read_utf(input)?)
                };
                selectors.insert(kind, value);
            }
        } else {
            return Err(DmiError::InvalidSelectorCount(lead));
        }

        Ok(selectors)
    }
}

impl DmiObject for Route {
    const TYPE_ID: i32 = TYPE_ROUTE;
    const NAME: &'static str = "Route";

    fn write_body<W: Write>(&self, out: &mut W, version: i32) -> DmiResult<()> {
        write_opt_str(out, self.route_guid.as_deref())?;
        write_opt_str(out, self.src_serv_inst.as_deref())?;
        write_opt_str(out, self.src_port_name.as_deref())?;
        write_opt_str(out, self.trgt_serv_inst.as_deref())?;
        write_opt_str(out, self.trgt_port_name.as_deref())?;
        write_opt_str(out, self.transformation_xsl.as_deref())?;
        write_bool(out, self.durable)?;
        write_bool(out, self.p2p)?;
        write_int(out, self.priority)?;
        write_long(out, self.time_to_live)?;
        self.write_selectors(out, version)?;
        write_optional(out, self.alternate_destination.as_ref(), version)
    }

    fn read_body<R: Read>(input: &mut R, version: i32) -> DmiResult<Self> {
        Ok(Self {
            route_guid: read_opt_str(input)?,
            src_serv_inst: read_opt_str(input)?,
            src_port_name: read_opt_str(input)?,
            trgt_serv_inst: read_opt_str(input)?,
            trgt_port_name: read_opt_str(input)?,
            transformation_xsl: read_opt_str(input)?,
            durable: read_bool(input)?,
            p2p: read_bool(input)?,
            priority: read_int(input)?,
            time_to_live: read_long(input)?,
            selectors: Self::read_selectors(input, version)?,
            alternate_destination: read_optional(input, "Route.alternate_destination", version)?,
        })
    }

    fn validate(&self) -> DmiResult<()> {
        require(Self::NAME, "route_guid", &self.route_guid)?;
        require(Self::NAME, "src_serv_inst", &self.src_serv_inst)?;
        require(Self::NAME, "src_port_name", &self.src_port_name)?;
        require(Self::NAME, "trgt_serv_inst", &self.trgt_serv_inst)?;
        require(Self::NAME, "trgt_port_name", &self.trgt_port_name)?;

        for (kind, value) in &self.selectors {
            if let SelectorValue::XPath(xpath) = value {
                if !is_xpath_selector(kind) {
                    return Err(DmiError::InvalidValue(format!(
                        "route {}: selector '{}' cannot hold an XPath value",
                        self.route_guid.as_deref().unwrap_or_default(),
                        kind
                    )));
                }
                xpath.validate()?;
            }
        }

        match &self.alternate_destination {
            Some(dest) => dest.validate(),
            None => Ok(()),
        }
    }
}

/// Ordered collection of routes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Routes {
    pub routes: Vec<Route>,
}

impl Routes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route. No de-duplication.
    pub fn add(&mut self, route: Route) {
        self.routes.push(route);
    }

    pub fn get(&self, route_guid: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|r| r.route_guid.as_deref() == Some(route_guid))
    }

    /// Routes leaving a service instance.
    pub fn routes_from<'a>(&'a self, instance: &'a str) -> impl Iterator<Item = &'a Route> + 'a {
        self.routes
            .iter()
            .filter(move |r| r.src_serv_inst.as_deref() == Some(instance))
    }

    /// Routes entering a service instance.
    pub fn routes_to<'a>(&'a self, instance: &'a str) -> impl Iterator<Item = &'a Route> + 'a {
        self.routes
            .iter()
            .filter(move |r| r.trgt_serv_inst.as_deref() == Some(instance))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl DmiObject for Routes {
    const TYPE_ID: i32 = TYPE_ROUTES;
    const NAME: &'static str = "Routes";

    fn write_body<W: Write>(&self, out: &mut W, version: i32) -> DmiResult<()> {
        write_seq(out, &self.routes, version)
    }

    fn read_body<R: Read>(input: &mut R, version: i32) -> DmiResult<Self> {
        Ok(Self {
            routes: read_seq(input, "Routes.routes", version)?,
        })
    }

    fn validate(&self) -> DmiResult<()> {
        validate_all(&self.routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        CLIENT_VERSION_CURRENT, SELECTOR_APPLICATION_CONTEXT, SELECTOR_BODY, SELECTOR_SENDER,
    };
    use std::io::Cursor;

    fn roundtrip<T: DmiObject>(value: &T) -> T {
        let bytes = value.to_bytes(CLIENT_VERSION_CURRENT).expect("encode");
        T::from_bytes(&bytes, CLIENT_VERSION_CURRENT).expect("decode")
    }

    fn sample_route() -> Route {
        let mut route = Route::new("R1", "A", "out1", "B", "in1");
        route.add_selector("JMS", "priority > 5");
        route
    }

    #[test]
    fn test_route_scenario_roundtrip() {
        let route = sample_route();
        let decoded = roundtrip(&route);

        assert_eq!(decoded.route_guid.as_deref(), Some("R1"));
        assert_eq!(decoded.src_serv_inst.as_deref(), Some("A"));
        assert_eq!(decoded.src_port_name.as_deref(), Some("out1"));
        assert_eq!(decoded.trgt_serv_inst.as_deref(), Some("B"));
        assert_eq!(decoded.trgt_port_name.as_deref(), Some("in1"));
        assert_eq!(decoded.selectors.len(), 1);
        assert_eq!(
            decoded.selector("JMS"),
            Some(&SelectorValue::PlainText("priority > 5".into()))
        );
        assert!(decoded.alternate_destination.is_none());
        assert_eq!(decoded, route);
    }

    #[test]
    fn test_route_full_roundtrip() {
        let mut route = sample_route();
        route.transformation_xsl = Some("<xsl:stylesheet/>".into());
        route.durable = true;
        route.p2p = true;
        route.priority = 9;
        route.time_to_live = 60_000;
        route.add_selector(SELECTOR_SENDER, "A");
        route.add_selector(
            SELECTOR_BODY,
            XPathDmi::new("/ns1:Order/ns1:Qty > 10").with_namespace("ns1", "urn:orders"),
        );
        route.add_selector(SELECTOR_APPLICATION_CONTEXT, "/ctx/state = 'open'");
        route.alternate_destination = Some(AlternateDestination::new("peer2", "B2", "in1"));

        assert_eq!(roundtrip(&route), route);
    }

    #[test]
    fn test_default_route_roundtrip() {
        let route = Route::default();
        assert_eq!(route.priority, DEFAULT_PRIORITY);
        assert_eq!(roundtrip(&route), route);
    }

    #[test]
    fn test_current_selector_layout() {
        let mut route = Route::default();
        route.add_selector("k", "v");
        let bytes = route.to_bytes(CLIENT_VERSION_CURRENT).expect("encode");

        // envelope(4) + 6 empty strings(12) + 2 bools + int + long
        let selectors_at = 4 + 12 + 2 + 4 + 8;
        assert_eq!(
            &bytes[selectors_at..selectors_at + 8],
            &[0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 1]
        );
        assert_eq!(
            &bytes[selectors_at + 8..selectors_at + 14],
            &[0, 1, b'k', 0, 1, b'v']
        );
        // trailing absent alternate destination
        assert_eq!(&bytes[bytes.len() - 4..], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_plain_text_under_xpath_kind_is_promoted() {
        let mut route = Route::default();
        route
            .selectors
            .insert(SELECTOR_BODY.into(), SelectorValue::PlainText("/a".into()));
        let decoded = roundtrip(&route);
        assert_eq!(
            decoded.selector(SELECTOR_BODY),
            Some(&SelectorValue::XPath(XPathDmi::new("/a")))
        );
    }

    #[test]
    fn test_xpath_under_plain_kind_is_invalid_and_written_as_text() {
        let mut route = sample_route();
        route.selectors.insert(
            SELECTOR_SENDER.into(),
            SelectorValue::XPath(XPathDmi::new("/x").with_namespace("p", "urn:p")),
        );
        assert!(matches!(route.validate(), Err(DmiError::InvalidValue(_))));

        let decoded = roundtrip(&route);
        assert_eq!(
            decoded.selector(SELECTOR_SENDER),
            Some(&SelectorValue::PlainText("/x".into()))
        );
    }

    #[test]
    fn test_unknown_negative_selector_count() {
        let mut buf = Vec::new();
        write_int(&mut buf, -2).expect("write");
        let mut cursor = Cursor::new(buf);
        assert!(matches!(
            Route::read_selectors(&mut cursor, CLIENT_VERSION_CURRENT),
            Err(DmiError::InvalidSelectorCount(-2))
        ));
    }

    #[test]
    fn test_zero_lead_count_is_empty() {
        let mut cursor = Cursor::new(vec![0, 0, 0, 0]);
        let selectors =
            Route::read_selectors(&mut cursor, CLIENT_VERSION_CURRENT).expect("read");
        assert!(selectors.is_empty());
    }

    #[test]
    fn test_route_validation() {
        assert!(sample_route().validate().is_ok());

        let mut route = sample_route();
        route.trgt_port_name = None;
        match route.validate() {
            Err(DmiError::InvalidArgument { record, field }) => {
                assert_eq!(record, "Route");
                assert_eq!(field, "trgt_port_name");
            }
            other => panic!("unexpected result {:?}", other),
        }

        let mut route = sample_route();
        route.alternate_destination = Some(AlternateDestination::default());
        assert!(matches!(
            route.validate(),
            Err(DmiError::InvalidArgument {
                record: "AlternateDestination",
                field: "service_instance"
            })
        ));

        let mut route = sample_route();
        route
            .selectors
            .insert(SELECTOR_BODY.into(), SelectorValue::XPath(XPathDmi::default()));
        assert!(matches!(
            route.validate(),
            Err(DmiError::InvalidArgument {
                record: "XPathDmi",
                ..
            })
        ));
    }

    #[test]
    fn test_xpath_roundtrip_keeps_default_prefix() {
        let xpath = XPathDmi::new("/root")
            .with_namespace("", "urn:default")
            .with_namespace("a", "urn:a");
        assert_eq!(roundtrip(&xpath), xpath);
    }

    #[test]
    fn test_routes_collection() {
        let mut routes = Routes::new();
        routes.add(Route::new("R1", "A", "out", "B", "in"));
        routes.add(Route::new("R2", "A", "out", "C", "in"));
        routes.add(Route::new("R1", "A", "out", "B", "in"));
        assert_eq!(routes.len(), 3);
        assert_eq!(routes.routes_from("A").count(), 3);
        assert_eq!(routes.routes_to("C").count(), 1);

        let decoded = roundtrip(&routes);
        assert_eq!(decoded, routes);
        assert_eq!(
            routes.get("R2").and_then(|r| r.trgt_serv_inst.as_deref()),
            Some("C")
        );
        assert!(routes.get("R9").is_none());
    }
}
