// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service instance ports.

use super::require;
use crate::codec::{
    read_bool, read_int, read_opt_str, read_seq, validate_all, write_bool, write_int,
    write_opt_str, write_seq, DmiObject,
};
use crate::constants::{TYPE_PARAM, TYPE_PORT_INSTANCE, TYPE_PORT_INST_DESCRIPTOR};
use crate::error::DmiResult;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Name/value pair attached to a port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Param {
    pub name: Option<String>,
    pub value: Option<String>,
}

impl Param {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value.into()),
        }
    }
}

impl DmiObject for Param {
    const TYPE_ID: i32 = TYPE_PARAM;
    const NAME: &'static str = "Param";

    fn write_body<W: Write>(&self, out: &mut W, _version: i32) -> DmiResult<()> {
        write_opt_str(out, self.name.as_deref())?;
        write_opt_str(out, self.value.as_deref())
    }

    fn read_body<R: Read>(input: &mut R, _version: i32) -> DmiResult<Self> {
        Ok(Self {
            name: read_opt_str(input)?,
            value: read_opt_str(input)?,
        })
    }

    fn validate(&self) -> DmiResult<()> {
        require(Self::NAME, "name", &self.name)
    }
}

/// Destination kinds for [`PortInstance::destination_type`].
pub mod destination_type {
    pub const QUEUE: i32 = 0;
    pub const TOPIC: i32 = 1;
}

/// An input or output port of a service instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortInstance {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Underlying destination name.
    pub destination: Option<String>,
    /// One of [`destination_type`].
    pub destination_type: i32,
    /// Request/reply port.
    pub sync_request: bool,
    /// Key into the property sheet's schema table.
    pub schema_ref: Option<String>,
    pub params: Vec<Param>,
}

impl PortInstance {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Look up a parameter value by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name.as_deref() == Some(name))
            .and_then(|p| p.value.as_deref())
    }
}

impl DmiObject for PortInstance {
    const TYPE_ID: i32 = TYPE_PORT_INSTANCE;
    const NAME: &'static str = "PortInstance";

    fn write_body<W: Write>(&self, out: &mut W, version: i32) -> DmiResult<()> {
        write_opt_str(out, self.name.as_deref())?;
        write_opt_str(out, self.description.as_deref())?;
        write_opt_str(out, self.destination.as_deref())?;
        write_int(out, self.destination_type)?;
        write_bool(out, self.sync_request)?;
        write_opt_str(out, self.schema_ref.as_deref())?;
        write_seq(out, &self.params, version)
    }

    fn read_body<R: Read>(input: &mut R, version: i32) -> DmiResult<Self> {
        Ok(Self {
            name: read_opt_str(input)?,
            description: read_opt_str(input)?,
            destination: read_opt_str(input)?,
            destination_type: read_int(input)?,
            sync_request: read_bool(input)?,
            schema_ref: read_opt_str(input)?,
            params: read_seq(input, "PortInstance.params", version)?,
        })
    }

    fn validate(&self) -> DmiResult<()> {
        require(Self::NAME, "name", &self.name)?;
        validate_all(&self.params)
    }
}

/// Input and output ports of a service instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortInstDescriptor {
    pub input_ports: Vec<PortInstance>,
    pub output_ports: Vec<PortInstance>,
}

impl PortInstDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self, name: &str) -> Option<&PortInstance> {
        find_port(&self.input_ports, name)
    }

    pub fn output(&self, name: &str) -> Option<&PortInstance> {
        find_port(&self.output_ports, name)
    }
}

fn find_port<'a>(ports: &'a [PortInstance], name: &str) -> Option<&'a PortInstance> {
    ports.iter().find(|p| p.name.as_deref() == Some(name))
}

impl DmiObject for PortInstDescriptor {
    const TYPE_ID: i32 = TYPE_PORT_INST_DESCRIPTOR;
    const NAME: &'static str = "PortInstDescriptor";

    fn write_body<W: Write>(&self, out: &mut W, version: i32) -> DmiResult<()> {
        write_seq(out, &self.input_ports, version)?;
        write_seq(out, &self.output_ports, version)
    }

    fn read_body<R: Read>(input: &mut R, version: i32) -> DmiResult<Self> {
        Ok(Self {
            input_ports: read_seq(input, "PortInstDescriptor.input_ports", version)?,
            output_ports: read_seq(input, "PortInstDescriptor.output_ports", version)?,
        })
    }

    fn validate(&self) -> DmiResult<()> {
        validate_all(&self.input_ports)?;
        validate_all(&self.output_ports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CLIENT_VERSION_CURRENT;

    fn roundtrip<T: DmiObject>(value: &T) -> T {
        let bytes = value.to_bytes(CLIENT_VERSION_CURRENT).expect("encode");
        T::from_bytes(&bytes, CLIENT_VERSION_CURRENT).expect("decode")
    }

    fn sample_port(name: &str) -> PortInstance {
        PortInstance {
            name: Some(name.into()),
            description: Some("orders".into()),
            destination: Some(format!("APP.{}", name)),
            destination_type: destination_type::TOPIC,
            sync_request: false,
            schema_ref: Some("order.xsd".into()),
            params: vec![Param::new("ack", "auto"), Param::new("prefetch", "10")],
        }
    }

    #[test]
    fn test_param_roundtrip() {
        let p = Param::new("k", "v");
        assert_eq!(roundtrip(&p), p);
        assert_eq!(roundtrip(&Param::default()), Param::default());
    }

    #[test]
    fn test_port_instance_roundtrip() {
        let port = sample_port("IN_PORT");
        assert_eq!(roundtrip(&port), port);
        assert_eq!(port.param("prefetch"), Some("10"));
        assert_eq!(port.param("missing"), None);
    }

    #[test]
    fn test_descriptor_roundtrip_keeps_order() {
        let desc = PortInstDescriptor {
            input_ports: vec![sample_port("IN_B"), sample_port("IN_A")],
            output_ports: vec![sample_port("OUT"), sample_port("ON_EXCEPTION")],
        };
        let decoded = roundtrip(&desc);
        assert_eq!(decoded, desc);
        assert_eq!(decoded.input_ports[0].name.as_deref(), Some("IN_B"));
        assert!(decoded.output("ON_EXCEPTION").is_some());
        assert!(decoded.input("OUT").is_none());
    }

    #[test]
    fn test_empty_descriptor_layout() {
        let bytes = PortInstDescriptor::new()
            .to_bytes(CLIENT_VERSION_CURRENT)
            .expect("encode");
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[4..], &[0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_port_validation_reaches_params() {
        let mut port = sample_port("IN");
        assert!(port.validate().is_ok());
        port.params.push(Param::default());
        assert!(port.validate().is_err());
        assert!(PortInstance::default().validate().is_err());
    }
}
