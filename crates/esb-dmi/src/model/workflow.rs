// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Workflow entry/exit ports and the application exception handler.

use super::require;
use crate::codec::{
    read_bool, read_opt_str, read_seq, validate_all, write_bool, write_opt_str, write_seq,
    DmiObject,
};
use crate::constants::{
    TYPE_ON_EXCEPTION, TYPE_WF_IN_PORT, TYPE_WF_OUT_PORT, TYPE_WORKFLOW_EXIT_PORTS,
    TYPE_WORKFLOW_START_PORTS,
};
use crate::error::DmiResult;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Where application-level errors are routed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnException {
    pub error_handling_supported: bool,
    pub target_service_instance: Option<String>,
    pub target_port: Option<String>,
}

impl OnException {
    pub fn new(
        target_service_instance: impl Into<String>,
        target_port: impl Into<String>,
    ) -> Self {
        Self {
            error_handling_supported: true,
            target_service_instance: Some(target_service_instance.into()),
            target_port: Some(target_port.into()),
        }
    }
}

impl DmiObject for OnException {
    const TYPE_ID: i32 = TYPE_ON_EXCEPTION;
    const NAME: &'static str = "OnException";

    fn write_body<W: Write>(&self, out: &mut W, _version: i32) -> DmiResult<()> {
        write_bool(out, self.error_handling_supported)?;
        write_opt_str(out, self.target_service_instance.as_deref())?;
        write_opt_str(out, self.target_port.as_deref())
    }

    fn read_body<R: Read>(input: &mut R, _version: i32) -> DmiResult<Self> {
        Ok(Self {
            error_handling_supported: read_bool(input)?,
            target_service_instance: read_opt_str(input)?,
            target_port: read_opt_str(input)?,
        })
    }

    fn validate(&self) -> DmiResult<()> {
        if !self.error_handling_supported {
            return Ok(());
        }
        require(
            Self::NAME,
            "target_service_instance",
            &self.target_service_instance,
        )?;
        require(Self::NAME, "target_port", &self.target_port)
    }
}

/// Port through which a workflow is entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WfInPort {
    pub service_instance: Option<String>,
    pub port_name: Option<String>,
}

impl WfInPort {
    pub fn new(service_instance: impl Into<String>, port_name: impl Into<String>) -> Self {
        Self {
            service_instance: Some(service_instance.into()),
            port_name: Some(port_name.into()),
        }
    }
}

impl DmiObject for WfInPort {
    const TYPE_ID: i32 = TYPE_WF_IN_PORT;
    const NAME: &'static str = "WfInPort";

    fn write_body<W: Write>(&self, out: &mut W, _version: i32) -> DmiResult<()> {
        write_opt_str(out, self.service_instance.as_deref())?;
        write_opt_str(out, self.port_name.as_deref())
    }

    fn read_body<R: Read>(input: &mut R, _version: i32) -> DmiResult<Self> {
        Ok(Self {
            service_instance: read_opt_str(input)?,
            port_name: read_opt_str(input)?,
        })
    }

    fn validate(&self) -> DmiResult<()> {
        require(Self::NAME, "service_instance", &self.service_instance)?;
        require(Self::NAME, "port_name", &self.port_name)
    }
}

/// Port through which a workflow ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WfOutPort {
    pub service_instance: Option<String>,
    pub port_name: Option<String>,
    /// Terminal state reported when a document leaves through this port.
    pub exit_state: Option<String>,
}

impl WfOutPort {
    pub fn new(service_instance: impl Into<String>, port_name: impl Into<String>) -> Self {
        Self {
            service_instance: Some(service_instance.into()),
            port_name: Some(port_name.into()),
            exit_state: None,
        }
    }
}

impl DmiObject for WfOutPort {
    const TYPE_ID: i32 = TYPE_WF_OUT_PORT;
    const NAME: &'static str = "WfOutPort";

    fn write_body<W: Write>(&self, out: &mut W, _version: i32) -> DmiResult<()> {
        write_opt_str(out, self.service_instance.as_deref())?;
        write_opt_str(out, self.port_name.as_deref())?;
        write_opt_str(out, self.exit_state.as_deref())
    }

    fn read_body<R: Read>(input: &mut R, _version: i32) -> DmiResult<Self> {
        Ok(Self {
            service_instance: read_opt_str(input)?,
            port_name: read_opt_str(input)?,
            exit_state: read_opt_str(input)?,
        })
    }

    fn validate(&self) -> DmiResult<()> {
        require(Self::NAME, "service_instance", &self.service_instance)?;
        require(Self::NAME, "port_name", &self.port_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowStartPorts {
    pub ports: Vec<WfInPort>,
}

impl DmiObject for WorkflowStartPorts {
    const TYPE_ID: i32 = TYPE_WORKFLOW_START_PORTS;
    const NAME: &'static str = "WorkflowStartPorts";

    fn write_body<W: Write>(&self, out: &mut W, version: i32) -> DmiResult<()> {
        write_seq(out, &self.ports, version)
    }

    fn read_body<R: Read>(input: &mut R, version: i32) -> DmiResult<Self> {
        Ok(Self {
            ports: read_seq(input, "WorkflowStartPorts.ports", version)?,
        })
    }

    fn validate(&self) -> DmiResult<()> {
        validate_all(&self.ports)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowExitPorts {
    pub ports: Vec<WfOutPort>,
}

impl DmiObject for WorkflowExitPorts {
    const TYPE_ID: i32 = TYPE_WORKFLOW_EXIT_PORTS;
    const NAME: &'static str = "WorkflowExitPorts";

    fn write_body<W: Write>(&self, out: &mut W, version: i32) -> DmiResult<()> {
        write_seq(out, &self.ports, version)
    }

    fn read_body<R: Read>(input: &mut R, version: i32) -> DmiResult<Self> {
        Ok(Self {
            ports: read_seq(input, "WorkflowExitPorts.ports", version)?,
        })
    }

    fn validate(&self) -> DmiResult<()> {
        validate_all(&self.ports)
    }
}
