// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Application descriptor records.
//!
//! ```text
//! ApplicationPropertySheet
//! +-- ApplicationHeader
//! |   +-- ApplicationContext
//! +-- ServiceInstances
//! |   +-- ServiceInstance*
//! |       +-- RuntimeDependency*
//! |       +-- RuntimeArgs ------> Argument*
//! |       +-- PortInstDescriptor -> PortInstance* -> Param*
//! |       +-- StatusTracking ---> ApsEventModule*
//! |       +-- DeploymentProfile* -> RuntimeArgs
//! +-- WorkflowStartPorts -> WfInPort*
//! +-- WorkflowExitPorts --> WfOutPort*
//! +-- Routes
//! |   +-- Route*
//! |       +-- selectors (plain text | XPathDmi)
//! |       +-- AlternateDestination
//! +-- OnException
//! ```
//!
//! Every string field is an `Option<String>`: the wire format writes `None`
//! as the empty string and reads the empty string back as `None`.

mod application;
mod arguments;
mod ports;
mod route;
mod service;
mod workflow;

pub use application::{
    format_creation_date, parse_creation_date, truncate_creation_date, ApplicationContext,
    ApplicationHeader, ApplicationPropertySheet, SchemaTable,
};
pub use arguments::{Argument, DeploymentProfile, RuntimeArgs};
pub use ports::{destination_type, Param, PortInstDescriptor, PortInstance};
pub use route::{
    AlternateDestination, Route, Routes, SelectorValue, XPathDmi, DEFAULT_PRIORITY,
};
pub use service::{
    launch_type, ApsEventModule, RuntimeDependency, ServiceInstance, ServiceInstances,
    StatusTracking,
};
pub use workflow::{OnException, WfInPort, WfOutPort, WorkflowExitPorts, WorkflowStartPorts};

use crate::error::{DmiError, DmiResult};

/// Fail with `InvalidArgument` when a mandatory string is unset or blank.
pub(crate) fn require(
    record: &'static str,
    field: &'static str,
    value: &Option<String>,
) -> DmiResult<()> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(()),
        _ => Err(DmiError::InvalidArgument { record, field }),
    }
}
