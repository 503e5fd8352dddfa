// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Application header, context and the top-level property sheet.

use super::{
    require, OnException, Route, Routes, ServiceInstance, ServiceInstances, WorkflowExitPorts,
    WorkflowStartPorts,
};
use crate::codec::{
    read_bool, read_opt_str, read_optional, read_optional_bool, write_bool, write_opt_str,
    write_optional, write_optional_bool, DmiObject,
};
use crate::constants::{
    DATE_FORMAT_PRIMARY, DATE_FORMAT_SECONDARY, TYPE_APPLICATION_CONTEXT,
    TYPE_APPLICATION_HEADER, TYPE_APPLICATION_PROPERTY_SHEET,
};
use crate::error::{DmiError, DmiResult};
use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};

// ---------------------------------------------------------------------------
// Creation dates
// ---------------------------------------------------------------------------

/// Render a creation date with the primary pattern.
pub fn format_creation_date(date: &NaiveDateTime) -> String {
    date.format(DATE_FORMAT_PRIMARY).to_string()
}

/// Parse a creation date: primary pattern, then the date-only pattern, then
/// the current local time.
pub fn parse_creation_date(text: Option<&str>) -> NaiveDateTime {
    if let Some(text) = text {
        if let Ok(date) = NaiveDateTime::parse_from_str(text, DATE_FORMAT_PRIMARY) {
            return date;
        }
        if let Some(date) = NaiveDate::parse_from_str(text, DATE_FORMAT_SECONDARY)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return date;
        }
        tracing::warn!(value = text, "unparseable creation date, using current time");
    }
    now_in_primary_format()
}

/// Drop the sub-second part, which the primary pattern cannot carry.
pub fn truncate_creation_date(date: NaiveDateTime) -> NaiveDateTime {
    date.with_nanosecond(0).unwrap_or(date)
}

/// Current local time at the precision of the primary pattern.
fn now_in_primary_format() -> NaiveDateTime {
    truncate_creation_date(Local::now().naive_local())
}

fn deserialize_creation_date<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let date = Option::<NaiveDateTime>::deserialize(deserializer)?;
    Ok(date.map(truncate_creation_date))
}

// ---------------------------------------------------------------------------
// ApplicationContext
// ---------------------------------------------------------------------------

/// Shared document carried alongside every message of an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationContext {
    pub structure_name: Option<String>,
    pub root_element: Option<String>,
    pub root_element_namespace: Option<String>,
    /// Schema body describing the context document.
    pub structure: Option<String>,
    /// Initial document instance.
    pub default_instance: Option<String>,
}

impl DmiObject for ApplicationContext {
    const TYPE_ID: i32 = TYPE_APPLICATION_CONTEXT;
    const NAME: &'static str = "ApplicationContext";

    fn write_body<W: Write>(&self, out: &mut W, _version: i32) -> DmiResult<()> {
        write_opt_str(out, self.structure_name.as_deref())?;
        write_opt_str(out, self.root_element.as_deref())?;
        write_opt_str(out, self.root_element_namespace.as_deref())?;
        write_opt_str(out, self.structure.as_deref())?;
        write_opt_str(out, self.default_instance.as_deref())
    }

    fn read_body<R: Read>(input: &mut R, _version: i32) -> DmiResult<Self> {
        Ok(Self {
            structure_name: read_opt_str(input)?,
            root_element: read_opt_str(input)?,
            root_element_namespace: read_opt_str(input)?,
            structure: read_opt_str(input)?,
            default_instance: read_opt_str(input)?,
        })
    }

    fn validate(&self) -> DmiResult<()> {
        require(Self::NAME, "root_element", &self.root_element)
    }
}

// ---------------------------------------------------------------------------
// ApplicationHeader
// ---------------------------------------------------------------------------

/// Application identity and metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationHeader {
    pub application_guid: Option<String>,
    pub display_name: Option<String>,
    pub version: Option<String>,
    pub author: Option<String>,
    /// Whole seconds only. Always `Some` after decoding (see
    /// [`parse_creation_date`]).
    #[serde(deserialize_with = "deserialize_creation_date")]
    pub creation_date: Option<NaiveDateTime>,
    pub category: Option<String>,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    /// Can be embedded as a sub-flow of another application.
    pub subgraphable: bool,
    /// Written behind a one-byte presence flag.
    pub application_context: Option<ApplicationContext>,
}

impl ApplicationHeader {
    pub fn new(application_guid: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            application_guid: Some(application_guid.into()),
            version: Some(version.into()),
            ..Default::default()
        }
    }

    /// Set the creation date, truncated to whole seconds.
    pub fn set_creation_date(&mut self, date: NaiveDateTime) {
        self.creation_date = Some(truncate_creation_date(date));
    }

    /// Creation date as written on the wire.
    pub fn creation_date_string(&self) -> Option<String> {
        self.creation_date.as_ref().map(format_creation_date)
    }
}

impl DmiObject for ApplicationHeader {
    const TYPE_ID: i32 = TYPE_APPLICATION_HEADER;
    const NAME: &'static str = "ApplicationHeader";

    fn write_body<W: Write>(&self, out: &mut W, version: i32) -> DmiResult<()> {
        write_opt_str(out, self.application_guid.as_deref())?;
        write_opt_str(out, self.display_name.as_deref())?;
        write_opt_str(out, self.version.as_deref())?;
        write_opt_str(out, self.author.as_deref())?;
        write_opt_str(out, self.creation_date_string().as_deref())?;
        write_opt_str(out, self.category.as_deref())?;
        write_opt_str(out, self.short_description.as_deref())?;
        write_opt_str(out, self.long_description.as_deref())?;
        write_bool(out, self.subgraphable)?;
        write_optional_bool(out, self.application_context.as_ref(), version)
    }

    fn read_body<R: Read>(input: &mut R, version: i32) -> DmiResult<Self> {
        Ok(Self {
            application_guid: read_opt_str(input)?,
            display_name: read_opt_str(input)?,
            version: read_opt_str(input)?,
            author: read_opt_str(input)?,
            creation_date: Some(parse_creation_date(read_opt_str(input)?.as_deref())),
            category: read_opt_str(input)?,
            short_description: read_opt_str(input)?,
            long_description: read_opt_str(input)?,
            subgraphable: read_bool(input)?,
            application_context: read_optional_bool(input, version)?,
        })
    }

    fn validate(&self) -> DmiResult<()> {
        require(Self::NAME, "application_guid", &self.application_guid)?;
        require(Self::NAME, "version", &self.version)?;
        if let Some(date) = self.creation_date {
            if date.nanosecond() != 0 {
                return Err(DmiError::InvalidValue(format!(
                    "creation date {} has a sub-second part",
                    date
                )));
            }
        }
        match &self.application_context {
            Some(context) => context.validate(),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// SchemaTable
// ---------------------------------------------------------------------------

/// Schema bodies referenced by ports, stored once per distinct body.
///
/// Never part of the binary stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaTable {
    schemas: BTreeMap<String, String>,
}

impl SchemaTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `body` under `id` and return the id to reference it by.
    ///
    /// If an identical body is already registered, its existing id is
    /// returned and nothing is stored.
    pub fn register(&mut self, id: impl Into<String>, body: impl Into<String>) -> String {
        let body = body.into();
        if let Some(existing) = self.id_for(&body) {
            return existing.to_string();
        }
        let id = id.into();
        if self.schemas.insert(id.clone(), body).is_some() {
            tracing::debug!(schema = %id, "replaced schema body");
        }
        id
    }

    /// Id under which `body` is registered.
    pub fn id_for(&self, body: &str) -> Option<&str> {
        self.schemas
            .iter()
            .find(|(_, b)| b.as_str() == body)
            .map(|(id, _)| id.as_str())
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.schemas.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ApplicationPropertySheet
// ---------------------------------------------------------------------------

/// Complete application descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationPropertySheet {
    /// Opaque editor layout.
    pub layout: Option<String>,
    pub header: Option<ApplicationHeader>,
    pub service_instances: Option<ServiceInstances>,
    pub workflow_start_ports: Option<WorkflowStartPorts>,
    pub workflow_exit_ports: Option<WorkflowExitPorts>,
    pub routes: Option<Routes>,
    pub on_exception: Option<OnException>,
    #[serde(skip)]
    pub schema_table: SchemaTable,
}

impl ApplicationPropertySheet {
    pub fn new(header: ApplicationHeader) -> Self {
        Self {
            header: Some(header),
            ..Default::default()
        }
    }

    pub fn service_instance(&self, name: &str) -> Option<&ServiceInstance> {
        self.service_instances.as_ref()?.get(name)
    }

    /// Add a service instance; `false` if the name is already taken.
    pub fn add_service_instance(&mut self, instance: ServiceInstance) -> bool {
        self.service_instances
            .get_or_insert_with(ServiceInstances::new)
            .add(instance)
    }

    pub fn add_route(&mut self, route: Route) {
        self.routes.get_or_insert_with(Routes::new).add(route);
    }

    /// Register a schema body; see [`SchemaTable::register`].
    pub fn register_schema(&mut self, id: impl Into<String>, body: impl Into<String>) -> String {
        self.schema_table.register(id, body)
    }

    pub fn resolve_schema(&self, id: &str) -> Option<&str> {
        self.schema_table.get(id)
    }

    /// GUIDs of routes whose source or target names no known service instance.
    pub fn dangling_routes(&self) -> Vec<&str> {
        let Some(routes) = &self.routes else {
            return Vec::new();
        };
        let known = |name: Option<&str>| name.is_some_and(|n| self.service_instance(n).is_some());
        routes
            .routes
            .iter()
            .filter(|r| !known(r.src_serv_inst.as_deref()) || !known(r.trgt_serv_inst.as_deref()))
            .map(|r| r.route_guid.as_deref().unwrap_or_default())
            .collect()
    }
}

impl DmiObject for ApplicationPropertySheet {
    const TYPE_ID: i32 = TYPE_APPLICATION_PROPERTY_SHEET;
    const NAME: &'static str = "ApplicationPropertySheet";

    fn write_body<W: Write>(&self, out: &mut W, version: i32) -> DmiResult<()> {
        write_opt_str(out, self.layout.as_deref())?;
        write_optional(out, self.header.as_ref(), version)?;
        write_optional(out, self.service_instances.as_ref(), version)?;
        write_optional(out, self.workflow_start_ports.as_ref(), version)?;
        write_optional(out, self.workflow_exit_ports.as_ref(), version)?;
        write_optional(out, self.routes.as_ref(), version)?;
        write_optional(out, self.on_exception.as_ref(), version)
    }

    fn read_body<R: Read>(input: &mut R, version: i32) -> DmiResult<Self> {
        Ok(Self {
            layout: read_opt_str(input)?,
            header: read_optional(input, "ApplicationPropertySheet.header", version)?,
            service_instances: read_optional(
                input,
                "ApplicationPropertySheet.service_instances",
                version,
            )?,
            workflow_start_ports: read_optional(
                input,
                "ApplicationPropertySheet.workflow_start_ports",
                version,
            )?,
            workflow_exit_ports: read_optional(
                input,
                "ApplicationPropertySheet.workflow_exit_ports",
                version,
            )?,
            routes: read_optional(input, "ApplicationPropertySheet.routes", version)?,
            on_exception: read_optional(input, "ApplicationPropertySheet.on_exception", version)?,
            schema_table: SchemaTable::new(),
        })
    }

    fn validate(&self) -> DmiResult<()> {
        if let Some(header) = &self.header {
            header.validate()?;
        }
        if let Some(instances) = &self.service_instances {
            instances.validate()?;
        }
        if let Some(ports) = &self.workflow_start_ports {
            ports.validate()?;
        }
        if let Some(ports) = &self.workflow_exit_ports {
            ports.validate()?;
        }
        if let Some(routes) = &self.routes {
            routes.validate()?;
        }
        match &self.on_exception {
            Some(handler) => handler.validate(),
            None => Ok(()),
        }
    }
}
