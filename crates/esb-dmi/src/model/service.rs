// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service instances and their runtime configuration.

use super::{require, DeploymentProfile, PortInstDescriptor, RuntimeArgs};
use crate::codec::{
    read_bool, read_int, read_opt_str, read_optional, read_seq, validate_all, write_bool,
    write_int, write_opt_str, write_optional, write_seq, DmiObject,
};
use crate::constants::{
    DEPLOYMENT_PROFILE_SINCE, TYPE_APS_EVENT_MODULE, TYPE_RUNTIME_DEPENDENCY,
    TYPE_SERVICE_INSTANCE, TYPE_SERVICE_INSTANCES, TYPE_STATUS_TRACKING,
};
use crate::error::{DmiError, DmiResult};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// How the platform starts a service instance.
pub mod launch_type {
    pub const SEPARATE_PROCESS: i32 = 0;
    pub const IN_MEMORY: i32 = 1;
    pub const MANUAL: i32 = 2;
    pub const NONE: i32 = 3;
}

/// A service (by GUID and version) that must be deployed alongside.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeDependency {
    pub service_guid: Option<String>,
    pub version: Option<String>,
}

impl RuntimeDependency {
    pub fn new(service_guid: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service_guid: Some(service_guid.into()),
            version: Some(version.into()),
        }
    }
}

impl DmiObject for RuntimeDependency {
    const TYPE_ID: i32 = TYPE_RUNTIME_DEPENDENCY;
    const NAME: &'static str = "RuntimeDependency";

    fn write_body<W: Write>(&self, out: &mut W, _version: i32) -> DmiResult<()> {
        write_opt_str(out, self.service_guid.as_deref())?;
        write_opt_str(out, self.version.as_deref())
    }

    fn read_body<R: Read>(input: &mut R, _version: i32) -> DmiResult<Self> {
        Ok(Self {
            service_guid: read_opt_str(input)?,
            version: read_opt_str(input)?,
        })
    }

    fn validate(&self) -> DmiResult<()> {
        require(Self::NAME, "service_guid", &self.service_guid)?;
        require(Self::NAME, "version", &self.version)
    }
}

/// Event module reporting status of a service instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApsEventModule {
    pub module_name: Option<String>,
    pub category: Option<String>,
    pub enabled: bool,
    pub event_level: i32,
}

impl ApsEventModule {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: Some(module_name.into()),
            enabled: true,
            ..Default::default()
        }
    }
}

impl DmiObject for ApsEventModule {
    const TYPE_ID: i32 = TYPE_APS_EVENT_MODULE;
    const NAME: &'static str = "ApsEventModule";

    fn write_body<W: Write>(&self, out: &mut W, _version: i32) -> DmiResult<()> {
        write_opt_str(out, self.module_name.as_deref())?;
        write_opt_str(out, self.category.as_deref())?;
        write_bool(out, self.enabled)?;
        write_int(out, self.event_level)
    }

    fn read_body<R: Read>(input: &mut R, _version: i32) -> DmiResult<Self> {
        Ok(Self {
            module_name: read_opt_str(input)?,
            category: read_opt_str(input)?,
            enabled: read_bool(input)?,
            event_level: read_int(input)?,
        })
    }

    fn validate(&self) -> DmiResult<()> {
        require(Self::NAME, "module_name", &self.module_name)
    }
}

/// Status tracking settings of a service instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusTracking {
    pub enabled: bool,
    pub event_modules: Vec<ApsEventModule>,
}

impl DmiObject for StatusTracking {
    const TYPE_ID: i32 = TYPE_STATUS_TRACKING;
    const NAME: &'static str = "StatusTracking";

    fn write_body<W: Write>(&self, out: &mut W, version: i32) -> DmiResult<()> {
        write_bool(out, self.enabled)?;
        write_seq(out, &self.event_modules, version)
    }

    fn read_body<R: Read>(input: &mut R, version: i32) -> DmiResult<Self> {
        Ok(Self {
            enabled: read_bool(input)?,
            event_modules: read_seq(input, "StatusTracking.event_modules", version)?,
        })
    }

    fn validate(&self) -> DmiResult<()> {
        validate_all(&self.event_modules)
    }
}

/// A configured, deployable unit of work in an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceInstance {
    pub instance_name: Option<String>,
    pub service_guid: Option<String>,
    pub version: Option<String>,
    /// Node the instance is deployed on.
    pub node_name: Option<String>,
    pub description: Option<String>,
    pub manageable: bool,
    pub debug_mode: bool,
    pub debug_port: i32,
    /// One of [`launch_type`].
    pub launch_type: i32,
    pub runtime_dependencies: Vec<RuntimeDependency>,
    pub runtime_args: Option<RuntimeArgs>,
    pub port_inst_descriptor: Option<PortInstDescriptor>,
    pub status_tracking: Option<StatusTracking>,
    /// Written from client version 2 on.
    pub deployment_profiles: Vec<DeploymentProfile>,
    /// Profile applied when none is named explicitly. Written from client
    /// version 2 on.
    pub active_profile: Option<String>,
}

impl ServiceInstance {
    pub fn new(
        instance_name: impl Into<String>,
        service_guid: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            instance_name: Some(instance_name.into()),
            service_guid: Some(service_guid.into()),
            version: Some(version.into()),
            ..Default::default()
        }
    }

    pub fn deployment_profile(&self, name: &str) -> Option<&DeploymentProfile> {
        self.deployment_profiles
            .iter()
            .find(|p| p.profile_name.as_deref() == Some(name))
    }

    /// Runtime args to launch with: the instance's own args overridden by
    /// the named profile, or by `active_profile` when `profile` is `None`.
    pub fn effective_runtime_args(&self, profile: Option<&str>) -> DmiResult<RuntimeArgs> {
        let base = self.runtime_args.clone().unwrap_or_default();
        let name = match profile.or(self.active_profile.as_deref()) {
            Some(name) => name,
            None => return Ok(base),
        };

        let profile = self.deployment_profile(name).ok_or_else(|| {
            DmiError::InvalidValue(format!(
                "service instance {}: unknown deployment profile '{}'",
                self.instance_name.as_deref().unwrap_or_default(),
                name
            ))
        })?;

        Ok(match &profile.runtime_args {
            Some(overrides) => base.merge_overrides(overrides),
            None => base,
        })
    }
}

impl DmiObject for ServiceInstance {
    const TYPE_ID: i32 = TYPE_SERVICE_INSTANCE;
    const NAME: &'static str = "ServiceInstance";

    fn write_body<W: Write>(&self, out: &mut W, version: i32) -> DmiResult<()> {
        write_opt_str(out, self.instance_name.as_deref())?;
        write_opt_str(out, self.service_guid.as_deref())?;
        write_opt_str(out, self.version.as_deref())?;
        write_opt_str(out, self.node_name.as_deref())?;
        write_opt_str(out, self.description.as_deref())?;
        write_bool(out, self.manageable)?;
        write_bool(out, self.debug_mode)?;
        write_int(out, self.debug_port)?;
        write_int(out, self.launch_type)?;
        write_seq(out, &self.runtime_dependencies, version)?;
        write_optional(out, self.runtime_args.as_ref(), version)?;
        write_optional(out, self.port_inst_descriptor.as_ref(), version)?;
        write_optional(out, self.status_tracking.as_ref(), version)?;

        if version >= DEPLOYMENT_PROFILE_SINCE {
            write_seq(out, &self.deployment_profiles, version)?;
            write_opt_str(out, self.active_profile.as_deref())?;
        } else if !self.deployment_profiles.is_empty() {
            tracing::debug!(
                instance = self.instance_name.as_deref().unwrap_or_default(),
                version,
                "deployment profiles not representable in this client version"
            );
        }
        Ok(())
    }

    fn read_body<R: Read>(input: &mut R, version: i32) -> DmiResult<Self> {
        let mut instance = Self {
            instance_name: read_opt_str(input)?,
            service_guid: read_opt_str(input)?,
            version: read_opt_str(input)?,
            node_name: read_opt_str(input)?,
            description: read_opt_str(input)?,
            manageable: read_bool(input)?,
            debug_mode: read_bool(input)?,
            debug_port: read_int(input)?,
            launch_type: read_int(input)?,
            runtime_dependencies: read_seq(input, "ServiceInstance.runtime_dependencies", version)?,
            runtime_args: read_optional(input, "ServiceInstance.runtime_args", version)?,
            port_inst_descriptor: read_optional(
                input,
                "ServiceInstance.port_inst_descriptor",
                version,
            )?,
            status_tracking: read_optional(input, "ServiceInstance.status_tracking", version)?,
            deployment_profiles: Vec::new(),
            active_profile: None,
        };

        if version >= DEPLOYMENT_PROFILE_SINCE {
            instance.deployment_profiles =
                read_seq(input, "ServiceInstance.deployment_profiles", version)?;
            instance.active_profile = read_opt_str(input)?;
        }
        Ok(instance)
    }

    fn validate(&self) -> DmiResult<()> {
        require(Self::NAME, "instance_name", &self.instance_name)?;
        require(Self::NAME, "service_guid", &self.service_guid)?;
        require(Self::NAME, "version", &self.version)?;

        if self.debug_mode && self.debug_port <= 0 {
            return Err(DmiError::InvalidValue(format!(
                "service instance {}: debug mode requires a positive debug port, got {}",
                self.instance_name.as_deref().unwrap_or_default(),
                self.debug_port
            )));
        }

        validate_all(&self.runtime_dependencies)?;
        if let Some(args) = &self.runtime_args {
            args.validate()?;
        }
        if let Some(ports) = &self.port_inst_descriptor {
            ports.validate()?;
        }
        if let Some(tracking) = &self.status_tracking {
            tracking.validate()?;
        }
        validate_all(&self.deployment_profiles)?;

        if let Some(active) = self.active_profile.as_deref() {
            if self.deployment_profile(active).is_none() {
                return Err(DmiError::InvalidValue(format!(
                    "service instance {}: active profile '{}' is not defined",
                    self.instance_name.as_deref().unwrap_or_default(),
                    active
                )));
            }
        }
        Ok(())
    }
}

/// Ordered service instances of an application, unique by instance name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceInstances {
    pub instances: Vec<ServiceInstance>,
}

impl ServiceInstances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an instance. An instance whose name is already present is
    /// dropped and `false` is returned.
    pub fn add(&mut self, instance: ServiceInstance) -> bool {
        if let Some(name) = instance.instance_name.as_deref() {
            if self.get(name).is_some() {
                tracing::debug!(instance = name, "dropping duplicate service instance");
                return false;
            }
        }
        self.instances.push(instance);
        true
    }

    pub fn get(&self, name: &str) -> Option<&ServiceInstance> {
        self.instances
            .iter()
            .find(|i| i.instance_name.as_deref() == Some(name))
    }

    pub fn remove(&mut self, name: &str) -> Option<ServiceInstance> {
        let pos = self
            .instances
            .iter()
            .position(|i| i.instance_name.as_deref() == Some(name))?;
        Some(self.instances.remove(pos))
    }

    /// Instance names in order.
    pub fn names(&self) -> Vec<&str> {
        self.instances
            .iter()
            .filter_map(|i| i.instance_name.as_deref())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl DmiObject for ServiceInstances {
    const TYPE_ID: i32 = TYPE_SERVICE_INSTANCES;
    const NAME: &'static str = "ServiceInstances";

    fn write_body<W: Write>(&self, out: &mut W, version: i32) -> DmiResult<()> {
        write_seq(out, &self.instances, version)
    }

    fn read_body<R: Read>(input: &mut R, version: i32) -> DmiResult<Self> {
        Ok(Self {
            instances: read_seq(input, "ServiceInstances.instances", version)?,
        })
    }

    fn validate(&self) -> DmiResult<()> {
        validate_all(&self.instances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CLIENT_VERSION_1, CLIENT_VERSION_CURRENT};
    use crate::model::{Argument, Param, PortInstance};

    fn roundtrip<T: DmiObject>(value: &T, version: i32) -> T {
        let bytes = value.to_bytes(version).expect("encode");
        T::from_bytes(&bytes, version).expect("decode")
    }

    fn sample_instance(name: &str) -> ServiceInstance {
        let mut instance = ServiceInstance::new(name, "chat", "4.0");
        instance.node_name = Some("peer1".into());
        instance.manageable = true;
        instance.launch_type = launch_type::IN_MEMORY;
        instance.runtime_dependencies = vec![RuntimeDependency::new("jms-lib", "1.2")];
        instance.runtime_args = Some(RuntimeArgs {
            jvm_params: Some("-Xmx256m".into()),
            arguments: vec![Argument::new("url", "tcp://base"), Argument::new("user", "u")],
        });

        let mut input = PortInstance::new("IN_PORT");
        input.params.push(Param::new("ack", "auto"));
        instance.port_inst_descriptor = Some(PortInstDescriptor {
            input_ports: vec![input],
            output_ports: vec![PortInstance::new("OUT_PORT")],
        });
        instance.status_tracking = Some(StatusTracking {
            enabled: true,
            event_modules: vec![ApsEventModule::new("sbw")],
        });

        let mut profile = DeploymentProfile::new("prod");
        profile.runtime_args = Some(RuntimeArgs {
            jvm_params: None,
            arguments: vec![Argument::new("url", "tcp://prod")],
        });
        instance.deployment_profiles = vec![profile, DeploymentProfile::new("dev")];
        instance.active_profile = Some("prod".into());
        instance
    }

    #[test]
    fn test_leaf_roundtrips() {
        let dep = RuntimeDependency::new("svc", "1.0");
        assert_eq!(roundtrip(&dep, CLIENT_VERSION_CURRENT), dep);

        let mut module = ApsEventModule::new("tracker");
        module.category = Some("workflow".into());
        module.event_level = 3;
        assert_eq!(roundtrip(&module, CLIENT_VERSION_CURRENT), module);

        let tracking = StatusTracking::default();
        assert_eq!(roundtrip(&tracking, CLIENT_VERSION_CURRENT), tracking);
    }

    #[test]
    fn test_service_instance_roundtrip() {
        let instance = sample_instance("chat1");
        assert_eq!(roundtrip(&instance, CLIENT_VERSION_CURRENT), instance);

        let bare = ServiceInstance::default();
        assert_eq!(roundtrip(&bare, CLIENT_VERSION_CURRENT), bare);
    }

    #[test]
    fn test_profiles_dropped_for_old_client_version() {
        let instance = sample_instance("chat1");
        let old = instance.to_bytes(CLIENT_VERSION_1).expect("encode v1");
        let current = instance.to_bytes(CLIENT_VERSION_CURRENT).expect("encode current");
        assert!(old.len() < current.len());

        let decoded = ServiceInstance::from_bytes(&old, CLIENT_VERSION_1).expect("decode v1");
        assert!(decoded.deployment_profiles.is_empty());
        assert_eq!(decoded.active_profile, None);
        assert_eq!(decoded.runtime_args, instance.runtime_args);
        assert_eq!(decoded.port_inst_descriptor, instance.port_inst_descriptor);

        // a v1 stream read as current runs out of bytes
        assert!(ServiceInstance::from_bytes(&old, CLIENT_VERSION_CURRENT).is_err());
    }

    #[test]
    fn test_effective_runtime_args() {
        let instance = sample_instance("chat1");

        let active = instance.effective_runtime_args(None).expect("active profile");
        assert_eq!(
            active.argument("url").and_then(|a| a.value.as_deref()),
            Some("tcp://prod")
        );
        assert_eq!(active.jvm_params.as_deref(), Some("-Xmx256m"));
        assert_eq!(
            active.argument("user").and_then(|a| a.value.as_deref()),
            Some("u")
        );

        let dev = instance.effective_runtime_args(Some("dev")).expect("dev profile");
        assert_eq!(
            dev.argument("url").and_then(|a| a.value.as_deref()),
            Some("tcp://base")
        );

        assert!(matches!(
            instance.effective_runtime_args(Some("qa")),
            Err(DmiError::InvalidValue(_))
        ));

        let plain = ServiceInstance::new("x", "svc", "1.0");
        assert_eq!(
            plain.effective_runtime_args(None).expect("no profile"),
            RuntimeArgs::default()
        );
    }

    #[test]
    fn test_service_instance_validation() {
        assert!(sample_instance("chat1").validate().is_ok());

        let mut instance = sample_instance("chat1");
        instance.service_guid = Some(String::new());
        assert!(matches!(
            instance.validate(),
            Err(DmiError::InvalidArgument {
                record: "ServiceInstance",
                field: "service_guid"
            })
        ));

        let mut instance = sample_instance("chat1");
        instance.debug_mode = true;
        instance.debug_port = 0;
        assert!(matches!(instance.validate(), Err(DmiError::InvalidValue(_))));
        instance.debug_port = 5005;
        assert!(instance.validate().is_ok());

        let mut instance = sample_instance("chat1");
        instance.active_profile = Some("staging".into());
        assert!(matches!(instance.validate(), Err(DmiError::InvalidValue(_))));

        let mut instance = sample_instance("chat1");
        instance.runtime_dependencies.push(RuntimeDependency::default());
        assert!(matches!(
            instance.validate(),
            Err(DmiError::InvalidArgument {
                record: "RuntimeDependency",
                ..
            })
        ));
    }

    #[test]
    fn test_service_instances_drop_duplicate_names() {
        let mut instances = ServiceInstances::new();
        assert!(instances.add(sample_instance("a")));
        assert!(instances.add(sample_instance("b")));
        assert!(!instances.add(ServiceInstance::new("a", "other", "9.9")));
        assert_eq!(instances.names(), vec!["a", "b"]);
        assert_eq!(
            instances.get("a").and_then(|i| i.service_guid.as_deref()),
            Some("chat")
        );

        let decoded = roundtrip(&instances, CLIENT_VERSION_CURRENT);
        assert_eq!(decoded, instances);

        let removed = instances.remove("b").expect("remove b");
        assert_eq!(removed.instance_name.as_deref(), Some("b"));
        assert!(instances.remove("b").is_none());
        assert_eq!(instances.len(), 1);
    }

    #[test]
    fn test_codec_keeps_duplicates_added_directly() {
        let instances = ServiceInstances {
            instances: vec![sample_instance("a"), sample_instance("a")],
        };
        let decoded = roundtrip(&instances, CLIENT_VERSION_CURRENT);
        assert_eq!(decoded.len(), 2);
    }
}
