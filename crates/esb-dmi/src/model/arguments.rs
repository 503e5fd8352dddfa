// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime arguments and deployment profiles.

use super::require;
use crate::codec::{
    read_bool, read_opt_str, read_optional, read_seq, validate_all, write_bool, write_opt_str,
    write_optional, write_seq, DmiObject,
};
use crate::constants::{TYPE_ARGUMENT, TYPE_DEPLOYMENT_PROFILE, TYPE_RUNTIME_ARGS};
use crate::error::DmiResult;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// A named launch argument of a service instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Argument {
    /// Argument name.
    pub name: Option<String>,
    /// Argument value.
    pub value: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Kept in memory only (never written to launch scripts).
    pub in_memory: bool,
}

impl Argument {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value.into()),
            ..Default::default()
        }
    }
}

impl DmiObject for Argument {
    const TYPE_ID: i32 = TYPE_ARGUMENT;
    const NAME: &'static str = "Argument";

    fn write_body<W: Write>(&self, out: &mut W, _version: i32) -> DmiResult<()> {
        write_opt_str(out, self.name.as_deref())?;
        write_opt_str(out, self.value.as_deref())?;
        write_opt_str(out, self.description.as_deref())?;
        write_bool(out, self.in_memory)
    }

    fn read_body<R: Read>(input: &mut R, _version: i32) -> DmiResult<Self> {
        Ok(Self {
            name: read_opt_str(input)?,
            value: read_opt_str(input)?,
            description: read_opt_str(input)?,
            in_memory: read_bool(input)?,
        })
    }

    fn validate(&self) -> DmiResult<()> {
        require(Self::NAME, "name", &self.name)
    }
}

/// Launch arguments of a service instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeArgs {
    /// Extra JVM/process parameters.
    pub jvm_params: Option<String>,
    /// Arguments in declaration order.
    pub arguments: Vec<Argument>,
}

impl RuntimeArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an argument by name.
    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments
            .iter()
            .find(|arg| arg.name.as_deref() == Some(name))
    }

    /// Replace the argument with the same name, or append it.
    pub fn set_argument(&mut self, argument: Argument) {
        let existing = self
            .arguments
            .iter_mut()
            .find(|arg| arg.name.is_some() && arg.name == argument.name);
        match existing {
            Some(slot) => *slot = argument,
            None => self.arguments.push(argument),
        }
    }

    /// Copy of `self` with `overrides` applied on top (arguments by name,
    /// JVM parameters when set).
    pub fn merge_overrides(&self, overrides: &RuntimeArgs) -> RuntimeArgs {
        let mut merged = self.clone();
        if overrides.jvm_params.is_some() {
            merged.jvm_params = overrides.jvm_params.clone();
        }
        for argument in &overrides.arguments {
            merged.set_argument(argument.clone());
        }
        merged
    }
}

impl DmiObject for RuntimeArgs {
    const TYPE_ID: i32 = TYPE_RUNTIME_ARGS;
    const NAME: &'static str = "RuntimeArgs";

    fn write_body<W: Write>(&self, out: &mut W, version: i32) -> DmiResult<()> {
        write_opt_str(out, self.jvm_params.as_deref())?;
        write_seq(out, &self.arguments, version)
    }

    fn read_body<R: Read>(input: &mut R, version: i32) -> DmiResult<Self> {
        Ok(Self {
            jvm_params: read_opt_str(input)?,
            arguments: read_seq(input, "RuntimeArgs.arguments", version)?,
        })
    }

    fn validate(&self) -> DmiResult<()> {
        validate_all(&self.arguments)
    }
}

/// Named bundle of argument overrides for launching a service instance
/// under a particular configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentProfile {
    pub profile_name: Option<String>,
    /// Node the profile targets.
    pub node_name: Option<String>,
    pub description: Option<String>,
    /// Overrides applied on top of the instance's runtime args.
    pub runtime_args: Option<RuntimeArgs>,
}

impl DeploymentProfile {
    pub fn new(profile_name: impl Into<String>) -> Self {
        Self {
            profile_name: Some(profile_name.into()),
            ..Default::default()
        }
    }
}

impl DmiObject for DeploymentProfile {
    const TYPE_ID: i32 = TYPE_DEPLOYMENT_PROFILE;
    const NAME: &'static str = "DeploymentProfile";

    fn write_body<W: Write>(&self, out: &mut W, version: i32) -> DmiResult<()> {
        write_opt_str(out, self.profile_name.as_deref())?;
        write_opt_str(out, self.node_name.as_deref())?;
        write_opt_str(out, self.description.as_deref())?;
        write_optional(out, self.runtime_args.as_ref(), version)
    }

    fn read_body<R: Read>(input: &mut R, version: i32) -> DmiResult<Self> {
        Ok(Self {
            profile_name: read_opt_str(input)?,
            node_name: read_opt_str(input)?,
            description: read_opt_str(input)?,
            runtime_args: read_optional(input, "DeploymentProfile.runtime_args", version)?,
        })
    }

    fn validate(&self) -> DmiResult<()> {
        require(Self::NAME, "profile_name", &self.profile_name)?;
        match &self.runtime_args {
            Some(args) => args.validate(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CLIENT_VERSION_CURRENT;
    use crate::error::DmiError;

    fn roundtrip<T: DmiObject>(value: &T) -> T {
        let bytes = value.to_bytes(CLIENT_VERSION_CURRENT).expect("encode");
        T::from_bytes(&bytes, CLIENT_VERSION_CURRENT).expect("decode")
    }

    #[test]
    fn test_argument_roundtrip() {
        let arg = Argument {
            name: Some("-Xmx".into()),
            value: Some("512m".into()),
            description: Some("heap".into()),
            in_memory: true,
        };
        assert_eq!(roundtrip(&arg), arg);
        assert_eq!(roundtrip(&Argument::default()), Argument::default());
    }

    #[test]
    fn test_argument_empty_value_collapses_to_none() {
        let arg = Argument::new("flag", "");
        let decoded = roundtrip(&arg);
        assert_eq!(decoded.name.as_deref(), Some("flag"));
        assert_eq!(decoded.value, None);
    }

    #[test]
    fn test_argument_validation() {
        assert!(Argument::new("a", "b").validate().is_ok());
        match Argument::default().validate() {
            Err(DmiError::InvalidArgument { record, field }) => {
                assert_eq!(record, "Argument");
                assert_eq!(field, "name");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_runtime_args_roundtrip() {
        let args = RuntimeArgs {
            jvm_params: Some("-Dfoo=bar".into()),
            arguments: vec![Argument::new("a", "1"), Argument::new("b", "2")],
        };
        assert_eq!(roundtrip(&args), args);
        assert_eq!(roundtrip(&RuntimeArgs::new()), RuntimeArgs::new());
    }

    #[test]
    fn test_runtime_args_set_and_merge() {
        let mut base = RuntimeArgs::new();
        base.set_argument(Argument::new("url", "tcp://a"));
        base.set_argument(Argument::new("user", "admin"));
        base.set_argument(Argument::new("url", "tcp://b"));
        assert_eq!(base.arguments.len(), 2);
        assert_eq!(
            base.argument("url").and_then(|a| a.value.as_deref()),
            Some("tcp://b")
        );

        let overrides = RuntimeArgs {
            jvm_params: Some("-Xmx1g".into()),
            arguments: vec![Argument::new("user", "ops"), Argument::new("retry", "3")],
        };
        let merged = base.merge_overrides(&overrides);
        assert_eq!(merged.jvm_params.as_deref(), Some("-Xmx1g"));
        let names: Vec<_> = merged
            .arguments
            .iter()
            .filter_map(|a| a.name.as_deref())
            .collect();
        assert_eq!(names, vec!["url", "user", "retry"]);
        assert_eq!(
            merged.argument("user").and_then(|a| a.value.as_deref()),
            Some("ops")
        );
        // base untouched
        assert_eq!(base.jvm_params, None);
    }

    #[test]
    fn test_deployment_profile_roundtrip() {
        let mut profile = DeploymentProfile::new("production");
        profile.node_name = Some("peer1".into());
        profile.runtime_args = Some(RuntimeArgs {
            jvm_params: None,
            arguments: vec![Argument::new("pool", "16")],
        });
        assert_eq!(roundtrip(&profile), profile);

        let bare = DeploymentProfile::new("dev");
        let bytes = bare.to_bytes(CLIENT_VERSION_CURRENT).expect("encode");
        // envelope + 3 strings (3 + 2 + 2 bytes) + absent flag
        assert_eq!(bytes.len(), 4 + 5 + 2 + 2 + 4);
        assert_eq!(roundtrip(&bare), bare);
    }

    #[test]
    fn test_deployment_profile_validation() {
        assert!(DeploymentProfile::default().validate().is_err());

        let mut profile = DeploymentProfile::new("p");
        profile.runtime_args = Some(RuntimeArgs {
            jvm_params: None,
            arguments: vec![Argument::default()],
        });
        assert!(matches!(
            profile.validate(),
            Err(DmiError::InvalidArgument {
                record: "Argument",
                ..
            })
        ));
    }
}
