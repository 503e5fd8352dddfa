// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! dmictl - ESB application descriptor tool.
//!
//! # Usage
//!
//! ```bash
//! # Summarize a binary descriptor
//! dmictl inspect chat.dmi
//!
//! # Check mandatory fields
//! dmictl validate chat.dmi
//!
//! # Convert between binary and JSON
//! dmictl export chat.dmi --output chat.json
//! dmictl import chat.json --output chat.dmi
//!
//! # Read a stream written by a version 1 client
//! dmictl --client-version 1 inspect legacy.dmi
//!
//! # Using configuration file
//! dmictl --config dmi.toml validate chat.dmi
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use esb_dmi::{
    property_sheet_from_json, property_sheet_to_json, read_property_sheet_file,
    write_property_sheet_file, ApplicationPropertySheet, CodecConfig, DmiObject,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// ESB application descriptor tool
#[derive(Parser, Debug)]
#[command(name = "dmictl")]
#[command(about = "Inspect, validate and convert ESB application descriptors")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Client version of the stream (overrides the configuration file)
    #[arg(long, global = true)]
    client_version: Option<i32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a summary of a binary descriptor
    Inspect {
        /// Binary descriptor file
        input: PathBuf,
    },

    /// Decode a binary descriptor and check mandatory fields
    Validate {
        /// Binary descriptor file
        input: PathBuf,
    },

    /// Convert a binary descriptor to JSON
    Export {
        /// Binary descriptor file
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a JSON descriptor to the binary format
    Import {
        /// JSON descriptor file
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Generate example configuration file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "dmi.toml")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = build_config(&args)?;

    // Initialize logging
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match args.command {
        Commands::Inspect { input } => cmd_inspect(&input, &config),
        Commands::Validate { input } => cmd_validate(&input, &config),
        Commands::Export { input, output } => cmd_export(&input, output.as_deref(), &config),
        Commands::Import { input, output } => cmd_import(&input, &output, &config),
        Commands::GenConfig { output } => cmd_gen_config(&output),
    }
}

fn build_config(args: &Args) -> anyhow::Result<CodecConfig> {
    let mut config = match &args.config {
        Some(path) => CodecConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => CodecConfig::default(),
    };
    if let Some(version) = args.client_version {
        config.client_version = version;
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

fn load(input: &Path, config: &CodecConfig) -> anyhow::Result<ApplicationPropertySheet> {
    read_property_sheet_file(input, config)
        .with_context(|| format!("decoding {}", input.display()))
}

fn cmd_inspect(input: &Path, config: &CodecConfig) -> anyhow::Result<()> {
    let sheet = load(input, config)?;
    print!("{}", summarize(&sheet));
    for guid in sheet.dangling_routes() {
        warn!("Route {} references an unknown service instance", guid);
    }
    Ok(())
}

fn cmd_validate(input: &Path, config: &CodecConfig) -> anyhow::Result<()> {
    let sheet = load(input, config)?;
    sheet
        .validate()
        .with_context(|| format!("{} is not a valid descriptor", input.display()))?;

    let dangling = sheet.dangling_routes();
    for guid in &dangling {
        warn!("Route {} references an unknown service instance", guid);
    }
    println!("{}: valid ({} warning(s))", input.display(), dangling.len());
    Ok(())
}

fn cmd_export(input: &Path, output: Option<&Path>, config: &CodecConfig) -> anyhow::Result<()> {
    let sheet = load(input, config)?;
    let json = property_sheet_to_json(&sheet)?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!("Exported {} -> {}", input.display(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn cmd_import(input: &Path, output: &Path, config: &CodecConfig) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let sheet = property_sheet_from_json(&json)
        .with_context(|| format!("parsing {}", input.display()))?;
    write_property_sheet_file(output, &sheet, config)
        .with_context(|| format!("encoding {}", output.display()))?;
    info!(
        "Imported {} -> {} (client version {})",
        input.display(),
        output.display(),
        config.client_version
    );
    Ok(())
}

fn cmd_gen_config(output: &Path) -> anyhow::Result<()> {
    let toml = CodecConfig::default().to_toml()?;
    let content = format!("# dmictl codec configuration\n\n{}", toml);
    std::fs::write(output, content).with_context(|| format!("writing {}", output.display()))?;
    println!("Generated configuration: {}", output.display());
    Ok(())
}

fn summarize(sheet: &ApplicationPropertySheet) -> String {
    let mut out = String::new();

    if let Some(header) = &sheet.header {
        out.push_str(&format!(
            "Application: {} v{}\n",
            header.application_guid.as_deref().unwrap_or("-"),
            header.version.as_deref().unwrap_or("-")
        ));
        if let Some(name) = &header.display_name {
            out.push_str(&format!("  Name: {}\n", name));
        }
        if let Some(created) = header.creation_date_string() {
            out.push_str(&format!("  Created: {}\n", created));
        }
    }

    let instances = sheet.service_instances.as_ref();
    out.push_str(&format!(
        "Service instances: {}\n",
        instances.map_or(0, |i| i.len())
    ));
    for instance in instances.iter().flat_map(|i| i.instances.iter()) {
        let ports = instance.port_inst_descriptor.as_ref();
        out.push_str(&format!(
            "  - {} ({} {}) in={} out={} profiles={}\n",
            instance.instance_name.as_deref().unwrap_or("-"),
            instance.service_guid.as_deref().unwrap_or("-"),
            instance.version.as_deref().unwrap_or("-"),
            ports.map_or(0, |p| p.input_ports.len()),
            ports.map_or(0, |p| p.output_ports.len()),
            instance.deployment_profiles.len()
        ));
    }

    let routes = sheet.routes.as_ref();
    out.push_str(&format!("Routes: {}\n", routes.map_or(0, |r| r.len())));
    for route in routes.iter().flat_map(|r| r.routes.iter()) {
        out.push_str(&format!(
            "  - {}: {}.{} -> {}.{} selectors={}\n",
            route.route_guid.as_deref().unwrap_or("-"),
            route.src_serv_inst.as_deref().unwrap_or("-"),
            route.src_port_name.as_deref().unwrap_or("-"),
            route.trgt_serv_inst.as_deref().unwrap_or("-"),
            route.trgt_port_name.as_deref().unwrap_or("-"),
            route.selectors.len()
        ));
    }

    if let Some(handler) = &sheet.on_exception {
        if handler.error_handling_supported {
            out.push_str(&format!(
                "Exceptions: {}.{}\n",
                handler.target_service_instance.as_deref().unwrap_or("-"),
                handler.target_port.as_deref().unwrap_or("-")
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use esb_dmi::{ApplicationHeader, Route, ServiceInstance};

    fn sample() -> ApplicationPropertySheet {
        let mut sheet = ApplicationPropertySheet::new(ApplicationHeader::new("CHAT", "1.0"));
        sheet.add_service_instance(ServiceInstance::new("Feeder", "feeder-svc", "4.0"));
        sheet.add_route(Route::new("R1", "Feeder", "OUT", "Display", "IN"));
        sheet
    }

    #[test]
    fn test_summary() {
        let text = summarize(&sample());
        assert!(text.contains("Application: CHAT v1.0"));
        assert!(text.contains("Service instances: 1"));
        assert!(text.contains("R1: Feeder.OUT -> Display.IN selectors=0"));
    }

    #[test]
    fn test_import_export_roundtrip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let json_in = dir.path().join("in.json");
        let binary = dir.path().join("chat.dmi");
        let json_out = dir.path().join("out.json");
        let config = CodecConfig::default();

        std::fs::write(&json_in, property_sheet_to_json(&sample()).expect("json")).expect("write");
        cmd_import(&json_in, &binary, &config).expect("import");
        cmd_validate(&binary, &config).expect("validate");
        cmd_export(&binary, Some(&json_out), &config).expect("export");

        let json = std::fs::read_to_string(&json_out).expect("read");
        let sheet = property_sheet_from_json(&json).expect("parse");
        assert_eq!(sheet.routes, sample().routes);
    }

    #[test]
    fn test_gen_config_loads_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("dmi.toml");
        cmd_gen_config(&path).expect("gen-config");
        assert_eq!(
            CodecConfig::from_file(&path).expect("load"),
            CodecConfig::default()
        );
    }

    #[test]
    fn test_client_version_override() {
        let args = Args::parse_from(["dmictl", "--client-version", "1", "inspect", "x.dmi"]);
        assert_eq!(build_config(&args).expect("config").client_version, 1);

        let args = Args::parse_from(["dmictl", "--client-version", "7", "inspect", "x.dmi"]);
        assert!(build_config(&args).is_err());
    }
}
