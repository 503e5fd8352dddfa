// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ESB Application Descriptors
//!
//! Typed records describing a deployed integration application (services,
//! ports, routes, runtime arguments, workflow boundaries) and the versioned
//! big-endian binary stream format used to exchange them.
//!
//! # Quick Start
//!
//! ```no_run
//! use esb_dmi::{ApplicationHeader, ApplicationPropertySheet, CodecConfig, Route, ServiceInstance};
//!
//! let mut sheet = ApplicationPropertySheet::new(ApplicationHeader::new("CHAT", "1.0"));
//! sheet.add_service_instance(ServiceInstance::new("Feeder", "feeder-svc", "4.0"));
//! sheet.add_service_instance(ServiceInstance::new("Display", "display-svc", "4.0"));
//! sheet.add_route(Route::new("R1", "Feeder", "OUT", "Display", "IN"));
//!
//! let config = CodecConfig::default();
//! let bytes = esb_dmi::encode_property_sheet(&sheet, &config)?;
//! let decoded = esb_dmi::decode_property_sheet(&bytes, &config)?;
//! assert_eq!(decoded.routes, sheet.routes);
//! # Ok::<(), esb_dmi::DmiError>(())
//! ```
//!
//! # Client Versions
//!
//! | Version | Change |
//! |---------|--------|
//! | 1 | Base format |
//! | 2 | Deployment profiles on service instances |
//! | 3 | Current |

pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod model;

pub use codec::{
    decode_property_sheet, encode_property_sheet, property_sheet_from_json,
    property_sheet_to_json, read_property_sheet_file, write_property_sheet_file, DmiObject,
};
pub use config::{CodecConfig, CodecConfigBuilder, ConfigError};
pub use constants::{CLIENT_VERSION_1, CLIENT_VERSION_CURRENT, DEPLOYMENT_PROFILE_SINCE};
pub use error::{DmiError, DmiResult};
pub use model::*;
