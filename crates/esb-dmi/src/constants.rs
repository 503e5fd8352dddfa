// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire constants: record type identifiers, client versions, selector kinds.
//!
//! Type identifiers are written in every record envelope and must never be
//! renumbered.

// ============================================================================
// CLIENT VERSIONS
// ============================================================================

/// First client version of the stream format.
pub const CLIENT_VERSION_1: i32 = 1;

/// Client version that introduced deployment profiles on service instances.
pub const DEPLOYMENT_PROFILE_SINCE: i32 = 2;

/// Version written by default.
pub const CLIENT_VERSION_CURRENT: i32 = 3;

// ============================================================================
// RECORD TYPE IDENTIFIERS
// ============================================================================

pub const TYPE_APPLICATION_PROPERTY_SHEET: i32 = 1;
pub const TYPE_APPLICATION_HEADER: i32 = 2;
pub const TYPE_APPLICATION_CONTEXT: i32 = 3;
pub const TYPE_SERVICE_INSTANCES: i32 = 4;
pub const TYPE_SERVICE_INSTANCE: i32 = 5;
pub const TYPE_PORT_INST_DESCRIPTOR: i32 = 6;
pub const TYPE_PORT_INSTANCE: i32 = 7;
pub const TYPE_PARAM: i32 = 8;
pub const TYPE_ROUTES: i32 = 9;
pub const TYPE_ROUTE: i32 = 10;
pub const TYPE_ALTERNATE_DESTINATION: i32 = 11;
pub const TYPE_XPATH: i32 = 12;
pub const TYPE_RUNTIME_ARGS: i32 = 13;
pub const TYPE_ARGUMENT: i32 = 14;
pub const TYPE_RUNTIME_DEPENDENCY: i32 = 15;
pub const TYPE_DEPLOYMENT_PROFILE: i32 = 16;
pub const TYPE_ON_EXCEPTION: i32 = 17;
pub const TYPE_WORKFLOW_START_PORTS: i32 = 18;
pub const TYPE_WORKFLOW_EXIT_PORTS: i32 = 19;
pub const TYPE_WF_IN_PORT: i32 = 20;
pub const TYPE_WF_OUT_PORT: i32 = 21;
pub const TYPE_STATUS_TRACKING: i32 = 22;
pub const TYPE_APS_EVENT_MODULE: i32 = 23;

// ============================================================================
// ROUTE SELECTORS
// ============================================================================

/// Selector on the sending service instance name.
pub const SELECTOR_SENDER: &str = "sender";

/// XPath selector evaluated against the message body.
pub const SELECTOR_BODY: &str = "body";

/// XPath selector evaluated against the application context.
pub const SELECTOR_APPLICATION_CONTEXT: &str = "application-context";

/// Leading selector count announcing the current (typed) encoding.
pub const SELECTOR_CURRENT_FORMAT_MARKER: i32 = -1;

/// Whether a selector kind carries a structured XPath value on the wire.
pub fn is_xpath_selector(kind: &str) -> bool {
    kind == SELECTOR_BODY || kind == SELECTOR_APPLICATION_CONTEXT
}

// ============================================================================
// DATES
// ============================================================================

/// Primary creation-date pattern (`dd-MM-yyyy HH:mm:ss`).
pub const DATE_FORMAT_PRIMARY: &str = "%d-%m-%Y %H:%M:%S";

/// Secondary creation-date pattern (`dd-MM-yyyy`).
pub const DATE_FORMAT_SECONDARY: &str = "%d-%m-%Y";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xpath_selector_kinds() {
        assert!(is_xpath_selector(SELECTOR_BODY));
        assert!(is_xpath_selector(SELECTOR_APPLICATION_CONTEXT));
        assert!(!is_xpath_selector(SELECTOR_SENDER));
        assert!(!is_xpath_selector("Body"));
    }
}
