// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use esb_dmi::{ApplicationPropertySheet, DmiObject, CLIENT_VERSION_1, CLIENT_VERSION_CURRENT};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for version in [CLIENT_VERSION_1, CLIENT_VERSION_CURRENT] {
        // Anything that decodes must re-encode
        if let Ok(sheet) = ApplicationPropertySheet::from_bytes(data, version) {
            let _ = sheet.validate();
            assert!(sheet.to_bytes(version).is_ok());
        }
    }
});
