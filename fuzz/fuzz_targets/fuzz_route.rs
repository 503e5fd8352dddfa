// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use esb_dmi::{DmiObject, Route, CLIENT_VERSION_CURRENT};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Selector encoding is normalized on write, so a second pass is stable
    if let Ok(route) = Route::from_bytes(data, CLIENT_VERSION_CURRENT) {
        let Ok(first) = route.to_bytes(CLIENT_VERSION_CURRENT) else {
            return;
        };
        let decoded = Route::from_bytes(&first, CLIENT_VERSION_CURRENT).expect("re-decode");
        let second = decoded.to_bytes(CLIENT_VERSION_CURRENT).expect("re-encode");
        assert_eq!(first, second);
    }
});
