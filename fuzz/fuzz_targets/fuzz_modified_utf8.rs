// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use esb_dmi::codec::{read_utf, write_utf};
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = read_utf(&mut Cursor::new(data)) {
        let mut buf = Vec::new();
        write_utf(&mut buf, &text).expect("decoded string re-encodes");
        let again = read_utf(&mut Cursor::new(&buf)).expect("re-decode");
        assert_eq!(text, again);
    }
});
