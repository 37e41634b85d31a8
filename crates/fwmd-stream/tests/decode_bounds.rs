// Dweve FWMD - Fixed-Width Microdata Engine
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Property tests for decode bounds: no line length can fault the
//! decoder, and truncated fields always degrade to missing.

use fwmd_core::{parse_layout, Value};
use fwmd_stream::RecordDecoder;
use proptest::prelude::*;
use std::io::Cursor;

proptest! {
    /// Decoding any prefix of a valid line never faults; fields fully
    /// past the cut are missing, fields fully covered decode as they
    /// would from the whole line.
    #[test]
    fn truncation_degrades_to_missing(cut in 0usize..30) {
        let layout_text = "@0001 A 4.\n@0005 B $3.\n@0008 C 5.2\n";
        let full_line = "0421abc12345";

        let layout = parse_layout(layout_text).unwrap();
        let line: String = full_line.chars().take(cut).collect();
        let mut decoder = RecordDecoder::new(Cursor::new(line), layout);

        // An empty input yields no record at all; anything else yields
        // exactly one.
        if cut == 0 {
            prop_assert!(decoder.next().is_none());
            return Ok(());
        }
        let record = decoder.next().unwrap().unwrap();

        if cut >= 4 {
            prop_assert_eq!(record.get("A"), Some(&Value::Number(421.0)));
        }
        if cut >= 7 {
            prop_assert_eq!(record.get("B"), Some(&Value::Text("abc".to_string())));
        }
        if cut >= 12 {
            prop_assert_eq!(record.get("C"), Some(&Value::Number(123.45)));
        }
        if cut <= 4 {
            prop_assert_eq!(record.get("B"), Some(&Value::Missing));
        }
        if cut <= 7 {
            prop_assert_eq!(record.get("C"), Some(&Value::Missing));
        }
        prop_assert!(decoder.next().is_none());
    }

    /// Arbitrary byte soup in the numeric columns never aborts the
    /// stream: every line still yields a record.
    #[test]
    fn garbage_lines_never_abort(lines in prop::collection::vec("[ -~]{1,20}", 0..20)) {
        let layout = parse_layout("@0001 A 4.\n@0005 B $3.\n@0008 C 5.\n").unwrap();
        let input = lines.join("\n");
        let expected = lines.len();

        let decoder = RecordDecoder::new(Cursor::new(input), layout);
        let decoded: Vec<_> = decoder.collect();
        prop_assert_eq!(decoded.len(), expected);
        for record in decoded {
            prop_assert!(record.is_ok());
        }
    }
}
