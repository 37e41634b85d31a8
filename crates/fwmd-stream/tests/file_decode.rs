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

//! Decoding from an actual file handle, the way the pipeline runs.

use fwmd_core::parse_layout;
use fwmd_stream::RecordDecoder;
use std::fs::File;
use std::io::{BufReader, Write};
use tempfile::tempdir;

#[test]
fn test_decode_extract_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("extract.txt");
    let mut f = File::create(&path).unwrap();
    for n in 0..500 {
        writeln!(f, "{:04}X", n).unwrap();
    }
    drop(f);

    let layout = parse_layout("@0001 N 4.\n@0005 T $1.\n").unwrap();
    let decoder = RecordDecoder::new(BufReader::new(File::open(&path).unwrap()), layout);

    let mut count = 0u64;
    for (i, record) in decoder.enumerate() {
        let record = record.unwrap();
        assert_eq!(record.get("N").unwrap().as_number(), Some(i as f64));
        assert_eq!(record.get("T").unwrap().as_text(), Some("X"));
        count += 1;
    }
    assert_eq!(count, 500);
}
