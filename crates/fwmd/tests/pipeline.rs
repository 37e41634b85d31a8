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

//! End-to-end pipeline tests: layout grammar through decoding, label
//! join, deflation, aggregation and the output stream.

use fwmd::agg::AggregateConfig;
use fwmd::csv::{read_index_series, read_wage_series, CodeJoiner, CodeTable, RecordWriter};
use fwmd::expr::{compile_expression, guard_query, ExprError};
use fwmd::npv::{apply_deflation, build_factors, BandSet, DeflateConfig, Deflator};
use fwmd::stream::{DecoderConfig, HouseholdIdSpec, RecordDecoder};
use fwmd::{aggregate_households, decode, parse_layout, Value};
use std::io::Cursor;

const LAYOUT: &str = "\
@0001 Ano 4.          /* ano de referência */
@0005 Trimestre 1.    /* trimestre de referência */
@0006 UPA $9.
@0015 V1008 $2.
@0017 UF $2.          /* unidade da federação */
@0019 VD4020 8.2      /* rendimento efetivo */
";

// Three persons across two households of one sampling unit. The second
// person's income field is blank.
const EXTRACT: &str = "\
20252000123456013500100000
202520001234560135        \n\
20252000123456023300300000
";

fn decoder_config() -> DecoderConfig {
    DecoderConfig {
        household: Some(HouseholdIdSpec {
            year: "Ano".to_string(),
            quarter: "Trimestre".to_string(),
            psu: "UPA".to_string(),
            selection: "V1008".to_string(),
            output: "household_id".to_string(),
        }),
        ..Default::default()
    }
}

#[test]
fn decode_example_from_minimal_layout() {
    // Field A at byte 1, width 3, numeric; field B at byte 4, width 1,
    // text. Line "007X" decodes to A = 7, B = "X".
    let layout = parse_layout("@0001 A 3.\n@0004 B $1.\n").unwrap();
    let mut records = decode(Cursor::new("007X"), layout);
    let record = records.next().unwrap().unwrap();
    assert_eq!(record.get("A"), Some(&Value::Number(7.0)));
    assert_eq!(record.get("B"), Some(&Value::Text("X".to_string())));
    assert!(records.next().is_none());
}

#[test]
fn deflation_example_numbers() {
    let index = read_index_series(
        "date,index\n2025-06,100\n2025-07,102\n".as_bytes(),
    )
    .unwrap();
    let wages = read_wage_series("date,value\n2025-01,1518.00\n".as_bytes()).unwrap();

    let factors = build_factors(&index, "2025-07".parse().unwrap()).unwrap();
    assert_eq!(factors.factor("2025-06".parse().unwrap()), Some(1.02));

    let deflator = Deflator::new(
        factors,
        &wages,
        DeflateConfig::new(vec!["VD4020".to_string()]),
    )
    .unwrap();
    assert_eq!(deflator.wage(), 1518.0);

    // Raw income 1000 observed at 2025-06: deflated 1020, about 0.672
    // minimum wages.
    let layout = parse_layout("@0001 Ano 4.\n@0005 Trimestre 1.\n@0006 VD4020 6.\n").unwrap();
    let records = decode(Cursor::new("20252001000"), layout).filter_map(|r| r.ok());
    let out: Vec<_> = apply_deflation(records, deflator).collect();
    assert_eq!(out[0].get("VD4020_202507"), Some(&Value::Number(1020.0)));
    let mw = out[0].get("VD4020_mw").unwrap().as_number().unwrap();
    assert!((mw - 0.672).abs() < 1e-3);
}

#[test]
fn full_pipeline_to_output_stream() {
    let layout = parse_layout(LAYOUT).unwrap();
    let decoder = RecordDecoder::with_config(Cursor::new(EXTRACT), layout, decoder_config());

    // Labels for the federation-unit code.
    let mut joiner = CodeJoiner::new();
    joiner.register(
        "UF__unidade_da_federacao",
        CodeTable::from_pairs([("35", "São Paulo"), ("33", "Rio de Janeiro")]),
    );

    // Deflation to July 2025.
    let index = read_index_series("date,index\n2025-06,100\n2025-07,102\n".as_bytes()).unwrap();
    let wages = read_wage_series("date,value\n2025-01,1518.00\n".as_bytes()).unwrap();
    let factors = build_factors(&index, "2025-07".parse().unwrap()).unwrap();
    let mut config = DeflateConfig::new(vec!["VD4020__rendimento_efetivo".to_string()]);
    config.year_field = "Ano__ano_de_referencia".to_string();
    config.quarter_field = "Trimestre__trimestre_de_referencia".to_string();
    let deflator = Deflator::new(factors, &wages, config).unwrap();

    let records = decoder.filter_map(|r| r.ok()).map(|r| joiner.annotate(r));
    let annotated: Vec<_> = apply_deflation(records, deflator).collect();
    assert_eq!(annotated.len(), 3);

    // Write the ordered tabular stream.
    let mut writer = RecordWriter::new(Vec::new());
    for record in &annotated {
        writer.write(record).unwrap();
    }
    let out = String::from_utf8(writer.finish().unwrap()).unwrap();
    let header = out.lines().next().unwrap();
    assert_eq!(
        header,
        "Ano__ano_de_referencia,Trimestre__trimestre_de_referencia,UPA,V1008,\
         UF__unidade_da_federacao,VD4020__rendimento_efetivo,household_id,\
         UF__unidade_da_federacao_label,VD4020__rendimento_efetivo_202507,\
         VD4020__rendimento_efetivo_mw"
    );
    let first = out.lines().nth(1).unwrap();
    assert!(first.contains("São Paulo"));
    assert!(first.contains("20252-000123456-01"));
    assert!(first.contains("1020"));

    // Aggregate persons into households on the raw key columns.
    let config = AggregateConfig {
        key_fields: vec!["household_id".to_string()],
        sum_fields: vec![
            "VD4020__rendimento_efetivo".to_string(),
            "VD4020__rendimento_efetivo_202507".to_string(),
        ],
        carry_fields: vec!["UF__unidade_da_federacao_label".to_string()],
    };
    let households = aggregate_households(annotated, config).unwrap();
    assert_eq!(households.len(), 2);

    let h1 = &households[0];
    assert_eq!(h1.persons(), 2);
    assert_eq!(h1.sum("VD4020__rendimento_efetivo"), Some(1000.0));
    assert_eq!(h1.sum("VD4020__rendimento_efetivo_202507"), Some(1020.0));
    assert_eq!(
        h1.carried("UF__unidade_da_federacao_label"),
        Some(&Value::Text("São Paulo".to_string()))
    );

    let h2 = &households[1];
    assert_eq!(h2.persons(), 1);
    assert_eq!(h2.sum("VD4020__rendimento_efetivo"), Some(3000.0));

    // Band the household incomes as minimum-wage multiples.
    let bands = BandSet::default();
    let wage = 1518.0;
    let h1_ratio = h1.sum("VD4020__rendimento_efetivo_202507").unwrap() / wage;
    assert_eq!(bands.classify(h1_ratio).label(), "0-2");
}

#[test]
fn expression_filter_composes_with_decoding() {
    let layout = parse_layout(LAYOUT).unwrap();
    let decoder = RecordDecoder::with_config(Cursor::new(EXTRACT), layout, decoder_config());

    let filter = compile_expression(
        "VD4020__rendimento_efetivo > 0 and UF__unidade_da_federacao == '35'",
    )
    .unwrap();

    let kept: Vec<_> = decoder
        .filter_map(|r| r.ok())
        .filter(|r| filter.matches(r))
        .collect();
    // The missing-income person fails closed; the Rio household fails
    // the UF comparison.
    assert_eq!(kept.len(), 1);
    assert_eq!(
        kept[0].get("VD4020__rendimento_efetivo"),
        Some(&Value::Number(1000.0))
    );
}

#[test]
fn sandbox_rejects_hostile_expressions() {
    for hostile in [
        "__import__('os').system('id')",
        "open('/etc/passwd')",
        "record.__class__",
        "a[0] + 1",
        "x = 42",
    ] {
        assert!(
            compile_expression(hostile).is_err(),
            "expected rejection for {:?}",
            hostile
        );
    }
}

#[test]
fn query_guard_classification() {
    assert!(guard_query("SELECT 1").is_ok());
    assert!(guard_query("PRAGMA table_info(t)").is_ok());
    assert!(matches!(
        guard_query("DROP TABLE x"),
        Err(ExprError::QueryRejected { .. })
    ));
    assert!(matches!(
        guard_query("/*c*/ DROP TABLE x"),
        Err(ExprError::QueryRejected { .. })
    ));
}
