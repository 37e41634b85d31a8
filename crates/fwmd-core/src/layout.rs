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

//! Column-layout grammar parser.
//!
//! Survey extracts ship with a layout file in the column syntax of the
//! statistical package that produced them. One field per line:
//!
//! ```text
//! @0001  UF       2.        /* Unidade da Federação */
//! @0003  Capital  $1.
//! @0270  V4050    $CHAR1.   /* renda habitual aux */
//! @0273  V405012  8.2
//! ```
//!
//! `@<pos>` is the 1-based byte position, the informat encodes width and
//! type (`$`/`CHAR` marks a character field; digits after the dot are
//! implied decimal places), and a trailing block comment is the
//! human-readable label. Lines that do not begin with `@` (the `INPUT`
//! statement scaffolding, semicolons, blanks) carry no field and are
//! skipped.
//!
//! Declaration order is preserved exactly: it is the canonical column
//! order for every downstream stage, including header emission.

use crate::error::{LayoutError, LayoutResult};
use std::collections::HashMap;

/// Field type as declared by the informat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldKind {
    /// Character field, decoded as a trimmed string.
    Text,
    /// Numeric field with implied decimal places: the raw digits are
    /// scaled by `10^(-decimals)` unless the slice carries an explicit
    /// decimal point.
    Numeric { decimals: u8 },
}

/// One declared field: name, byte range, type, optional label.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldSpec {
    /// Field name token from the layout.
    pub name: String,
    /// 0-based byte offset of the first byte.
    pub start: usize,
    /// Width in bytes.
    pub width: usize,
    /// Declared type.
    pub kind: FieldKind,
    /// Free-text label from the trailing comment, if any.
    pub label: Option<String>,
    /// ASCII slug of the label, if any.
    pub slug: Option<String>,
}

impl FieldSpec {
    /// One past the last byte of this field.
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.width
    }

    /// Portable column name: `NAME__label_slug` when a label exists,
    /// else the bare name. Disambiguates fields whose cryptic survey
    /// names would otherwise be opaque downstream.
    pub fn column_name(&self) -> String {
        match &self.slug {
            Some(slug) if !slug.is_empty() => format!("{}__{}", self.name, slug),
            _ => self.name.clone(),
        }
    }
}

/// An immutable, ordered set of field declarations.
///
/// Created once per run by [`parse_layout`]; iteration order is
/// declaration order.
#[derive(Debug, Clone)]
pub struct LayoutSpec {
    fields: Vec<FieldSpec>,
    index: HashMap<String, usize>,
}

impl LayoutSpec {
    /// All fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no fields are declared (never the case for a parsed
    /// layout; useful for manually assembled specs in tests).
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The minimum line length that covers every declared field.
    pub fn line_width(&self) -> usize {
        self.fields.iter().map(FieldSpec::end).max().unwrap_or(0)
    }

    /// Output column names in declaration order.
    pub fn column_names(&self) -> Vec<String> {
        self.fields.iter().map(FieldSpec::column_name).collect()
    }
}

/// Parse layout grammar text into a [`LayoutSpec`].
///
/// Fatal on the first malformed declaration: duplicate names, overlapping
/// byte ranges, and unrecognized informats all abort with the offending
/// line number, since misread offsets would silently corrupt every
/// downstream column.
pub fn parse_layout(text: &str) -> LayoutResult<LayoutSpec> {
    let mut fields: Vec<FieldSpec> = Vec::new();
    let mut lines: Vec<usize> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (line_no, raw) in text.lines().enumerate() {
        let line_no = line_no + 1;
        let Some(field) = parse_declaration(raw, line_no)? else {
            continue;
        };

        if index.contains_key(&field.name) {
            return Err(LayoutError::DuplicateField {
                line: line_no,
                name: field.name,
            });
        }
        index.insert(field.name.clone(), fields.len());
        fields.push(field);
        lines.push(line_no);
    }

    if fields.is_empty() {
        return Err(LayoutError::Empty);
    }

    check_overlaps(&fields, &lines)?;

    Ok(LayoutSpec { fields, index })
}

/// Parse one line; `Ok(None)` for non-declaration scaffolding.
fn parse_declaration(raw: &str, line_no: usize) -> LayoutResult<Option<FieldSpec>> {
    // Trailing block comment is the label.
    let (decl, label) = match raw.split_once("/*") {
        Some((before, after)) => {
            let label = match after.split_once("*/") {
                Some((text, _)) => text.trim(),
                None => after.trim(),
            };
            (before, (!label.is_empty()).then(|| label.to_string()))
        }
        None => (raw, None),
    };

    let decl = decl.trim();
    let Some(rest) = decl.strip_prefix('@') else {
        return Ok(None);
    };

    let rest = rest.trim_start();
    let digits_len = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits_len == 0 {
        return Err(LayoutError::syntax(line_no, "expected position after `@`"));
    }
    let pos: usize = rest[..digits_len]
        .parse()
        .map_err(|_| LayoutError::syntax(line_no, "position out of range"))?;
    if pos == 0 {
        return Err(LayoutError::syntax(line_no, "position is 1-based"));
    }

    let mut tokens = rest[digits_len..].split_whitespace();
    let Some(name) = tokens.next() else {
        return Err(LayoutError::syntax(line_no, "missing field name"));
    };

    // The informat may be split across tokens; it ends at the token
    // carrying the dot.
    let mut informat = String::new();
    let mut terminated = false;
    for tok in tokens.by_ref() {
        informat.push_str(tok);
        if tok.contains('.') {
            terminated = true;
            break;
        }
    }
    if informat.is_empty() {
        return Err(LayoutError::syntax(line_no, "missing informat"));
    }
    if !terminated {
        return Err(LayoutError::syntax(
            line_no,
            "informat missing terminating `.`",
        ));
    }

    let (width, kind) = parse_informat(&informat, line_no)?;

    let slug = label.as_deref().map(slugify);
    Ok(Some(FieldSpec {
        name: name.to_string(),
        start: pos - 1,
        width,
        kind,
        label,
        slug,
    }))
}

/// Decode an informat token like `8.`, `10.2`, `$1.` or `$CHAR4.` into
/// width and kind.
fn parse_informat(fmt: &str, line_no: usize) -> LayoutResult<(usize, FieldKind)> {
    let unknown = || LayoutError::UnknownFormat {
        line: line_no,
        token: fmt.to_string(),
    };

    let is_char = fmt.contains('$');
    let dot = fmt.find('.').ok_or_else(unknown)?;

    // Width: the digit run immediately before the dot.
    let head = &fmt[..dot];
    let digits_start = head
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)
        .ok_or_else(unknown)?;
    let width: usize = head[digits_start..].parse().map_err(|_| unknown())?;
    if width == 0 {
        return Err(unknown());
    }

    // Everything before the width digits must be the `$`/`CHAR` marker
    // for character fields, or nothing for numeric fields.
    let marker = &head[..digits_start];
    let marker_ok = if is_char {
        let bare = marker.trim_start_matches('$');
        bare.is_empty() || bare.eq_ignore_ascii_case("char")
    } else {
        marker.is_empty()
    };
    if !marker_ok {
        return Err(unknown());
    }

    let tail = &fmt[dot + 1..];
    let decimals: u8 = if tail.is_empty() {
        0
    } else if tail.chars().all(|c| c.is_ascii_digit()) {
        tail.parse().map_err(|_| unknown())?
    } else {
        return Err(unknown());
    };

    let kind = if is_char {
        FieldKind::Text
    } else {
        FieldKind::Numeric { decimals }
    };
    Ok((width, kind))
}

fn check_overlaps(fields: &[FieldSpec], lines: &[usize]) -> LayoutResult<()> {
    let mut order: Vec<usize> = (0..fields.len()).collect();
    order.sort_by_key(|&i| fields[i].start);
    for pair in order.windows(2) {
        let (a, b) = (&fields[pair[0]], &fields[pair[1]]);
        if a.end() > b.start {
            return Err(LayoutError::Overlap {
                line: lines[pair[1]],
                name: b.name.clone(),
            });
        }
    }
    Ok(())
}

/// Normalize a free-text label into a lowercase ASCII token: accents are
/// folded, runs of anything non-alphanumeric collapse to one `_`.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_sep = false;
    for c in text.chars() {
        let folded = match c {
            'a'..='z' | '0'..='9' => Some(c),
            'A'..='Z' => Some(c.to_ascii_lowercase()),
            _ => latin_fold(c),
        };
        match folded {
            Some(c) => {
                if pending_sep && !out.is_empty() {
                    out.push('_');
                }
                pending_sep = false;
                out.push(c);
            }
            None => pending_sep = true,
        }
    }
    out
}

/// Fold the accented Latin letters that occur in survey labels to their
/// ASCII base letter. Anything else is treated as a separator.
fn latin_fold(c: char) -> Option<char> {
    let folded = match c.to_lowercase().next()? {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        _ => return None,
    };
    Some(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = "\
@0001 UF 2.
@0003 Capital $1.
@0270 V4050 $CHAR1.   /* renda habitual aux */
@0273 V405012 8.
";

    // ==================== Declaration parsing ====================

    #[test]
    fn test_parse_basic_layout() {
        let layout = parse_layout(BASIC).unwrap();
        assert_eq!(layout.len(), 4);

        let uf = layout.get("UF").unwrap();
        assert_eq!(uf.start, 0);
        assert_eq!(uf.width, 2);
        assert_eq!(uf.kind, FieldKind::Numeric { decimals: 0 });

        let cap = layout.get("Capital").unwrap();
        assert_eq!(cap.start, 2);
        assert_eq!(cap.width, 1);
        assert_eq!(cap.kind, FieldKind::Text);

        let v = layout.get("V405012").unwrap();
        assert_eq!(v.start, 272);
        assert_eq!(v.width, 8);
    }

    #[test]
    fn test_label_and_slug() {
        let layout = parse_layout(BASIC).unwrap();
        let f = layout.get("V4050").unwrap();
        assert_eq!(f.label.as_deref(), Some("renda habitual aux"));
        assert_eq!(f.slug.as_deref(), Some("renda_habitual_aux"));
        assert_eq!(f.column_name(), "V4050__renda_habitual_aux");
    }

    #[test]
    fn test_column_name_without_label() {
        let layout = parse_layout(BASIC).unwrap();
        assert_eq!(layout.get("UF").unwrap().column_name(), "UF");
    }

    #[test]
    fn test_declaration_order_preserved() {
        // Declared out of byte order on purpose; declaration order wins.
        let text = "@0010 B 2.\n@0001 A 2.\n";
        let layout = parse_layout(text).unwrap();
        let names: Vec<_> = layout.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_scaffolding_lines_skipped() {
        let text = "INPUT\n\n@0001 UF 2.\n;\n";
        let layout = parse_layout(text).unwrap();
        assert_eq!(layout.len(), 1);
    }

    #[test]
    fn test_decimal_informat() {
        let layout = parse_layout("@0001 V1 10.2\n").unwrap();
        let f = layout.get("V1").unwrap();
        assert_eq!(f.width, 10);
        assert_eq!(f.kind, FieldKind::Numeric { decimals: 2 });
    }

    #[test]
    fn test_unquoted_dollar_char_forms() {
        let layout = parse_layout("@0001 A $4.\n@0005 B $CHAR2.\n").unwrap();
        assert_eq!(layout.get("A").unwrap().kind, FieldKind::Text);
        assert_eq!(layout.get("A").unwrap().width, 4);
        assert_eq!(layout.get("B").unwrap().kind, FieldKind::Text);
    }

    #[test]
    fn test_label_without_closing_comment() {
        let layout = parse_layout("@0001 A 2. /* open label\n").unwrap();
        assert_eq!(layout.get("A").unwrap().label.as_deref(), Some("open label"));
    }

    #[test]
    fn test_line_width() {
        let layout = parse_layout(BASIC).unwrap();
        assert_eq!(layout.line_width(), 280);
    }

    // ==================== Rejections ====================

    #[test]
    fn test_unknown_informat_rejected() {
        let err = parse_layout("@0001 A DATE9.\n").unwrap_err();
        assert!(matches!(err, LayoutError::UnknownFormat { line: 1, .. }));
    }

    #[test]
    fn test_informat_without_dot_rejected() {
        let err = parse_layout("@0001 A 2\n").unwrap_err();
        assert!(matches!(err, LayoutError::Syntax { line: 1, .. }));
    }

    #[test]
    fn test_missing_informat_rejected() {
        let err = parse_layout("@0001 A\n").unwrap_err();
        assert!(matches!(err, LayoutError::Syntax { line: 1, .. }));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = parse_layout("@0001 UF 2.\n@0003 UF 2.\n").unwrap_err();
        assert_eq!(
            err,
            LayoutError::DuplicateField {
                line: 2,
                name: "UF".to_string()
            }
        );
    }

    #[test]
    fn test_overlap_rejected() {
        let err = parse_layout("@0001 A 3.\n@0003 B 2.\n").unwrap_err();
        assert_eq!(
            err,
            LayoutError::Overlap {
                line: 2,
                name: "B".to_string()
            }
        );
    }

    #[test]
    fn test_adjacent_fields_do_not_overlap() {
        assert!(parse_layout("@0001 A 3.\n@0004 B 2.\n").is_ok());
    }

    #[test]
    fn test_zero_position_rejected() {
        let err = parse_layout("@0000 A 2.\n").unwrap_err();
        assert!(matches!(err, LayoutError::Syntax { line: 1, .. }));
    }

    #[test]
    fn test_empty_layout_rejected() {
        assert_eq!(parse_layout("INPUT\n;\n").unwrap_err(), LayoutError::Empty);
        assert_eq!(parse_layout("").unwrap_err(), LayoutError::Empty);
    }

    #[test]
    fn test_error_reports_offending_line() {
        let err = parse_layout("@0001 A 2.\n@0003 B NOPE9.\n").unwrap_err();
        assert_eq!(err.line(), Some(2));
    }

    // ==================== Slugify ====================

    #[test]
    fn test_slugify_folds_accents() {
        assert_eq!(slugify("Unidade da Federação"), "unidade_da_federacao");
        assert_eq!(slugify("Cônjuge ou companheiro(a)"), "conjuge_ou_companheiro_a");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  a -- b  "), "a_b");
        assert_eq!(slugify("rendimento (R$)"), "rendimento_r");
    }

    #[test]
    fn test_slugify_empty_and_symbol_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("***"), "");
    }
}
