/*
Copyright (c) 2024 the p4rt contributors
SPDX-License-Identifier: MIT
Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:
The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.
THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Typed match values and the table-entry builder.
//!
//! Callers speak in names and typed values; the codec resolves both
//! against a [`ProgramIndex`] and emits protocol-ready messages. Each
//! field's declared match kind picks the wire shape; a value whose shape
//! disagrees with the declaration is rejected rather than coerced.

use crate::error::Error;
use crate::p4info::{MatchFieldDesc, MatchKind, ParamDesc, ProgramIndex};
use byteorder::{BigEndian, ByteOrder};
use proto::p4runtime::{field_match, table_action, Action, ActionParam, FieldMatch, TableEntry};

/// A match value for one field, in the shape its match kind requires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchValue {
    /// Big-endian bytes, exactly as they should appear on the wire.
    Exact(Vec<u8>),
    /// A longest-prefix-match value with the number of significant bits.
    Lpm { value: Vec<u8>, prefix_len: i32 },
    /// Header validity.
    Valid(bool),
}

impl MatchValue {
    /// Shorthand for an exact match on an integer value, sized to the
    /// field's bitwidth at encoding time.
    pub fn exact_u64(value: u64, bitwidth: i32) -> Self {
        MatchValue::Exact(encode_value(value, bitwidth))
    }
}

/// Knobs for [`build_table_entry`].
#[derive(Clone, Copy, Debug, Default)]
pub struct EntryOptions {
    /// Entry priority; leave 0 for tables without ternary or range fields.
    pub priority: i32,
    /// When set, values must fit their field's declared bitwidth exactly.
    pub strict: bool,
}

fn byte_width(bitwidth: i32) -> usize {
    ((bitwidth + 7) / 8) as usize
}

/// Whether `value` is representable in `bitwidth` bits.
fn fits(value: u64, bitwidth: i32) -> bool {
    bitwidth >= 64 || value >> bitwidth == 0
}

/// Renders `value` as the big-endian byte string of the exact width that
/// `bitwidth` bits occupy. Widths beyond 64 bits zero-pad on the left.
pub fn encode_value(value: u64, bitwidth: i32) -> Vec<u8> {
    let mut full = [0u8; 8];
    BigEndian::write_u64(&mut full, value);
    let width = byte_width(bitwidth);
    if width <= 8 {
        full[8 - width..].to_vec()
    } else {
        let mut bytes = vec![0u8; width - 8];
        bytes.extend_from_slice(&full);
        bytes
    }
}

/// Encodes one match value against the field that declares it.
///
/// Ternary, range and unspecified fields are rejected outright; nothing in
/// the entry builder produces them.
pub fn encode_match(
    field: &MatchFieldDesc,
    value: &MatchValue,
    strict: bool,
) -> Result<FieldMatch, Error> {
    let shape_mismatch = |value: &MatchValue| Error::InvalidMatchValue {
        field: field.name.clone(),
        kind: field.match_kind,
        reason: format!("got a {} value", value.kind_name()),
    };

    let field_match_type = match field.match_kind {
        MatchKind::Exact => match value {
            MatchValue::Exact(bytes) => {
                if strict && bytes.len() != byte_width(field.bitwidth) {
                    return Err(Error::InvalidMatchValue {
                        field: field.name.clone(),
                        kind: field.match_kind,
                        reason: format!(
                            "{} bytes given for a bit<{}> field",
                            bytes.len(),
                            field.bitwidth
                        ),
                    });
                }
                field_match::FieldMatchType::Exact(field_match::Exact {
                    value: bytes.clone(),
                })
            }
            other => return Err(shape_mismatch(other)),
        },
        MatchKind::Lpm => match value {
            MatchValue::Lpm { value, prefix_len } => {
                if *prefix_len < 0 || *prefix_len > field.bitwidth {
                    return Err(Error::InvalidMatchValue {
                        field: field.name.clone(),
                        kind: field.match_kind,
                        reason: format!(
                            "prefix length {} out of range for bit<{}>",
                            prefix_len, field.bitwidth
                        ),
                    });
                }
                if strict && value.len() != byte_width(field.bitwidth) {
                    return Err(Error::InvalidMatchValue {
                        field: field.name.clone(),
                        kind: field.match_kind,
                        reason: format!(
                            "{} bytes given for a bit<{}> field",
                            value.len(),
                            field.bitwidth
                        ),
                    });
                }
                field_match::FieldMatchType::Lpm(field_match::Lpm {
                    value: value.clone(),
                    prefix_len: *prefix_len,
                })
            }
            other => return Err(shape_mismatch(other)),
        },
        MatchKind::Valid => match value {
            MatchValue::Valid(flag) => {
                field_match::FieldMatchType::Valid(field_match::Valid { value: *flag })
            }
            other => return Err(shape_mismatch(other)),
        },
        kind @ (MatchKind::Ternary | MatchKind::Range | MatchKind::Unspecified) => {
            return Err(Error::UnsupportedMatchKind {
                field: field.name.clone(),
                kind,
            })
        }
    };

    Ok(FieldMatch {
        field_id: field.id,
        field_match_type: Some(field_match_type),
    })
}

impl MatchValue {
    fn kind_name(&self) -> &'static str {
        match self {
            MatchValue::Exact(_) => "exact",
            MatchValue::Lpm { .. } => "LPM",
            MatchValue::Valid(_) => "valid",
        }
    }
}

fn encode_param(param: &ParamDesc, value: u64, strict: bool) -> Result<ActionParam, Error> {
    if strict && !fits(value, param.bitwidth) {
        return Err(Error::InvalidParamValue {
            param: param.name.clone(),
            value,
            bitwidth: param.bitwidth,
        });
    }
    Ok(ActionParam {
        param_id: param.id,
        value: encode_value(value, param.bitwidth),
    })
}

/// Builds a complete table entry from names and typed values.
///
/// Match fields appear in the entry in the order the caller gives them;
/// switches key on field ids, not position. Passing no action leaves the
/// action clause empty, which reads as "keep the table default" on writes
/// and as a wildcard on reads.
pub fn build_table_entry(
    index: &ProgramIndex,
    table_name: &str,
    match_fields: &[(&str, MatchValue)],
    action_name: Option<&str>,
    action_params: &[(&str, u64)],
    options: EntryOptions,
) -> Result<TableEntry, Error> {
    let table = index.table(table_name)?;

    let mut field_match = Vec::with_capacity(match_fields.len());
    for (field_name, value) in match_fields {
        let field = index.match_field(table_name, field_name)?;
        field_match.push(encode_match(field, value, options.strict)?);
    }

    let action = match action_name {
        Some(action_name) => {
            let action = index.action(action_name)?;
            let mut params = Vec::with_capacity(action_params.len());
            for (param_name, value) in action_params {
                let param = index.action_param(action_name, param_name)?;
                params.push(encode_param(param, *value, options.strict)?);
            }
            Some(proto::p4runtime::TableAction {
                action_type: Some(table_action::ActionType::Action(Action {
                    action_id: action.preamble.id,
                    params,
                })),
            })
        }
        None => None,
    };

    Ok(TableEntry {
        table_id: table.preamble.id,
        field_match,
        action,
        priority: options.priority,
    })
}
