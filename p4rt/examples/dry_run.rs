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

//! Builds a table entry from an inline program description and prints the
//! requests that would go to a switch, without connecting to one.

use anyhow::Result;
use p4rt::{build_table_entry, encode_value, EntryOptions, MatchValue, ProgramDescription, ProgramIndex};
use serde_json::json;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let program = ProgramDescription::from_value(json!({
        "tables": [
            {
                "preamble": {"id": 33574068, "name": "MyIngress.ipv4_lpm", "alias": "ipv4_lpm"},
                "matchFields": [
                    {"id": 1, "name": "hdr.ipv4.dstAddr", "bitwidth": 32, "matchType": "LPM"}
                ]
            }
        ],
        "actions": [
            {
                "preamble": {"id": 16799317, "name": "MyIngress.ipv4_forward", "alias": "ipv4_forward"},
                "params": [
                    {"id": 1, "name": "dstAddr", "bitwidth": 48},
                    {"id": 2, "name": "port", "bitwidth": 9}
                ]
            }
        ]
    }))?;

    for table in &program.tables {
        println!("{}", table);
    }
    for action in &program.actions {
        println!("{}", action);
    }

    let index = ProgramIndex::new(program);
    let entry = build_table_entry(
        &index,
        "ipv4_lpm",
        &[(
            "hdr.ipv4.dstAddr",
            MatchValue::Lpm {
                value: encode_value(0x0a00_0100, 32),
                prefix_len: 24,
            },
        )],
        Some("ipv4_forward"),
        &[("dstAddr", 0x0000_0800_0000_0222), ("port", 2)],
        EntryOptions::default(),
    )?;

    println!("table entry that would be written:\n{:#?}", entry);
    Ok(())
}
