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

use crate::p4info::{EntityKind, MatchKind, Selector};
use thiserror::Error;

/// Every failure the client surfaces, one variant per condition a caller
/// might branch on: retry on [`Error::Connection`]/[`Error::Rpc`], treat
/// [`Error::NotFound`] as a configuration bug, and so on.
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not read program description")]
    Io(#[from] std::io::Error),

    #[error("could not parse program description")]
    Parse(#[from] serde_json::Error),

    #[error("could not find {kind} {selector}")]
    NotFound {
        kind: EntityKind,
        selector: Selector,
    },

    #[error("exactly one of a name or an id must be given")]
    InvalidSelector,

    #[error("field {field}: {kind} matches are not supported")]
    UnsupportedMatchKind { field: String, kind: MatchKind },

    #[error("field {field}: value does not fit a {kind} match ({reason})")]
    InvalidMatchValue {
        field: String,
        kind: MatchKind,
        reason: String,
    },

    #[error("param {param}: value {value} does not fit in bit<{bitwidth}>")]
    InvalidParamValue {
        param: String,
        value: u64,
        bitwidth: i32,
    },

    #[error("could not connect to switch")]
    Connection(#[from] tonic::transport::Error),

    #[error("no forwarding pipeline config has been pushed on this session")]
    NotConfigured,

    #[error("switch RPC failed")]
    Rpc(#[from] tonic::Status),
}
