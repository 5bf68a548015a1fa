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

//! Control-plane client for P4Runtime switches.
//!
//! The crate bridges a program description (the JSON rendering of a P4Info
//! document, listing tables, actions, match fields, action parameters and
//! direct counters with their numeric ids) to the binary protocol a switch
//! actually speaks:
//!
//! - [`p4info::ProgramIndex`] loads the description and resolves names and
//!   aliases to ids and back, for every entity kind.
//! - [`codec`] turns per-field typed match values and action parameters into
//!   a fully-populated, protocol-ready table entry, dispatching on each
//!   field's declared match kind.
//! - [`session::SwitchSession`] owns one connection to one switch instance
//!   and sequences pipeline installation, entry writes and streaming
//!   entry/counter reads. Every operation has a request-builder counterpart
//!   that renders the would-be request without transmitting it.
//!
//! The RPC surface is the [`transport::P4RuntimeRpc`] trait; production code
//! uses the tonic-backed `proto::p4runtime_grpc::P4RuntimeClient`, tests
//! inject doubles.

pub mod codec;
pub mod error;
pub mod p4info;
pub mod session;
pub mod transport;

pub use codec::{build_table_entry, encode_value, EntryOptions, MatchValue};
pub use error::Error;
pub use p4info::{EntityKind, ProgramDescription, ProgramIndex, Selector};
pub use session::{SwitchSession, UpdateKind};
