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

//! Bindings for the subset of the P4Runtime v1 protocol that the `p4rt`
//! session layer consumes: the `p4info` program descriptor messages, the
//! request/response messages for `SetForwardingPipelineConfig`, `Write` and
//! the streaming `Read`, and a `tonic` client for the `p4.v1.P4Runtime`
//! service.
//!
//! The messages are written by hand against the published field numbers
//! rather than generated, so building this crate needs no protoc toolchain.
//! Only the fields the session layer populates or inspects are declared;
//! unknown fields on the wire are skipped by prost.

pub mod p4info;
pub mod p4runtime;
pub mod p4runtime_grpc;
