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

//! A stateful session with one P4Runtime switch instance.
//!
//! A [`SwitchSession`] holds the connection, the device id, and, once a
//! pipeline has been pushed, the [`ProgramIndex`] every later operation
//! resolves names against. Operations that need the index fail with
//! [`Error::NotConfigured`] before touching the wire.
//!
//! Every transmitting method has a `*_request` counterpart that builds and
//! returns the request without sending it, so callers can log or inspect
//! what would go out.

use crate::codec::{self, EntryOptions, MatchValue};
use crate::error::Error;
use crate::p4info::{EntityKind, ProgramDescription, ProgramIndex};
use futures::stream::{self, Stream, StreamExt};
use proto::p4runtime::{
    entity, get_forwarding_pipeline_config_request, set_forwarding_pipeline_config_request,
    update, DirectCounterEntry, Entity, ForwardingPipelineConfig,
    GetForwardingPipelineConfigRequest, ReadRequest, SetForwardingPipelineConfigRequest,
    TableEntry, Uint128, Update, WriteRequest,
};
use proto::p4runtime_grpc::P4RuntimeClient;
use std::path::Path;
use tonic::transport::Channel;
use tracing::{debug, info};

use crate::transport::P4RuntimeRpc;

/// What a write does with its entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateKind {
    Insert,
    Modify,
    Delete,
}

impl From<UpdateKind> for update::Type {
    fn from(kind: UpdateKind) -> Self {
        match kind {
            UpdateKind::Insert => update::Type::Insert,
            UpdateKind::Modify => update::Type::Modify,
            UpdateKind::Delete => update::Type::Delete,
        }
    }
}

pub struct SwitchSession<R> {
    name: String,
    target: String,
    device_id: u64,
    role_id: u64,
    election_id: Uint128,
    rpc: R,
    index: Option<ProgramIndex>,
}

impl SwitchSession<P4RuntimeClient<Channel>> {
    /// Connects to the switch at `target` (a `host:port` pair or a full
    /// URI) and opens an unconfigured session for `device_id`.
    pub async fn open(name: &str, target: &str, device_id: u64) -> Result<Self, Error> {
        let uri = if target.contains("://") {
            target.to_string()
        } else {
            format!("http://{}", target)
        };
        let rpc = P4RuntimeClient::connect(uri).await?;
        info!(switch = name, target, device_id, "connected");
        Ok(Self::with_transport(name, target, device_id, rpc))
    }
}

impl<R: P4RuntimeRpc> SwitchSession<R> {
    /// Builds a session over an already-established transport. This is the
    /// seam tests use.
    pub fn with_transport(name: &str, target: &str, device_id: u64, rpc: R) -> Self {
        SwitchSession {
            name: name.to_string(),
            target: target.to_string(),
            device_id,
            role_id: 0,
            election_id: Uint128 { high: 0, low: 1 },
            rpc,
            index: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn device_id(&self) -> u64 {
        self.device_id
    }

    pub fn is_configured(&self) -> bool {
        self.index.is_some()
    }

    /// The index over the currently installed pipeline.
    pub fn index(&self) -> Result<&ProgramIndex, Error> {
        self.index.as_ref().ok_or(Error::NotConfigured)
    }

    /// Renders the pipeline-installation request for `program` without
    /// sending it.
    pub fn pipeline_config_request(
        &self,
        program: &ProgramDescription,
        device_config: Vec<u8>,
    ) -> SetForwardingPipelineConfigRequest {
        SetForwardingPipelineConfigRequest {
            device_id: self.device_id,
            role_id: self.role_id,
            election_id: Some(self.election_id),
            action: set_forwarding_pipeline_config_request::Action::VerifyAndCommit as i32,
            config: Some(ForwardingPipelineConfig {
                p4info: Some(program.into()),
                p4_device_config: device_config,
                cookie: None,
            }),
        }
    }

    /// Installs `program` plus the target-specific `device_config` blob on
    /// the switch and, on success, replaces the session's index.
    pub async fn push_pipeline_config(
        &mut self,
        program: ProgramDescription,
        device_config: Vec<u8>,
    ) -> Result<(), Error> {
        let request = self.pipeline_config_request(&program, device_config);
        debug!(switch = %self.name, ?request, "setting forwarding pipeline config");
        self.rpc.set_forwarding_pipeline_config(request).await?;
        info!(
            switch = %self.name,
            tables = program.tables.len(),
            actions = program.actions.len(),
            "forwarding pipeline config installed"
        );
        self.index = Some(ProgramIndex::new(program));
        Ok(())
    }

    /// Convenience wrapper that loads both inputs from disk.
    pub async fn push_pipeline_config_from_paths<P, Q>(
        &mut self,
        program_path: P,
        device_config_path: Q,
    ) -> Result<(), Error>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let program = ProgramDescription::from_path(program_path)?;
        let device_config = std::fs::read(device_config_path)?;
        self.push_pipeline_config(program, device_config).await
    }

    /// Builds a table entry against the installed pipeline. See
    /// [`codec::build_table_entry`].
    pub fn build_table_entry(
        &self,
        table_name: &str,
        match_fields: &[(&str, MatchValue)],
        action_name: Option<&str>,
        action_params: &[(&str, u64)],
        options: EntryOptions,
    ) -> Result<TableEntry, Error> {
        codec::build_table_entry(
            self.index()?,
            table_name,
            match_fields,
            action_name,
            action_params,
            options,
        )
    }

    /// Renders the write request for one update without sending it.
    pub fn write_request(&self, kind: UpdateKind, entry: TableEntry) -> WriteRequest {
        WriteRequest {
            device_id: self.device_id,
            role_id: self.role_id,
            election_id: Some(self.election_id),
            updates: vec![Update {
                update_type: update::Type::from(kind) as i32,
                entity: Some(Entity {
                    entity: Some(entity::Entity::TableEntry(entry)),
                }),
            }],
        }
    }

    /// Inserts `entry` into its table.
    pub async fn write_table_entry(&mut self, entry: TableEntry) -> Result<(), Error> {
        self.write_update(UpdateKind::Insert, entry).await
    }

    /// Applies one update to the switch.
    pub async fn write_update(&mut self, kind: UpdateKind, entry: TableEntry) -> Result<(), Error> {
        if !self.is_configured() {
            return Err(Error::NotConfigured);
        }
        let request = self.write_request(kind, entry);
        debug!(switch = %self.name, ?kind, "writing table entry");
        self.rpc.write(request).await?;
        Ok(())
    }

    /// Renders the read request for table entries without sending it.
    /// `table_name` of `None` reads every table.
    pub fn read_entries_request(&self, table_name: Option<&str>) -> Result<ReadRequest, Error> {
        let table_id = match table_name {
            Some(name) => self.index()?.id_of(EntityKind::Table, name)?,
            None => 0,
        };
        Ok(ReadRequest {
            device_id: self.device_id,
            entities: vec![Entity {
                entity: Some(entity::Entity::TableEntry(TableEntry {
                    table_id,
                    ..Default::default()
                })),
            }],
        })
    }

    /// Streams the entries of `table_name`, or of every table when `None`.
    pub async fn read_table_entries(
        &mut self,
        table_name: Option<&str>,
    ) -> Result<impl Stream<Item = Result<TableEntry, Error>> + Send + 'static, Error> {
        let request = self.read_entries_request(table_name)?;
        debug!(switch = %self.name, table = table_name.unwrap_or("<all>"), "reading table entries");
        let responses = self.rpc.read(request).await?;
        Ok(responses.flat_map(|response| {
            let items: Vec<Result<TableEntry, Error>> = match response {
                Ok(response) => response
                    .entities
                    .into_iter()
                    .filter_map(|e| match e.entity {
                        Some(entity::Entity::TableEntry(entry)) => Some(Ok(entry)),
                        _ => None,
                    })
                    .collect(),
                Err(status) => vec![Err(Error::Rpc(status))],
            };
            stream::iter(items)
        }))
    }

    /// Renders the read request for direct counters without sending it.
    ///
    /// At least one of the selectors must be given: `table_name` scopes the
    /// read to one table's entries, `counter_name` to one declared counter.
    pub fn read_counters_request(
        &self,
        table_name: Option<&str>,
        counter_name: Option<&str>,
    ) -> Result<ReadRequest, Error> {
        if table_name.is_none() && counter_name.is_none() {
            return Err(Error::InvalidSelector);
        }
        let index = self.index()?;
        let counter_id = match counter_name {
            Some(name) => index.id_of(EntityKind::DirectCounter, name)?,
            None => 0,
        };
        let table_entry = match table_name {
            Some(name) => Some(TableEntry {
                table_id: index.id_of(EntityKind::Table, name)?,
                ..Default::default()
            }),
            None => None,
        };
        Ok(ReadRequest {
            device_id: self.device_id,
            entities: vec![Entity {
                entity: Some(entity::Entity::DirectCounterEntry(DirectCounterEntry {
                    counter_id,
                    table_entry,
                    data: None,
                })),
            }],
        })
    }

    /// Streams direct-counter values for the selected table or counter.
    pub async fn read_direct_counters(
        &mut self,
        table_name: Option<&str>,
        counter_name: Option<&str>,
    ) -> Result<impl Stream<Item = Result<DirectCounterEntry, Error>> + Send + 'static, Error> {
        let request = self.read_counters_request(table_name, counter_name)?;
        debug!(switch = %self.name, "reading direct counters");
        let responses = self.rpc.read(request).await?;
        Ok(responses.flat_map(|response| {
            let items: Vec<Result<DirectCounterEntry, Error>> = match response {
                Ok(response) => response
                    .entities
                    .into_iter()
                    .filter_map(|e| match e.entity {
                        Some(entity::Entity::DirectCounterEntry(counter)) => Some(Ok(counter)),
                        _ => None,
                    })
                    .collect(),
                Err(status) => vec![Err(Error::Rpc(status))],
            };
            stream::iter(items)
        }))
    }

    /// Fetches the pipeline config the switch currently runs, independent
    /// of what this session pushed.
    pub async fn fetch_pipeline_config(&mut self) -> Result<ForwardingPipelineConfig, Error> {
        let request = GetForwardingPipelineConfigRequest {
            device_id: self.device_id,
            response_type: get_forwarding_pipeline_config_request::ResponseType::P4infoAndCookie
                as i32,
        };
        let response = self.rpc.get_forwarding_pipeline_config(request).await?;
        response
            .config
            .ok_or_else(|| Error::Rpc(tonic::Status::not_found("no pipeline config installed")))
    }
}
