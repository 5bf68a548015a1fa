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

//! Session behavior against an in-process transport double.

use async_trait::async_trait;
use futures::StreamExt;
use p4rt::p4info::ProgramDescription;
use p4rt::transport::{P4RuntimeRpc, ReadStream};
use p4rt::{EntryOptions, Error, MatchValue, SwitchSession, UpdateKind};
use proto::p4runtime::{
    entity, field_match, table_action, update, CounterData, DirectCounterEntry, Entity,
    ForwardingPipelineConfig, GetForwardingPipelineConfigRequest,
    GetForwardingPipelineConfigResponse, ReadRequest, ReadResponse,
    SetForwardingPipelineConfigRequest, SetForwardingPipelineConfigResponse, TableEntry,
    WriteRequest, WriteResponse,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tonic::{Code, Status};

#[derive(Default)]
struct Calls {
    set_pipeline: AtomicUsize,
    get_pipeline: AtomicUsize,
    write: AtomicUsize,
    read: AtomicUsize,
}

/// Transport double: counts calls, records write requests, and replays
/// canned read responses.
#[derive(Default)]
struct MockRpc {
    calls: Arc<Calls>,
    writes: Arc<Mutex<Vec<WriteRequest>>>,
    read_responses: Vec<ReadResponse>,
    write_error: Option<Code>,
    installed_config: Option<ForwardingPipelineConfig>,
}

#[async_trait]
impl P4RuntimeRpc for MockRpc {
    async fn set_forwarding_pipeline_config(
        &mut self,
        _request: SetForwardingPipelineConfigRequest,
    ) -> Result<SetForwardingPipelineConfigResponse, Status> {
        self.calls.set_pipeline.fetch_add(1, Ordering::SeqCst);
        Ok(SetForwardingPipelineConfigResponse {})
    }

    async fn get_forwarding_pipeline_config(
        &mut self,
        _request: GetForwardingPipelineConfigRequest,
    ) -> Result<GetForwardingPipelineConfigResponse, Status> {
        self.calls.get_pipeline.fetch_add(1, Ordering::SeqCst);
        Ok(GetForwardingPipelineConfigResponse {
            config: self.installed_config.clone(),
        })
    }

    async fn write(&mut self, request: WriteRequest) -> Result<WriteResponse, Status> {
        self.calls.write.fetch_add(1, Ordering::SeqCst);
        if let Some(code) = self.write_error {
            return Err(Status::new(code, "injected failure"));
        }
        self.writes.lock().unwrap().push(request);
        Ok(WriteResponse {})
    }

    async fn read(&mut self, _request: ReadRequest) -> Result<ReadStream, Status> {
        self.calls.read.fetch_add(1, Ordering::SeqCst);
        let responses = self.read_responses.clone();
        Ok(futures::stream::iter(responses.into_iter().map(Ok)).boxed())
    }
}

fn program() -> ProgramDescription {
    ProgramDescription::from_value(json!({
        "tables": [
            {
                "preamble": {"id": 1, "name": "MyIngress.ipv4_lpm", "alias": "ipv4_lpm"},
                "matchFields": [
                    {"id": 1, "name": "hdr.ipv4.dstAddr", "bitwidth": 32, "matchType": "LPM"}
                ]
            }
        ],
        "actions": [
            {
                "preamble": {"id": 1, "name": "MyIngress.ipv4_forward", "alias": "ipv4_forward"},
                "params": [
                    {"id": 1, "name": "port", "bitwidth": 9}
                ]
            }
        ],
        "directCounters": [
            {
                "preamble": {"id": 7, "name": "MyIngress.ipv4_counter", "alias": "ipv4_counter"},
                "directTableId": 1
            }
        ]
    }))
    .unwrap()
}

fn session(rpc: MockRpc) -> SwitchSession<MockRpc> {
    SwitchSession::with_transport("s1", "127.0.0.1:50051", 1, rpc)
}

fn lpm_24() -> MatchValue {
    MatchValue::Lpm {
        value: vec![10, 0, 1, 0],
        prefix_len: 24,
    }
}

#[tokio::test]
async fn write_before_configure_never_reaches_the_wire() {
    let calls = Arc::new(Calls::default());
    let rpc = MockRpc {
        calls: calls.clone(),
        ..Default::default()
    };
    let mut session = session(rpc);

    assert!(!session.is_configured());
    assert!(matches!(
        session.write_table_entry(TableEntry::default()).await,
        Err(Error::NotConfigured)
    ));
    assert!(matches!(
        session.build_table_entry("ipv4_lpm", &[], None, &[], EntryOptions::default()),
        Err(Error::NotConfigured)
    ));
    assert!(matches!(
        session.read_entries_request(Some("ipv4_lpm")),
        Err(Error::NotConfigured)
    ));
    assert_eq!(calls.write.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn push_then_write_sends_one_insert() {
    let calls = Arc::new(Calls::default());
    let writes = Arc::new(Mutex::new(Vec::new()));
    let rpc = MockRpc {
        calls: calls.clone(),
        writes: writes.clone(),
        ..Default::default()
    };
    let mut session = session(rpc);

    session
        .push_pipeline_config(program(), b"bmv2 json".to_vec())
        .await
        .unwrap();
    assert!(session.is_configured());
    assert_eq!(calls.set_pipeline.load(Ordering::SeqCst), 1);

    let entry = session
        .build_table_entry(
            "ipv4_lpm",
            &[("hdr.ipv4.dstAddr", lpm_24())],
            Some("ipv4_forward"),
            &[("port", 1)],
            EntryOptions::default(),
        )
        .unwrap();
    session.write_table_entry(entry).await.unwrap();
    assert_eq!(calls.write.load(Ordering::SeqCst), 1);

    let writes = writes.lock().unwrap();
    let request = &writes[0];
    assert_eq!(request.device_id, 1);
    assert_eq!(request.election_id.as_ref().unwrap().low, 1);
    assert_eq!(request.updates.len(), 1);
    assert_eq!(request.updates[0].update_type, update::Type::Insert as i32);

    let entry = match request.updates[0].entity.as_ref().unwrap().entity.as_ref() {
        Some(entity::Entity::TableEntry(entry)) => entry,
        other => panic!("expected a table entry, got {:?}", other),
    };
    assert_eq!(entry.table_id, 1);
    match entry.field_match[0].field_match_type.as_ref().unwrap() {
        field_match::FieldMatchType::Lpm(lpm) => {
            assert_eq!(lpm.value, vec![10, 0, 1, 0]);
            assert_eq!(lpm.prefix_len, 24);
        }
        other => panic!("expected LPM, got {:?}", other),
    }
    match entry.action.as_ref().unwrap().action_type.as_ref().unwrap() {
        table_action::ActionType::Action(action) => {
            assert_eq!(action.action_id, 1);
            assert_eq!(action.params[0].value, vec![0, 1]);
        }
    }
}

#[tokio::test]
async fn delete_uses_the_requested_update_kind() {
    let writes = Arc::new(Mutex::new(Vec::new()));
    let rpc = MockRpc {
        writes: writes.clone(),
        ..Default::default()
    };
    let mut session = session(rpc);
    session.push_pipeline_config(program(), vec![]).await.unwrap();

    let entry = session
        .build_table_entry(
            "ipv4_lpm",
            &[("hdr.ipv4.dstAddr", lpm_24())],
            None,
            &[],
            EntryOptions::default(),
        )
        .unwrap();
    session.write_update(UpdateKind::Delete, entry).await.unwrap();

    let writes = writes.lock().unwrap();
    assert_eq!(writes[0].updates[0].update_type, update::Type::Delete as i32);
}

#[tokio::test]
async fn read_table_entries_filters_and_flattens() {
    let table_entity = |table_id| Entity {
        entity: Some(entity::Entity::TableEntry(TableEntry {
            table_id,
            ..Default::default()
        })),
    };
    let counter_entity = Entity {
        entity: Some(entity::Entity::DirectCounterEntry(DirectCounterEntry {
            counter_id: 7,
            ..Default::default()
        })),
    };
    let rpc = MockRpc {
        read_responses: vec![
            ReadResponse {
                entities: vec![table_entity(1), counter_entity],
            },
            ReadResponse {
                entities: vec![table_entity(1)],
            },
        ],
        ..Default::default()
    };
    let mut session = session(rpc);
    session.push_pipeline_config(program(), vec![]).await.unwrap();

    let entries: Vec<_> = session
        .read_table_entries(Some("ipv4_lpm"))
        .await
        .unwrap()
        .collect()
        .await;
    assert_eq!(entries.len(), 2);
    for entry in entries {
        assert_eq!(entry.unwrap().table_id, 1);
    }
}

#[tokio::test]
async fn counter_reads_need_a_selector() {
    let calls = Arc::new(Calls::default());
    let rpc = MockRpc {
        calls: calls.clone(),
        ..Default::default()
    };
    let mut session = session(rpc);
    session.push_pipeline_config(program(), vec![]).await.unwrap();

    assert!(matches!(
        session.read_counters_request(None, None),
        Err(Error::InvalidSelector)
    ));

    // Table alone: wildcard counter scoped by table id.
    let request = session
        .read_counters_request(Some("ipv4_lpm"), None)
        .unwrap();
    let counter = match request.entities[0].entity.as_ref().unwrap() {
        entity::Entity::DirectCounterEntry(counter) => counter,
        other => panic!("expected a counter entity, got {:?}", other),
    };
    assert_eq!(counter.counter_id, 0);
    assert_eq!(counter.table_entry.as_ref().unwrap().table_id, 1);

    // Counter alone: id set, no table scope.
    let request = session
        .read_counters_request(None, Some("ipv4_counter"))
        .unwrap();
    let counter = match request.entities[0].entity.as_ref().unwrap() {
        entity::Entity::DirectCounterEntry(counter) => counter,
        other => panic!("expected a counter entity, got {:?}", other),
    };
    assert_eq!(counter.counter_id, 7);
    assert!(counter.table_entry.is_none());

    // Builders never transmit.
    assert_eq!(calls.read.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn read_direct_counters_yields_counter_data() {
    let rpc = MockRpc {
        read_responses: vec![ReadResponse {
            entities: vec![Entity {
                entity: Some(entity::Entity::DirectCounterEntry(DirectCounterEntry {
                    counter_id: 7,
                    table_entry: None,
                    data: Some(CounterData {
                        byte_count: 1200,
                        packet_count: 10,
                    }),
                })),
            }],
        }],
        ..Default::default()
    };
    let mut session = session(rpc);
    session.push_pipeline_config(program(), vec![]).await.unwrap();

    let counters: Vec<_> = session
        .read_direct_counters(None, Some("ipv4_counter"))
        .await
        .unwrap()
        .collect()
        .await;
    assert_eq!(counters.len(), 1);
    let counter = counters.into_iter().next().unwrap().unwrap();
    assert_eq!(counter.counter_id, 7);
    assert_eq!(counter.data.unwrap().packet_count, 10);
}

#[tokio::test]
async fn second_push_replaces_the_index() {
    let mut session = session(MockRpc::default());
    session.push_pipeline_config(program(), vec![]).await.unwrap();
    assert!(session.index().unwrap().table("ipv4_lpm").is_ok());

    let replacement = ProgramDescription::from_value(json!({
        "tables": [
            {"preamble": {"id": 42, "name": "NewIngress.acl", "alias": "acl"}}
        ]
    }))
    .unwrap();
    session
        .push_pipeline_config(replacement, vec![])
        .await
        .unwrap();

    let index = session.index().unwrap();
    assert_eq!(index.table("acl").unwrap().preamble.id, 42);
    assert!(matches!(
        index.table("ipv4_lpm"),
        Err(Error::NotFound { .. })
    ));
}

#[tokio::test]
async fn request_builders_never_transmit() {
    let calls = Arc::new(Calls::default());
    let rpc = MockRpc {
        calls: calls.clone(),
        ..Default::default()
    };
    let mut session = session(rpc);
    session.push_pipeline_config(program(), vec![]).await.unwrap();

    let config_request = session.pipeline_config_request(session.index().unwrap().program(), vec![]);
    assert_eq!(config_request.device_id, 1);
    assert_eq!(
        config_request
            .config
            .unwrap()
            .p4info
            .unwrap()
            .tables[0]
            .preamble
            .as_ref()
            .unwrap()
            .id,
        1
    );

    let write_request = session.write_request(UpdateKind::Insert, TableEntry::default());
    assert_eq!(write_request.updates.len(), 1);

    let read_request = session.read_entries_request(None).unwrap();
    match read_request.entities[0].entity.as_ref().unwrap() {
        entity::Entity::TableEntry(entry) => assert_eq!(entry.table_id, 0),
        other => panic!("expected a table entity, got {:?}", other),
    }

    assert_eq!(calls.set_pipeline.load(Ordering::SeqCst), 1);
    assert_eq!(calls.write.load(Ordering::SeqCst), 0);
    assert_eq!(calls.read.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn write_failures_surface_the_status() {
    let rpc = MockRpc {
        write_error: Some(Code::PermissionDenied),
        ..Default::default()
    };
    let mut session = session(rpc);
    session.push_pipeline_config(program(), vec![]).await.unwrap();

    let entry = session
        .build_table_entry(
            "ipv4_lpm",
            &[("hdr.ipv4.dstAddr", lpm_24())],
            None,
            &[],
            EntryOptions::default(),
        )
        .unwrap();
    match session.write_table_entry(entry).await {
        Err(Error::Rpc(status)) => assert_eq!(status.code(), Code::PermissionDenied),
        other => panic!("expected an RPC error, got {:?}", other.err().map(|e| e.to_string())),
    }
}

#[tokio::test]
async fn fetch_pipeline_config_round_trips() {
    let rpc = MockRpc {
        installed_config: Some(ForwardingPipelineConfig {
            p4info: Some((&program()).into()),
            p4_device_config: vec![],
            cookie: None,
        }),
        ..Default::default()
    };
    let mut session = session(rpc);
    let config = session.fetch_pipeline_config().await.unwrap();
    let p4info = config.p4info.unwrap();
    assert_eq!(
        p4info.tables[0].preamble.as_ref().unwrap().name,
        "MyIngress.ipv4_lpm"
    );

    let mut bare = self::session(MockRpc::default());
    assert!(matches!(
        bare.fetch_pipeline_config().await,
        Err(Error::Rpc(status)) if status.code() == Code::NotFound
    ));
}
