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

//! The RPC seam between [`crate::session::SwitchSession`] and the wire.
//!
//! The session talks to whatever implements [`P4RuntimeRpc`]. Production
//! code hands it a connected tonic client; tests hand it a double and
//! never open a socket.

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use proto::p4runtime::{
    GetForwardingPipelineConfigRequest, GetForwardingPipelineConfigResponse, ReadRequest,
    ReadResponse, SetForwardingPipelineConfigRequest, SetForwardingPipelineConfigResponse,
    WriteRequest, WriteResponse,
};
use proto::p4runtime_grpc::P4RuntimeClient;
use tonic::transport::Channel;
use tonic::Status;

/// The response stream of a read RPC.
pub type ReadStream = BoxStream<'static, Result<ReadResponse, Status>>;

/// The subset of the P4Runtime service a session uses.
#[async_trait]
pub trait P4RuntimeRpc: Send {
    async fn set_forwarding_pipeline_config(
        &mut self,
        request: SetForwardingPipelineConfigRequest,
    ) -> Result<SetForwardingPipelineConfigResponse, Status>;

    async fn get_forwarding_pipeline_config(
        &mut self,
        request: GetForwardingPipelineConfigRequest,
    ) -> Result<GetForwardingPipelineConfigResponse, Status>;

    async fn write(&mut self, request: WriteRequest) -> Result<WriteResponse, Status>;

    async fn read(&mut self, request: ReadRequest) -> Result<ReadStream, Status>;
}

#[async_trait]
impl P4RuntimeRpc for P4RuntimeClient<Channel> {
    async fn set_forwarding_pipeline_config(
        &mut self,
        request: SetForwardingPipelineConfigRequest,
    ) -> Result<SetForwardingPipelineConfigResponse, Status> {
        Ok(P4RuntimeClient::set_forwarding_pipeline_config(self, request)
            .await?
            .into_inner())
    }

    async fn get_forwarding_pipeline_config(
        &mut self,
        request: GetForwardingPipelineConfigRequest,
    ) -> Result<GetForwardingPipelineConfigResponse, Status> {
        Ok(P4RuntimeClient::get_forwarding_pipeline_config(self, request)
            .await?
            .into_inner())
    }

    async fn write(&mut self, request: WriteRequest) -> Result<WriteResponse, Status> {
        Ok(P4RuntimeClient::write(self, request).await?.into_inner())
    }

    async fn read(&mut self, request: ReadRequest) -> Result<ReadStream, Status> {
        let stream = P4RuntimeClient::read(self, request).await?.into_inner();
        Ok(stream.boxed())
    }
}
