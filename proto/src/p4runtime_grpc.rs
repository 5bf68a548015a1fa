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

//! Client for the `p4.v1.P4Runtime` service, written against the same
//! method paths tonic's codegen would emit for `p4runtime.proto`.

use crate::p4runtime::{
    GetForwardingPipelineConfigRequest, GetForwardingPipelineConfigResponse, ReadRequest,
    ReadResponse, SetForwardingPipelineConfigRequest, SetForwardingPipelineConfigResponse,
    WriteRequest, WriteResponse,
};
use tonic::codegen::http::uri::PathAndQuery;
use tonic::codegen::*;

#[derive(Debug, Clone)]
pub struct P4RuntimeClient<T> {
    inner: tonic::client::Grpc<T>,
}

impl P4RuntimeClient<tonic::transport::Channel> {
    /// Attempts to create a new client by connecting to a given endpoint.
    pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
    where
        D: TryInto<tonic::transport::Endpoint>,
        D::Error: Into<StdError>,
    {
        let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
        Ok(Self::new(conn))
    }
}

impl<T> P4RuntimeClient<T>
where
    T: tonic::client::GrpcService<tonic::body::BoxBody>,
    T::Error: Into<StdError>,
    T::ResponseBody: Body<Data = Bytes> + Send + 'static,
    <T::ResponseBody as Body>::Error: Into<StdError> + Send,
{
    pub fn new(inner: T) -> Self {
        let inner = tonic::client::Grpc::new(inner);
        Self { inner }
    }

    pub async fn set_forwarding_pipeline_config(
        &mut self,
        request: impl tonic::IntoRequest<SetForwardingPipelineConfigRequest>,
    ) -> Result<tonic::Response<SetForwardingPipelineConfigResponse>, tonic::Status> {
        self.inner.ready().await.map_err(|e| {
            tonic::Status::new(
                tonic::Code::Unknown,
                format!("Service was not ready: {}", e.into()),
            )
        })?;
        let codec = tonic::codec::ProstCodec::default();
        let path = PathAndQuery::from_static("/p4.v1.P4Runtime/SetForwardingPipelineConfig");
        let mut req = request.into_request();
        req.extensions_mut().insert(GrpcMethod::new(
            "p4.v1.P4Runtime",
            "SetForwardingPipelineConfig",
        ));
        self.inner.unary(req, path, codec).await
    }

    pub async fn get_forwarding_pipeline_config(
        &mut self,
        request: impl tonic::IntoRequest<GetForwardingPipelineConfigRequest>,
    ) -> Result<tonic::Response<GetForwardingPipelineConfigResponse>, tonic::Status> {
        self.inner.ready().await.map_err(|e| {
            tonic::Status::new(
                tonic::Code::Unknown,
                format!("Service was not ready: {}", e.into()),
            )
        })?;
        let codec = tonic::codec::ProstCodec::default();
        let path = PathAndQuery::from_static("/p4.v1.P4Runtime/GetForwardingPipelineConfig");
        let mut req = request.into_request();
        req.extensions_mut().insert(GrpcMethod::new(
            "p4.v1.P4Runtime",
            "GetForwardingPipelineConfig",
        ));
        self.inner.unary(req, path, codec).await
    }

    pub async fn write(
        &mut self,
        request: impl tonic::IntoRequest<WriteRequest>,
    ) -> Result<tonic::Response<WriteResponse>, tonic::Status> {
        self.inner.ready().await.map_err(|e| {
            tonic::Status::new(
                tonic::Code::Unknown,
                format!("Service was not ready: {}", e.into()),
            )
        })?;
        let codec = tonic::codec::ProstCodec::default();
        let path = PathAndQuery::from_static("/p4.v1.P4Runtime/Write");
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new("p4.v1.P4Runtime", "Write"));
        self.inner.unary(req, path, codec).await
    }

    pub async fn read(
        &mut self,
        request: impl tonic::IntoRequest<ReadRequest>,
    ) -> Result<tonic::Response<tonic::codec::Streaming<ReadResponse>>, tonic::Status> {
        self.inner.ready().await.map_err(|e| {
            tonic::Status::new(
                tonic::Code::Unknown,
                format!("Service was not ready: {}", e.into()),
            )
        })?;
        let codec = tonic::codec::ProstCodec::default();
        let path = PathAndQuery::from_static("/p4.v1.P4Runtime/Read");
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new("p4.v1.P4Runtime", "Read"));
        self.inner.server_streaming(req, path, codec).await
    }
}
