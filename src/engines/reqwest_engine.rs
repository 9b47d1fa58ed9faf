// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::engines::traits::{EngineError, HttpTransport, TransportRequest, TransportResponse};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::debug;

/// HTTP传输引擎
///
/// 基于reqwest实现，整个批次共用一个带连接池的客户端
pub struct ReqwestEngine {
    client: reqwest::Client,
}

impl ReqwestEngine {
    /// 创建新的引擎实例
    ///
    /// # 参数
    ///
    /// * `timeout` - 单次请求的超时时间，`None`表示不限制
    ///
    /// # 返回值
    ///
    /// * `Ok(ReqwestEngine)` - 引擎实例
    /// * `Err(EngineError)` - 客户端构建失败
    pub fn new(timeout: Option<Duration>) -> Result<Self, EngineError> {
        // Built without reqwest's decompression features: bodies arrive as sent
        // and the content decoder inflates gzip itself
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestEngine {
    /// 执行HTTP请求
    ///
    /// # 参数
    ///
    /// * `request` - 已合并头部的传输请求
    ///
    /// # 返回值
    ///
    /// * `Ok(TransportResponse)` - 任意状态码的响应
    /// * `Err(EngineError)` - 网络错误或超时
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, EngineError> {
        let start = Instant::now();
        let response = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EngineError::Timeout
                } else if e.is_builder() {
                    EngineError::InvalidRequest(e.to_string())
                } else {
                    EngineError::RequestFailed(e)
                }
            })?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let final_url = response.url().to_string();
        let body = response.bytes().await?;

        debug!(
            "{} {} -> {} ({} bytes, {} ms)",
            self.name(),
            final_url,
            status,
            body.len(),
            start.elapsed().as_millis()
        );

        Ok(TransportResponse {
            status,
            headers,
            final_url,
            body,
        })
    }

    /// 获取引擎名称
    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
