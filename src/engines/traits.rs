// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::Method;
use thiserror::Error;

/// 传输层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 无法构造的请求
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl EngineError {
    /// 判断错误是否由超时引起
    pub fn is_timeout(&self) -> bool {
        match self {
            EngineError::RequestFailed(e) => e.is_timeout(),
            EngineError::Timeout => true,
            EngineError::InvalidRequest(_) => false,
        }
    }
}

/// 传输请求
///
/// 每次抓取单独构造，头部已经合并完毕，不与其他请求共享
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP方法
    pub method: Method,
    /// 目标URL
    pub url: String,
    /// 请求头
    pub headers: HeaderMap,
}

/// 传输响应
///
/// 响应体保持原始字节，解压和编码转换由内容解码器负责
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP状态码
    pub status: u16,
    /// 响应头
    pub headers: HeaderMap,
    /// 重定向之后的最终URL
    pub final_url: String,
    /// 原始响应体
    pub body: Bytes,
}

/// HTTP传输能力
///
/// 连接管理、TLS和重定向都在这一层之下完成
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// 发送一次请求
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, EngineError>;

    /// 传输实现名称
    fn name(&self) -> &'static str;
}
