// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::EngineError;
use thiserror::Error;

/// 抓取流水线错误类型
///
/// `InvalidInput` 在 `queue` 调用时同步返回，其余错误都只影响单个目标
#[derive(Error, Debug)]
pub enum KrawlError {
    /// 目标列表为空或格式错误，或配置无效
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 网络层失败（DNS、连接、超时）
    #[error("Transport error: {0}")]
    Transport(#[from] EngineError),

    /// 4xx/5xx 响应
    #[error("Wrong response code: {status}")]
    HttpStatus { status: u16, url: String },

    /// gzip 数据损坏
    #[error("Decompression failed: {0}")]
    Decompression(#[source] std::io::Error),

    /// 响应体解析失败
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// 抓取任务异常结束（panic或被取消）
    #[error("Fetch task failed: {0}")]
    TaskFailed(String),
}

impl KrawlError {
    /// 返回指标标签使用的错误类别
    pub fn kind(&self) -> &'static str {
        match self {
            KrawlError::InvalidInput(_) => "invalid_input",
            KrawlError::Transport(_) => "transport",
            KrawlError::HttpStatus { .. } => "http_status",
            KrawlError::Decompression(_) => "decompression",
            KrawlError::Parse(_) => "parse",
            KrawlError::TaskFailed(_) => "task_failed",
        }
    }
}

/// 解析错误类型
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed XML document: {0}")]
    XmlStructure(String),
}
