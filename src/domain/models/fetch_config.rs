// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::KrawlError;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Method;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// 默认最大并发数
pub const DEFAULT_MAX_CONNECTIONS: usize = 10;

/// 默认User-Agent
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; Krawler/",
    env!("CARGO_PKG_VERSION"),
    ";)"
);

/// 响应体解析方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserMode {
    /// 构建可查询的DOM
    #[default]
    Html,
    /// 严格JSON解析
    Json,
    /// 严格XML解析为嵌套键值树
    Xml,
    /// 原样返回文本
    Raw,
}

impl ParserMode {
    /// 未显式配置时使用的Accept头
    pub fn accept_header(&self) -> &'static str {
        match self {
            ParserMode::Xml => "application/xml,text/xml;q=0.9,*/*;q=0.8",
            ParserMode::Json => "application/json,text/javascript;q=0.9,*/*;q=0.8",
            ParserMode::Html | ParserMode::Raw => {
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
            }
        }
    }
}

impl FromStr for ParserMode {
    type Err = KrawlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" | "cheerio" => Ok(ParserMode::Html),
            "json" => Ok(ParserMode::Json),
            "xml" => Ok(ParserMode::Xml),
            // falsy parser setting means passthrough
            "raw" | "" | "false" | "none" => Ok(ParserMode::Raw),
            other => Err(KrawlError::InvalidInput(format!(
                "unknown parser mode: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ParserMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParserMode::Html => "html",
            ParserMode::Json => "json",
            ParserMode::Xml => "xml",
            ParserMode::Raw => "raw",
        };
        f.write_str(name)
    }
}

/// 抓取配置
///
/// 每次运行内不可变，所有并发抓取只读共享。派生的 `Accept` /
/// `Accept-Charset` 头在每次请求的副本上生成，不会写回这里。
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// 最大并发抓取数，必须大于0
    pub max_connections: usize,
    /// 解析方式
    pub parser: ParserMode,
    /// 是否强制把响应体转换为UTF-8
    pub force_utf8: bool,
    /// HTTP方法
    pub method: Method,
    /// 请求头，键大小写不敏感
    pub headers: HeaderMap,
    /// 传输层超时
    pub timeout: Option<Duration>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            parser: ParserMode::default(),
            force_utf8: false,
            method: Method::GET,
            headers,
            timeout: None,
        }
    }
}

impl FetchConfig {
    /// 设置解析方式
    pub fn with_parser(mut self, parser: ParserMode) -> Self {
        self.parser = parser;
        self
    }

    /// 设置最大并发数
    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// 开启或关闭UTF-8强制转换
    pub fn with_force_utf8(mut self, force_utf8: bool) -> Self {
        self.force_utf8 = force_utf8;
        self
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), KrawlError> {
        if self.max_connections == 0 {
            return Err(KrawlError::InvalidInput(
                "max_connections must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}
