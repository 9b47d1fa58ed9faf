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

use crate::domain::models::event::QueueOptions;
use crate::domain::models::fetch_config::{FetchConfig, ParserMode, DEFAULT_MAX_CONNECTIONS};
use crate::utils::errors::KrawlError;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use reqwest::header::{HeaderName, HeaderValue, USER_AGENT};
use reqwest::Method;
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含抓取、队列和遥测三部分配置
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 抓取配置
    pub fetch: FetchSettings,
    /// 队列配置
    #[serde(default)]
    pub queue: QueueOptions,
    /// 遥测配置
    pub telemetry: TelemetrySettings,
}

/// 抓取配置设置
#[derive(Debug, Deserialize)]
pub struct FetchSettings {
    /// 最大并发抓取数
    pub max_connections: usize,
    /// 解析方式 (html, cheerio, json, xml, raw, false)
    pub parser: String,
    /// 是否强制转换为UTF-8
    pub force_utf8: bool,
    /// HTTP方法
    pub method: String,
    /// 附加请求头
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// 请求超时时间（秒）
    pub timeout_secs: Option<u64>,
    /// 覆盖默认User-Agent
    pub user_agent: Option<String>,
}

/// 遥测配置设置
#[derive(Debug, Deserialize)]
pub struct TelemetrySettings {
    /// 是否输出JSON格式日志
    pub json: bool,
    /// Prometheus指标监听地址，未设置时不启动监听
    pub metrics_addr: Option<SocketAddr>,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加默认值、`config/default`、`config/<APP_ENVIRONMENT>` 和
    /// `KRAWLRS__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("KRAWLRS").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 只包含默认值的配置构建器
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            // Default fetch settings
            .set_default("fetch.max_connections", DEFAULT_MAX_CONNECTIONS as u64)?
            .set_default("fetch.parser", ParserMode::default().to_string())?
            .set_default("fetch.force_utf8", false)?
            .set_default("fetch.method", "GET")?
            // Default queue settings
            .set_default("queue.custom_callback", false)?
            // Default telemetry settings
            .set_default("telemetry.json", false)
    }

    /// 转换为校验过的抓取配置
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchConfig)` - 可直接交给 `Krawler` 的配置
    /// * `Err(KrawlError::InvalidInput)` - 解析方式、方法、请求头或并发数无效
    pub fn fetch_config(&self) -> Result<FetchConfig, KrawlError> {
        let fetch = &self.fetch;

        let method = Method::from_bytes(fetch.method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|e| {
                KrawlError::InvalidInput(format!("invalid method {}: {}", fetch.method, e))
            })?;

        let mut config = FetchConfig::default()
            .with_parser(fetch.parser.parse()?)
            .with_max_connections(fetch.max_connections)
            .with_force_utf8(fetch.force_utf8);
        config.method = method;
        config.timeout = fetch.timeout_secs.map(Duration::from_secs);

        if let Some(agent) = &fetch.user_agent {
            config.headers.insert(USER_AGENT, header_value(agent)?);
        }
        for (name, value) in &fetch.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                KrawlError::InvalidInput(format!("invalid header name {}: {}", name, e))
            })?;
            config.headers.insert(name, header_value(value)?);
        }

        config.validate()?;
        Ok(config)
    }
}

fn header_value(value: &str) -> Result<HeaderValue, KrawlError> {
    HeaderValue::from_str(value)
        .map_err(|e| KrawlError::InvalidInput(format!("invalid header value {}: {}", value, e)))
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
