// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::fetch_config::FetchConfig;
use crate::domain::models::outcome::{FetchOutcome, FetchedPage, ParsedValue, ResponseMeta};
use crate::domain::services::body_parser::BodyParser;
use crate::domain::services::content_decoder::ContentDecoder;
use crate::engines::traits::{HttpTransport, TransportRequest, TransportResponse};
use crate::utils::errors::KrawlError;
use metrics::{counter, gauge, histogram};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_CHARSET, ACCEPT_ENCODING, CONTENT_ENCODING,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// `force_utf8` 开启时使用的 Accept-Charset
const UTF8_ACCEPT_CHARSET: &str = "utf-8;q=0.7,*;q=0.3";

/// 单URL抓取器
///
/// 执行一次请求，然后依次经过解压、字符集归一化和解析。所有失败都以
/// `Err` 返回，不会panic，也不会跨越抓取边界传播。
pub struct Fetcher {
    config: Arc<FetchConfig>,
    transport: Arc<dyn HttpTransport>,
}

impl Fetcher {
    /// 创建新的抓取器
    ///
    /// # 参数
    ///
    /// * `config` - 一次运行内共享的只读配置
    /// * `transport` - HTTP传输实现
    pub fn new(config: Arc<FetchConfig>, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// 生成单次请求使用的头部
    ///
    /// 在配置头部的副本上补充派生头，共享配置保持不变
    pub fn request_headers(&self) -> HeaderMap {
        let mut headers = self.config.headers.clone();

        if !headers.contains_key(ACCEPT) {
            headers.insert(
                ACCEPT,
                HeaderValue::from_static(self.config.parser.accept_header()),
            );
        }
        if self.config.force_utf8 && !headers.contains_key(ACCEPT_CHARSET) {
            headers.insert(ACCEPT_CHARSET, HeaderValue::from_static(UTF8_ACCEPT_CHARSET));
        }
        if !headers.contains_key(ACCEPT_ENCODING) {
            headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        }

        headers
    }

    /// 构造传输请求
    pub fn build_request(&self, url: &str) -> TransportRequest {
        TransportRequest {
            method: self.config.method.clone(),
            url: url.to_string(),
            headers: self.request_headers(),
        }
    }

    /// 抓取并解析一个URL
    ///
    /// # 参数
    ///
    /// * `url` - 目标URL
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchedPage)` - 解析结果和响应元数据
    /// * `Err(KrawlError)` - 传输、状态码、解压或解析失败
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let start = Instant::now();
        gauge!("krawlrs_fetches_in_flight").increment(1.0);
        debug!("Fetching {} via {}", url, self.transport.name());

        let outcome = self.try_fetch(url).await;

        gauge!("krawlrs_fetches_in_flight").decrement(1.0);
        histogram!("krawlrs_fetch_duration_seconds").record(start.elapsed().as_secs_f64());

        match &outcome {
            Ok(page) => {
                counter!("krawlrs_fetch_total", "outcome" => "success").increment(1);
                debug!(
                    "Fetched {} (status {}) in {} ms",
                    url,
                    page.response.status,
                    start.elapsed().as_millis()
                );
            }
            Err(e) => {
                counter!("krawlrs_fetch_total", "outcome" => e.kind()).increment(1);
                warn!("Fetch of {} failed: {}", url, e);
            }
        }

        outcome
    }

    async fn try_fetch(&self, url: &str) -> FetchOutcome {
        let response = self.transport.send(self.build_request(url)).await?;

        if (400..=599).contains(&response.status) {
            return Err(KrawlError::HttpStatus {
                status: response.status,
                url: response.final_url,
            });
        }

        let TransportResponse {
            status,
            headers,
            final_url,
            body,
        } = response;

        let body = if is_gzip(&headers) {
            ContentDecoder::decompress(&body)?
        } else {
            body.to_vec()
        };

        let data = self.decode_and_parse(body)?;

        Ok(FetchedPage {
            data,
            response: ResponseMeta {
                status,
                headers,
                url: final_url,
            },
        })
    }

    /// 解压之后共用的解码与解析路径
    fn decode_and_parse(&self, body: Vec<u8>) -> Result<ParsedValue, KrawlError> {
        let text = if self.config.force_utf8 {
            ContentDecoder::normalize_encoding(&body)
        } else {
            String::from_utf8(body)
                .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
        };

        Ok(BodyParser::parse(text, self.config.parser)?)
    }
}

fn is_gzip(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            let v = v.trim();
            v.eq_ignore_ascii_case("gzip") || v.eq_ignore_ascii_case("x-gzip")
        })
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "fetcher_test.rs"]
mod tests;
