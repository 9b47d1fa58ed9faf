// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 测试用的进程内传输实现

use crate::engines::traits::{EngineError, HttpTransport, TransportRequest, TransportResponse};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// 预设响应
#[derive(Clone)]
pub struct StubResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl StubResponse {
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers
            .insert(name, reqwest::header::HeaderValue::from_static(value));
        self
    }
}

/// 按URL返回预设响应，并记录请求与并发峰值
#[derive(Default)]
pub struct StubEngine {
    routes: HashMap<String, StubResponse>,
    panics: HashSet<String>,
    delay: Option<Duration>,
    requests: Mutex<Vec<TransportRequest>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl StubEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, response: StubResponse) -> Self {
        self.routes.insert(url.to_string(), response);
        self
    }

    /// 请求该URL时panic，模拟抓取任务异常结束
    pub fn panic_on(mut self, url: &str) -> Self {
        self.panics.insert(url.to_string());
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for StubEngine {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, EngineError> {
        if self.panics.contains(&request.url) {
            panic!("stub transport failure for {}", request.url);
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.routes.get(&request.url) {
            Some(stub) => Ok(TransportResponse {
                status: stub.status,
                headers: stub.headers.clone(),
                final_url: request.url,
                body: stub.body.clone(),
            }),
            None => Err(EngineError::InvalidRequest(format!(
                "no route for {}",
                request.url
            ))),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}
