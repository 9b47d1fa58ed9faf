// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 初始化指标系统
///
/// 注册抓取相关指标的描述。只有配置了监听地址时才安装Prometheus导出器，
/// 否则指标调用都是空操作。
pub fn init_metrics(addr: Option<SocketAddr>) {
    if let Some(addr) = addr {
        // Ignore error if a recorder is already installed or the port is in use
        match PrometheusBuilder::new().with_http_listener(addr).install() {
            Ok(()) => info!("Metrics exporter listening on {}", addr),
            Err(e) => warn!(
                "Failed to install Prometheus recorder on {}: {}. Metrics are disabled.",
                addr, e
            ),
        }
    }

    describe_counter!(
        "krawlrs_fetch_total",
        "Total number of settled fetches, labelled by outcome"
    );
    describe_counter!("krawlrs_batches_total", "Total number of queued batches");
    describe_histogram!(
        "krawlrs_fetch_duration_seconds",
        Unit::Seconds,
        "Duration of a single fetch including decoding and parsing"
    );
    describe_gauge!(
        "krawlrs_fetches_in_flight",
        "Number of fetches currently holding a connection slot"
    );
}
