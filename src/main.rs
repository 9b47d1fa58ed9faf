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

use anyhow::Context;
use async_trait::async_trait;
use clap::Parser;
use krawlrs::config::settings::Settings;
use krawlrs::infrastructure::metrics::init_metrics;
use krawlrs::utils::telemetry;
use krawlrs::{
    Ack, BatchSummary, CrawlObserver, Krawler, KrawlError, ParsedValue, ResponseMeta, Target,
};
use std::path::PathBuf;
use tracing::info;

const PREVIEW_CHARS: usize = 120;

/// 命令行参数
///
/// 未指定的选项回落到配置文件和 `KRAWLRS__` 环境变量
#[derive(Parser, Debug)]
#[command(name = "krawlrs", version, about = "Fetch and parse URLs with bounded concurrency")]
struct Cli {
    /// URLs to fetch
    urls: Vec<String>,

    /// Body parser: html, cheerio, json, xml or raw
    #[arg(short, long)]
    parser: Option<String>,

    /// Maximum number of concurrent fetches
    #[arg(short = 'c', long)]
    max_connections: Option<usize>,

    /// Detect the body charset and transcode it to UTF-8
    #[arg(long)]
    force_utf8: bool,

    /// JSON file holding an array of targets (strings or objects with a url field)
    #[arg(short, long)]
    targets: Option<PathBuf>,

    /// Wait for each result to be handled before admitting the next target
    #[arg(long)]
    ack: bool,
}

/// 主函数
///
/// 加载配置、初始化日志与指标，提交一个批次并逐行打印事件
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. Load configuration
    let settings = Settings::new().context("failed to load configuration")?;

    // 2. Initialize logging and metrics
    telemetry::init_telemetry(settings.telemetry.json);
    init_metrics(settings.telemetry.metrics_addr);
    info!("Starting krawlrs {}", Krawler::VERSION);

    // 3. Build fetch configuration, CLI flags win over settings
    let mut config = settings.fetch_config()?;
    if let Some(parser) = &cli.parser {
        config.parser = parser.parse()?;
    }
    if let Some(max_connections) = cli.max_connections {
        config.max_connections = max_connections;
    }
    if cli.force_utf8 {
        config.force_utf8 = true;
    }

    let mut options = settings.queue;
    if cli.ack {
        options.custom_callback = true;
    }

    // 4. Collect targets
    let mut targets: Vec<Target> = match &cli.targets {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a JSON array of targets", path.display()))?
        }
        None => Vec::new(),
    };
    targets.extend(cli.urls.into_iter().map(Target::from));

    // 5. Run the batch
    let krawler = Krawler::new(config)?;
    let batch = krawler.queue(targets, options)?;
    info!("Scheduled {} targets", batch.target_count());

    let mut printer = Printer::default();
    batch.observe(&mut printer).await;

    let summary = printer.summary;
    println!(
        "done: {} succeeded, {} failed, {} total",
        summary.succeeded,
        summary.failed,
        summary.total()
    );

    if summary.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// 把事件逐行打印到stdout
#[derive(Default)]
struct Printer {
    summary: BatchSummary,
}

#[async_trait]
impl CrawlObserver for Printer {
    async fn on_data(
        &mut self,
        data: ParsedValue,
        target: Target,
        response: ResponseMeta,
        ack: Option<Ack>,
    ) {
        self.summary.succeeded += 1;
        println!(
            "ok    {} [{}] {}",
            target.url().unwrap_or_default(),
            response.status,
            preview(&data)
        );
        if let Some(ack) = ack {
            ack.done();
        }
    }

    async fn on_error(&mut self, error: KrawlError, target: Target, _ack: Option<Ack>) {
        self.summary.failed += 1;
        println!("error {} {}", target.url().unwrap_or_default(), error);
    }
}

fn preview(data: &ParsedValue) -> String {
    let text = match data {
        ParsedValue::Html(_) => data
            .select_text("title")
            .map(|title| format!("title: {}", title.trim()))
            .unwrap_or_else(|| "(html, no title)".to_string()),
        ParsedValue::Json(value) | ParsedValue::Xml(value) => value.to_string(),
        ParsedValue::Raw(text) => text.clone(),
    };
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
