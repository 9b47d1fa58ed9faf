// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 有界并发的URL抓取与解析流水线
//!
//! ```no_run
//! use krawlrs::{CrawlEvent, FetchConfig, Krawler, ParserMode, QueueOptions};
//!
//! # async fn run() -> Result<(), krawlrs::KrawlError> {
//! let krawler = Krawler::new(FetchConfig::default().with_parser(ParserMode::Json))?;
//! let mut batch = krawler.queue(
//!     vec!["https://example.com/a.json", "https://example.com/b.json"],
//!     QueueOptions::default(),
//! )?;
//! while let Some(event) = batch.recv().await {
//!     if let CrawlEvent::End = event {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含目标、配置、事件等模型以及抓取、解码、解析服务
pub mod domain;

/// 引擎模块
///
/// HTTP传输抽象及其reqwest实现
pub mod engines;

/// 基础设施模块
///
/// 指标导出
pub mod infrastructure;

/// 队列模块
///
/// 批次调度与事件分发
pub mod queue;

/// 工具模块
///
/// 错误类型与日志初始化
pub mod utils;

pub use domain::models::event::{Ack, CrawlEvent, QueueOptions};
pub use domain::models::fetch_config::{FetchConfig, ParserMode};
pub use domain::models::outcome::{FetchOutcome, FetchedPage, ParsedValue, ResponseMeta};
pub use domain::models::target::{Target, TargetBatch, TargetEntry};
pub use queue::batch::{BatchHandle, BatchSummary, CrawlObserver};
pub use queue::scheduler::Krawler;
pub use utils::errors::{KrawlError, ParseError};
