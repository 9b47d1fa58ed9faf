// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::event::{Ack, CrawlEvent, QueueOptions};
use crate::domain::models::fetch_config::FetchConfig;
use crate::domain::models::outcome::FetchOutcome;
use crate::domain::models::target::{Target, TargetBatch};
use crate::domain::services::fetcher::Fetcher;
use crate::engines::reqwest_engine::ReqwestEngine;
use crate::engines::traits::HttpTransport;
use crate::queue::batch::BatchHandle;
use crate::utils::errors::KrawlError;
use metrics::counter;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio::task::{self, JoinError, JoinSet};
use tracing::{debug, error, info};

/// 批量抓取调度器
///
/// 按输入顺序放行目标，同时在途的抓取不超过 `max_connections`。
/// 每个目标产生一个终止事件，全部结束后产生一个 `End` 事件。
pub struct Krawler {
    fetcher: Arc<Fetcher>,
}

impl Krawler {
    /// 版本号，出现在默认User-Agent中
    pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    /// 使用reqwest传输创建调度器
    ///
    /// # 参数
    ///
    /// * `config` - 抓取配置
    ///
    /// # 返回值
    ///
    /// * `Ok(Krawler)` - 调度器实例
    /// * `Err(KrawlError)` - 配置无效或HTTP客户端构建失败
    pub fn new(config: FetchConfig) -> Result<Self, KrawlError> {
        config.validate()?;
        let engine = ReqwestEngine::new(config.timeout)?;
        Self::with_transport(config, Arc::new(engine))
    }

    /// 使用自定义传输创建调度器
    pub fn with_transport(
        config: FetchConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, KrawlError> {
        config.validate()?;
        Ok(Self {
            fetcher: Arc::new(Fetcher::new(Arc::new(config), transport)),
        })
    }

    pub fn config(&self) -> &FetchConfig {
        self.fetcher.config()
    }

    /// 抓取单个URL，不经过批次队列
    pub async fn fetch_url(&self, url: &str) -> FetchOutcome {
        self.fetcher.fetch(url).await
    }

    /// 提交一个批次
    ///
    /// 必须在Tokio运行时内调用。输入校验同步完成，抓取在后台进行，
    /// 结果通过返回的 `BatchHandle` 获取。
    ///
    /// # 参数
    ///
    /// * `targets` - 单个目标或目标列表
    /// * `options` - 队列选项
    ///
    /// # 返回值
    ///
    /// * `Ok(BatchHandle)` - 事件流句柄
    /// * `Err(KrawlError::InvalidInput)` - 列表为空或目标缺少URL，此时不会发出任何事件
    pub fn queue(
        &self,
        targets: impl Into<TargetBatch>,
        options: QueueOptions,
    ) -> Result<BatchHandle, KrawlError> {
        let targets = targets.into().into_targets()?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            KrawlError::InvalidInput(format!("queue requires a Tokio runtime: {}", e))
        })?;

        let (events, receiver) = mpsc::unbounded_channel();
        let run = BatchRun {
            fetcher: self.fetcher.clone(),
            max_connections: self.fetcher.config().max_connections,
            acknowledged: options.custom_callback,
            events,
        };

        info!(
            "Queued batch of {} targets (max_connections={}, custom_callback={})",
            targets.len(),
            run.max_connections,
            run.acknowledged
        );
        counter!("krawlrs_batches_total").increment(1);

        let total = targets.len();
        runtime.spawn(run.drive(targets));
        Ok(BatchHandle::new(receiver, total))
    }
}

/// 一次 `queue` 调用的运行状态
struct BatchRun {
    fetcher: Arc<Fetcher>,
    max_connections: usize,
    acknowledged: bool,
    events: mpsc::UnboundedSender<CrawlEvent>,
}

impl BatchRun {
    async fn drive(self, targets: Vec<Target>) {
        let total = targets.len();
        let gate = Arc::new(Semaphore::new(self.max_connections));
        let mut in_flight = JoinSet::new();
        let mut pending: HashMap<task::Id, Target> = HashMap::with_capacity(total);
        let mut settled = 0;

        for target in targets {
            // The gate is never closed, so acquisition only fails if that invariant breaks
            let permit = match gate.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("Admission gate closed unexpectedly: {}", e);
                    break;
                }
            };

            // Reap whatever finished while this target waited for a slot
            while let Some(joined) = in_flight.try_join_next_with_id() {
                settled += self.settle(joined, &mut pending);
            }

            let task = fetch_one(
                self.fetcher.clone(),
                self.events.clone(),
                self.acknowledged,
                target.clone(),
                permit,
            );
            let handle = in_flight.spawn(task);
            pending.insert(handle.id(), target);
        }

        while let Some(joined) = in_flight.join_next_with_id().await {
            settled += self.settle(joined, &mut pending);
        }

        info!("Batch finished: {}/{} targets settled", settled, total);
        let _ = self.events.send(CrawlEvent::End);
    }

    /// 回收一个已结束的任务
    ///
    /// 任务异常结束时它的目标还没有终止事件，在这里补发一个 `Error` 事件
    fn settle(
        &self,
        joined: Result<(task::Id, ()), JoinError>,
        pending: &mut HashMap<task::Id, Target>,
    ) -> usize {
        match joined {
            Ok((id, ())) => {
                pending.remove(&id);
            }
            Err(e) => {
                error!("Fetch task ended abnormally: {}", e);
                let Some(target) = pending.remove(&e.id()) else {
                    return 0;
                };
                let error = KrawlError::TaskFailed(e.to_string());
                counter!("krawlrs_fetch_total", "outcome" => error.kind()).increment(1);
                let event = CrawlEvent::Error {
                    error,
                    target,
                    ack: None,
                };
                if self.events.send(event).is_err() {
                    debug!("Batch handle dropped, discarding task failure");
                }
            }
        }
        1
    }
}

/// 抓取单个目标并发出它的终止事件，确认模式下等待确认后才释放名额
async fn fetch_one(
    fetcher: Arc<Fetcher>,
    events: mpsc::UnboundedSender<CrawlEvent>,
    acknowledged: bool,
    target: Target,
    permit: OwnedSemaphorePermit,
) {
    let url = target.url().unwrap_or_default().to_string();
    let outcome = fetcher.fetch(&url).await;

    let (ack, acked) = if acknowledged {
        let (ack, acked) = Ack::new();
        (Some(ack), Some(acked))
    } else {
        (None, None)
    };

    let event = match outcome {
        Ok(page) => CrawlEvent::Data {
            data: page.data,
            target,
            response: page.response,
            ack,
        },
        Err(error) => CrawlEvent::Error { error, target, ack },
    };

    // A failed send drops the event and its Ack, which releases the wait below
    if events.send(event).is_err() {
        debug!("Batch handle dropped, discarding result for {}", url);
    }
    if let Some(acked) = acked {
        let _ = acked.await;
    }

    drop(permit);
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod tests;
