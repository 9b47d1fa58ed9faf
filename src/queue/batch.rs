// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::event::{Ack, CrawlEvent};
use crate::domain::models::outcome::{ParsedValue, ResponseMeta};
use crate::domain::models::target::Target;
use crate::utils::errors::KrawlError;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// 批次事件观察者
///
/// 所有方法都有空的默认实现，只需覆盖关心的事件。确认模式下的 `Ack`
/// 可以移交给其他任务，稍后再调用 `done`。
#[async_trait]
pub trait CrawlObserver: Send {
    async fn on_data(
        &mut self,
        _data: ParsedValue,
        _target: Target,
        _response: ResponseMeta,
        _ack: Option<Ack>,
    ) {
    }

    async fn on_error(&mut self, _error: KrawlError, _target: Target, _ack: Option<Ack>) {}

    async fn on_end(&mut self) {}
}

/// 批次结果统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// 批次句柄
///
/// 事件按完成顺序到达，`End` 总是最后一个。句柄被丢弃后批次仍会跑完，
/// 只是结果被丢弃。
pub struct BatchHandle {
    events: mpsc::UnboundedReceiver<CrawlEvent>,
    target_count: usize,
}

impl BatchHandle {
    pub(crate) fn new(events: mpsc::UnboundedReceiver<CrawlEvent>, target_count: usize) -> Self {
        Self {
            events,
            target_count,
        }
    }

    /// 去重后实际调度的目标数
    pub fn target_count(&self) -> usize {
        self.target_count
    }

    /// 接收下一个事件，`End` 之后返回 `None`
    pub async fn recv(&mut self) -> Option<CrawlEvent> {
        self.events.recv().await
    }

    /// 把事件逐个分发给观察者，直到批次结束
    pub async fn observe<O>(mut self, observer: &mut O)
    where
        O: CrawlObserver + ?Sized,
    {
        while let Some(event) = self.events.recv().await {
            match event {
                CrawlEvent::Data {
                    data,
                    target,
                    response,
                    ack,
                } => observer.on_data(data, target, response, ack).await,
                CrawlEvent::Error { error, target, ack } => {
                    observer.on_error(error, target, ack).await
                }
                CrawlEvent::End => {
                    observer.on_end().await;
                    break;
                }
            }
        }
    }

    /// 等待批次结束并统计结果，确认令牌被立即释放
    pub async fn collect_all(mut self) -> BatchSummary {
        let mut summary = BatchSummary::default();
        while let Some(event) = self.events.recv().await {
            match event {
                CrawlEvent::Data { .. } => summary.succeeded += 1,
                CrawlEvent::Error { .. } => summary.failed += 1,
                CrawlEvent::End => break,
            }
        }
        summary
    }
}

impl Stream for BatchHandle {
    type Item = CrawlEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().events.poll_recv(cx)
    }
}
