// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::outcome::{ParsedValue, ResponseMeta};
use crate::domain::models::target::Target;
use crate::utils::errors::KrawlError;
use serde::Deserialize;
use tokio::sync::oneshot;

/// `queue` 调用选项
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct QueueOptions {
    /// 确认模式：下一个目标要等消费者确认当前事件后才放行
    #[serde(default)]
    pub custom_callback: bool,
}

impl QueueOptions {
    pub fn acknowledged() -> Self {
        Self {
            custom_callback: true,
        }
    }
}

/// 确认令牌
///
/// 只在确认模式下随事件下发。调用 `done` 或直接丢弃都会释放并发名额。
#[derive(Debug)]
pub struct Ack {
    sender: Option<oneshot::Sender<()>>,
}

impl Ack {
    pub(crate) fn new() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self { sender: Some(tx) }, rx)
    }

    /// 确认事件已处理
    pub fn done(mut self) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(());
        }
    }
}

impl Drop for Ack {
    fn drop(&mut self) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(());
        }
    }
}

/// 批次事件
///
/// 每个目标恰好产生一个 `Data` 或 `Error`，批次最后恰好一个 `End`
#[derive(Debug)]
pub enum CrawlEvent {
    /// 抓取成功
    Data {
        data: ParsedValue,
        target: Target,
        response: ResponseMeta,
        ack: Option<Ack>,
    },
    /// 抓取失败
    Error {
        error: KrawlError,
        target: Target,
        ack: Option<Ack>,
    },
    /// 批次结束
    End,
}

impl CrawlEvent {
    /// 事件对应的目标，`End` 没有目标
    pub fn target(&self) -> Option<&Target> {
        match self {
            CrawlEvent::Data { target, .. } | CrawlEvent::Error { target, .. } => Some(target),
            CrawlEvent::End => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, CrawlEvent::End)
    }
}
