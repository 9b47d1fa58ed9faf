// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::KrawlError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// 抓取目标
///
/// 可以是裸URL字符串，也可以是带附加数据的结构化目标。附加数据原样透传，
/// 流水线不会读取它。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Target {
    /// 裸URL
    Url(String),
    /// 结构化目标
    Entry(TargetEntry),
}

/// 结构化目标
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TargetEntry {
    /// 目标URL，缺失时在 `queue` 中被拒绝
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// 透传的附加数据
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Target {
    /// 创建带附加数据的结构化目标
    pub fn with_metadata(url: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Target::Entry(TargetEntry {
            url: Some(url.into()),
            metadata,
        })
    }

    /// 目标URL
    pub fn url(&self) -> Option<&str> {
        match self {
            Target::Url(url) => Some(url.as_str()),
            Target::Entry(entry) => entry.url.as_deref(),
        }
    }

    /// 附加数据，裸URL没有附加数据
    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        match self {
            Target::Url(_) => None,
            Target::Entry(entry) => Some(&entry.metadata),
        }
    }

    fn validate(&self) -> Result<(), KrawlError> {
        match self.url() {
            Some(url) if !url.trim().is_empty() => Ok(()),
            Some(_) => Err(KrawlError::InvalidInput(
                "target URL must not be empty".to_string(),
            )),
            None => Err(KrawlError::InvalidInput(
                "structured target is missing a url field".to_string(),
            )),
        }
    }
}

impl From<&str> for Target {
    fn from(url: &str) -> Self {
        Target::Url(url.to_string())
    }
}

impl From<String> for Target {
    fn from(url: String) -> Self {
        Target::Url(url)
    }
}

impl From<TargetEntry> for Target {
    fn from(entry: TargetEntry) -> Self {
        Target::Entry(entry)
    }
}

/// 一次 `queue` 调用的输入
///
/// 单个目标不做去重；列表中的裸URL按字符串去重（保留首次出现的位置），
/// 结构化目标即使URL相同也各自独立。
#[derive(Debug, Clone, PartialEq)]
pub enum TargetBatch {
    Single(Target),
    Many(Vec<Target>),
}

impl TargetBatch {
    /// 校验并展开为待调度的目标列表
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<Target>)` - 去重后的目标，顺序与输入一致
    /// * `Err(KrawlError::InvalidInput)` - 列表为空或某个目标缺少URL
    pub fn into_targets(self) -> Result<Vec<Target>, KrawlError> {
        match self {
            TargetBatch::Single(target) => {
                target.validate()?;
                Ok(vec![target])
            }
            TargetBatch::Many(targets) => {
                if targets.is_empty() {
                    return Err(KrawlError::InvalidInput(
                        "At least one URL must be specified.".to_string(),
                    ));
                }
                for target in &targets {
                    target.validate()?;
                }

                let mut seen = HashSet::new();
                Ok(targets
                    .into_iter()
                    .filter(|target| match target {
                        Target::Url(url) => seen.insert(url.clone()),
                        Target::Entry(_) => true,
                    })
                    .collect())
            }
        }
    }
}

impl From<Target> for TargetBatch {
    fn from(target: Target) -> Self {
        TargetBatch::Single(target)
    }
}

impl From<&str> for TargetBatch {
    fn from(url: &str) -> Self {
        TargetBatch::Single(Target::from(url))
    }
}

impl From<String> for TargetBatch {
    fn from(url: String) -> Self {
        TargetBatch::Single(Target::from(url))
    }
}

impl From<Vec<Target>> for TargetBatch {
    fn from(targets: Vec<Target>) -> Self {
        TargetBatch::Many(targets)
    }
}

impl From<Vec<String>> for TargetBatch {
    fn from(urls: Vec<String>) -> Self {
        TargetBatch::Many(urls.into_iter().map(Target::Url).collect())
    }
}

impl From<Vec<&str>> for TargetBatch {
    fn from(urls: Vec<&str>) -> Self {
        TargetBatch::Many(urls.into_iter().map(Target::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for TargetBatch {
    fn from(urls: [&str; N]) -> Self {
        TargetBatch::Many(urls.into_iter().map(Target::from).collect())
    }
}
