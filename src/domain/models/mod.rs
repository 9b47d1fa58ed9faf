// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// - 目标（target）：待抓取的URL及透传数据
/// - 抓取配置（fetch_config）：一次运行内共享的只读配置
/// - 抓取结果（outcome）：解析结果与响应元数据
/// - 事件（event）：批次向消费者推送的事件与确认令牌
pub mod event;
pub mod fetch_config;
pub mod outcome;
pub mod target;
