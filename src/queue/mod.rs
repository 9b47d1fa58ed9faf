// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 批量调度：并发闸门、事件推送和确认模式
pub mod batch;
pub mod scheduler;
