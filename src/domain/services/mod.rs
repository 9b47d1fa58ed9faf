// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 单个URL的处理流水线，依次为：
/// - 抓取器（fetcher）：发起请求并校验状态码
/// - 内容解码器（content_decoder）：gzip解压和字符集归一化
/// - 响应体解析器（body_parser）：HTML/JSON/XML/原始文本解析
///
/// 每个阶段都返回 `Result`，第一个失败即终止后续阶段。
pub mod body_parser;
pub mod content_decoder;
pub mod fetcher;
