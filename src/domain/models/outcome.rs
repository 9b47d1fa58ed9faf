// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::KrawlError;
use reqwest::header::HeaderMap;
use scraper::{Html, Selector};
use serde_json::Value;

/// 响应元数据
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    /// HTTP状态码
    pub status: u16,
    /// 响应头
    pub headers: HeaderMap,
    /// 重定向之后的最终URL
    pub url: String,
}

impl ResponseMeta {
    /// 读取响应头，名称大小写不敏感
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// 解析结果
#[derive(Debug)]
pub enum ParsedValue {
    /// 可查询的HTML文档
    Html(Html),
    /// JSON值
    Json(Value),
    /// XML树，形如 `{ "root": { "$": {..}, "_": "..", "child": [..] } }`
    Xml(Value),
    /// 原始文本
    Raw(String),
}

impl ParsedValue {
    pub fn as_html(&self) -> Option<&Html> {
        match self {
            ParsedValue::Html(html) => Some(html),
            _ => None,
        }
    }

    /// JSON或XML树
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ParsedValue::Json(value) | ParsedValue::Xml(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParsedValue::Raw(text) => Some(text),
            _ => None,
        }
    }

    /// 取第一个匹配CSS选择器的元素文本
    ///
    /// 非HTML结果或选择器无效时返回 `None`
    pub fn select_text(&self, css: &str) -> Option<String> {
        let html = self.as_html()?;
        let selector = Selector::parse(css).ok()?;
        html.select(&selector)
            .next()
            .map(|element| element.text().collect::<String>())
    }
}

/// 单个目标成功抓取的结果
#[derive(Debug)]
pub struct FetchedPage {
    /// 解析后的数据
    pub data: ParsedValue,
    /// 响应元数据
    pub response: ResponseMeta,
}

/// 一次抓取的结果，失败时携带错误详情
pub type FetchOutcome = Result<FetchedPage, KrawlError>;
