// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::fetch_config::ParserMode;
use crate::domain::models::outcome::ParsedValue;
use crate::utils::errors::ParseError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use scraper::Html;
use serde_json::{Map, Value};
use tracing::debug;

/// XML属性在树中的键
const ATTRIBUTES_KEY: &str = "$";
/// XML文本内容在树中的键
const TEXT_KEY: &str = "_";

/// 响应体解析器
pub struct BodyParser;

impl BodyParser {
    /// 按解析方式把文本转换为结构化结果
    ///
    /// # 参数
    ///
    /// * `text` - UTF-8文本
    /// * `mode` - 解析方式
    ///
    /// # 返回值
    ///
    /// * `Ok(ParsedValue)` - 解析结果
    /// * `Err(ParseError)` - JSON/XML语法错误
    pub fn parse(text: String, mode: ParserMode) -> Result<ParsedValue, ParseError> {
        match mode {
            ParserMode::Html => Ok(ParsedValue::Html(Self::parse_html(&text))),
            ParserMode::Json => Ok(ParsedValue::Json(serde_json::from_str(&text)?)),
            ParserMode::Xml => Ok(ParsedValue::Xml(Self::parse_xml(&text)?)),
            ParserMode::Raw => Ok(ParsedValue::Raw(text)),
        }
    }

    fn parse_html(text: &str) -> Html {
        let document = Html::parse_document(text);
        // html5ever recovers from everything; its complaints are only worth a debug line
        if !document.errors.is_empty() {
            debug!("HTML parsed with {} recoverable errors", document.errors.len());
        }
        document
    }

    /// 把XML文档转换为嵌套键值树
    pub fn parse_xml(text: &str) -> Result<Value, ParseError> {
        let mut reader = Reader::from_str(text);
        let mut stack: Vec<XmlFrame> = Vec::new();
        let mut root: Option<(String, Value)> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    Self::ensure_single_root(&stack, &root)?;
                    stack.push(XmlFrame::open(&start)?);
                }
                Event::Empty(start) => {
                    Self::ensure_single_root(&stack, &root)?;
                    let frame = XmlFrame::open(&start)?;
                    Self::close(frame, &mut stack, &mut root);
                }
                Event::End(_) => {
                    let frame = stack.pop().ok_or_else(|| {
                        ParseError::XmlStructure("unexpected closing tag".to_string())
                    })?;
                    Self::close(frame, &mut stack, &mut root);
                }
                Event::Text(content) => {
                    let content = content.unescape()?;
                    match stack.last_mut() {
                        Some(frame) => frame.text.push_str(&content),
                        None if content.trim().is_empty() => {}
                        None => {
                            return Err(ParseError::XmlStructure(
                                "non-whitespace text outside the root element".to_string(),
                            ))
                        }
                    }
                }
                Event::CData(cdata) => {
                    let content = cdata.into_inner();
                    match stack.last_mut() {
                        Some(frame) => frame.text.push_str(&String::from_utf8_lossy(&content)),
                        None => {
                            return Err(ParseError::XmlStructure(
                                "CDATA outside the root element".to_string(),
                            ))
                        }
                    }
                }
                Event::Eof => break,
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }

        if let Some(frame) = stack.last() {
            return Err(ParseError::XmlStructure(format!(
                "unclosed element <{}>",
                frame.name
            )));
        }

        let (name, element) =
            root.ok_or_else(|| ParseError::XmlStructure("document has no root element".to_string()))?;
        let mut tree = Map::new();
        tree.insert(name, element);
        Ok(Value::Object(tree))
    }

    fn ensure_single_root(
        stack: &[XmlFrame],
        root: &Option<(String, Value)>,
    ) -> Result<(), ParseError> {
        if stack.is_empty() && root.is_some() {
            return Err(ParseError::XmlStructure(
                "document has more than one root element".to_string(),
            ));
        }
        Ok(())
    }

    fn close(frame: XmlFrame, stack: &mut [XmlFrame], root: &mut Option<(String, Value)>) {
        let name = frame.name.clone();
        let value = frame.finish();
        match stack.last_mut() {
            Some(parent) => match parent
                .children
                .entry(name)
                .or_insert_with(|| Value::Array(Vec::new()))
            {
                Value::Array(items) => items.push(value),
                other => *other = Value::Array(vec![value]),
            },
            None => *root = Some((name, value)),
        }
    }
}

/// 解析中的XML元素
struct XmlFrame {
    name: String,
    attributes: Map<String, Value>,
    text: String,
    children: Map<String, Value>,
}

impl XmlFrame {
    fn open(start: &BytesStart<'_>) -> Result<Self, ParseError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Map::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value()?.into_owned();
            attributes.insert(key, Value::String(value));
        }
        Ok(Self {
            name,
            attributes,
            text: String::new(),
            children: Map::new(),
        })
    }

    /// 没有属性和子元素时折叠为文本
    ///
    /// 纯空白文本视为没有文本，其他文本保留首尾空白
    fn finish(self) -> Value {
        let text = if self.text.trim().is_empty() {
            String::new()
        } else {
            self.text
        };
        if self.attributes.is_empty() && self.children.is_empty() {
            return Value::String(text);
        }

        let mut element = Map::new();
        if !self.attributes.is_empty() {
            element.insert(ATTRIBUTES_KEY.to_string(), Value::Object(self.attributes));
        }
        if !text.is_empty() {
            element.insert(TEXT_KEY.to_string(), Value::String(text));
        }
        element.extend(self.children);
        Value::Object(element)
    }
}

#[cfg(test)]
#[path = "body_parser_test.rs"]
mod tests;
