// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::KrawlError;
use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use flate2::read::GzDecoder;
use std::io::Read;
use tracing::{debug, warn};

/// 内容解码器
///
/// 负责gzip解压和字符集归一化。字符集只按字节内容统计检测，
/// 不读取响应头或meta标签。
pub struct ContentDecoder;

impl ContentDecoder {
    /// gzip解压
    ///
    /// # 参数
    ///
    /// * `bytes` - gzip压缩数据
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<u8>)` - 解压后的数据
    /// * `Err(KrawlError::Decompression)` - 数据不是合法的gzip流
    pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>, KrawlError> {
        let mut decoder = GzDecoder::new(bytes);
        let mut decompressed = Vec::with_capacity(bytes.len() * 4);
        decoder
            .read_to_end(&mut decompressed)
            .map_err(KrawlError::Decompression)?;
        debug!(
            "Inflated {} gzip bytes to {} bytes",
            bytes.len(),
            decompressed.len()
        );
        Ok(decompressed)
    }

    /// 把任意字符集的字节转换为UTF-8文本
    ///
    /// 检测可信且为UTF-8/ASCII时原样解码；可信但为其他字符集时转码，
    /// 无法映射的字符被丢弃；检测不可信时按UTF-8解码。永远不会失败。
    pub fn normalize_encoding(bytes: &[u8]) -> String {
        let mut detector = EncodingDetector::new();
        detector.feed(bytes, true);
        let (encoding, confident) = detector.guess_assess(None, true);

        if !confident {
            warn!(
                "Charset detection inconclusive (best guess {}), decoding as UTF-8",
                encoding.name()
            );
            return String::from_utf8_lossy(bytes).into_owned();
        }

        if encoding == UTF_8 || bytes.is_ascii() {
            return String::from_utf8_lossy(bytes).into_owned();
        }

        debug!("Transcoding body from {} to UTF-8", encoding.name());
        Self::transcode(bytes, encoding)
    }

    /// 按给定字符集转码为UTF-8，丢弃无法映射的字符
    fn transcode(bytes: &[u8], encoding: &'static Encoding) -> String {
        let (decoded, actual, had_errors) = encoding.decode(bytes);
        if actual != encoding {
            debug!("BOM overrides detected charset: {}", actual.name());
        }
        if had_errors {
            warn!(
                "Dropping characters without a UTF-8 mapping from {} input",
                actual.name()
            );
            return decoded
                .chars()
                .filter(|c| *c != char::REPLACEMENT_CHARACTER)
                .collect();
        }
        decoded.into_owned()
    }
}
