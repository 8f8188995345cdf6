// ==========================================
// OpenSILEX 事件导入 - CSV 行读取器
// ==========================================
// 职责: 将输入流切分为逐行的单元格数组
// 约定: 流结束返回 None；允许行长度不一致；空行跳过
// 分隔符: 可配置，或从首行自动探测（, ; \t）
// ==========================================

use crate::importer::error::ImportResult;
use csv::{ReaderBuilder, StringRecord};
use std::io::{BufRead, BufReader, Read};
use tracing::debug;

/// 可自动探测的分隔符（按优先级排列）
pub const CANDIDATE_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// 自动探测时窥视的最大字节数
const SNIFF_CAPACITY: usize = 8 * 1024;

// ==========================================
// CsvRowReader - 逐行读取
// ==========================================
pub struct CsvRowReader<R: Read> {
    reader: csv::Reader<BufReader<R>>,
    record: StringRecord,
    delimiter: u8,
}

impl<R: Read> CsvRowReader<R> {
    /// 创建读取器
    ///
    /// # 参数
    /// - input: 原始输入流（UTF-8）
    /// - delimiter: 指定分隔符；None 表示从首行探测
    pub fn new(input: R, delimiter: Option<u8>) -> ImportResult<Self> {
        let mut buffered = BufReader::with_capacity(SNIFF_CAPACITY, input);

        let delimiter = match delimiter {
            Some(d) => d,
            None => detect_delimiter(buffered.fill_buf()?),
        };
        debug!(delimiter = %(delimiter as char).escape_default(), "CSV 分隔符");

        let reader = ReaderBuilder::new()
            .has_headers(false) // 两行表头由导入器显式处理
            .flexible(true) // 允许行长度不一致
            .delimiter(delimiter)
            .from_reader(buffered);

        Ok(Self {
            reader,
            record: StringRecord::new(),
            delimiter,
        })
    }

    /// 读取下一行
    ///
    /// # 返回
    /// - Ok(Some(cells)): 单元格数组
    /// - Ok(None): 流结束
    /// - Err: I/O 或编码错误
    pub fn parse_next(&mut self) -> ImportResult<Option<Vec<String>>> {
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }

        Ok(Some(self.record.iter().map(str::to_string).collect()))
    }

    /// 当前使用的分隔符
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }
}

/// 从首行探测分隔符
///
/// 统计引号外各候选分隔符的出现次数，取最多者；全为 0 时使用逗号
pub fn detect_delimiter(sample: &[u8]) -> u8 {
    let first_line = sample
        .split(|b| *b == b'\n')
        .next()
        .unwrap_or_default();

    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut in_quotes = false;

    for byte in first_line {
        if *byte == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(idx) = CANDIDATE_DELIMITERS.iter().position(|d| d == byte) {
            counts[idx] += 1;
        }
    }

    // 平局时保留靠前的候选（逗号优先）
    let mut best = 0;
    for idx in 1..counts.len() {
        if counts[idx] > counts[best] {
            best = idx;
        }
    }

    CANDIDATE_DELIMITERS[best]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(input: &str, delimiter: Option<u8>) -> Vec<Vec<String>> {
        let mut reader = CsvRowReader::new(input.as_bytes(), delimiter).unwrap();
        let mut rows = Vec::new();
        while let Some(row) = reader.parse_next().unwrap() {
            rows.push(row);
        }
        rows
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter(b"URI,Type,IsInstant"), b',');
        assert_eq!(detect_delimiter(b"URI;Type;IsInstant\nA;B;C"), b';');
        assert_eq!(detect_delimiter(b"URI\tType\tIsInstant"), b'\t');
        assert_eq!(detect_delimiter(b"single"), b',');
        assert_eq!(detect_delimiter(b""), b',');
    }

    #[test]
    fn test_detect_delimiter_ignores_quoted() {
        // 引号内的逗号不参与统计
        assert_eq!(detect_delimiter(b"\"a,b,c,d\";x;y"), b';');
    }

    #[test]
    fn test_parse_rows_with_semicolon() {
        let rows = read_all("URI;Type\ndesc;desc\nev:1;t:1\n", None);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], vec!["ev:1".to_string(), "t:1".to_string()]);
    }

    #[test]
    fn test_flexible_row_width() {
        let rows = read_all("a,b,c\nd\n", Some(b','));
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[1].len(), 1);
    }

    #[test]
    fn test_empty_input_yields_none() {
        let mut reader = CsvRowReader::new("".as_bytes(), None).unwrap();
        assert_eq!(reader.delimiter(), b',');
        assert!(reader.parse_next().unwrap().is_none());
    }

    #[test]
    fn test_quoted_cell_kept_verbatim() {
        let rows = read_all("a,\"hello, world\"\n", None);
        assert_eq!(rows[0][1], "hello, world");
    }
}
