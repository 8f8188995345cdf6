// ==========================================
// OpenSILEX 事件导入 - 表头校验器
// ==========================================
// 职责: 按位置比对文件表头与期望表头
// 规则:
// - 同位置列名不一致 → invalid header（记录列号）
// - 期望列超出文件宽度 → missing header（每列一次）
// - 文件无任何行 → 全部期望列记为 missing header
// - 文件多出的列忽略
// ==========================================

use crate::domain::validation::CsvValidationModel;

/// UTF-8 BOM
const BOM: char = '\u{feff}';

/// 校验表头行
///
/// # 参数
/// - header_row: 文件第一行（None 表示空文件）
/// - expected: 期望的有序列名
/// - validation: 校验结果（错误追加到此）
///
/// # 返回
/// - true: 表头无错误
/// - false: 存在表头错误（调用方应停止处理）
pub fn validate_header(
    header_row: Option<&[String]>,
    expected: &[&str],
    validation: &mut CsvValidationModel,
) -> bool {
    let header_row = match header_row {
        Some(row) if !row.is_empty() => row,
        _ => {
            validation.add_missing_headers(expected.iter().copied());
            return false;
        }
    };

    let mut valid = true;
    let mut missing = Vec::new();

    for (idx, expected_column) in expected.iter().enumerate() {
        match header_row.get(idx) {
            Some(found) => {
                if !header_matches(expected_column, found) {
                    validation.add_invalid_header_uri(idx, found.clone());
                    valid = false;
                }
            }
            None => missing.push(*expected_column),
        }
    }

    if !missing.is_empty() {
        validation.add_missing_headers(missing);
        valid = false;
    }

    valid
}

/// 列名比对（大小写不敏感，忽略首尾空白与 BOM）
fn header_matches(expected: &str, found: &str) -> bool {
    let normalized = found.trim_start_matches(BOM).trim();
    expected.eq_ignore_ascii_case(normalized)
}
