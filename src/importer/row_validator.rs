// ==========================================
// OpenSILEX 事件导入 - 行校验器
// ==========================================
// 职责: 将一行单元格解码为事件草稿，逐单元格记录错误
// 规则:
// - 严格从左到右访问每一列，任何列出错都不跳过后续列
// - 软错误（缺失必填 / 值非法）记录到 CsvValidationModel
// - URI 格式错误为硬错误，中断整个文件
// ==========================================

use crate::domain::event::EventModel;
use crate::domain::validation::{CsvCell, CsvValidationModel};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::event_schema::EventSchema;
use chrono::{DateTime, FixedOffset};
use oxiri::IriRef;

// 通用列名（与表头一致，用于错误定位）
pub const URI_COLUMN: &str = "URI";
pub const TYPE_COLUMN: &str = "Type";
pub const IS_INSTANT_COLUMN: &str = "IsInstant";
pub const START_COLUMN: &str = "Start";
pub const END_COLUMN: &str = "End";
pub const TARGET_COLUMN: &str = "Target";
pub const DESCRIPTION_COLUMN: &str = "Description";

/// 短行中缺失列的占位值
const NO_VALUE_FOR_COLUMN: &str = "No value for column";

// ==========================================
// ColumnCursor - 行内列游标
// ==========================================
// 每行新建一个，只在本行内前进
pub struct ColumnCursor<'a> {
    row: &'a [String],
    row_index: usize,
    next_index: usize,
}

/// 游标返回的单元格
#[derive(Debug, Clone, Copy)]
pub struct ColumnCell<'a> {
    pub index: usize,
    pub raw: &'a str,
}

impl<'a> ColumnCell<'a> {
    /// 去除首尾空白后的值
    pub fn value(&self) -> &'a str {
        self.raw.trim()
    }

    pub fn is_empty(&self) -> bool {
        self.value().is_empty()
    }

    /// 生成错误定位
    pub fn to_csv_cell(&self, row_index: usize, header: &str) -> CsvCell {
        CsvCell::new(row_index, self.index, Some(self.raw.to_string()), header)
    }
}

impl<'a> ColumnCursor<'a> {
    pub fn new(row: &'a [String], row_index: usize) -> Self {
        Self {
            row,
            row_index,
            next_index: 0,
        }
    }

    /// 取下一列（超出行宽时返回空值）
    pub fn next_cell(&mut self) -> ColumnCell<'a> {
        let index = self.next_index;
        self.next_index += 1;
        ColumnCell {
            index,
            raw: self.row.get(index).map(String::as_str).unwrap_or(""),
        }
    }

    pub fn row_index(&self) -> usize {
        self.row_index
    }
}

// ==========================================
// 行校验入口
// ==========================================

/// 校验并解码一行
///
/// # 参数
/// - schema: 事件类别（决定表头与扩展列）
/// - row: 单元格数组
/// - row_index: 行号（0 基，前两行为表头）
/// - creator: 创建人 URI（附加到每个草稿）
/// - validation: 校验结果
///
/// # 返回
/// - Ok(EventModel): 草稿（即使本行有软错误也会返回）
/// - Err(ImportError::InvalidUri): URI 格式错误
pub fn validate_row(
    schema: &dyn EventSchema,
    row: &[String],
    row_index: usize,
    creator: &str,
    validation: &mut CsvValidationModel,
) -> ImportResult<EventModel> {
    let mut model = EventModel::new(row_index);

    // 短行: 每个缺失列记一次非法值，不再解码
    if !check_row_width(row, row_index, schema.header(), validation) {
        return Ok(model);
    }

    let mut cursor = ColumnCursor::new(row, row_index);
    read_common_columns(&mut cursor, &mut model, creator, validation)?;
    schema.read_extra_columns(&mut cursor, &mut model, validation)?;

    Ok(model)
}

/// 校验行宽，缺失列记为非法值
fn check_row_width(
    row: &[String],
    row_index: usize,
    header: &[&str],
    validation: &mut CsvValidationModel,
) -> bool {
    if row.len() >= header.len() {
        return true;
    }

    for (col_index, column) in header.iter().enumerate().skip(row.len()) {
        validation.add_invalid_value_error(CsvCell::new(
            row_index,
            col_index,
            Some(NO_VALUE_FOR_COLUMN.to_string()),
            *column,
        ));
    }

    false
}

/// 读取 7 个通用列: URI, Type, IsInstant, Start, End, Target, Description
pub fn read_common_columns(
    cursor: &mut ColumnCursor<'_>,
    model: &mut EventModel,
    creator: &str,
    validation: &mut CsvValidationModel,
) -> ImportResult<()> {
    let row_index = cursor.row_index();

    let uri = cursor.next_cell();
    model.uri = parse_optional_uri(row_index, uri, URI_COLUMN)?;

    let rdf_type = cursor.next_cell();
    model.rdf_type = parse_optional_uri(row_index, rdf_type, TYPE_COLUMN)?;

    // 必填，但解析宽松: 非 "true" 一律为 false
    let is_instant = cursor.next_cell();
    if is_instant.is_empty() {
        validation.add_missing_required_value(is_instant.to_csv_cell(row_index, IS_INSTANT_COLUMN));
    } else {
        model.is_instant = Some(parse_lenient_bool(is_instant.value()));
    }

    let start = cursor.next_cell();
    if !start.is_empty() {
        match parse_date_time(start.value()) {
            Some(date) => model.start = Some(date),
            None => validation.add_invalid_value_error(start.to_csv_cell(row_index, START_COLUMN)),
        }
    }

    let end = cursor.next_cell();
    if end.is_empty() {
        if model.is_instant_or_unknown() {
            validation.add_missing_required_value(end.to_csv_cell(row_index, END_COLUMN));
        } else if start.is_empty() {
            // 区间事件起止皆空: 错误归属到更靠前的 Start 列
            validation.add_missing_required_value(start.to_csv_cell(row_index, START_COLUMN));
        }
    } else {
        match parse_date_time(end.value()) {
            Some(date) => {
                model.end = Some(date);
                // 瞬时事件以 start == end 表示
                if model.is_instant == Some(true) {
                    model.start = Some(date);
                }
            }
            None => validation.add_invalid_value_error(end.to_csv_cell(row_index, END_COLUMN)),
        }
    }

    let target = cursor.next_cell();
    if target.is_empty() {
        validation.add_missing_required_value(target.to_csv_cell(row_index, TARGET_COLUMN));
    } else {
        model.targets = vec![parse_uri(row_index, target, TARGET_COLUMN)?];
    }

    let description = cursor.next_cell();
    model.description = description.raw.to_string();
    model.creator = Some(creator.to_string());

    Ok(())
}

// ==========================================
// 单元格解析工具
// ==========================================

/// 解析 URI 单元格（必须非空）
pub fn parse_uri(row_index: usize, cell: ColumnCell<'_>, header: &str) -> ImportResult<String> {
    IriRef::parse(cell.value())
        .map(|iri| iri.as_str().to_string())
        .map_err(|e| ImportError::InvalidUri {
            row: row_index,
            column: cell.index,
            header: header.to_string(),
            value: cell.raw.to_string(),
            message: e.to_string(),
        })
}

/// 解析可选 URI 单元格（空值返回 None）
pub fn parse_optional_uri(
    row_index: usize,
    cell: ColumnCell<'_>,
    header: &str,
) -> ImportResult<Option<String>> {
    if cell.is_empty() {
        return Ok(None);
    }
    parse_uri(row_index, cell, header).map(Some)
}

/// 宽松布尔解析: 仅 "true"（大小写不敏感）为真
pub fn parse_lenient_bool(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// 解析带时区偏移的日期时间
///
/// 接受 RFC 3339（如 2021-09-08T12:00:00+01:00），以及省略秒的写法
/// （如 2021-09-08T12:00+01:00 / 2021-09-08T12:00Z）
pub fn parse_date_time(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date);
    }

    let normalized = match value.strip_suffix('Z') {
        Some(stripped) => format!("{}+00:00", stripped),
        None => value.to_string(),
    };
    DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M%:z").ok()
}

/// 解析 WKT POINT（如 "POINT(3.87 43.61)"）
pub fn parse_wkt_point(value: &str) -> Option<(f64, f64)> {
    let upper = value.trim().to_ascii_uppercase();
    let inner = upper
        .strip_prefix("POINT")?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')?;

    let mut parts = inner.split_whitespace();
    let x = parts.next()?.parse::<f64>().ok()?;
    let y = parts.next()?.parse::<f64>().ok()?;
    if parts.next().is_some() {
        return None;
    }

    Some((x, y))
}
