// ==========================================
// OpenSILEX 事件导入 - CSV 校验结果模型
// ==========================================
// 职责: 汇总单个文件的全部单元格级错误
// 红线: 错误只追加不截断，一次返回全部错误
// ==========================================

use crate::domain::event::EventModel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// CsvCell - 出错单元格定位
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvCell {
    row_index: usize,
    col_index: usize,
    value: Option<String>,
    header: String,
}

impl CsvCell {
    pub fn new(
        row_index: usize,
        col_index: usize,
        value: Option<String>,
        header: impl Into<String>,
    ) -> Self {
        Self {
            row_index,
            col_index,
            value,
            header: header.into(),
        }
    }

    pub fn row_index(&self) -> usize {
        self.row_index
    }

    pub fn col_index(&self) -> usize {
        self.col_index
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn header(&self) -> &str {
        &self.header
    }
}

// ==========================================
// DuplicateUriError - 文件内重复 URI
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateUriError {
    pub cell: CsvCell,
    pub previous_row: usize, // 首次出现的行号
}

// ==========================================
// CsvValidationModel - 校验结果汇总
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CsvValidationModel {
    // 仅用于校验 → 提交两步流程，不对外序列化
    #[serde(skip)]
    objects: Vec<EventModel>,

    missing_headers: Vec<String>,
    invalid_header_uris: BTreeMap<usize, String>,
    missing_required_value_errors: BTreeMap<usize, Vec<CsvCell>>,
    invalid_value_errors: BTreeMap<usize, Vec<CsvCell>>,
    duplicate_uri_errors: BTreeMap<usize, Vec<DuplicateUriError>>,
    already_existing_uri_errors: BTreeMap<usize, Vec<CsvCell>>,

    nb_object_imported: usize,
    validation_token: Option<String>,
}

impl CsvValidationModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否存在任一类错误
    pub fn has_errors(&self) -> bool {
        !self.missing_headers.is_empty()
            || !self.invalid_header_uris.is_empty()
            || !self.missing_required_value_errors.is_empty()
            || !self.invalid_value_errors.is_empty()
            || !self.duplicate_uri_errors.is_empty()
            || !self.already_existing_uri_errors.is_empty()
    }

    /// 错误总数（按单元格计）
    pub fn error_count(&self) -> usize {
        let count_cells = |m: &BTreeMap<usize, Vec<CsvCell>>| m.values().map(Vec::len).sum::<usize>();

        self.missing_headers.len()
            + self.invalid_header_uris.len()
            + count_cells(&self.missing_required_value_errors)
            + count_cells(&self.invalid_value_errors)
            + self.duplicate_uri_errors.values().map(Vec::len).sum::<usize>()
            + count_cells(&self.already_existing_uri_errors)
    }

    // ===== 错误登记 =====

    pub fn add_missing_headers<I, S>(&mut self, headers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing_headers.extend(headers.into_iter().map(Into::into));
    }

    pub fn add_invalid_header_uri(&mut self, col_index: usize, found: impl Into<String>) {
        self.invalid_header_uris.insert(col_index, found.into());
    }

    pub fn add_missing_required_value(&mut self, cell: CsvCell) {
        self.missing_required_value_errors
            .entry(cell.row_index())
            .or_default()
            .push(cell);
    }

    pub fn add_invalid_value_error(&mut self, cell: CsvCell) {
        self.invalid_value_errors
            .entry(cell.row_index())
            .or_default()
            .push(cell);
    }

    pub fn add_duplicate_uri_error(&mut self, cell: CsvCell, previous_row: usize) {
        self.duplicate_uri_errors
            .entry(cell.row_index())
            .or_default()
            .push(DuplicateUriError { cell, previous_row });
    }

    pub fn add_already_existing_uri_error(&mut self, cell: CsvCell) {
        self.already_existing_uri_errors
            .entry(cell.row_index())
            .or_default()
            .push(cell);
    }

    // ===== 错误查询 =====

    pub fn missing_headers(&self) -> &[String] {
        &self.missing_headers
    }

    pub fn invalid_header_uris(&self) -> &BTreeMap<usize, String> {
        &self.invalid_header_uris
    }

    pub fn missing_required_value_errors(&self) -> &BTreeMap<usize, Vec<CsvCell>> {
        &self.missing_required_value_errors
    }

    pub fn invalid_value_errors(&self) -> &BTreeMap<usize, Vec<CsvCell>> {
        &self.invalid_value_errors
    }

    pub fn duplicate_uri_errors(&self) -> &BTreeMap<usize, Vec<DuplicateUriError>> {
        &self.duplicate_uri_errors
    }

    pub fn already_existing_uri_errors(&self) -> &BTreeMap<usize, Vec<CsvCell>> {
        &self.already_existing_uri_errors
    }

    // ===== 已解析实体 =====

    /// 校验通过的实体（存在错误时恒为空）
    pub fn objects(&self) -> &[EventModel] {
        if self.has_errors() {
            return &[];
        }
        &self.objects
    }

    pub fn add_object(&mut self, object: EventModel) {
        self.objects.push(object);
    }

    /// 取走已解析实体（存在错误时返回空列表）
    pub fn take_objects(&mut self) -> Vec<EventModel> {
        if self.has_errors() {
            return Vec::new();
        }
        std::mem::take(&mut self.objects)
    }

    // ===== 提交统计与令牌 =====

    pub fn nb_object_imported(&self) -> usize {
        self.nb_object_imported
    }

    pub fn set_nb_object_imported(&mut self, count: usize) {
        self.nb_object_imported = count;
    }

    pub fn validation_token(&self) -> Option<&str> {
        self.validation_token.as_deref()
    }

    pub fn set_validation_token(&mut self, token: impl Into<String>) -> &mut Self {
        self.validation_token = Some(token.into());
        self
    }
}
