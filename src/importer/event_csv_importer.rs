// ==========================================
// OpenSILEX 事件导入 - 单文件导入器
// ==========================================
// 职责: 驱动 表头校验 → 跳过说明行 → 逐行校验 状态机
// 文件约定:
// - 第 0 行: 列名
// - 第 1 行: 列说明（恒跳过）
// - 第 2 行起: 数据
// 规则: 批量校验，所有行都会被访问，错误一次性返回
// ==========================================

use crate::domain::event::EventModel;
use crate::domain::validation::{CsvCell, CsvValidationModel};
use crate::importer::csv_reader::CsvRowReader;
use crate::importer::error::ImportResult;
use crate::importer::event_schema::EventSchema;
use crate::importer::header_validator::validate_header;
use crate::importer::row_validator::validate_row;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 首个数据行的行号
pub const ROWS_BEGIN_IDX: usize = 2;

/// 无数据行时的错误说明
pub const EMPTY_ROW: &str = "Empty row";

// ==========================================
// ImportPhase - 导入阶段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    AwaitingHeader,      // 等待表头
    SkippingDescription, // 跳过列说明行
    ValidatingBody,      // 逐行校验
    Done,                // 结束（表头出错时直接进入）
}

// ==========================================
// EventCsvImporter
// ==========================================
pub struct EventCsvImporter<R: Read> {
    reader: CsvRowReader<R>,
    schema: Arc<dyn EventSchema>,
    creator: String,
    phase: ImportPhase,
    validation: CsvValidationModel,
    drafts: Vec<EventModel>,
    retain_drafts: bool,
}

impl<R: Read> EventCsvImporter<R> {
    /// 创建导入器
    ///
    /// # 参数
    /// - input: CSV 输入流
    /// - schema: 事件类别
    /// - creator: 创建人 URI
    /// - delimiter: 指定分隔符（None = 自动探测）
    pub fn new(
        input: R,
        schema: Arc<dyn EventSchema>,
        creator: impl Into<String>,
        delimiter: Option<u8>,
    ) -> ImportResult<Self> {
        Ok(Self {
            reader: CsvRowReader::new(input, delimiter)?,
            schema,
            creator: creator.into(),
            phase: ImportPhase::AwaitingHeader,
            validation: CsvValidationModel::new(),
            drafts: Vec::new(),
            retain_drafts: false,
        })
    }

    /// 仅校验模式下仍保留草稿（写入 validation.objects 供提交复用）
    pub fn with_retained_drafts(mut self) -> Self {
        self.retain_drafts = true;
        self
    }

    /// 读取并校验整个文件
    ///
    /// # 参数
    /// - validate_only: true = 仅校验（不保留草稿）；false = 完整导入
    ///
    /// # 返回
    /// - Ok(&CsvValidationModel): 软错误汇总
    /// - Err: 硬错误（I/O、CSV 解析、URI 格式）
    pub fn read_file(&mut self, validate_only: bool) -> ImportResult<&CsvValidationModel> {
        // 硬错误不留下部分结果
        if let Err(err) = self.advance(validate_only) {
            self.drafts.clear();
            self.phase = ImportPhase::Done;
            warn!(kind = %self.schema.kind(), error = %err, "CSV 读取中断");
            return Err(err);
        }

        info!(
            kind = %self.schema.kind(),
            validate_only = validate_only,
            drafts = self.drafts.len(),
            errors = self.validation.error_count(),
            "CSV 文件读取完成"
        );

        Ok(&self.validation)
    }

    /// 推进状态机直到 Done
    fn advance(&mut self, validate_only: bool) -> ImportResult<()> {
        while self.phase != ImportPhase::Done {
            self.phase = match self.phase {
                ImportPhase::AwaitingHeader => {
                    let header = self.reader.parse_next()?;
                    if validate_header(header.as_deref(), self.schema.header(), &mut self.validation) {
                        ImportPhase::SkippingDescription
                    } else {
                        debug!(kind = %self.schema.kind(), "表头校验失败，停止读取");
                        ImportPhase::Done
                    }
                }
                ImportPhase::SkippingDescription => {
                    self.reader.parse_next()?;
                    ImportPhase::ValidatingBody
                }
                ImportPhase::ValidatingBody => {
                    self.read_body(validate_only)?;
                    ImportPhase::Done
                }
                ImportPhase::Done => ImportPhase::Done,
            };
        }
        Ok(())
    }

    /// 逐行校验数据区
    fn read_body(&mut self, validate_only: bool) -> ImportResult<()> {
        let mut row_index = ROWS_BEGIN_IDX;

        while let Some(row) = self.reader.parse_next()? {
            let model = validate_row(
                self.schema.as_ref(),
                &row,
                row_index,
                &self.creator,
                &mut self.validation,
            )?;

            if !validate_only {
                self.drafts.push(model);
            } else if self.retain_drafts {
                self.validation.add_object(model);
            }

            row_index += 1;
        }

        if row_index == ROWS_BEGIN_IDX {
            self.validation
                .add_missing_required_value(CsvCell::new(ROWS_BEGIN_IDX, 0, None, EMPTY_ROW));
        }

        Ok(())
    }

    /// 校验通过的草稿（存在任何错误时为空）
    pub fn models(&self) -> &[EventModel] {
        if self.validation.has_errors() {
            return &[];
        }
        &self.drafts
    }

    /// 所有草稿（含出错行，仅完整导入模式下填充）
    pub fn drafts(&self) -> &[EventModel] {
        &self.drafts
    }

    pub fn validation(&self) -> &CsvValidationModel {
        &self.validation
    }

    pub fn phase(&self) -> ImportPhase {
        self.phase
    }

    /// 拆分为 (校验结果, 校验通过的草稿)
    pub fn into_parts(self) -> (CsvValidationModel, Vec<EventModel>) {
        let models = if self.validation.has_errors() {
            Vec::new()
        } else {
            self.drafts
        };
        (self.validation, models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::event_schema::{BasicEventSchema, MoveEventSchema};
    use crate::importer::error::ImportError;
    use chrono::DateTime;

    const CREATOR: &str = "http://www.opensilex.org/users/admin";
    const HEADER: &str = "URI,Type,IsInstant,Start,End,Target,Description";
    const DESCRIPTIONS: &str = "event uri,event type,instant?,start date,end date,target uri,free text";

    fn csv(rows: &[&str]) -> String {
        let mut content = format!("{}\n{}\n", HEADER, DESCRIPTIONS);
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        content
    }

    fn importer(content: &str) -> EventCsvImporter<&[u8]> {
        EventCsvImporter::new(content.as_bytes(), Arc::new(BasicEventSchema), CREATOR, None).unwrap()
    }

    #[test]
    fn test_exact_header_no_header_errors() {
        let content = csv(&[",,true,,2021-09-08T12:00:00+01:00,http://test/so/1,"]);
        let mut importer = importer(&content);

        let validation = importer.read_file(true).unwrap();
        assert!(validation.missing_headers().is_empty());
        assert!(validation.invalid_header_uris().is_empty());
        assert!(!validation.has_errors());
        assert_eq!(importer.phase(), ImportPhase::Done);
    }

    #[test]
    fn test_short_header_stops_before_rows() {
        // 数据行本身有错，但表头出错时不应读取
        let content = "URI,Type,IsInstant\ndesc,desc,desc\n,,,,,,\n";
        let mut importer = importer(content);

        let validation = importer.read_file(false).unwrap();
        assert_eq!(
            validation.missing_headers(),
            &[
                "Start".to_string(),
                "End".to_string(),
                "Target".to_string(),
                "Description".to_string()
            ]
        );
        assert!(validation.missing_required_value_errors().is_empty());
        assert!(importer.drafts().is_empty());
    }

    #[test]
    fn test_instant_row_start_equals_end() {
        let content = csv(&[",,true,,2021-09-08T12:00:00+01:00,http://test/so/1,"]);
        let mut importer = importer(&content);

        assert!(!importer.read_file(false).unwrap().has_errors());
        let models = importer.models();
        assert_eq!(models.len(), 1);

        let expected = DateTime::parse_from_rfc3339("2021-09-08T12:00:00+01:00").unwrap();
        assert_eq!(models[0].start, Some(expected));
        assert_eq!(models[0].end, Some(expected));
        assert_eq!(models[0].row_index, ROWS_BEGIN_IDX);
    }

    #[test]
    fn test_ranged_row_without_dates_single_start_error() {
        let content = csv(&[",,false,,,http://test/so/1,"]);
        let mut importer = importer(&content);

        let validation = importer.read_file(true).unwrap();
        assert_eq!(validation.error_count(), 1);
        let cell = &validation.missing_required_value_errors()[&2][0];
        assert_eq!(cell.col_index(), 3);
    }

    #[test]
    fn test_missing_is_instant_still_builds_draft() {
        let content = csv(&["http://test/event/1,,,,2021-09-08T12:00:00+01:00,http://test/so/1,note"]);
        let mut importer = importer(&content);

        let validation = importer.read_file(false).unwrap();
        assert_eq!(validation.error_count(), 1);
        let cell = &validation.missing_required_value_errors()[&2][0];
        assert_eq!((cell.row_index(), cell.col_index()), (2, 2));

        // 出错时 models() 为空，但草稿已完整构建
        assert!(importer.models().is_empty());
        let draft = &importer.drafts()[0];
        assert_eq!(draft.uri.as_deref(), Some("http://test/event/1"));
        assert!(draft.end.is_some());
        assert_eq!(draft.targets, vec!["http://test/so/1".to_string()]);
        assert_eq!(draft.description, "note");
        assert_eq!(draft.creator.as_deref(), Some(CREATOR));
    }

    #[test]
    fn test_every_row_validated() {
        let content = csv(&[
            ",,true,,,http://test/so/1,",
            ",,true,,2021-09-08T12:00:00+01:00,http://test/so/2,",
            ",,true,,,,",
        ]);
        let mut importer = importer(&content);

        let validation = importer.read_file(false).unwrap();
        let errors = validation.missing_required_value_errors();
        assert_eq!(errors.keys().copied().collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(errors[&4].len(), 2);
        assert_eq!(importer.drafts().len(), 3);
    }

    #[test]
    fn test_header_only_file_reports_empty_row() {
        let content = csv(&[]);
        let mut importer = importer(&content);

        let validation = importer.read_file(true).unwrap();
        let cell = &validation.missing_required_value_errors()[&2][0];
        assert_eq!(cell.col_index(), 0);
        assert_eq!(cell.header(), EMPTY_ROW);
        assert!(cell.value().is_none());
    }

    #[test]
    fn test_empty_file_reports_all_missing_headers() {
        let mut importer = importer("");

        let validation = importer.read_file(true).unwrap();
        assert_eq!(validation.missing_headers().len(), 7);
        assert!(validation.missing_required_value_errors().is_empty());
    }

    #[test]
    fn test_validate_only_discards_drafts() {
        let content = csv(&[",,true,,2021-09-08T12:00:00+01:00,http://test/so/1,"]);
        let mut importer = importer(&content);

        importer.read_file(true).unwrap();
        assert!(importer.drafts().is_empty());
        assert!(importer.validation().objects().is_empty());
    }

    #[test]
    fn test_retained_drafts_go_to_objects() {
        let content = csv(&[
            ",,true,,2021-09-08T12:00:00+01:00,http://test/so/1,",
            ",,false,2021-09-01T00:00:00Z,,http://test/so/2,",
        ]);
        let mut importer = importer(&content).with_retained_drafts();

        let validation = importer.read_file(true).unwrap();
        assert_eq!(validation.objects().len(), 2);
        assert!(importer.drafts().is_empty());
    }

    #[test]
    fn test_malformed_uri_aborts_file() {
        let content = csv(&[
            ",,true,,2021-09-08T12:00:00+01:00,not a uri,",
            ",,true,,2021-09-08T12:00:00+01:00,http://test/so/2,",
        ]);
        let mut importer = importer(&content);

        let result = importer.read_file(false);
        assert!(matches!(result, Err(ImportError::InvalidUri { row: 2, .. })));
    }

    #[test]
    fn test_semicolon_move_file() {
        let content = "URI;Type;IsInstant;Start;End;Target;Description;From;To;Coordinates;X;Y;Z;TextualPosition\n\
                       ;;;;;;;;;;;;;\n\
                       ;;true;;2021-09-08T12:00:00+01:00;http://test/so/1;;;http://test/facility/b;;;;;\n";
        let mut importer =
            EventCsvImporter::new(content.as_bytes(), Arc::new(MoveEventSchema), CREATOR, None).unwrap();

        assert!(!importer.read_file(false).unwrap().has_errors());
        let (validation, models) = importer.into_parts();
        assert!(!validation.has_errors());
        assert_eq!(models.len(), 1);
        let movement = models[0].movement.as_ref().unwrap();
        assert_eq!(movement.to.as_deref(), Some("http://test/facility/b"));
    }

    #[test]
    fn test_invalid_utf8_row_is_hard_error() {
        let mut content = csv(&[",,true,,2021-09-08T12:00:00+01:00,http://test/so/1,"]).into_bytes();
        content.extend_from_slice(b",,true,,2021-09-08T12:00:00+01:00,http://test/so/2,\xff\xfe\n");

        let mut importer =
            EventCsvImporter::new(content.as_slice(), Arc::new(BasicEventSchema), CREATOR, None).unwrap();
        let result = importer.read_file(false);

        assert!(matches!(result, Err(ImportError::CsvParseError(_))));
        assert!(importer.drafts().is_empty());
        assert_eq!(importer.phase(), ImportPhase::Done);
    }
}
