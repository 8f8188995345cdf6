// ==========================================
// OpenSILEX 事件导入 - 事件类别模式
// ==========================================
// 职责: 定义每种事件类别的期望表头与扩展列解码
// 类别:
// - BasicEventSchema: 7 个通用列
// - MoveEventSchema: 通用列 + 7 个移动列
// ==========================================

use crate::domain::event::{MoveModel, PositionModel};
use crate::domain::types::EventKind;
use crate::domain::validation::{CsvCell, CsvValidationModel};
use crate::domain::EventModel;
use crate::importer::error::ImportResult;
use crate::importer::row_validator::{parse_optional_uri, parse_wkt_point, ColumnCursor};
use std::sync::Arc;

/// 通用事件表头
pub const EVENT_HEADER: [&str; 7] = [
    "URI",
    "Type",
    "IsInstant",
    "Start",
    "End",
    "Target",
    "Description",
];

/// 移动事件表头
pub const MOVE_HEADER: [&str; 14] = [
    "URI",
    "Type",
    "IsInstant",
    "Start",
    "End",
    "Target",
    "Description",
    "From",
    "To",
    "Coordinates",
    "X",
    "Y",
    "Z",
    "TextualPosition",
];

/// 移动列全空时的错误说明
pub const MOVE_FIELDS_REQUIRED: &str = "from, to, x, y, z or positionDescription";

// ==========================================
// EventSchema Trait
// ==========================================
pub trait EventSchema: Send + Sync {
    /// 事件类别
    fn kind(&self) -> EventKind;

    /// 期望的有序表头
    fn header(&self) -> &'static [&'static str];

    /// 读取通用列之后的扩展列（默认无扩展列）
    fn read_extra_columns(
        &self,
        _cursor: &mut ColumnCursor<'_>,
        _model: &mut EventModel,
        _validation: &mut CsvValidationModel,
    ) -> ImportResult<()> {
        Ok(())
    }
}

/// 按类别取模式
pub fn schema_for(kind: EventKind) -> Arc<dyn EventSchema> {
    match kind {
        EventKind::Event => Arc::new(BasicEventSchema),
        EventKind::Move => Arc::new(MoveEventSchema),
    }
}

// ==========================================
// BasicEventSchema
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicEventSchema;

impl EventSchema for BasicEventSchema {
    fn kind(&self) -> EventKind {
        EventKind::Event
    }

    fn header(&self) -> &'static [&'static str] {
        &EVENT_HEADER
    }
}

// ==========================================
// MoveEventSchema
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveEventSchema;

impl EventSchema for MoveEventSchema {
    fn kind(&self) -> EventKind {
        EventKind::Move
    }

    fn header(&self) -> &'static [&'static str] {
        &MOVE_HEADER
    }

    fn read_extra_columns(
        &self,
        cursor: &mut ColumnCursor<'_>,
        model: &mut EventModel,
        validation: &mut CsvValidationModel,
    ) -> ImportResult<()> {
        let row_index = cursor.row_index();
        let mut movement = MoveModel::default();
        let mut position = PositionModel::default();

        let from = cursor.next_cell();
        movement.from = parse_optional_uri(row_index, from, "From")?;

        let to = cursor.next_cell();
        movement.to = parse_optional_uri(row_index, to, "To")?;

        let coordinates = cursor.next_cell();
        if !coordinates.is_empty() {
            match parse_wkt_point(coordinates.value()) {
                Some(point) => position.point = Some(point),
                None => validation.add_invalid_value_error(coordinates.to_csv_cell(row_index, "Coordinates")),
            }
        }

        let mut axes = [None; 3];
        let mut any_axis = false;
        for (axis, header) in axes.iter_mut().zip(["X", "Y", "Z"]) {
            let cell = cursor.next_cell();
            if cell.is_empty() {
                continue;
            }
            any_axis = true;
            match cell.value().parse::<i32>() {
                Ok(v) => *axis = Some(v),
                Err(_) => validation.add_invalid_value_error(cell.to_csv_cell(row_index, header)),
            }
        }
        [position.x, position.y, position.z] = axes;

        let textual_position = cursor.next_cell();
        if !textual_position.is_empty() {
            position.description = Some(textual_position.raw.to_string());
        }

        // 任一移动列有值即视为已提供（非法值已单独记录）
        let any_value = movement.from.is_some()
            || movement.to.is_some()
            || !coordinates.is_empty()
            || any_axis
            || !textual_position.is_empty();

        if !any_value {
            validation.add_missing_required_value(CsvCell::new(
                row_index,
                from.index,
                None,
                MOVE_FIELDS_REQUIRED,
            ));
        }

        if !position.is_empty() {
            movement.position = Some(position);
        }
        model.movement = Some(movement);

        Ok(())
    }
}
