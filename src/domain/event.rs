// ==========================================
// OpenSILEX 事件导入 - 事件领域模型
// ==========================================
// 职责: 事件草稿（CSV 行 → 内存实体）
// 生命周期: 由导入器逐列构建，校验通过后落库
// ==========================================

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

// ==========================================
// EventModel - 事件实体（草稿）
// ==========================================
// 说明: 行内任一列出错时草稿仍会继续构建，其余字段照常赋值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventModel {
    pub uri: Option<String>,                   // 事件 URI（为空时落库前生成）
    pub rdf_type: Option<String>,              // 事件类型 URI
    pub is_instant: Option<bool>,              // 是否瞬时事件（None = 单元格为空）
    pub start: Option<DateTime<FixedOffset>>,  // 开始时间
    pub end: Option<DateTime<FixedOffset>>,    // 结束时间
    pub targets: Vec<String>,                  // 关联对象 URI（CSV 中恒为单元素）
    pub description: String,                   // 描述（原样保留，可为空）
    pub creator: Option<String>,               // 创建人 URI

    // ===== 移动事件扩展 =====
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movement: Option<MoveModel>,

    // 源文件行号（仅导入流程内使用）
    #[serde(skip)]
    pub row_index: usize,
}

impl EventModel {
    /// 创建空草稿
    ///
    /// # 参数
    /// - row_index: 源文件行号（0 基，含两行表头）
    pub fn new(row_index: usize) -> Self {
        Self {
            uri: None,
            rdf_type: None,
            is_instant: None,
            start: None,
            end: None,
            targets: Vec::new(),
            description: String::new(),
            creator: None,
            movement: None,
            row_index,
        }
    }

    /// 是否为瞬时事件（未填写时按瞬时处理）
    pub fn is_instant_or_unknown(&self) -> bool {
        self.is_instant.unwrap_or(true)
    }
}

// ==========================================
// MoveModel - 移动事件扩展字段
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveModel {
    pub from: Option<String>,           // 起始设施 URI
    pub to: Option<String>,             // 目标设施 URI
    pub position: Option<PositionModel>, // 目标对象的位置
}

// ==========================================
// PositionModel - 对象位置
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionModel {
    pub point: Option<(f64, f64)>, // WKT POINT 坐标 (x, y)
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub z: Option<i32>,
    pub description: Option<String>, // 文本位置描述
}

impl PositionModel {
    /// 是否所有字段皆为空
    pub fn is_empty(&self) -> bool {
        self.point.is_none()
            && self.x.is_none()
            && self.y.is_none()
            && self.z.is_none()
            && self.description.is_none()
    }
}
