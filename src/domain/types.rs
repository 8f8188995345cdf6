// ==========================================
// OpenSILEX 事件导入 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 事件类别 (Event Kind)
// ==========================================
// 决定 CSV 表头与行解析规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Event, // 通用事件（7 列）
    Move,  // 移动事件（14 列）
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Event => write!(f, "EVENT"),
            EventKind::Move => write!(f, "MOVE"),
        }
    }
}

impl EventKind {
    /// 从字符串解析（大小写不敏感）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "EVENT" => Some(EventKind::Event),
            "MOVE" => Some(EventKind::Move),
            _ => None,
        }
    }
}

// ==========================================
// 导入响应状态
// ==========================================
// 对齐原 REST 接口的 200 / 201 / 400 语义
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Ok,         // 校验通过（未落库）
    Created,    // 已落库
    BadRequest, // 存在软校验错误
}

impl ResponseStatus {
    /// 对应的 HTTP 状态码
    pub fn http_code(&self) -> u16 {
        match self {
            ResponseStatus::Ok => 200,
            ResponseStatus::Created => 201,
            ResponseStatus::BadRequest => 400,
        }
    }
}
