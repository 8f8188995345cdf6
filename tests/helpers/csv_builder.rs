// ==========================================
// 测试 CSV 构建器 - 用于集成测试
// ==========================================

use silex_event_import::importer::{EVENT_HEADER, MOVE_HEADER};

pub const TEST_CREATOR: &str = "http://www.opensilex.org/users/test";
pub const INSTANT_AT: &str = "2021-09-08T12:00:00+01:00";

// ==========================================
// EventRowBuilder - 单行构建
// ==========================================

#[derive(Debug, Clone, Default)]
pub struct EventRowBuilder {
    uri: String,
    rdf_type: String,
    is_instant: String,
    start: String,
    end: String,
    target: String,
    description: String,
    from: String,
    to: String,
    coordinates: String,
    x: String,
    y: String,
    z: String,
    textual_position: String,
}

impl EventRowBuilder {
    /// 瞬时事件（仅填写 End）
    pub fn instant(target: &str) -> Self {
        Self {
            is_instant: "true".to_string(),
            end: INSTANT_AT.to_string(),
            target: target.to_string(),
            ..Self::default()
        }
    }

    /// 区间事件
    pub fn ranged(target: &str, start: &str, end: &str) -> Self {
        Self {
            is_instant: "false".to_string(),
            start: start.to_string(),
            end: end.to_string(),
            target: target.to_string(),
            ..Self::default()
        }
    }

    pub fn uri(mut self, uri: &str) -> Self {
        self.uri = uri.to_string();
        self
    }

    pub fn rdf_type(mut self, rdf_type: &str) -> Self {
        self.rdf_type = rdf_type.to_string();
        self
    }

    pub fn is_instant(mut self, value: &str) -> Self {
        self.is_instant = value.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn to(mut self, to: &str) -> Self {
        self.to = to.to_string();
        self
    }

    pub fn from(mut self, from: &str) -> Self {
        self.from = from.to_string();
        self
    }

    pub fn coordinates(mut self, wkt: &str) -> Self {
        self.coordinates = wkt.to_string();
        self
    }

    pub fn xyz(mut self, x: &str, y: &str, z: &str) -> Self {
        self.x = x.to_string();
        self.y = y.to_string();
        self.z = z.to_string();
        self
    }

    pub fn textual_position(mut self, text: &str) -> Self {
        self.textual_position = text.to_string();
        self
    }

    fn cells(&self, with_move: bool) -> Vec<&str> {
        let mut cells = vec![
            self.uri.as_str(),
            self.rdf_type.as_str(),
            self.is_instant.as_str(),
            self.start.as_str(),
            self.end.as_str(),
            self.target.as_str(),
            self.description.as_str(),
        ];
        if with_move {
            cells.extend([
                self.from.as_str(),
                self.to.as_str(),
                self.coordinates.as_str(),
                self.x.as_str(),
                self.y.as_str(),
                self.z.as_str(),
                self.textual_position.as_str(),
            ]);
        }
        cells
    }
}

// ==========================================
// EventCsvBuilder - 文件构建
// ==========================================

pub struct EventCsvBuilder {
    header: Vec<String>,
    with_move: bool,
    delimiter: char,
    rows: Vec<String>,
}

impl EventCsvBuilder {
    /// 通用事件文件
    pub fn events() -> Self {
        Self {
            header: EVENT_HEADER.iter().map(|h| h.to_string()).collect(),
            with_move: false,
            delimiter: ',',
            rows: Vec::new(),
        }
    }

    /// 移动事件文件
    pub fn moves() -> Self {
        Self {
            header: MOVE_HEADER.iter().map(|h| h.to_string()).collect(),
            with_move: true,
            delimiter: ',',
            rows: Vec::new(),
        }
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// 覆盖表头（用于表头错误场景）
    pub fn header(mut self, header: &[&str]) -> Self {
        self.header = header.iter().map(|h| h.to_string()).collect();
        self
    }

    pub fn row(mut self, row: EventRowBuilder) -> Self {
        let line = row.cells(self.with_move).join(&self.delimiter.to_string());
        self.rows.push(line);
        self
    }

    /// 原样追加一行
    pub fn raw_row(mut self, line: &str) -> Self {
        self.rows.push(line.to_string());
        self
    }

    pub fn build(&self) -> String {
        let separator = self.delimiter.to_string();
        let descriptions = vec!["description"; self.header.len()].join(&separator);

        let mut content = self.header.join(&separator);
        content.push('\n');
        content.push_str(&descriptions);
        content.push('\n');
        for row in &self.rows {
            content.push_str(row);
            content.push('\n');
        }
        content
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.build().into_bytes()
    }
}
