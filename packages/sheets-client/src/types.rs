use serde::{Deserialize, Serialize};

/// A block of cell values addressed by an A1 range.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValueRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(rename = "majorDimension", skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    /// Rows of cells. Absent in responses for empty ranges.
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

impl ValueRange {
    /// Row-major values for a write.
    pub fn rows(values: Vec<Vec<String>>) -> Self {
        Self {
            range: None,
            major_dimension: Some("ROWS".to_string()),
            values,
        }
    }
}

/// Spreadsheet metadata restricted to worksheet properties.
#[derive(Debug, Clone, Deserialize)]
pub struct Spreadsheet {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sheet {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetProperties {
    #[serde(rename = "sheetId", skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<i64>,
    pub title: String,
    #[serde(rename = "gridProperties", skip_serializing_if = "Option::is_none")]
    pub grid_properties: Option<GridProperties>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridProperties {
    #[serde(rename = "rowCount")]
    pub row_count: u32,
    #[serde(rename = "columnCount")]
    pub column_count: u32,
}

/// `spreadsheets.batchUpdate` body adding one worksheet.
#[derive(Debug, Clone, Serialize)]
pub struct AddSheetBatch {
    pub requests: Vec<AddSheetRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddSheetRequest {
    #[serde(rename = "addSheet")]
    pub add_sheet: AddSheet,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddSheet {
    pub properties: SheetProperties,
}

impl AddSheetBatch {
    pub fn new(title: &str, rows: u32, columns: u32) -> Self {
        Self {
            requests: vec![AddSheetRequest {
                add_sheet: AddSheet {
                    properties: SheetProperties {
                        sheet_id: None,
                        title: title.to_string(),
                        grid_properties: Some(GridProperties {
                            row_count: rows,
                            column_count: columns,
                        }),
                    },
                },
            }],
        }
    }
}

/// Google API error envelope.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}
