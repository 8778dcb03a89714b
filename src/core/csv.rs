use crate::domain::model::{Document, Row};

/// 解析 CSV 文字為 Document。容錯處理：不足兩行時回傳空文件。
pub fn parse(text: &str) -> Document {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    // 第一行是標題列；沒有換行就沒有資料列
    let Some((header_line, body)) = normalized.split_once('\n') else {
        return Document::default();
    };

    let headers: Vec<String> = header_line
        .split(',')
        .map(|field| field.trim().to_string())
        .collect();

    let mut rows: Vec<Row> = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    // 單趟字元掃描，追蹤引號狀態；引號內的逗號與換行視為欄位內容
    for ch in body.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                field.push(ch);
            }
            ',' if !in_quotes => record.push(std::mem::take(&mut field)),
            '\n' if !in_quotes => {
                record.push(std::mem::take(&mut field));
                flush_record(&mut rows, &mut record, headers.len());
            }
            _ => field.push(ch),
        }
    }

    // 最後一列可能沒有換行結尾
    if !field.is_empty() || !record.is_empty() {
        record.push(std::mem::take(&mut field));
        flush_record(&mut rows, &mut record, headers.len());
    }

    Document { headers, rows }
}

fn flush_record(rows: &mut Vec<Row>, record: &mut Vec<String>, expected_fields: usize) {
    let raw = std::mem::take(record);

    // 空白列直接略過
    if raw.len() == 1 && raw[0].trim().is_empty() {
        return;
    }

    if raw.len() != expected_fields {
        tracing::warn!(
            "Skipping malformed row: {} fields, expected {}",
            raw.len(),
            expected_fields
        );
        return;
    }

    rows.push(raw.iter().map(|field| clean_field(field)).collect());
}

// 去除一層包覆引號並還原成對跳脫的雙引號
fn clean_field(raw: &str) -> String {
    let unwrapped = if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        &raw[1..raw.len() - 1]
    } else {
        raw
    };

    unwrapped.replace("\"\"", "\"")
}

/// 將資料列序列化為 CSV 文字；rows 為空時回傳空字串。
pub fn serialize(headers: &[String], rows: &[Row]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut lines: Vec<String> = Vec::with_capacity(rows.len() + 1);

    let header_line = headers
        .iter()
        .map(|name| escape_field(name))
        .collect::<Vec<_>>()
        .join(",");
    lines.push(header_line);

    for row in rows {
        let line = (0..headers.len())
            .map(|i| escape_field(row.get(i).map(String::as_str).unwrap_or("")))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    lines.join("\n") + "\n"
}

// 欄位含逗號、引號或換行時以雙引號包覆，內部引號成對跳脫
fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
