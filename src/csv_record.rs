// ============================================
// src/csv_record.rs
// 見出し CSV の読み込みと書き戻し
// ============================================

use tracing::debug;

use crate::error::{Error, Result};

/// CSV の1行から作られる生レコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlineRecord {
    pub text: String,
    pub label: String,
    /// 元の行そのもの (書き戻し時にそのまま使う)
    pub original_line: String,
}

/// ヘッダー行とレコード一覧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDocument {
    pub header: String,
    pub records: Vec<HeadlineRecord>,
}

/// 1行をフィールドに分解する
///
/// `"` で引用モードを切り替え、引用中の `""` はリテラルの `"` 1文字になる。
/// 改行のエスケープは扱わない (1レコード = 1物理行)。
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    fields.push(current);
    fields
}

/// CSV 文書全体をパースする
///
/// ヘッダーは引用を考慮せず `,` で分割し、`text` と `label` 列を探す。
/// 列数が足りない行と見出しが空の行は黙って捨てる。
pub fn parse_csv(data: &str) -> Result<CsvDocument> {
    // Excel などが付ける BOM は空白と同じく読み飛ばす
    let mut lines = data.trim_start_matches('\u{feff}').trim().split('\n');
    let header = lines.next().unwrap_or_default().trim().to_string();

    let columns: Vec<String> = header
        .split(',')
        .map(|h| h.trim().to_lowercase())
        .collect();
    let text_idx = columns.iter().position(|c| c == "text");
    let label_idx = columns.iter().position(|c| c == "label");

    let (text_idx, label_idx) = match (text_idx, label_idx) {
        (Some(t), Some(l)) => (t, l),
        _ => {
            return Err(Error::MalformedInput(
                "CSV must contain \"text\" and \"label\" columns".to_string(),
            ));
        }
    };
    let needed = text_idx.max(label_idx);

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for raw in lines {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let values = parse_csv_line(line);
        if values.len() <= needed {
            dropped += 1;
            continue;
        }

        let text = values[text_idx].trim();
        if text.is_empty() {
            // 見出しが空の行も列不足と同じ扱い
            dropped += 1;
            continue;
        }

        records.push(HeadlineRecord {
            text: text.to_string(),
            label: values[label_idx].trim().to_string(),
            original_line: line.to_string(),
        });
    }

    if dropped > 0 {
        debug!(dropped, "skipped malformed CSV rows");
    }

    Ok(CsvDocument { header, records })
}

/// ヘッダーと元の行をそのまま並べて CSV 文字列に戻す
pub fn write_csv(header: &str, records: &[HeadlineRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(header);
    lines.extend(records.iter().map(|r| r.original_line.as_str()));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_fields_and_escaped_quotes() {
        assert_eq!(
            parse_csv_line(r#"a,"b,c","d""e""#),
            vec!["a", "b,c", "d\"e"]
        );
    }

    #[test]
    fn empty_fields_are_kept() {
        assert_eq!(parse_csv_line("a,,b,"), vec!["a", "", "b", ""]);
        assert_eq!(parse_csv_line(""), vec![""]);
    }

    #[test]
    fn missing_label_column_is_rejected() {
        for header in ["text,kind", "headline,text", "title,body,source"] {
            let data = format!("{header}\nfoo,bar\n");
            let err = parse_csv(&data).unwrap_err();
            assert!(matches!(err, Error::MalformedInput(_)), "{header}");
        }
    }

    #[test]
    fn empty_document_is_rejected() {
        assert!(matches!(parse_csv(""), Err(Error::MalformedInput(_))));
    }

    #[test]
    fn leading_byte_order_mark_is_ignored() {
        let doc = parse_csv("\u{feff}text,label\nMan bites dog,1\n").unwrap();
        assert_eq!(doc.header, "text,label");
        assert_eq!(doc.records.len(), 1);
        assert_eq!(doc.records[0].text, "Man bites dog");
    }

    #[test]
    fn header_is_case_and_space_insensitive() {
        let doc = parse_csv(" Label , id ,TEXT \n1,7,\"Man bites dog\"\n").unwrap();
        assert_eq!(doc.records.len(), 1);
        assert_eq!(doc.records[0].text, "Man bites dog");
        assert_eq!(doc.records[0].label, "1");
    }

    #[test]
    fn short_rows_and_blank_lines_are_dropped() {
        let data = "id,text,label\n1,First,0\n\n2,Second\n3,\"Third, again\",1\r\n";
        let doc = parse_csv(data).unwrap();
        let texts: Vec<_> = doc.records.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["First", "Third, again"]);
        assert_eq!(doc.records[1].original_line, "3,\"Third, again\",1");
    }

    #[test]
    fn rows_with_blank_text_are_dropped() {
        let doc = parse_csv("text,label\n\"  \",1\nkept,0\n").unwrap();
        assert_eq!(doc.records.len(), 1);
        assert_eq!(doc.records[0].text, "kept");
    }

    #[test]
    fn fields_are_trimmed() {
        let doc = parse_csv("text,label\n  padded headline  ,  1 \n").unwrap();
        assert_eq!(doc.records[0].text, "padded headline");
        assert_eq!(doc.records[0].label, "1");
    }

    #[test]
    fn write_csv_keeps_header_and_original_lines() {
        let doc = parse_csv("Text,Label,Source\n\"A \"\"quoted\"\" one\",0,x\nplain,1,y").unwrap();
        let out = write_csv(&doc.header, &doc.records[1..]);
        assert_eq!(out, "Text,Label,Source\nplain,1,y");
    }
}
