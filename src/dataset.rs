// ============================================
// src/dataset.rs
// ゲームが読み込む見出しデータセット (JSON 配列)
// ============================================

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fsutil::write_atomic;

/// データセットの1件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub headline: String,
    /// 捏造・風刺側の見出しなら true (`isOnion` も同じ意味で受け付ける)
    #[serde(rename = "isFake", alias = "isOnion")]
    pub is_fake: bool,
}

impl DatasetEntry {
    pub fn new(headline: impl Into<String>, is_fake: bool) -> Self {
        Self {
            headline: headline.into(),
            is_fake,
        }
    }
}

/// 順序付きの見出し一覧
///
/// 並び順が日替わり選択のインデックスになるため、追加は末尾のみ。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    entries: Vec<DatasetEntry>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// 見出しを trim し、空のものがあればエラーにする
    pub fn from_entries(entries: Vec<DatasetEntry>) -> Result<Self> {
        let mut checked = Vec::with_capacity(entries.len());
        for (i, mut entry) in entries.into_iter().enumerate() {
            let trimmed = entry.headline.trim();
            if trimmed.is_empty() {
                return Err(Error::MalformedInput(format!(
                    "dataset entry {i} has an empty headline"
                )));
            }
            if trimmed.len() != entry.headline.len() {
                entry.headline = trimmed.to_string();
            }
            checked.push(entry);
        }
        Ok(Self { entries: checked })
    }

    /// 整形済み・圧縮済みどちらの JSON でも読める
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<DatasetEntry> = serde_json::from_str(json)
            .map_err(|e| Error::MalformedInput(format!("dataset is not a valid JSON array: {e}")))?;
        Self::from_entries(entries)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn entries(&self) -> &[DatasetEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // MARK:保存 (フィルタ版は圧縮 JSON で上書き)
    pub fn save_compact(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(&self.entries)?;
        write_atomic(path, json.as_bytes())
    }
}

/// `append_to_file` の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOutcome {
    pub existing: usize,
    pub total: usize,
    pub created_new: bool,
}

// MARK:追記 (マージ版は整形 JSON)
/// データセットファイルの末尾に追加する
///
/// 既存の要素は読んだ形のまま残す (`isOnion` や余分なキーも書き換えない)。
/// 既存ファイルは先に検証し、壊れていれば何も書かずにエラーを返す。
pub fn append_to_file(path: &Path, batch: &[DatasetEntry]) -> Result<AppendOutcome> {
    let created_new = !path.exists();
    let mut raw: Vec<serde_json::Value> = if created_new {
        Vec::new()
    } else {
        let json = fs::read_to_string(path)?;
        Dataset::from_json(&json)?;
        serde_json::from_str(&json)?
    };
    let existing = raw.len();

    for entry in batch {
        raw.push(serde_json::to_value(entry)?);
    }

    let json = serde_json::to_string_pretty(&raw)?;
    write_atomic(path, json.as_bytes())?;

    Ok(AppendOutcome {
        existing,
        total: raw.len(),
        created_new,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn accepts_both_label_names() {
        let json = r#"[{"headline":"A","isFake":true},{"headline":"B","isOnion":false}]"#;
        let dataset = Dataset::from_json(json).unwrap();
        assert_eq!(
            dataset.entries(),
            &[DatasetEntry::new("A", true), DatasetEntry::new("B", false)]
        );
    }

    #[test]
    fn serializes_with_is_fake() {
        let json = serde_json::to_string(&DatasetEntry::new("A", true)).unwrap();
        assert_eq!(json, r#"{"headline":"A","isFake":true}"#);
    }

    #[test]
    fn headlines_are_trimmed_and_must_be_non_empty() {
        let dataset = Dataset::from_json(r#"[{"headline":"  padded ","isFake":false}]"#).unwrap();
        assert_eq!(dataset.entries()[0].headline, "padded");

        let err = Dataset::from_json(r#"[{"headline":"ok","isFake":false},{"headline":" ","isFake":true}]"#)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedInput(ref m) if m.contains("entry 1")));
    }

    #[test]
    fn rejects_wrong_shape() {
        assert!(matches!(
            Dataset::from_json(r#"{"headline":"A","isFake":true}"#),
            Err(Error::MalformedInput(_))
        ));
        assert!(matches!(
            Dataset::from_json(r#"[{"headline":"A"}]"#),
            Err(Error::MalformedInput(_))
        ));
    }

    #[test]
    fn pretty_and_compact_files_load_the_same() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![DatasetEntry::new("One", false), DatasetEntry::new("Two", true)];
        let dataset = Dataset::from_entries(entries.clone()).unwrap();

        let pretty = dir.path().join("pretty.json");
        let compact = dir.path().join("compact.json");
        append_to_file(&pretty, &entries).unwrap();
        dataset.save_compact(&compact).unwrap();

        assert!(fs::read_to_string(&pretty).unwrap().contains('\n'));
        assert!(!fs::read_to_string(&compact).unwrap().contains('\n'));
        assert_eq!(Dataset::load(&pretty).unwrap(), dataset);
        assert_eq!(Dataset::load(&compact).unwrap(), dataset);
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        assert!(matches!(Dataset::load(&path), Err(Error::MissingFile(_))));
    }

    #[test]
    fn append_keeps_existing_entries_as_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        fs::write(
            &path,
            r#"[{"headline":"Old","isOnion":true,"source":"archive","year":2019}]"#,
        )
        .unwrap();

        let outcome = append_to_file(&path, &[DatasetEntry::new("New", false)]).unwrap();
        assert_eq!(
            outcome,
            AppendOutcome {
                existing: 1,
                total: 2,
                created_new: false
            }
        );

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!([
                {"headline": "Old", "isOnion": true, "source": "archive", "year": 2019},
                {"headline": "New", "isFake": false}
            ])
        );
        assert_eq!(Dataset::load(&path).unwrap().len(), 2);
    }

    #[test]
    fn append_refuses_to_touch_a_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        fs::write(&path, "[{\"headline\": ").unwrap();

        let err = append_to_file(&path, &[DatasetEntry::new("New", false)]).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[{\"headline\": ");
    }

    #[test]
    fn append_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("dataset.json");
        let outcome = append_to_file(&path, &[]).unwrap();
        assert!(outcome.created_new);
        assert_eq!(outcome.total, 0);
        assert!(Dataset::load(&path).unwrap().is_empty());
    }
}
