// ============================================
// src/progress.rs
// その日の進行データと保存先
// ============================================

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fsutil::write_atomic;

/// 1問ごとの回答
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub guess: bool,
    pub correct: bool,
}

/// その日の進行状況
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub date: String,
    pub answers: Vec<Answer>,
    pub score: u32,
}

impl SessionProgress {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// 保存データを読み込み、スコアと回答が食い違っていればエラー
    pub fn from_json(blob: &str) -> Result<Self> {
        let progress: SessionProgress = serde_json::from_str(blob)
            .map_err(|e| Error::MalformedPersistedState(e.to_string()))?;

        let correct = progress.answers.iter().filter(|a| a.correct).count();
        if correct != progress.score as usize {
            return Err(Error::MalformedPersistedState(format!(
                "score {} does not match {} correct answers",
                progress.score, correct
            )));
        }
        Ok(progress)
    }
}

/// キー付きの保存先
pub trait ProgressStore {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&mut self, key: &str, blob: &str) -> Result<()>;
}

/// メモリ上の保存先 (テスト用)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(key: &str, blob: &str) -> Self {
        let mut store = Self::new();
        store.slots.insert(key.to_string(), blob.to_string());
        store
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn save(&mut self, key: &str, blob: &str) -> Result<()> {
        self.slots.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

/// キーごとに `<key>.json` を置くディレクトリ
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    // MARK:OS ごとのデータ保存用ディレクトリ
    pub fn default_dir() -> PathBuf {
        match ProjectDirs::from("jp", "Fukumoto0141", "fakenewsdle") {
            Some(proj_dirs) => proj_dirs.data_dir().to_path_buf(),
            // 取得できなかったらカレントディレクトリ
            None => PathBuf::from("."),
        }
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

impl ProgressStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn save(&mut self, key: &str, blob: &str) -> Result<()> {
        write_atomic(&self.slot_path(key), blob.as_bytes())
    }
}
