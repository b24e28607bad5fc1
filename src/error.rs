// ============================================
// src/error.rs
// クレート共通のエラー型
// ============================================

use std::path::PathBuf;

use thiserror::Error;

/// クレート共通の Result
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// CSV ヘッダー不足、空の見出しなど入力データの形式エラー
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// 指定されたファイルが存在しない
    #[error("File \"{}\" does not exist", .0.display())]
    MissingFile(PathBuf),

    /// 保存済みの進行データが壊れている (ゲーム側で破棄して復帰する)
    #[error("Malformed saved progress: {0}")]
    MalformedPersistedState(String),

    /// 現在の状態では受け付けない操作
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
