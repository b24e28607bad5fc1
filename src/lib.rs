// ============================================
// src/lib.rs
// 見出し当てゲームの中核 (データセット作成と日替わり出題)
// ============================================

pub mod builder;
pub mod clock;
pub mod config;
pub mod csv_record;
pub mod daily;
pub mod dataset;
pub mod error;
mod fsutil;
pub mod progress;
pub mod session;

pub use error::{Error, Result};
