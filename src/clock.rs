// ============================================
// src/clock.rs
// 現在時刻の取得 (テストでは固定時刻に差し替える)
// ============================================

use chrono::{Local, NaiveDate, NaiveDateTime};

/// 日付の識別文字列の形式 (例: "Thu Oct 16 2026")
pub const DATE_KEY_FORMAT: &str = "%a %b %d %Y";

pub trait Clock {
    /// ローカル時刻
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// OS のローカル時刻
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// 常に同じ時刻を返す
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// 進行データの `date` に入れる日付文字列
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}
