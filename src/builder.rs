// ============================================
// src/builder.rs
// CSV からデータセットを作るオフライン処理
// ============================================

use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::{debug, info};

use crate::csv_record::{CsvDocument, HeadlineRecord, parse_csv, write_csv};
use crate::dataset::{Dataset, DatasetEntry, append_to_file};
use crate::error::{Error, Result};
use crate::fsutil::write_atomic;

/// 出典や話題が答えのヒントになってしまう語 (小文字で比較)
pub const BLOCKLIST: &[&str] = &[
    "onion",
    "satire",
    "satirical",
    "reuters",
    "associated press",
    "(video)",
    "[video]",
    "(photos)",
    "watch:",
    "breaking:",
];

/// フィルタ版で「偽物」とみなすラベルの既定値
pub const DEFAULT_FAKE_LABEL: &str = "1";

/// Fisher-Yates シャッフル (後ろから順に [0, i] のどれかと交換)
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// 1回分のマージ結果 (ファイルには触らない)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeBatch {
    /// 片側から取り出した件数
    pub taken: usize,
    /// シャッフル済みの追加分
    pub batch: Vec<DatasetEntry>,
    pub remaining_real: Vec<HeadlineRecord>,
    pub remaining_fake: Vec<HeadlineRecord>,
}

/// 本物・偽物を同数ずつ先頭から取り出し、混ぜてシャッフルする
///
/// どちらかが空なら何も取り出さない (エラーではない)。
pub fn balance_and_merge<R: Rng + ?Sized>(
    mut real: Vec<HeadlineRecord>,
    mut fake: Vec<HeadlineRecord>,
    rng: &mut R,
) -> MergeBatch {
    let taken = real.len().min(fake.len());

    // 先頭 taken 件を消費し、残りは元の順のまま返す
    let remaining_real = real.split_off(taken);
    let remaining_fake = fake.split_off(taken);

    let mut batch: Vec<DatasetEntry> = real
        .into_iter()
        .map(|r| DatasetEntry::new(r.text, false))
        .chain(fake.into_iter().map(|r| DatasetEntry::new(r.text, true)))
        .collect();
    shuffle(&mut batch, rng);

    MergeBatch {
        taken,
        batch,
        remaining_real,
        remaining_fake,
    }
}

/// `merge` 実行後の集計
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub real_parsed: usize,
    pub fake_parsed: usize,
    pub taken: usize,
    pub added: Vec<DatasetEntry>,
    pub existing: usize,
    pub total: usize,
    pub created_new: bool,
    pub remaining_real: usize,
    pub remaining_fake: usize,
}

fn read_csv(path: &Path) -> Result<CsvDocument> {
    if !path.exists() {
        return Err(Error::MissingFile(path.to_path_buf()));
    }
    let data = fs::read_to_string(path)?;
    parse_csv(&data)
}

// MARK:マージ＆ドレイン
/// 2つの CSV を同数ずつデータセット末尾に追加し、使った行を CSV から取り除く
///
/// 読み込みをすべて終えてから書き込む。JSON を先に書き、その後 CSV を書き戻す。
/// 間で落ちた場合は次回同じ行が再度追加される (少なくとも1回)。
pub fn run_merge_drain<R: Rng + ?Sized>(
    real_path: &Path,
    fake_path: &Path,
    json_path: &Path,
    rng: &mut R,
) -> Result<MergeReport> {
    // 両方の存在を先に確認する
    for path in [real_path, fake_path] {
        if !path.exists() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
    }

    info!("reading CSV files");
    let real = read_csv(real_path)?;
    let fake = read_csv(fake_path)?;
    let real_parsed = real.records.len();
    let fake_parsed = fake.records.len();
    info!(real = real_parsed, fake = fake_parsed, "parsed CSV data");

    let merged = balance_and_merge(real.records, fake.records, rng);
    info!(taken = merged.taken, "taking this many from each file");

    // 既存 JSON の検証もここで行うので、壊れていれば CSV には触らない
    let appended = append_to_file(json_path, &merged.batch)?;
    info!(total = appended.total, path = %json_path.display(), "saved dataset");

    write_atomic(
        real_path,
        write_csv(&real.header, &merged.remaining_real).as_bytes(),
    )?;
    write_atomic(
        fake_path,
        write_csv(&fake.header, &merged.remaining_fake).as_bytes(),
    )?;
    debug!(
        remaining_real = merged.remaining_real.len(),
        remaining_fake = merged.remaining_fake.len(),
        "drained source CSV files"
    );

    Ok(MergeReport {
        real_parsed,
        fake_parsed,
        taken: merged.taken,
        existing: appended.existing,
        total: appended.total,
        created_new: appended.created_new,
        remaining_real: merged.remaining_real.len(),
        remaining_fake: merged.remaining_fake.len(),
        added: merged.batch,
    })
}

// MARK:フィルタ＆上書き
/// 見出しにブロックリストの語が含まれるか (大文字小文字は無視)
pub fn is_blocked(headline: &str) -> bool {
    let lower = headline.to_lowercase();
    BLOCKLIST.iter().any(|term| lower.contains(term))
}

/// ラベルが `fake_label` と一致するものを偽物として変換する
pub fn label_records(records: Vec<HeadlineRecord>, fake_label: &str) -> Vec<DatasetEntry> {
    records
        .into_iter()
        .map(|r| {
            let is_fake = r.label == fake_label;
            DatasetEntry::new(r.text, is_fake)
        })
        .collect()
}

/// 入力 CSV の拡張子を json に置き換えたパス
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("json")
}

#[derive(Debug, Clone)]
pub struct FilterReport {
    pub parsed: usize,
    pub blocked: usize,
    pub written: Vec<DatasetEntry>,
    pub output: PathBuf,
}

/// 1つの CSV を変換・フィルタ・シャッフルして JSON を上書きする (元の CSV は変更しない)
pub fn run_filter<R: Rng + ?Sized>(
    input: &Path,
    output: Option<&Path>,
    fake_label: &str,
    rng: &mut R,
) -> Result<FilterReport> {
    let doc = read_csv(input)?;
    let parsed = doc.records.len();

    let mut entries: Vec<DatasetEntry> = label_records(doc.records, fake_label)
        .into_iter()
        .filter(|e| !is_blocked(&e.headline))
        .collect();
    let blocked = parsed - entries.len();
    info!(parsed, blocked, "filtered headlines");

    shuffle(&mut entries, rng);

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input));
    let dataset = Dataset::from_entries(entries)?;
    dataset.save_compact(&output)?;
    info!(path = %output.display(), count = dataset.len(), "wrote dataset");

    Ok(FilterReport {
        parsed,
        blocked,
        written: dataset.entries().to_vec(),
        output,
    })
}
