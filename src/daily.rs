// ============================================
// src/daily.rs
// 日替わりのお題セット選択
// ============================================

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::dataset::DatasetEntry;

/// 基準日からの経過日数 (基準日より前なら負)
pub fn day_number(epoch: NaiveDate, today: NaiveDate) -> i64 {
    (today - epoch).num_days()
}

/// ローテーション1周のセット数
pub fn total_sets(dataset_len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    dataset_len.div_ceil(page_size)
}

/// 今日のセット番号。負の日数でも [0, total_sets) に正規化する
pub fn set_index(day_number: i64, total_sets: usize) -> usize {
    if total_sets == 0 {
        return 0;
    }
    day_number.rem_euclid(total_sets as i64) as usize
}

/// 今日のお題 (データセットの連続した一部) を返す
///
/// 同じ日・同じデータセットなら誰が呼んでも同じ結果になる。
/// 最後のセットは `page_size` より短いことがある。
pub fn select_today(
    dataset: &[DatasetEntry],
    epoch: NaiveDate,
    today: NaiveDate,
    page_size: usize,
) -> &[DatasetEntry] {
    let sets = total_sets(dataset.len(), page_size);
    if sets == 0 {
        return &[];
    }

    let index = set_index(day_number(epoch, today), sets);
    let start = index * page_size;
    let end = (start + page_size).min(dataset.len());
    &dataset[start..end]
}

/// 次の日付切り替え (ローカルの 0 時) までの時間。表示専用
pub fn time_until_next_rotation(now: NaiveDateTime) -> TimeDelta {
    match now.date().succ_opt() {
        Some(tomorrow) => tomorrow.and_time(NaiveTime::MIN) - now,
        None => TimeDelta::zero(),
    }
}

/// "5h 12m" 形式
pub fn format_countdown(remaining: TimeDelta) -> String {
    let minutes_total = remaining.num_minutes().max(0);
    format!("{}h {}m", minutes_total / 60, minutes_total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> Vec<DatasetEntry> {
        (0..n)
            .map(|i| DatasetEntry::new(format!("headline {i}"), i % 2 == 0))
            .collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn epoch() -> NaiveDate {
        date(2025, 9, 29)
    }

    #[test]
    fn day_zero_is_the_first_set() {
        let data = dataset(25);
        let today = select_today(&data, epoch(), epoch(), 10);
        assert_eq!(today, &data[0..10]);
    }

    #[test]
    fn same_arguments_same_result() {
        let data = dataset(25);
        let day = date(2026, 10, 16);
        assert_eq!(
            select_today(&data, epoch(), day, 10),
            select_today(&data, epoch(), day, 10)
        );
    }

    #[test]
    fn rotation_repeats_after_total_sets_days() {
        let data = dataset(25);
        let sets = total_sets(data.len(), 10) as i64;
        assert_eq!(sets, 3);

        let day = date(2026, 1, 5);
        let later = day + TimeDelta::days(sets);
        assert_eq!(
            select_today(&data, epoch(), day, 10),
            select_today(&data, epoch(), later, 10)
        );
    }

    #[test]
    fn one_rotation_covers_every_entry_once() {
        let data = dataset(23);
        let sets = total_sets(data.len(), 8);
        let mut seen = Vec::new();
        for offset in 0..sets as i64 {
            let day = epoch() + TimeDelta::days(offset);
            seen.extend_from_slice(select_today(&data, epoch(), day, 8));
        }
        assert_eq!(seen, data);

        // 最後のセットだけ短い
        let last = epoch() + TimeDelta::days(sets as i64 - 1);
        assert_eq!(select_today(&data, epoch(), last, 8).len(), 7);
    }

    #[test]
    fn days_before_epoch_wrap_to_a_non_negative_set() {
        let data = dataset(30);
        let day_before = epoch() - TimeDelta::days(1);
        assert_eq!(day_number(epoch(), day_before), -1);
        assert_eq!(set_index(-1, 3), 2);
        assert_eq!(set_index(-3, 3), 0);
        assert_eq!(set_index(-7, 3), 2);
        assert_eq!(select_today(&data, epoch(), day_before, 10), &data[20..30]);
    }

    #[test]
    fn empty_dataset_or_zero_page_size_selects_nothing() {
        assert!(select_today(&[], epoch(), epoch(), 10).is_empty());
        assert!(select_today(&dataset(5), epoch(), epoch(), 0).is_empty());
    }

    #[test]
    fn countdown_until_midnight() {
        let now = date(2026, 10, 16).and_hms_opt(18, 47, 30).unwrap();
        let remaining = time_until_next_rotation(now);
        assert_eq!(remaining, TimeDelta::seconds(5 * 3600 + 12 * 60 + 30));
        assert_eq!(format_countdown(remaining), "5h 12m");
    }
}
