// ============================================
// src/session.rs
// 1日分のゲーム進行 (出題 → 回答 → 正解表示 → 次へ / 終了)
// ============================================

use tracing::{debug, info, warn};

use crate::clock::{Clock, date_key};
use crate::config::GameConfig;
use crate::daily::select_today;
use crate::dataset::{Dataset, DatasetEntry};
use crate::error::{Error, Result};
use crate::progress::{Answer, ProgressStore, SessionProgress};

/// シェア用グリッドの1行あたりのマス数
const SHARE_GRID_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// 回答待ち
    Answering,
    /// 正解を表示中
    Revealed,
    /// 今日の分は終了
    Complete,
}

impl SessionState {
    fn name(self) -> &'static str {
        match self {
            SessionState::Answering => "answering",
            SessionState::Revealed => "showing the answer",
            SessionState::Complete => "complete",
        }
    }
}

/// 表示中の問題
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question<'a> {
    /// 1 始まり
    pub number: usize,
    pub total: usize,
    pub headline: &'a str,
    /// `[guess = false, guess = true]`
    pub choice_labels: [&'a str; 2],
}

/// 回答の判定結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessOutcome {
    pub guess: bool,
    pub correct: bool,
    pub is_fake: bool,
    pub reveal_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSummary {
    pub score: u32,
    pub total_answered: usize,
    pub accuracy_pct: f64,
    pub share_text: String,
}

/// 正答率による評価
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    Excellent,
    Good,
    Poor,
}

impl ScoreTier {
    pub fn from_accuracy(accuracy_pct: f64) -> Self {
        if accuracy_pct >= 80.0 {
            ScoreTier::Excellent
        } else if accuracy_pct >= 60.0 {
            ScoreTier::Good
        } else {
            ScoreTier::Poor
        }
    }
}

/// 正答率 (%)。回答数 0 なら 0
pub fn accuracy_pct(score: u32, total_answered: usize) -> f64 {
    if total_answered == 0 {
        0.0
    } else {
        score as f64 / total_answered as f64 * 100.0
    }
}

/// 結果シェア用の文字列
pub fn share_text(title: &str, date: &str, score: u32, answers: &[Answer]) -> String {
    let total = answers.len();
    let mut lines = vec![
        format!("{title} {date}"),
        format!("{score}/{total} ({:.0}%)", accuracy_pct(score, total)),
    ];
    for row in answers.chunks(SHARE_GRID_WIDTH) {
        lines.push(
            row.iter()
                .map(|a| if a.correct { "✅" } else { "❌" })
                .collect(),
        );
    }
    lines.join("\n")
}

/// 1日分のゲーム
///
/// データセットと保存先は外から受け取る。時計は開始時にだけ使う。
pub struct GameSession<S: ProgressStore> {
    config: GameConfig,
    store: S,
    daily: Vec<DatasetEntry>,
    date_key: String,
    current_index: usize,
    answers: Vec<Answer>,
    score: u32,
    last_outcome: Option<GuessOutcome>,
    state: SessionState,
}

impl<S: ProgressStore> GameSession<S> {
    // MARK:開始 (今日のお題の選択と進行データの復元)
    pub fn start(config: GameConfig, dataset: &Dataset, store: S, clock: &dyn Clock) -> Self {
        let today = clock.today();
        let daily = select_today(dataset.entries(), config.epoch_date, today, config.page_size).to_vec();
        let date_key = date_key(today);
        debug!(date = %date_key, count = daily.len(), "selected today's headlines");

        let mut session = Self {
            config,
            store,
            daily,
            date_key,
            current_index: 0,
            answers: Vec::new(),
            score: 0,
            last_outcome: None,
            state: SessionState::Answering,
        };

        if let Some(progress) = session.restore() {
            session.current_index = progress.answers.len();
            session.score = progress.score;
            session.answers = progress.answers;
            info!(
                answered = session.answers.len(),
                score = session.score,
                "resumed today's progress"
            );
        }

        if session.current_index >= session.daily.len() {
            session.state = SessionState::Complete;
        }
        session
    }

    /// 今日の日付の進行データがあれば返す。壊れていれば捨てる
    fn restore(&self) -> Option<SessionProgress> {
        let blob = match self.store.load(&self.config.storage_key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "could not read saved progress; starting fresh");
                return None;
            }
        };

        let progress = match SessionProgress::from_json(&blob) {
            Ok(progress) => progress,
            Err(e) => {
                warn!(error = %e, "discarding saved progress");
                return None;
            }
        };

        if progress.date != self.date_key {
            debug!(saved = %progress.date, "saved progress is from another day");
            return None;
        }

        if progress.answers.len() > self.daily.len() {
            let e = Error::MalformedPersistedState(format!(
                "{} answers saved but today has {} headlines",
                progress.answers.len(),
                self.daily.len()
            ));
            warn!(error = %e, "discarding saved progress");
            return None;
        }

        Some(progress)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn date_key(&self) -> &str {
        &self.date_key
    }

    pub fn daily_set(&self) -> &[DatasetEntry] {
        &self.daily
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total_answered(&self) -> usize {
        self.answers.len()
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// 正解表示中なら直前の判定結果
    pub fn last_outcome(&self) -> Option<&GuessOutcome> {
        self.last_outcome.as_ref()
    }

    /// 進捗バー用 (0.0 ~ 1.0)
    pub fn progress_fraction(&self) -> f64 {
        if self.daily.is_empty() || self.state == SessionState::Complete {
            return 1.0;
        }
        let shown = self.current_index + usize::from(self.state == SessionState::Revealed);
        shown as f64 / self.daily.len() as f64
    }

    pub fn current_question(&self) -> Option<Question<'_>> {
        if self.state == SessionState::Complete {
            return None;
        }
        let entry = self.daily.get(self.current_index)?;
        Some(Question {
            number: self.current_index + 1,
            total: self.daily.len(),
            headline: &entry.headline,
            choice_labels: self.config.choice_labels(),
        })
    }

    // MARK:回答
    /// 回答を判定し、保存してから正解表示に移る
    pub fn submit_guess(&mut self, guess: bool) -> Result<GuessOutcome> {
        if self.state != SessionState::Answering {
            return Err(Error::InvalidTransition {
                action: "submit a guess",
                state: self.state.name(),
            });
        }

        let is_fake = self.daily[self.current_index].is_fake;
        let correct = guess == is_fake;

        let mut progress = SessionProgress {
            date: self.date_key.clone(),
            answers: self.answers.clone(),
            score: self.score + u32::from(correct),
        };
        progress.answers.push(Answer { guess, correct });
        self.persist(&progress);

        self.answers = progress.answers;
        self.score = progress.score;

        let outcome = GuessOutcome {
            guess,
            correct,
            is_fake,
            reveal_label: self.config.reveal_label(is_fake).to_string(),
        };
        self.last_outcome = Some(outcome.clone());
        self.state = SessionState::Revealed;
        Ok(outcome)
    }

    /// 保存に失敗してもゲームは続ける
    fn persist(&mut self, progress: &SessionProgress) {
        let result = progress
            .to_json()
            .and_then(|blob| self.store.save(&self.config.storage_key, &blob));
        if let Err(e) = result {
            warn!(error = %e, "failed to save progress");
        }
    }

    // MARK:次へ
    pub fn advance(&mut self) -> Result<SessionState> {
        if self.state != SessionState::Revealed {
            return Err(Error::InvalidTransition {
                action: "advance",
                state: self.state.name(),
            });
        }

        if self.current_index + 1 >= self.daily.len() {
            self.state = SessionState::Complete;
        } else {
            self.current_index += 1;
            self.last_outcome = None;
            self.state = SessionState::Answering;
        }
        Ok(self.state)
    }

    pub fn progress_summary(&self) -> ProgressSummary {
        let total_answered = self.answers.len();
        ProgressSummary {
            score: self.score,
            total_answered,
            accuracy_pct: accuracy_pct(self.score, total_answered),
            share_text: share_text(&self.config.title, &self.date_key, self.score, &self.answers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(correct: bool) -> Answer {
        Answer {
            guess: true,
            correct,
        }
    }

    #[test]
    fn share_text_grid_wraps_every_four() {
        let answers: Vec<Answer> = [true, true, false, true, true, false]
            .into_iter()
            .map(answer)
            .collect();
        let text = share_text("Onion or Not", "Thu Oct 16 2026", 4, &answers);
        assert_eq!(
            text,
            "Onion or Not Thu Oct 16 2026\n4/6 (67%)\n✅✅❌✅\n✅❌"
        );
    }

    #[test]
    fn accuracy_guards_zero() {
        assert_eq!(accuracy_pct(0, 0), 0.0);
        assert_eq!(accuracy_pct(3, 4), 75.0);
    }

    #[test]
    fn tiers() {
        assert_eq!(ScoreTier::from_accuracy(80.0), ScoreTier::Excellent);
        assert_eq!(ScoreTier::from_accuracy(79.9), ScoreTier::Good);
        assert_eq!(ScoreTier::from_accuracy(60.0), ScoreTier::Good);
        assert_eq!(ScoreTier::from_accuracy(10.0), ScoreTier::Poor);
    }
}
