// ============================================
// src/main.rs (メインファイル)
// ターミナル版のゲーム画面
// ============================================

use std::fs::{self, OpenOptions};
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fakenewsdle::clock::{Clock, SystemClock};
use fakenewsdle::config::{GameConfig, Variant};
use fakenewsdle::daily::{format_countdown, time_until_next_rotation};
use fakenewsdle::dataset::Dataset;
use fakenewsdle::progress::{FileStore, ProgressStore};
use fakenewsdle::session::{GameSession, ScoreTier, SessionState};

use crossterm::{
    ExecutableCommand,
    cursor::{Hide, Show},
    event::{self, Event, KeyCode},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};

use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

/// Daily headline quiz: real news or made up?
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Which game to play
    #[arg(long, value_enum)]
    variant: Option<Variant>,

    /// Dataset file (JSON array)
    #[arg(long, default_value = "data/dataset.json")]
    dataset: PathBuf,

    /// Config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

// --------------------------------------------------
// メイン関数 (TUIセットアップと実行ループ)
// --------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = GameConfig::load(cli.variant, cli.config.as_deref())?;
    let dataset = Dataset::load(&cli.dataset)
        .with_context(|| format!("failed to load dataset {}", cli.dataset.display()))?;
    info!(entries = dataset.len(), title = %config.title, "starting game");

    let mut session = GameSession::start(config, &dataset, FileStore::default(), &SystemClock);

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut session);
    restore_terminal()?;
    result
}

/// 画面を使うので、ログはデータディレクトリのファイルに書く
fn init_logging() {
    let dir = FileStore::default_dir();
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("fakenewsdle.log"))
    else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn setup_terminal() -> Result<Terminal<impl Backend>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?; // 代替スクリーンを使用
    stdout().execute(Hide)?; // カーソルを非表示
    let backend = CrosstermBackend::new(stdout());
    Ok(Terminal::new(backend)?)
}

fn restore_terminal() -> Result<()> {
    stdout().execute(Show)?;
    stdout().execute(LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

fn run_app<S: ProgressStore>(
    terminal: &mut Terminal<impl Backend>,
    session: &mut GameSession<S>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, session))?;

        if !event::poll(Duration::from_millis(250))? {
            continue; // 残り時間の表示を更新するだけ
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != event::KeyEventKind::Press {
            continue;
        }

        match (session.state(), key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q')) => break,
            (
                SessionState::Answering,
                KeyCode::Left | KeyCode::Char('1') | KeyCode::Char('r'),
            ) => guess(session, false),
            (
                SessionState::Answering,
                KeyCode::Right | KeyCode::Char('2') | KeyCode::Char('f'),
            ) => guess(session, true),
            (SessionState::Revealed, KeyCode::Enter | KeyCode::Char(' ')) => {
                if let Err(e) = session.advance() {
                    warn!(error = %e, "advance rejected");
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn guess<S: ProgressStore>(session: &mut GameSession<S>, guess: bool) {
    if let Err(e) = session.submit_guess(guess) {
        warn!(error = %e, "guess rejected");
    }
}

// --------------------------------------------------
// UI描画
// --------------------------------------------------

fn tier_color(tier: ScoreTier) -> Color {
    match tier {
        ScoreTier::Excellent => Color::Green,
        ScoreTier::Good => Color::Yellow,
        ScoreTier::Poor => Color::Red,
    }
}

fn ui<S: ProgressStore>(f: &mut Frame, session: &GameSession<S>) {
    let size = f.area();
    let config = session.config();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", config.title));
    let inner_area = block.inner(size);
    f.render_widget(block, size);

    if session.daily_set().is_empty() {
        f.render_widget(
            Paragraph::new("No headlines available today.").centered(),
            inner_area,
        );
        return;
    }

    if session.state() == SessionState::Complete {
        ui_complete(f, session, inner_area);
    } else {
        ui_question(f, session, inner_area);
    }
}

fn ui_question<S: ProgressStore>(f: &mut Frame, session: &GameSession<S>, area: Rect) {
    let config = session.config();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // [0] サブタイトルと日付
            Constraint::Length(1), // [1] 進捗ゲージ
            Constraint::Length(1), // [2] 空白
            Constraint::Min(3),    // [3] 見出し
            Constraint::Length(3), // [4] 選択肢 / 判定
            Constraint::Length(1), // [5] 操作説明
        ])
        .split(area);

    f.render_widget(
        Paragraph::new(vec![
            Line::from(config.subtitle.as_str()).style(Style::default().fg(Color::Gray)),
            Line::from(session.date_key()).style(Style::default().fg(Color::DarkGray)),
        ])
        .centered(),
        chunks[0],
    );

    // 0. 進捗 (何問目 / スコア)
    let question = session.current_question();
    let (number, total) = question
        .as_ref()
        .map(|q| (q.number, q.total))
        .unwrap_or((0, 0));
    let label = format!(
        "Question {} of {}  |  Score: {}/{}",
        number,
        total,
        session.score(),
        session.total_answered()
    );
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::NONE))
        .gauge_style(Style::default().fg(Color::Blue).bg(Color::Black))
        .ratio(session.progress_fraction().clamp(0.0, 1.0))
        .label(label);
    f.render_widget(gauge, chunks[1]);

    // 1. 見出し
    if let Some(q) = &question {
        f.render_widget(
            Paragraph::new(q.headline)
                .style(Style::default().fg(Color::White).bold())
                .wrap(Wrap { trim: true })
                .centered(),
            chunks[3],
        );
    }

    // 2. 選択肢 or 判定
    let lines = match (session.state(), session.last_outcome()) {
        (SessionState::Revealed, Some(outcome)) => {
            let verdict = if outcome.correct {
                Span::styled(" Correct! ", Style::default().fg(Color::Black).bg(Color::Green))
            } else {
                Span::styled(" Wrong ", Style::default().fg(Color::White).bg(Color::Red))
            };
            vec![
                Line::from(verdict),
                Line::from(vec![
                    Span::raw("This was a "),
                    Span::styled(outcome.reveal_label.as_str(), Style::default().bold()),
                    Span::raw(" headline"),
                ]),
            ]
        }
        _ => {
            let [real, fake] = config.choice_labels();
            vec![Line::from(vec![
                Span::styled(format!(" ← {real} "), Style::default().fg(Color::White).bg(Color::Blue)),
                Span::raw("    "),
                Span::styled(format!(" {fake} → "), Style::default().fg(Color::Black).bg(Color::LightRed)),
            ])]
        }
    };
    f.render_widget(Paragraph::new(lines).centered(), chunks[4]);

    // 3. 操作説明
    let help = match session.state() {
        SessionState::Revealed if number >= total => "Enter: see final score   Esc: quit",
        SessionState::Revealed => "Enter: next headline   Esc: quit",
        _ => "←/→: answer   Esc: quit",
    };
    f.render_widget(
        Paragraph::new(help)
            .style(Style::default().fg(Color::DarkGray))
            .centered(),
        chunks[5],
    );
}

fn ui_complete<S: ProgressStore>(f: &mut Frame, session: &GameSession<S>, area: Rect) {
    let summary = session.progress_summary();
    let tier = ScoreTier::from_accuracy(summary.accuracy_pct);
    let message = match tier {
        ScoreTier::Excellent => "Excellent! You're a headline expert!",
        ScoreTier::Good => "Good job! You can spot the fakes pretty well!",
        ScoreTier::Poor => "The fakes got you! Better luck next time!",
    };
    let countdown = format_countdown(time_until_next_rotation(SystemClock.now()));

    let mut lines = vec![
        Line::from("Today's Challenge Complete!").style(Style::default().bold()),
        Line::from(""),
        Line::from(format!("{:.0}% accuracy", summary.accuracy_pct))
            .style(Style::default().fg(tier_color(tier)).bold()),
        Line::from(format!(
            "You got {} out of {} headlines correct!",
            summary.score, summary.total_answered
        )),
        Line::from(message).style(Style::default().fg(Color::Gray)),
        Line::from(""),
    ];
    lines.extend(summary.share_text.lines().map(|l| Line::from(l.to_string())));
    lines.push(Line::from(""));
    lines.push(Line::from("Come back tomorrow for new headlines!"));
    lines.push(
        Line::from(format!("Next challenge in: {countdown}"))
            .style(Style::default().fg(Color::DarkGray)),
    );

    f.render_widget(Paragraph::new(lines).centered(), area);
}
