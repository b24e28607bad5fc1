// ============================================
// src/config.rs
// ゲームの種類ごとの設定 (表示ラベル、1日の問題数、基準日など)
// ============================================

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::ValueEnum;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Real news or The Onion
    #[default]
    Onion,
    /// Real news or fake news
    FakeNews,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// 「偽物」と答えるボタンのラベル (guess = true)
    pub true_label: String,
    /// 「本物」と答えるボタンのラベル (guess = false)
    pub false_label: String,
    pub title: String,
    pub subtitle: String,
    /// 1日に出題する数
    pub page_size: usize,
    /// ローテーションの基準日 (公開日)
    pub epoch_date: NaiveDate,
    /// 進行データの保存キー
    pub storage_key: String,
    /// 正解表示 "This was a ... headline" に入る語
    pub fake_reveal: String,
    pub real_reveal: String,
}

/// 公開日 2025-09-29
fn launch_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 29).unwrap_or_default()
}

impl GameConfig {
    pub fn preset(variant: Variant) -> Self {
        match variant {
            Variant::Onion => Self {
                true_label: "The Onion".to_string(),
                false_label: "Real News".to_string(),
                title: "Onion or Not".to_string(),
                subtitle: "Today's Daily Challenge".to_string(),
                page_size: 10,
                epoch_date: launch_day(),
                storage_key: "onionGameProgress".to_string(),
                fake_reveal: "satirical Onion".to_string(),
                real_reveal: "real news".to_string(),
            },
            Variant::FakeNews => Self {
                true_label: "Fake News".to_string(),
                false_label: "Real News".to_string(),
                title: "Fakenewsdle".to_string(),
                subtitle: "Today's Daily Challenge".to_string(),
                page_size: 8,
                epoch_date: launch_day(),
                storage_key: "fakeNewsGameProgress".to_string(),
                fake_reveal: "fake news".to_string(),
                real_reveal: "real news".to_string(),
            },
        }
    }

    /// 選択肢のラベル `[guess = false, guess = true]`
    pub fn choice_labels(&self) -> [&str; 2] {
        [self.false_label.as_str(), self.true_label.as_str()]
    }

    pub fn reveal_label(&self, is_fake: bool) -> &str {
        if is_fake {
            &self.fake_reveal
        } else {
            &self.real_reveal
        }
    }

    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("jp", "Fukumoto0141", "fakenewsdle")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// プリセットに TOML の上書きを重ねる
    ///
    /// `path` 指定時はそのファイルが必須。未指定なら既定の場所にあれば使う。
    /// コマンドラインの `variant` は TOML の `variant` より優先。
    pub fn load(variant: Option<Variant>, path: Option<&Path>) -> Result<Self> {
        let toml_text = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::MissingFile(path.to_path_buf()));
                }
                Some(fs::read_to_string(path)?)
            }
            None => match Self::default_config_path() {
                Some(default) if default.exists() => {
                    debug!(path = %default.display(), "using config file");
                    Some(fs::read_to_string(default)?)
                }
                _ => None,
            },
        };

        match toml_text {
            Some(text) => Self::from_toml_str(variant, &text),
            None => Self::preset(variant.unwrap_or_default()).validated(),
        }
    }

    pub fn from_toml_str(variant: Option<Variant>, text: &str) -> Result<Self> {
        let overrides: ConfigOverrides =
            toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        let variant = variant.or(overrides.variant).unwrap_or_default();
        let mut config = Self::preset(variant);
        overrides.apply(&mut config);
        config.validated()
    }

    fn validated(self) -> Result<Self> {
        if self.page_size == 0 {
            return Err(Error::Config("page_size must be at least 1".to_string()));
        }
        if self.storage_key.trim().is_empty() {
            return Err(Error::Config("storage_key must not be empty".to_string()));
        }
        Ok(self)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::preset(Variant::default())
    }
}

/// config.toml の中身 (すべて省略可)
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigOverrides {
    variant: Option<Variant>,
    true_label: Option<String>,
    false_label: Option<String>,
    title: Option<String>,
    subtitle: Option<String>,
    page_size: Option<usize>,
    epoch_date: Option<NaiveDate>,
    storage_key: Option<String>,
    fake_reveal: Option<String>,
    real_reveal: Option<String>,
}

impl ConfigOverrides {
    fn apply(self, config: &mut GameConfig) {
        if let Some(v) = self.true_label {
            config.true_label = v;
        }
        if let Some(v) = self.false_label {
            config.false_label = v;
        }
        if let Some(v) = self.title {
            config.title = v;
        }
        if let Some(v) = self.subtitle {
            config.subtitle = v;
        }
        if let Some(v) = self.page_size {
            config.page_size = v;
        }
        if let Some(v) = self.epoch_date {
            config.epoch_date = v;
        }
        if let Some(v) = self.storage_key {
            config.storage_key = v;
        }
        if let Some(v) = self.fake_reveal {
            config.fake_reveal = v;
        }
        if let Some(v) = self.real_reveal {
            config.real_reveal = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_differ_only_cosmetically() {
        let onion = GameConfig::preset(Variant::Onion);
        let fake = GameConfig::preset(Variant::FakeNews);
        assert_eq!(onion.page_size, 10);
        assert_eq!(fake.page_size, 8);
        assert_eq!(onion.epoch_date, fake.epoch_date);
        assert_ne!(onion.storage_key, fake.storage_key);
        assert_eq!(onion.choice_labels(), ["Real News", "The Onion"]);
    }

    #[test]
    fn toml_overrides_apply_on_top_of_variant() {
        let text = r#"
            variant = "fake-news"
            page_size = 5
            epoch_date = "2026-01-01"
            title = "Headline Hunch"
        "#;
        let config = GameConfig::from_toml_str(None, text).unwrap();
        assert_eq!(config.page_size, 5);
        assert_eq!(config.epoch_date, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(config.title, "Headline Hunch");
        assert_eq!(config.storage_key, "fakeNewsGameProgress");

        // コマンドラインの指定が優先
        let config = GameConfig::from_toml_str(Some(Variant::Onion), text).unwrap();
        assert_eq!(config.storage_key, "onionGameProgress");
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert!(matches!(
            GameConfig::from_toml_str(None, "page_size = 0"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            GameConfig::from_toml_str(None, "pagesize = 3"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            GameConfig::load(None, Some(&path)),
            Err(Error::MissingFile(_))
        ));
    }
}
