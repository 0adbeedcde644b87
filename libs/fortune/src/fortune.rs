//! Deterministic per-user, per-day fortunes.
//!
//! The draw sequence is pinned: the seed string `"{recipient}_{YYYYMMDD}"` is
//! hashed with SHA-256 and the digest keys a [`ChaCha8Rng`]. Draws are taken in
//! the fixed order score, advice, lucky colour, lucky item; reordering them
//! changes every result for every seed.

use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::calendar::{CalendarDate, Timezone};

pub const MIN_SCORE: u32 = 30;
pub const MAX_SCORE: u32 = 100;

pub const LUCKY_COLORS: [&str; 10] = [
    "❤️ 赤",
    "💙 青",
    "💚 緑",
    "💛 黄色",
    "🧡 オレンジ",
    "💜 紫",
    "🤍 白",
    "🖤 黒",
    "💗 ピンク",
    "🤎 茶色",
];

pub const LUCKY_ITEMS: [&str; 18] = [
    "☕ コーヒー",
    "📱 スマホケース",
    "🎧 イヤホン",
    "⌚ 腕時計",
    "👓 メガネ",
    "📝 ノート",
    "🍀 四つ葉のクローバー",
    "💍 アクセサリー",
    "🔑 鍵",
    "🎒 バッグ",
    "🧸 ぬいぐるみ",
    "🍫 チョコレート",
    "🌸 花",
    "📚 本",
    "🎵 音楽",
    "🍵 お茶",
    "🕯️ キャンドル",
    "✨ キラキラしたもの",
];

/// Five fortune tiers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FortuneLevel {
    Caution,
    Ordinary,
    Fair,
    Good,
    Excellent,
}

impl FortuneLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => FortuneLevel::Excellent,
            75..=89 => FortuneLevel::Good,
            60..=74 => FortuneLevel::Fair,
            45..=59 => FortuneLevel::Ordinary,
            _ => FortuneLevel::Caution,
        }
    }

    /// 1 for [`FortuneLevel::Caution`] up to 5 for [`FortuneLevel::Excellent`].
    pub fn tier(&self) -> u8 {
        match self {
            FortuneLevel::Caution => 1,
            FortuneLevel::Ordinary => 2,
            FortuneLevel::Fair => 3,
            FortuneLevel::Good => 4,
            FortuneLevel::Excellent => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FortuneLevel::Caution => "😅 要注意",
            FortuneLevel::Ordinary => "😐 普通",
            FortuneLevel::Fair => "😊 まずまず",
            FortuneLevel::Good => "✨ 好調!",
            FortuneLevel::Excellent => "🌟 絶好調!",
        }
    }

    pub fn advice(&self) -> &'static [&'static str; 3] {
        match self {
            FortuneLevel::Caution => &[
                "ちょっと慎重に!財布とか忘れ物注意してね",
                "今日は守りの日!無理な挑戦は避けた方がいいかも",
                "トラブル回避モードで!いつもより確認を丁寧に",
            ],
            FortuneLevel::Ordinary => &[
                "可もなく不可もなく!焦らず着実にいきましょ",
                "地道な努力が大事な日!コツコツやっていこ",
                "慌てず騒がず!落ち着いて行動すれば問題なし",
            ],
            FortuneLevel::Fair => &[
                "普通にいい日!無理せずマイペースでいきましょ",
                "安定した運気!いつも通りで大丈夫です",
                "平和な一日になりそう!リラックスして過ごして",
            ],
            FortuneLevel::Good => &[
                "良い流れが来てます!周りの人に感謝を伝えると◎",
                "調子いい日!ただし調子に乗りすぎ注意w",
                "チャンスが舞い込みそう!アンテナ張っておいてね!",
            ],
            FortuneLevel::Excellent => &[
                "今日は何でもうまくいく日!積極的にチャレンジしてみて!",
                "最高の一日になりそう!新しいことを始めるのに最適!",
                "運気MAX!やりたかったこと、今日やっちゃいましょ!",
            ],
        }
    }
}

/// Seed string for one recipient on one day.
///
/// ```
/// use fortune_core::{CalendarDate, Seed};
///
/// let date = CalendarDate::from_ymd(2024, 3, 15).unwrap();
/// assert_eq!(Seed::new("U123", date).as_str(), "U123_20240315");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Seed(String);

impl Seed {
    pub fn new(recipient_id: &str, date: CalendarDate) -> Self {
        Self(format!("{recipient_id}_{}", date.yyyymmdd()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// SHA-256 of the seed string; the ChaCha8 key.
    pub fn digest(&self) -> [u8; 32] {
        let mut key = [0u8; 32];
        key.copy_from_slice(&Sha256::digest(self.0.as_bytes()));
        key
    }

    fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::from_seed(self.digest())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FortuneResult {
    pub score: u32,
    pub level: FortuneLevel,
    pub advice: &'static str,
    pub lucky_color: &'static str,
    pub lucky_item: &'static str,
    pub date: CalendarDate,
}

/// Fortune for `recipient_id` on the local day containing `now`.
pub fn generate(recipient_id: &str, now: DateTime<Utc>, timezone: &Timezone) -> FortuneResult {
    generate_for_date(recipient_id, timezone.to_calendar_date(now))
}

pub fn generate_for_date(recipient_id: &str, date: CalendarDate) -> FortuneResult {
    let seed = Seed::new(recipient_id, date);
    let mut rng = seed.rng();

    let score = rng.random_range(MIN_SCORE..=MAX_SCORE);
    let level = FortuneLevel::from_score(score);
    let advice = pick(&mut rng, level.advice());
    let lucky_color = pick(&mut rng, &LUCKY_COLORS);
    let lucky_item = pick(&mut rng, &LUCKY_ITEMS);

    FortuneResult {
        score,
        level,
        advice,
        lucky_color,
        lucky_item,
        date,
    }
}

fn pick(rng: &mut ChaCha8Rng, options: &[&'static str]) -> &'static str {
    options.choose(rng).copied().unwrap_or_default()
}
