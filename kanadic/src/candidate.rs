//! 変換候補
//!
//! 辞書から引いた語を、種類・読みの長さ・スコア・文脈IDとともに保持します。

use crate::dictionary::{ConnectionCostTable, WordContext};
use crate::errors::{KanadicError, Result};

/// 候補の種類
///
/// 保存や受け渡しには[`u8`]の値を使用します。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CandidateType {
    /// 文全体の変換結果
    NBest = 1,
    /// 読みの一部に対する候補
    PartialReading = 2,
    /// ひらがなのままの候補
    Hiragana = 3,
    /// カタカナに変換した候補
    Katakana = 4,
    /// 部分候補を連結した候補
    CombinedPartial = 5,
    /// 単漢字
    SingleKanji = 7,
}

impl From<CandidateType> for u8 {
    fn from(kind: CandidateType) -> Self {
        kind as u8
    }
}

impl TryFrom<u8> for CandidateType {
    type Error = KanadicError;

    fn try_from(v: u8) -> Result<Self> {
        Ok(match v {
            1 => Self::NBest,
            2 => Self::PartialReading,
            3 => Self::Hiragana,
            4 => Self::Katakana,
            5 => Self::CombinedPartial,
            7 => Self::SingleKanji,
            _ => {
                return Err(KanadicError::malformed_input(
                    "candidate type",
                    format!("unknown tag {v}"),
                ));
            }
        })
    }
}

/// 変換候補
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    string: String,
    kind: CandidateType,
    length: u8,
    score: i32,
    left_id: Option<u16>,
    right_id: Option<u16>,
}

impl Candidate {
    /// 候補を作成します。
    ///
    /// # 引数
    ///
    /// * `string` - 候補の文字列
    /// * `kind` - 候補の種類
    /// * `length` - 対応する読みの文字数
    /// * `score` - スコア(小さいほど良い)
    /// * `context` - 文脈ID。持たない候補は`None`
    pub fn new<S>(
        string: S,
        kind: CandidateType,
        length: u8,
        score: i32,
        context: Option<WordContext>,
    ) -> Self
    where
        S: Into<String>,
    {
        Self {
            string: string.into(),
            kind,
            length,
            score,
            left_id: context.map(|c| c.left_id),
            right_id: context.map(|c| c.right_id),
        }
    }

    /// 辞書の語から候補を組み立てます。
    ///
    /// 直前の語の右文脈IDとこの語の左文脈IDがどちらも分かる場合、
    /// スコアは語のコストに接続コストを加えたものになります。
    /// それ以外の場合は語のコストがそのままスコアになります。
    ///
    /// 読みの文字数は`u8`に収まらない場合`u8::MAX`に丸められます。
    pub fn assemble<S>(
        word: S,
        reading_len: usize,
        cost: i16,
        context: Option<WordContext>,
        kind: CandidateType,
        prev_right_id: Option<u16>,
        table: &ConnectionCostTable,
    ) -> Self
    where
        S: Into<String>,
    {
        let mut score = i32::from(cost);
        if let (Some(prev), Some(ctx)) = (prev_right_id, context) {
            score += i32::from(table.cost(prev, ctx.left_id));
        }
        let length = u8::try_from(reading_len).unwrap_or(u8::MAX);
        Self::new(word, kind, length, score, context)
    }

    #[inline(always)]
    pub fn string(&self) -> &str {
        &self.string
    }

    #[inline(always)]
    pub const fn kind(&self) -> CandidateType {
        self.kind
    }

    /// 対応する読みの文字数
    #[inline(always)]
    pub const fn length(&self) -> u8 {
        self.length
    }

    #[inline(always)]
    pub const fn score(&self) -> i32 {
        self.score
    }

    #[inline(always)]
    pub const fn left_id(&self) -> Option<u16> {
        self.left_id
    }

    #[inline(always)]
    pub const fn right_id(&self) -> Option<u16> {
        self.right_id
    }
}
