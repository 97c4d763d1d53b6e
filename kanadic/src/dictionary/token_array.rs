//! 読みごとの語の一覧
//!
//! 読みごとに`0`を1つ、続けてその読みに属する語ごとに`1`を並べたビット列で
//! 各読みの語の範囲を表します。末尾には番兵の`0`を置きます。
//! 読み`t`(語ID順)の語は`rank1(select0(t+1))..rank1(select0(t+2))`番目です。

use rkyv::{Archive, Deserialize, Serialize};

use crate::bit_vector::SuccinctBitVector;
use crate::errors::{KanadicError, Result};

const SURFACE_IS_READING: i32 = -2;
const SURFACE_IS_KATAKANA: i32 = -1;

/// 語の表層形の表し方
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Surface {
    /// 読みそのもの
    Reading,
    /// 読みのカタカナ
    Katakana,
    /// 表層形トライのノード番号
    Node(u32),
}

impl Surface {
    fn encode(self) -> Result<i32> {
        Ok(match self {
            Self::Reading => SURFACE_IS_READING,
            Self::Katakana => SURFACE_IS_KATAKANA,
            Self::Node(n) => i32::try_from(n)?,
        })
    }

    fn decode(v: i32) -> Option<Self> {
        match v {
            SURFACE_IS_READING => Some(Self::Reading),
            SURFACE_IS_KATAKANA => Some(Self::Katakana),
            n => u32::try_from(n).ok().map(Self::Node),
        }
    }
}

/// 読みに属する1語
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenEntry {
    pub pos_index: u16,
    pub word_cost: i16,
    pub surface: Surface,
}

/// 読みごとの語の一覧
#[derive(Debug, Clone, Default, Archive, Serialize, Deserialize)]
pub struct TokenArray {
    bits: SuccinctBitVector,
    pos_index: Vec<u16>,
    word_cost: Vec<i16>,
    surface: Vec<i32>,
}

impl TokenArray {
    /// 語ID順に並んだ読みごとの語の一覧から構築します。
    ///
    /// # エラー
    ///
    /// 表層形のノード番号が`i32`で表せない場合にエラーを返します。
    pub fn from_groups<I, G>(groups: I) -> Result<Self>
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = TokenEntry>,
    {
        let mut bits = vec![];
        let mut pos_index = vec![];
        let mut word_cost = vec![];
        let mut surface = vec![];
        for group in groups {
            bits.push(false);
            for entry in group {
                bits.push(true);
                pos_index.push(entry.pos_index);
                word_cost.push(entry.word_cost);
                surface.push(entry.surface.encode()?);
            }
        }
        bits.push(false);

        Ok(Self {
            bits: SuccinctBitVector::from_bits(bits),
            pos_index,
            word_cost,
            surface,
        })
    }

    /// 読みの数を返します。
    #[inline(always)]
    pub fn num_readings(&self) -> usize {
        self.bits.num_zeros().saturating_sub(1)
    }

    /// 語の総数を返します。
    #[inline(always)]
    pub fn num_tokens(&self) -> usize {
        self.pos_index.len()
    }

    /// 語IDの読みに属する語を返します。範囲外の語IDでは空になります。
    pub fn entries(&self, term_id: u32) -> impl Iterator<Item = TokenEntry> + '_ {
        let t = term_id as usize;
        let range = if t < self.num_readings() {
            match (self.bits.select0(t + 1), self.bits.select0(t + 2)) {
                (Some(b), Some(e)) => self.bits.rank1(b)..self.bits.rank1(e),
                _ => 0..0,
            }
        } else {
            0..0
        };
        range.filter_map(move |i| {
            Some(TokenEntry {
                pos_index: self.pos_index[i],
                word_cost: self.word_cost[i],
                surface: Surface::decode(self.surface[i])?,
            })
        })
    }

    /// 読み込んだ一覧が整合しているかを検証します。
    ///
    /// # 引数
    ///
    /// * `num_surface_nodes` - 表層形トライのノード数
    /// * `num_pos` - 品詞表の行数
    pub(crate) fn validate(&self, num_surface_nodes: usize, num_pos: usize) -> Result<()> {
        let malformed = |msg: &str| Err(KanadicError::malformed_input("token array", msg));

        self.bits.validate()?;
        if self.bits.num_zeros() == 0 {
            return malformed("missing the sentinel");
        }
        let n = self.bits.num_ones();
        if self.pos_index.len() != n || self.word_cost.len() != n || self.surface.len() != n {
            return malformed("inconsistent array lengths");
        }
        if self.pos_index.iter().any(|&p| usize::from(p) >= num_pos) {
            return malformed("part-of-speech index out of range");
        }
        for &v in &self.surface {
            match Surface::decode(v) {
                Some(Surface::Node(node)) if node as usize >= num_surface_nodes => {
                    return malformed("surface node out of range");
                }
                None => return malformed("unknown surface kind"),
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(pos_index: u16, word_cost: i16, surface: Surface) -> TokenEntry {
        TokenEntry {
            pos_index,
            word_cost,
            surface,
        }
    }

    #[test]
    fn test_entries() {
        let groups = vec![
            vec![entry(0, 10, Surface::Reading), entry(1, 20, Surface::Node(3))],
            vec![],
            vec![entry(2, 30, Surface::Katakana)],
        ];
        let tokens = TokenArray::from_groups(groups).unwrap();
        assert_eq!(tokens.num_readings(), 3);
        assert_eq!(tokens.num_tokens(), 3);

        let e: Vec<_> = tokens.entries(0).collect();
        assert_eq!(
            e,
            vec![entry(0, 10, Surface::Reading), entry(1, 20, Surface::Node(3))]
        );
        assert_eq!(tokens.entries(1).count(), 0);
        assert_eq!(
            tokens.entries(2).collect::<Vec<_>>(),
            vec![entry(2, 30, Surface::Katakana)]
        );
        assert_eq!(tokens.entries(3).count(), 0);
        assert!(tokens.validate(4, 3).is_ok());
    }

    #[test]
    fn test_validate() {
        let groups = vec![vec![entry(0, 10, Surface::Reading), entry(1, 20, Surface::Node(3))]];
        let tokens = TokenArray::from_groups(groups).unwrap();
        assert!(tokens.validate(4, 2).is_ok());
        assert!(matches!(
            tokens.validate(3, 2),
            Err(KanadicError::MalformedInput(_))
        ));
        assert!(tokens.validate(4, 1).is_err());

        let mut broken = tokens.clone();
        broken.surface[1] = -7;
        assert!(broken.validate(4, 2).is_err());
        assert_eq!(broken.entries(0).count(), 1);

        let mut broken = tokens.clone();
        broken.word_cost.pop();
        assert!(broken.validate(4, 2).is_err());

        assert!(TokenArray::default().validate(0, 0).is_err());
    }
}
