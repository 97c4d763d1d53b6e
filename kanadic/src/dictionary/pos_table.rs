//! 品詞テーブル
//!
//! 語の左右文脈IDの組を、出現頻度の高い順に並べた小さな索引へ対応付けます。

use hashbrown::HashMap;
use rkyv::{Archive, Deserialize, Serialize};

use crate::errors::{KanadicError, Result};

/// 語の左右文脈ID
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize)]
pub struct WordContext {
    /// 左文脈ID
    pub left_id: u16,
    /// 右文脈ID
    pub right_id: u16,
}

impl WordContext {
    #[inline(always)]
    pub const fn new(left_id: u16, right_id: u16) -> Self {
        Self { left_id, right_id }
    }
}

/// 品詞索引と文脈IDの組の対応表
#[derive(Debug, Clone, Default, Archive, Serialize, Deserialize)]
pub struct PosTable {
    contexts: Vec<WordContext>,
}

impl PosTable {
    /// すべての語の文脈IDの組から表を構築します。
    ///
    /// 頻度の降順に索引を割り当て、同じ頻度の組はID順に並べます。
    ///
    /// # エラー
    ///
    /// 異なる組が`u16`で表せる数を超える場合にエラーを返します。
    pub fn from_contexts<I>(contexts: I) -> Result<Self>
    where
        I: IntoIterator<Item = WordContext>,
    {
        let mut freqs: HashMap<WordContext, usize> = HashMap::new();
        for ctx in contexts {
            *freqs.entry(ctx).or_insert(0) += 1;
        }
        if freqs.len() > usize::from(u16::MAX) + 1 {
            return Err(KanadicError::invalid_argument(
                "contexts",
                format!("too many distinct context pairs: {}", freqs.len()),
            ));
        }

        let mut sorted: Vec<_> = freqs.into_iter().collect();
        sorted.sort_unstable_by(|(a, fa), (b, fb)| fb.cmp(fa).then(a.cmp(b)));

        Ok(Self {
            contexts: sorted.into_iter().map(|(ctx, _)| ctx).collect(),
        })
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// 索引に対応する文脈IDの組を返します。
    #[inline(always)]
    pub fn get(&self, index: u16) -> Option<WordContext> {
        self.contexts.get(usize::from(index)).copied()
    }

    /// 文脈IDの組の索引を返します。
    pub fn index_of(&self, ctx: WordContext) -> Option<u16> {
        self.contexts
            .iter()
            .position(|&c| c == ctx)
            .and_then(|i| u16::try_from(i).ok())
    }

    /// 組から索引への対応表を作成します。構築時の一括変換に使用します。
    pub(crate) fn index_map(&self) -> HashMap<WordContext, u16> {
        self.contexts
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, i as u16))
            .collect()
    }

    pub(crate) fn contexts(&self) -> &[WordContext] {
        &self.contexts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_order() {
        let a = WordContext::new(1, 1);
        let b = WordContext::new(2, 5);
        let c = WordContext::new(0, 3);
        let table = PosTable::from_contexts([b, a, c, a, b, a]).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.get(0), Some(a));
        assert_eq!(table.get(1), Some(b));
        assert_eq!(table.get(2), Some(c));
        assert_eq!(table.get(3), None);
        assert_eq!(table.index_of(b), Some(1));
        assert_eq!(table.index_of(WordContext::new(9, 9)), None);
        assert_eq!(table.index_map()[&c], 2);
    }
}
