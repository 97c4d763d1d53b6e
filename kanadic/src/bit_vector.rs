//! rank/select付きの簡潔ビットベクトル
//!
//! LOUDSトライのビット列と終端フラグを保持するための不変ビットベクトルです。
//! 512ビットの大ブロックごとに累積の1の数を、64ビットのワードごとにブロック内の
//! 相対的な1の数を保持し、`rank`を定数時間で計算します。
//! `select`は大ブロックとワードの要約に対する二分探索の後、ワード内を走査します。

use rkyv::{Archive, Deserialize, Serialize};

use crate::errors::{KanadicError, Result};

const WORD_LEN: usize = 64;
const WORDS_PER_BLOCK: usize = 8;
const BLOCK_LEN: usize = WORD_LEN * WORDS_PER_BLOCK;

/// rank/select索引付きの不変ビットベクトル
///
/// 構築後は変更されないため、索引は常にビット列と整合します。
#[derive(Default, Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct SuccinctBitVector {
    words: Vec<u64>,
    len: usize,
    // 各大ブロックより前の1の数。末尾に全体の1の数を持つ。
    block_ranks: Vec<u32>,
    // 各ワードより前にある、同じ大ブロック内の1の数。
    word_ranks: Vec<u16>,
}

impl SuccinctBitVector {
    /// ビットの列からビットベクトルを構築します。
    ///
    /// # 引数
    ///
    /// * `bits` - 先頭から順に並んだビット
    ///
    /// # 戻り値
    ///
    /// 索引構築済みのビットベクトル
    pub fn from_bits<I>(bits: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut words = vec![];
        let mut len = 0;
        for bit in bits {
            if len % WORD_LEN == 0 {
                words.push(0);
            }
            if bit {
                words[len / WORD_LEN] |= 1 << (len % WORD_LEN);
            }
            len += 1;
        }
        Self::build(words, len)
    }

    /// 64ビットワードの列からビットベクトルを構築します。
    ///
    /// `len`を超える位置のビットは無視されます。
    ///
    /// # 引数
    ///
    /// * `words` - 下位ビットから順に詰められたワード列
    /// * `len` - ビット長
    ///
    /// # パニック
    ///
    /// `len`が`words`に収まらない場合にパニックします。
    pub fn from_words(mut words: Vec<u64>, len: usize) -> Self {
        assert!(
            len <= words.len() * WORD_LEN,
            "len {len} exceeds the capacity of {} words",
            words.len()
        );
        words.truncate(len.div_ceil(WORD_LEN));
        if len % WORD_LEN != 0
            && let Some(last) = words.last_mut()
        {
            *last &= (1 << (len % WORD_LEN)) - 1;
        }
        Self::build(words, len)
    }

    fn build(words: Vec<u64>, len: usize) -> Self {
        let num_blocks = words.len().div_ceil(WORDS_PER_BLOCK);
        let mut block_ranks = Vec::with_capacity(num_blocks + 1);
        let mut word_ranks = Vec::with_capacity(words.len());

        let mut total = 0u32;
        let mut in_block = 0u16;
        for (i, &w) in words.iter().enumerate() {
            if i % WORDS_PER_BLOCK == 0 {
                block_ranks.push(total);
                in_block = 0;
            }
            word_ranks.push(in_block);
            let ones = w.count_ones();
            total += ones;
            in_block += ones as u16;
        }
        block_ranks.push(total);

        Self {
            words,
            len,
            block_ranks,
            word_ranks,
        }
    }

    /// ビット長を返します。
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// ビット長が0かどうかを返します。
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 1の総数を返します。
    #[inline(always)]
    pub fn num_ones(&self) -> usize {
        self.block_ranks.last().copied().unwrap_or(0) as usize
    }

    /// 0の総数を返します。
    #[inline(always)]
    pub fn num_zeros(&self) -> usize {
        self.len - self.num_ones()
    }

    /// `pos`番目のビットを返します。
    ///
    /// # パニック
    ///
    /// `pos >= len()`の場合にパニックします。
    #[inline(always)]
    pub fn get(&self, pos: usize) -> bool {
        assert!(pos < self.len, "bit position {pos} out of range (len {})", self.len);
        self.words[pos / WORD_LEN] >> (pos % WORD_LEN) & 1 == 1
    }

    /// 区間`[0, pos)`に含まれる1の数を返します。
    ///
    /// # 引数
    ///
    /// * `pos` - `0..=len()`のビット位置
    ///
    /// # パニック
    ///
    /// `pos > len()`の場合にパニックします。
    #[inline(always)]
    pub fn rank1(&self, pos: usize) -> usize {
        assert!(pos <= self.len, "rank position {pos} out of range (len {})", self.len);
        if pos == self.len {
            return self.num_ones();
        }
        let w = pos / WORD_LEN;
        let mask = (1u64 << (pos % WORD_LEN)) - 1;
        self.block_ranks[w / WORDS_PER_BLOCK] as usize
            + self.word_ranks[w] as usize
            + (self.words[w] & mask).count_ones() as usize
    }

    /// 区間`[0, pos)`に含まれる0の数を返します。
    ///
    /// # パニック
    ///
    /// `pos > len()`の場合にパニックします。
    #[inline(always)]
    pub fn rank0(&self, pos: usize) -> usize {
        pos - self.rank1(pos)
    }

    /// `n`番目(1始まり)の1の位置を返します。
    ///
    /// # 引数
    ///
    /// * `n` - 1以上の順位
    ///
    /// # 戻り値
    ///
    /// 位置。`n`が1の総数を超える場合は`None`。
    ///
    /// # パニック
    ///
    /// `n == 0`の場合にパニックします。
    pub fn select1(&self, n: usize) -> Option<usize> {
        assert!(n > 0, "select1 is 1-indexed; n must be positive");
        if n > self.num_ones() {
            return None;
        }
        let k = n - 1;

        let block = self.block_ranks.partition_point(|&r| r as usize <= k) - 1;
        let mut rest = k - self.block_ranks[block] as usize;

        let start = block * WORDS_PER_BLOCK;
        let end = (start + WORDS_PER_BLOCK).min(self.words.len());
        let w = start + self.word_ranks[start..end].partition_point(|&r| r as usize <= rest) - 1;
        rest -= self.word_ranks[w] as usize;

        Some(w * WORD_LEN + select_in_word(self.words[w], rest))
    }

    /// `n`番目(1始まり)の0の位置を返します。
    ///
    /// # 引数
    ///
    /// * `n` - 1以上の順位
    ///
    /// # 戻り値
    ///
    /// 位置。`n`が0の総数を超える場合は`None`。
    ///
    /// # パニック
    ///
    /// `n == 0`の場合にパニックします。
    pub fn select0(&self, n: usize) -> Option<usize> {
        assert!(n > 0, "select0 is 1-indexed; n must be positive");
        if n > self.num_zeros() {
            return None;
        }
        let k = n - 1;

        // 0の数が k 以下となる最後の大ブロック
        let num_blocks = self.block_ranks.len() - 1;
        let (mut lo, mut hi) = (0, num_blocks);
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if self.block_rank0(mid) <= k {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let block = lo;
        let mut rest = k - self.block_rank0(block);

        let start = block * WORDS_PER_BLOCK;
        let end = (start + WORDS_PER_BLOCK).min(self.words.len());
        let mut w = start;
        while w + 1 < end && self.word_rank0(w + 1) <= rest {
            w += 1;
        }
        rest -= self.word_rank0(w);

        Some(w * WORD_LEN + select_in_word(!self.words[w], rest))
    }

    #[inline(always)]
    fn block_rank0(&self, block: usize) -> usize {
        block * BLOCK_LEN - self.block_ranks[block] as usize
    }

    #[inline(always)]
    fn word_rank0(&self, w: usize) -> usize {
        (w % WORDS_PER_BLOCK) * WORD_LEN - self.word_ranks[w] as usize
    }

    /// 読み込んだビットベクトルの索引がビット列と整合しているかを検証します。
    ///
    /// # エラー
    ///
    /// ワード数、末尾の余りビット、索引の値のいずれかが不正な場合は
    /// [`KanadicError::MalformedInput`]を返します。
    pub(crate) fn validate(&self) -> Result<()> {
        let malformed = |msg: &str| Err(KanadicError::malformed_input("bit vector", msg));

        if self.words.len() != self.len.div_ceil(WORD_LEN) {
            return malformed("word count does not match the bit length");
        }
        if self.word_ranks.len() != self.words.len()
            || self.block_ranks.len() != self.words.len().div_ceil(WORDS_PER_BLOCK) + 1
        {
            return malformed("rank index has a wrong length");
        }
        if self.len % WORD_LEN != 0
            && let Some(&last) = self.words.last()
            && last >> (self.len % WORD_LEN) != 0
        {
            return malformed("bits are set past the end");
        }

        let mut total = 0u64;
        let mut in_block = 0u64;
        for (i, &w) in self.words.iter().enumerate() {
            if i % WORDS_PER_BLOCK == 0 {
                if u64::from(self.block_ranks[i / WORDS_PER_BLOCK]) != total {
                    return malformed("block rank mismatch");
                }
                in_block = 0;
            }
            if u64::from(self.word_ranks[i]) != in_block {
                return malformed("word rank mismatch");
            }
            let ones = u64::from(w.count_ones());
            total += ones;
            in_block += ones;
        }
        if self.block_ranks.last().map(|&r| u64::from(r)) != Some(total) {
            return malformed("total rank mismatch");
        }
        Ok(())
    }
}

/// ワード内で`rank`番目(0始まり)に立っているビットの位置を返します。
#[inline(always)]
fn select_in_word(mut word: u64, rank: usize) -> usize {
    for _ in 0..rank {
        word &= word - 1;
    }
    word.trailing_zeros() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pseudo_random_bits(len: usize, seed: u64) -> Vec<bool> {
        let mut x = seed;
        (0..len)
            .map(|_| {
                x ^= x << 13;
                x ^= x >> 7;
                x ^= x << 17;
                x % 3 == 0
            })
            .collect()
    }

    #[test]
    fn test_single_bit_select() {
        let bv = SuccinctBitVector::from_bits((0..256).map(|i| i == 120));
        assert_eq!(bv.select1(1), Some(120));
        assert_eq!(bv.select1(2), None);
        assert_eq!(bv.rank1(120), 0);
        assert_eq!(bv.rank1(121), 1);
        assert_eq!(bv.select0(121), Some(121));
    }

    #[test]
    fn test_rank_select_consistency() {
        let bits = pseudo_random_bits(3000, 0x9e37_79b9_7f4a_7c15);
        let bv = SuccinctBitVector::from_bits(bits.iter().copied());

        let mut ones = 0;
        for (i, &b) in bits.iter().enumerate() {
            assert_eq!(bv.rank1(i), ones);
            assert_eq!(bv.get(i), b);
            if b {
                ones += 1;
            }
        }
        assert_eq!(bv.rank1(bits.len()), ones);
        assert_eq!(bv.num_ones(), ones);

        for n in 1..=bv.num_ones() {
            let pos = bv.select1(n).unwrap();
            assert!(bv.get(pos));
            assert_eq!(bv.rank1(pos), n - 1);
            assert_eq!(bv.rank1(pos + 1), n);
        }
        for n in 1..=bv.num_zeros() {
            let pos = bv.select0(n).unwrap();
            assert!(!bv.get(pos));
            assert_eq!(bv.rank0(pos + 1), n);
        }
        assert_eq!(bv.select0(bv.num_zeros() + 1), None);
    }

    #[test]
    fn test_from_words() {
        let bv = SuccinctBitVector::from_words(vec![0b1011, u64::MAX], 70);
        assert_eq!(bv.len(), 70);
        assert_eq!(bv.num_ones(), 3 + 6);
        assert_eq!(bv.select1(3), Some(3));
        assert_eq!(bv.select1(4), Some(64));
        assert_eq!(bv.select0(1), Some(2));
    }

    #[test]
    fn test_empty() {
        let bv = SuccinctBitVector::from_bits([]);
        assert!(bv.is_empty());
        assert_eq!(bv.rank1(0), 0);
        assert_eq!(bv.select1(1), None);
        assert_eq!(bv.select0(1), None);
    }

    #[test]
    fn test_validate() {
        let bv = SuccinctBitVector::from_bits(pseudo_random_bits(1500, 7));
        assert!(bv.validate().is_ok());
        assert!(SuccinctBitVector::default().validate().is_err());
        assert!(SuccinctBitVector::from_bits([]).validate().is_ok());

        let mut broken = bv.clone();
        broken.block_ranks[1] += 1;
        assert!(matches!(broken.validate(), Err(KanadicError::MalformedInput(_))));

        let mut broken = bv.clone();
        broken.word_ranks[3] ^= 1;
        assert!(broken.validate().is_err());

        let mut broken = bv.clone();
        broken.len += 64;
        assert!(broken.validate().is_err());

        let mut broken = SuccinctBitVector::from_bits([true, false, true]);
        broken.words[0] |= 1 << 10;
        assert!(broken.validate().is_err());
    }

    #[test]
    #[should_panic]
    fn test_select_zero_panics() {
        let bv = SuccinctBitVector::from_bits([true, false]);
        bv.select1(0);
    }

    #[test]
    #[should_panic]
    fn test_rank_out_of_range_panics() {
        let bv = SuccinctBitVector::from_bits([true, false]);
        bv.rank1(3);
    }
}
