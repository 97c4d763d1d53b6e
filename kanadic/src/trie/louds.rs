//! LOUDS(Level-Order Unary Degree Sequence)で符号化したトライ
//!
//! ビット列は先頭の仮想根`10`に続き、幅優先順の各ノードについて
//! 子の数だけ`1`を並べ、最後に`0`を1つ置いたものです。
//! ノード番号は幅優先順の0始まりで、根が0になります。
//! 位置`p`の`1`が表すノードの番号は`rank1(p)`で、
//! ノード`v`の子は`v+1`番目と`v+2`番目の`0`の間に並びます。

use std::collections::VecDeque;
use std::ops::Range;
use std::str::Chars;

use rkyv::{Archive, Deserialize, Serialize};

use crate::bit_vector::SuccinctBitVector;
use crate::errors::{KanadicError, Result};
use crate::trie::BuildTrie;

const ROOT: usize = 0;
const ROOT_LABEL: char = ' ';
const NO_TERMINAL: u32 = u32::MAX;

/// LOUDS形式の不変トライ
///
/// 終端ノードごとに、構築用トライから引き継いだ語IDとコストを保持します。
#[derive(Default, Debug, Clone, Archive, Serialize, Deserialize)]
pub struct LoudsTrie {
    lbs: SuccinctBitVector,
    labels: Vec<char>,
    terminals: SuccinctBitVector,
    term_ids: Vec<u32>,
    costs: Vec<i16>,
    term_to_terminal: Vec<u32>,
}

/// 検索で見つかった語
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct LoudsMatch {
    /// 語の文字列
    pub word: String,
    /// 語の末尾ノード
    pub node: usize,
    /// 語ID
    pub term_id: u32,
    /// 語の長さ(文字数)
    pub end_char: usize,
}

impl LoudsTrie {
    /// 構築用トライを幅優先順に線形化します。
    ///
    /// # 引数
    ///
    /// * `trie` - 構築用トライ
    ///
    /// # エラー
    ///
    /// 語IDの数が`u32`で表せない場合にエラーを返します。
    pub fn from_build_trie(trie: &BuildTrie) -> Result<Self> {
        let mut lbs = Vec::with_capacity(2 * trie.num_nodes() + 1);
        lbs.extend([true, false]);
        let mut labels = vec![ROOT_LABEL];
        let mut terminals = vec![false];
        let mut term_ids = vec![];
        let mut costs = vec![];

        let mut queue = VecDeque::from([trie.root()]);
        while let Some(node) = queue.pop_front() {
            for child in node.children() {
                lbs.push(true);
                labels.push(child.label());
                terminals.push(child.is_word());
                if child.is_word() {
                    let term_id = child.term_id().ok_or_else(|| {
                        KanadicError::invalid_state("terminal node without a term id", child.label())
                    })?;
                    term_ids.push(term_id);
                    costs.push(child.cost());
                }
                queue.push_back(child);
            }
            lbs.push(false);
        }

        let num_terms = term_ids.iter().max().map_or(0, |&t| t as usize + 1);
        let mut term_to_terminal = vec![NO_TERMINAL; num_terms];
        for (ordinal, &t) in term_ids.iter().enumerate() {
            term_to_terminal[t as usize] = u32::try_from(ordinal)?;
        }

        log::debug!(
            "[kanadic] linearized trie: {} nodes, {} words",
            labels.len(),
            term_ids.len()
        );

        Ok(Self {
            lbs: SuccinctBitVector::from_bits(lbs),
            labels,
            terminals: SuccinctBitVector::from_bits(terminals),
            term_ids,
            costs,
            term_to_terminal,
        })
    }

    /// 語とコストの組から構築します。
    ///
    /// 各語の語IDは、その語が最初に現れたレコードの順番になります。
    /// 同じ語が複数回現れた場合は後のコストで上書きされます。
    ///
    /// # エラー
    ///
    /// 空文字列が含まれる場合にエラーを返します。
    pub fn from_records<K>(records: &[(K, i16)]) -> Result<Self>
    where
        K: AsRef<str>,
    {
        let mut trie = BuildTrie::new();
        for (key, cost) in records {
            if !trie.insert(key.as_ref(), *cost) {
                return Err(KanadicError::invalid_argument(
                    "records",
                    "includes an empty key.",
                ));
            }
        }
        Self::from_build_trie(&trie)
    }

    /// 根を含むノード数を返します。
    #[inline(always)]
    pub fn num_nodes(&self) -> usize {
        self.labels.len()
    }

    /// 登録されている語の数を返します。
    #[inline(always)]
    pub fn num_words(&self) -> usize {
        self.term_ids.len()
    }

    /// 終端ノードの幅優先順に並んだコストを返します。
    #[inline(always)]
    pub fn costs(&self) -> &[i16] {
        &self.costs
    }

    /// ノードへ入る辺のラベルを返します。
    #[inline(always)]
    pub fn label(&self, node: usize) -> char {
        self.labels[node]
    }

    /// ノードの子の番号の範囲を返します。
    pub fn children(&self, node: usize) -> Range<usize> {
        let (Some(begin), Some(end)) = (self.lbs.select0(node + 1), self.lbs.select0(node + 2))
        else {
            return 0..0;
        };
        let first = begin - node;
        first..first + (end - begin - 1)
    }

    /// 親ノードの番号を返します。根の場合は`None`。
    pub fn parent(&self, node: usize) -> Option<usize> {
        if node == ROOT {
            return None;
        }
        let pos = self.lbs.select1(node + 1)?;
        Some(self.lbs.rank0(pos) - 1)
    }

    #[inline(always)]
    fn child(&self, node: usize, label: char) -> Option<usize> {
        let range = self.children(node);
        self.labels[range.clone()]
            .binary_search(&label)
            .ok()
            .map(|i| range.start + i)
    }

    /// 語の末尾ノードの番号を返します。
    ///
    /// 語として登録されていない途中のノードでも番号を返します。
    /// 空文字列は根を返します。
    pub fn node_index(&self, word: &str) -> Option<usize> {
        word.chars()
            .try_fold(ROOT, |node, c| self.child(node, c))
    }

    /// 語が登録されているかどうかを返します。
    pub fn contains(&self, word: &str) -> bool {
        self.node_index(word)
            .is_some_and(|node| self.terminals.get(node))
    }

    /// 終端ノードの語IDを返します。
    ///
    /// # パニック
    ///
    /// `node`がノード数以上の場合にパニックします。
    pub fn term_id(&self, node: usize) -> Option<u32> {
        self.terminal_ordinal(node).map(|i| self.term_ids[i])
    }

    /// 終端ノードのコストを返します。
    ///
    /// # パニック
    ///
    /// `node`がノード数以上の場合にパニックします。
    pub fn cost(&self, node: usize) -> Option<i16> {
        self.terminal_ordinal(node).map(|i| self.costs[i])
    }

    #[inline(always)]
    fn terminal_ordinal(&self, node: usize) -> Option<usize> {
        assert!(
            node < self.num_nodes(),
            "node {node} out of range (num_nodes {})",
            self.num_nodes()
        );
        self.terminals
            .get(node)
            .then(|| self.terminals.rank1(node))
    }

    /// 語IDに対応するノードの番号を返します。
    pub fn node_of_term(&self, term_id: u32) -> Option<usize> {
        let ordinal = *self.term_to_terminal.get(term_id as usize)?;
        if ordinal == NO_TERMINAL {
            return None;
        }
        self.terminals.select1(ordinal as usize + 1)
    }

    /// 語IDに対応するコストを返します。
    pub fn cost_of_term(&self, term_id: u32) -> Option<i16> {
        let ordinal = *self.term_to_terminal.get(term_id as usize)?;
        if ordinal == NO_TERMINAL {
            return None;
        }
        self.costs.get(ordinal as usize).copied()
    }

    /// 親をたどってノードまでの文字列を復元します。
    pub fn word(&self, node: usize) -> String {
        let mut chars = vec![];
        let mut cur = node;
        while let Some(parent) = self.parent(cur) {
            chars.push(self.labels[cur]);
            cur = parent;
        }
        chars.iter().rev().collect()
    }

    /// 読み込んだトライの構造が整合しているかを検証します。
    ///
    /// ビット列が幅優先順の木を表し、子の番号が常に親より大きいことも確かめます。
    ///
    /// # エラー
    ///
    /// 不整合がある場合は[`KanadicError::MalformedInput`]を返します。
    pub(crate) fn validate(&self) -> Result<()> {
        let malformed = |msg: &str| Err(KanadicError::malformed_input("louds trie", msg));

        self.lbs.validate()?;
        self.terminals.validate()?;

        let n = self.labels.len();
        if n == 0 || self.lbs.num_ones() != n || self.lbs.num_zeros() != n + 1 {
            return malformed("bit string does not match the labels");
        }
        if !self.lbs.get(0) || self.lbs.get(1) {
            return malformed("missing the super root");
        }

        let mut parent = 0;
        let mut next_child = 1;
        for pos in 2..self.lbs.len() {
            if self.lbs.get(pos) {
                if next_child <= parent {
                    return malformed("child precedes its parent");
                }
                next_child += 1;
            } else {
                parent += 1;
            }
        }
        if parent != n || next_child != n {
            return malformed("bit string is not a tree");
        }

        if self.terminals.len() != n
            || self.term_ids.len() != self.costs.len()
            || self.term_ids.len() != self.terminals.num_ones()
        {
            return malformed("terminal arrays have inconsistent lengths");
        }
        for (ordinal, &t) in self.term_ids.iter().enumerate() {
            if self.term_to_terminal.get(t as usize).map(|&o| o as usize) != Some(ordinal) {
                return malformed("term id index is inconsistent");
            }
        }
        let num_mapped = self
            .term_to_terminal
            .iter()
            .filter(|&&o| o != NO_TERMINAL)
            .count();
        if num_mapped != self.term_ids.len() {
            return malformed("term id index is inconsistent");
        }
        Ok(())
    }

    /// `text`の接頭辞になっている登録語を短い順に列挙します。
    pub fn common_prefix_search<'a>(&'a self, text: &'a str) -> CommonPrefixIter<'a> {
        CommonPrefixIter {
            trie: self,
            chars: text.chars(),
            node: Some(ROOT),
            word: String::new(),
            end_char: 0,
        }
    }

    /// `prefix`で始まる登録語を最大`limit`個返します。
    ///
    /// 接頭辞のノードから前順(親が先、子はラベル順)の深さ優先探索で集めるため、
    /// 結果はコスト順ではありません。
    pub fn predictive_search(&self, prefix: &str, limit: usize) -> Vec<LoudsMatch> {
        let mut results = vec![];
        if limit == 0 {
            return results;
        }
        let Some(start) = self.node_index(prefix) else {
            return results;
        };

        let mut stack = vec![(start, prefix.to_string(), prefix.chars().count())];
        while let Some((node, word, len)) = stack.pop() {
            if let Some(term_id) = self.term_id(node) {
                results.push(LoudsMatch {
                    word: word.clone(),
                    node,
                    term_id,
                    end_char: len,
                });
                if results.len() >= limit {
                    break;
                }
            }
            for child in self.children(node).rev() {
                let mut w = word.clone();
                w.push(self.labels[child]);
                stack.push((child, w, len + 1));
            }
        }
        results
    }
}

/// [`LoudsTrie::common_prefix_search`]のイテレータ
///
/// 複製すれば途中から検索をやり直せます。
#[derive(Clone)]
pub struct CommonPrefixIter<'a> {
    trie: &'a LoudsTrie,
    chars: Chars<'a>,
    node: Option<usize>,
    word: String,
    end_char: usize,
}

impl Iterator for CommonPrefixIter<'_> {
    type Item = LoudsMatch;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.node {
            let c = self.chars.next()?;
            self.node = self.trie.child(node, c);
            let node = self.node?;
            self.word.push(c);
            self.end_char += 1;
            if let Some(term_id) = self.trie.term_id(node) {
                return Some(LoudsMatch {
                    word: self.word.clone(),
                    node,
                    term_id,
                    end_char: self.end_char,
                });
            }
        }
        None
    }
}
