//! 構築用の可変トライ
//!
//! ノードはアリーナ(`Vec`)に格納され、インデックスで参照されます。
//! ノードIDと語IDのカウンタはトライのインスタンスごとに保持されます。

use std::collections::BTreeMap;

type NodeIdx = usize;

const ROOT: NodeIdx = 0;

#[derive(Debug, Clone)]
struct Node {
    label: char,
    id: u32,
    children: BTreeMap<char, NodeIdx>,
    is_word: bool,
    term_id: Option<u32>,
    cost: i16,
}

impl Node {
    const fn new(label: char, id: u32) -> Self {
        Self {
            label,
            id,
            children: BTreeMap::new(),
            is_word: false,
            term_id: None,
            cost: 0,
        }
    }
}

/// 挿入・削除・検索が可能な構築用トライ
///
/// 子ノードは文字の順序で保持されるため、線形化の順序は挿入順に依存しません。
#[derive(Debug, Clone)]
pub struct BuildTrie {
    nodes: Vec<Node>,
    next_node_id: u32,
    next_term_id: u32,
    num_words: usize,
    num_live_nodes: usize,
}

impl Default for BuildTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildTrie {
    /// 根だけを持つ空のトライを作成します。
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new('\0', 0)],
            next_node_id: 1,
            next_term_id: 0,
            num_words: 0,
            num_live_nodes: 1,
        }
    }

    /// 登録されている語の数を返します。
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.num_words
    }

    /// 語が1つも登録されていないかどうかを返します。
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.num_words == 0
    }

    /// 根を含む、到達可能なノードの数を返します。
    #[inline(always)]
    pub const fn num_nodes(&self) -> usize {
        self.num_live_nodes
    }

    /// 次に割り当てられるノードIDを返します。
    #[inline(always)]
    pub const fn next_node_id(&self) -> u32 {
        self.next_node_id
    }

    /// 次に割り当てられる語IDを返します。
    #[inline(always)]
    pub const fn next_term_id(&self) -> u32 {
        self.next_term_id
    }

    /// 語を挿入します。
    ///
    /// 初めて登録される語には新しい語IDが割り当てられます。
    /// 既存の語を再挿入した場合はコストだけが上書きされ、語IDは維持されます。
    ///
    /// # 引数
    ///
    /// * `word` - 登録する語
    /// * `cost` - 語のコスト
    ///
    /// # 戻り値
    ///
    /// 登録できた場合は`true`。空文字列は登録できず`false`を返します。
    pub fn insert(&mut self, word: &str, cost: i16) -> bool {
        if word.is_empty() {
            log::warn!("[kanadic] refused to insert an empty word into the trie");
            return false;
        }
        let mut cur = ROOT;
        for c in word.chars() {
            cur = match self.nodes[cur].children.get(&c) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(Node::new(c, self.next_node_id));
                    self.next_node_id += 1;
                    self.num_live_nodes += 1;
                    self.nodes[cur].children.insert(c, child);
                    child
                }
            };
        }

        let node = &mut self.nodes[cur];
        if !node.is_word {
            node.is_word = true;
            self.num_words += 1;
        }
        if node.term_id.is_none() {
            node.term_id = Some(self.next_term_id);
            self.next_term_id += 1;
        }
        node.cost = cost;
        true
    }

    /// 語の末尾ノードを検索します。
    ///
    /// 語として登録されていない途中のノードも返します。
    /// 経路が途切れた場合は`None`を返します。
    pub fn find(&self, word: &str) -> Option<NodeRef<'_>> {
        let mut cur = ROOT;
        for c in word.chars() {
            cur = *self.nodes[cur].children.get(&c)?;
        }
        Some(NodeRef { trie: self, idx: cur })
    }

    /// 語が登録されているかどうかを返します。
    pub fn contains(&self, word: &str) -> bool {
        self.find(word).is_some_and(|n| n.is_word())
    }

    /// 語を削除します。
    ///
    /// 終端フラグを外した後、末尾から根に向かって、子を持たず語でもないノードを
    /// 親から切り離します。他の語と共有している接頭辞は削除されません。
    ///
    /// # 戻り値
    ///
    /// 語が存在して削除された場合は`true`
    pub fn delete(&mut self, word: &str) -> bool {
        let chars: Vec<char> = word.chars().collect();
        if chars.is_empty() {
            return false;
        }
        let mut path = Vec::with_capacity(chars.len() + 1);
        path.push(ROOT);
        let mut cur = ROOT;
        for c in &chars {
            match self.nodes[cur].children.get(c) {
                Some(&child) => {
                    cur = child;
                    path.push(child);
                }
                None => return false,
            }
        }

        let node = &mut self.nodes[cur];
        if !node.is_word {
            return false;
        }
        node.is_word = false;
        node.term_id = None;
        node.cost = 0;
        self.num_words -= 1;

        for depth in (1..path.len()).rev() {
            let node = &self.nodes[path[depth]];
            if node.is_word || !node.children.is_empty() {
                break;
            }
            self.nodes[path[depth - 1]].children.remove(&chars[depth - 1]);
            self.num_live_nodes -= 1;
        }
        true
    }

    /// 根ノードを返します。
    #[inline(always)]
    pub const fn root(&self) -> NodeRef<'_> {
        NodeRef {
            trie: self,
            idx: ROOT,
        }
    }
}

/// [`BuildTrie`]のノードへの参照
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    trie: &'a BuildTrie,
    idx: NodeIdx,
}

impl<'a> NodeRef<'a> {
    #[inline(always)]
    fn node(&self) -> &'a Node {
        &self.trie.nodes[self.idx]
    }

    /// 親からこのノードへの辺のラベル
    #[inline(always)]
    pub fn label(&self) -> char {
        self.node().label
    }

    /// ノードID。根は0で、それ以外は正の値です。
    #[inline(always)]
    pub fn id(&self) -> u32 {
        self.node().id
    }

    #[inline(always)]
    pub fn is_word(&self) -> bool {
        self.node().is_word
    }

    #[inline(always)]
    pub fn term_id(&self) -> Option<u32> {
        self.node().term_id
    }

    #[inline(always)]
    pub fn cost(&self) -> i16 {
        self.node().cost
    }

    #[inline(always)]
    pub fn num_children(&self) -> usize {
        self.node().children.len()
    }

    /// ラベルの昇順で子ノードを返します。
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let trie = self.trie;
        self.node()
            .children
            .values()
            .map(move |&idx| NodeRef { trie, idx })
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("label", &self.label())
            .field("id", &self.id())
            .field("is_word", &self.is_word())
            .field("term_id", &self.term_id())
            .field("cost", &self.cost())
            .finish()
    }
}
