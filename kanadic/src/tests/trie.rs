use crate::trie::{BuildTrie, LoudsTrie};

const WORDS: &[&str] = &[
    "a", "an", "and", "android", "ant", "cat", "catalog", "cats", "dog", "do", "o", "on", "one",
    "かな", "かなだ", "かなり", "き", "きょう", "きょうと",
];

fn build() -> (BuildTrie, LoudsTrie) {
    let mut trie = BuildTrie::new();
    for (i, w) in WORDS.iter().enumerate() {
        assert!(trie.insert(w, i as i16));
    }
    let louds = LoudsTrie::from_build_trie(&trie).unwrap();
    (trie, louds)
}

/// 挿入したすべての語が、線形化後に引けることのテスト
#[test]
fn test_every_word_is_found() {
    let (build, louds) = build();
    assert_eq!(louds.num_words(), WORDS.len());
    assert_eq!(louds.costs().len(), WORDS.len());

    for w in WORDS {
        let node = louds.node_index(w).unwrap();
        let term_id = louds.term_id(node).unwrap();
        assert_eq!(Some(term_id), build.find(w).unwrap().term_id());
        assert_eq!(louds.word(node), *w);
        assert!(louds.common_prefix_search(w).any(|m| m.word == *w));
    }
}

/// 予測検索の結果がすべて接頭辞で始まり、上限を超えないことのテスト
#[test]
fn test_predictive_bounds() {
    let (_, louds) = build();
    for prefix in ["", "a", "an", "ca", "き", "きょ", "x"] {
        for limit in [0, 1, 3, 100] {
            let found = louds.predictive_search(prefix, limit);
            assert!(found.len() <= limit);
            assert!(found.iter().all(|m| m.word.starts_with(prefix)));
            let expected = WORDS.iter().filter(|w| w.starts_with(prefix)).count();
            assert_eq!(found.len(), expected.min(limit));
        }
    }
}

/// 予測検索が前順(親が先、子はラベル順)で語を返すことのテスト
#[test]
fn test_predictive_order() {
    let (_, louds) = build();
    let found: Vec<_> = louds
        .predictive_search("an", 10)
        .into_iter()
        .map(|m| m.word)
        .collect();
    assert_eq!(found, vec!["an", "and", "android", "ant"]);
}

/// 削除後に線形化しても、共有する接頭辞を持つ語が残ることのテスト
#[test]
fn test_delete_then_linearize() {
    let (mut build, _) = build();
    assert!(build.delete("cat"));
    assert!(build.delete("android"));
    assert!(build.find("catalog").is_some());

    let louds = LoudsTrie::from_build_trie(&build).unwrap();
    assert_eq!(louds.num_words(), WORDS.len() - 2);
    assert_eq!(louds.costs().len(), louds.num_words());
    assert!(!louds.contains("cat"));
    assert!(louds.contains("catalog"));
    assert!(louds.contains("cats"));
    assert!(louds.node_index("andr").is_none());
    assert_eq!(louds.num_nodes(), build.num_nodes());
}
