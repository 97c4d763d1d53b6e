//! 辞書の読みと表層形を格納するトライ
//!
//! 構築時には可変の[`BuildTrie`]に語を挿入・削除し、
//! 完成後に[`LoudsTrie`]へ線形化して検索に用います。

mod build;
mod louds;

pub use crate::trie::build::{BuildTrie, NodeRef};
pub use crate::trie::louds::{CommonPrefixIter, LoudsMatch, LoudsTrie};
