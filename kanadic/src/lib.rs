//! # kanadic
//!
//! kanadicは、日本語・英語入力メソッドのための省メモリな辞書エンジンです。
//!
//! ## 概要
//!
//! 読みから語への大規模な辞書を簡潔データ構造(LOUDSトライ)に格納し、
//! キー入力ごとの共通接頭辞検索と予測検索を高速に行います。
//! 語ごとのコストと、文脈IDの組ごとの接続コストを用いて変換候補を順位付けします。
//!
//! ## 主な機能
//!
//! - **簡潔ビットベクトル**: 定数時間のrankと二分探索によるselect
//! - **LOUDSトライ**: 共通接頭辞検索、予測検索、語IDとコストの参照
//! - **構築用トライ**: 語の挿入・削除・検索
//! - **接続コスト表**: 圧縮形式と非圧縮形式での保存
//! - **変換候補**: 接続コストを加味したスコア計算
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use kanadic::{CandidateType, Dictionary, SystemDictionaryBuilder};
//!
//! let lexicon_csv = "きょう,1,1,300,今日
//! きょう,2,2,500,京
//! きょうと,1,1,400,京都";
//! let matrix_def = "3 3\n0 1 -100\n0 2 50";
//!
//! let dict = SystemDictionaryBuilder::from_readers(
//!     lexicon_csv.as_bytes(),
//!     matrix_def.as_bytes(),
//! )?;
//! let dict = Dictionary::from_inner(dict);
//!
//! let found: Vec<_> = dict
//!     .lexicon()
//!     .readings()
//!     .common_prefix_search("きょうとし")
//!     .map(|m| m.word)
//!     .collect();
//! assert_eq!(found, vec!["きょう", "きょうと"]);
//!
//! let candidates = dict.candidates("きょう", CandidateType::PartialReading, Some(0));
//! assert_eq!(candidates[0].string(), "今日");
//! assert_eq!(candidates[0].score(), 200);
//! assert_eq!(candidates[1].string(), "京");
//! assert_eq!(candidates[1].score(), 550);
//! # Ok(())
//! # }
//! ```

#[cfg(not(any(target_pointer_width = "32", target_pointer_width = "64")))]
compile_error!("`target_pointer_width` must be 32 or 64");

/// rank/select付きの簡潔ビットベクトル
pub mod bit_vector;

/// 変換候補の型定義
pub mod candidate;

/// 配列のバイナリ符号化と圧縮
pub mod codec;

/// 辞書データ構造とビルダー
pub mod dictionary;

/// エラー型の定義
pub mod errors;

/// 構築用トライとLOUDSトライ
pub mod trie;

/// 内部ユーティリティ関数
pub mod utils;

#[cfg(test)]
mod tests;

// Re-exports
pub use bit_vector::SuccinctBitVector;
pub use candidate::{Candidate, CandidateType};
pub use dictionary::{ConnectionCostTable, Dictionary, SystemDictionaryBuilder};
pub use trie::{BuildTrie, LoudsTrie};

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
