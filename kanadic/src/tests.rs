//! kanadicのテストモジュール群
//!
//! 接続コスト表、トライ、辞書の読み書きについて、
//! 複数のモジュールにまたがる動作を検証します。

mod dictionary;
mod trie;
