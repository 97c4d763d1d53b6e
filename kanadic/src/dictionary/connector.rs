//! 接続コスト表
//!
//! このモジュールは、前後の語の文脈IDの組から接続コストを引く行列と、
//! その保存形式を提供します。

mod cost_table;

pub use crate::dictionary::connector::cost_table::{ConnectionCostTable, MAX_COST};

/// コネクターのビュー機能を提供するトレイト
pub trait ConnectorView {
    /// 行(前の語の右文脈ID)の数を返します。
    fn num_left(&self) -> usize;

    /// 列(次の語の左文脈ID)の数を返します。
    fn num_right(&self) -> usize;
}
