//! 辞書構築のためのビルダー
//!
//! このモジュールは、語彙CSVと接続コスト表から [`DictionaryInner`] を構築するための
//! ビルダーを提供します。

use std::io::Read;

use crate::dictionary::connector::ConnectionCostTable;
use crate::dictionary::lexicon::{Lexicon, LexiconBuilder};
use crate::dictionary::DictionaryInner;
use crate::errors::{KanadicError, Result};

/// システム辞書エントリから [`DictionaryInner`] を構築するビルダー
pub struct SystemDictionaryBuilder {}

impl SystemDictionaryBuilder {
    /// 構築済みのコンポーネントから `DictionaryInner` を構築します。
    ///
    /// # エラー
    ///
    /// 語彙に接続コスト表の範囲外の文脈IDが含まれる場合にエラーを返します。
    pub fn build(lexicon: Lexicon, connector: ConnectionCostTable) -> Result<DictionaryInner> {
        if !lexicon.verify(&connector) {
            return Err(KanadicError::invalid_argument(
                "lexicon_rdr",
                "lexicon_rdr includes invalid connection ids.",
            ));
        }
        Ok(DictionaryInner { lexicon, connector })
    }

    /// 語彙CSVと`matrix.def`から新しい [`DictionaryInner`] を作成します。
    ///
    /// # 引数
    ///
    ///  - `lexicon_rdr`: 語彙ファイル `*.csv` のリーダー
    ///  - `matrix_rdr`: 接続行列ファイル `matrix.def` のリーダー
    ///
    /// # エラー
    ///
    /// 入力フォーマットが不正な場合に [`KanadicError`] を返します。
    pub fn from_readers<L, M>(lexicon_rdr: L, matrix_rdr: M) -> Result<DictionaryInner>
    where
        L: Read,
        M: Read,
    {
        let lexicon = Lexicon::from_reader(lexicon_rdr)?;
        let connector = ConnectionCostTable::from_matrix_def(matrix_rdr)?;
        Self::build(lexicon, connector)
    }

    /// 語彙CSVと旧形式の圧縮コスト表から新しい [`DictionaryInner`] を作成します。
    ///
    /// # 引数
    ///
    ///  - `lexicon_rdr`: 語彙ファイル `*.csv` のリーダー
    ///  - `matrix_rdr`: [`ConnectionCostTable::build`]で書き込まれた圧縮データのリーダー
    ///  - `byte_len`: 圧縮データを展開した後のバイト数
    ///  - `builder`: 語彙の構築設定
    ///
    /// # エラー
    ///
    /// コスト表が読み込めない場合は [`KanadicError::MalformedInput`] を返します。
    pub fn from_legacy_readers<L, M>(
        lexicon_rdr: L,
        matrix_rdr: M,
        byte_len: usize,
        builder: &LexiconBuilder,
    ) -> Result<DictionaryInner>
    where
        L: Read,
        M: Read,
    {
        let lexicon = builder.build_from_reader(lexicon_rdr)?;
        let connector = ConnectionCostTable::load(matrix_rdr, byte_len)?;
        Self::build(lexicon, connector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oor_lex() {
        let lexicon_csv = "しぜん,1,1,0,自然";
        let matrix_def = "1 1\n0 0 0";

        let result = SystemDictionaryBuilder::from_readers(
            lexicon_csv.as_bytes(),
            matrix_def.as_bytes(),
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_legacy_matrix() {
        let lexicon_csv = "しぜん,0,1,0,自然";
        let mut blob = vec![];
        let byte_len = ConnectionCostTable::build(&[0, 1, 2, 3], &mut blob).unwrap();

        let dict = SystemDictionaryBuilder::from_legacy_readers(
            lexicon_csv.as_bytes(),
            blob.as_slice(),
            byte_len,
            &LexiconBuilder::new(),
        )
        .unwrap();
        assert_eq!(dict.connector().cost(1, 0), 2);

        let result = SystemDictionaryBuilder::from_legacy_readers(
            lexicon_csv.as_bytes(),
            &blob[..2],
            byte_len,
            &LexiconBuilder::new(),
        );
        assert!(result.is_err());
    }
}
