//! エラー型の定義
//!
//! このモジュールは、kanadicライブラリで使用されるすべてのエラー型を定義します。
//! 検索で語が見つからないことはエラーではなく、`None`や空の結果で表現されます。

use std::error::Error;
use std::fmt::{self, Debug};

/// kanadic専用のResult型
///
/// エラー型としてデフォルトで[`KanadicError`]を使用します。
pub type Result<T, E = KanadicError> = std::result::Result<T, E>;

/// kanadicのエラー型
///
/// このライブラリで発生する可能性のあるすべてのエラーを表現します。
#[derive(Debug, thiserror::Error)]
pub enum KanadicError {
    /// 無効な引数エラー
    ///
    /// [`InvalidArgumentError`]のエラーバリアント。
    #[error(transparent)]
    InvalidArgument(InvalidArgumentError),

    /// 不正な入力データエラー
    ///
    /// 圧縮データの破損、途中で切れたストリーム、不正なソース行などで発生します。
    /// [`MalformedInputError`]のエラーバリアント。
    #[error(transparent)]
    MalformedInput(MalformedInputError),

    /// 無効な状態エラー
    ///
    /// [`InvalidStateError`]のエラーバリアント。
    #[error(transparent)]
    InvalidState(InvalidStateError),

    /// 整数変換エラー
    #[error(transparent)]
    TryFromInt(std::num::TryFromIntError),

    /// 整数パースエラー
    #[error(transparent)]
    ParseInt(std::num::ParseIntError),

    /// UTF-8エンコーディングエラー
    #[error(transparent)]
    Utf8(std::str::Utf8Error),

    /// バックグラウンドスレッドパニックエラー
    ///
    /// 辞書を別スレッドで読み込んでいる最中にパニックした場合に発生します。
    #[error("Background thread panicked: {0}")]
    ThreadPanic(String),

    /// I/Oエラー
    ///
    /// 読み書きの失敗はそのまま呼び出し元へ伝播します。
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// rkyvシリアライゼーションエラー
    #[error(transparent)]
    RkyvError(#[from] rkyv::rancor::Error),
}

impl KanadicError {
    /// 無効な引数エラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 引数の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    /// 不正な入力データエラーを生成します
    ///
    /// # 引数
    ///
    /// * `what` - 入力データの名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn malformed_input<S>(what: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::MalformedInput(MalformedInputError {
            what,
            msg: msg.into(),
        })
    }

    /// 無効な状態エラーを生成します
    ///
    /// # 引数
    ///
    /// * `msg` - エラーメッセージ
    /// * `cause` - エラーの原因
    pub(crate) fn invalid_state<S, M>(msg: S, cause: M) -> Self
    where
        S: Into<String>,
        M: Into<String>,
    {
        Self::InvalidState(InvalidStateError {
            msg: msg.into(),
            cause: cause.into(),
        })
    }
}

/// 引数が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// 引数の名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// 入力データが壊れている場合に使用されるエラー
#[derive(Debug)]
pub struct MalformedInputError {
    /// 入力データの名前
    pub(crate) what: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for MalformedInputError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MalformedInputError: {}: {}", self.what, self.msg)
    }
}

impl Error for MalformedInputError {}

/// 状態が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidStateError {
    /// エラーメッセージ
    pub(crate) msg: String,

    /// エラーの根本原因
    pub(crate) cause: String,
}

impl fmt::Display for InvalidStateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidStateError: {}: {}", self.msg, self.cause)
    }
}

impl Error for InvalidStateError {}

impl From<std::num::TryFromIntError> for KanadicError {
    fn from(error: std::num::TryFromIntError) -> Self {
        Self::TryFromInt(error)
    }
}

impl From<std::num::ParseIntError> for KanadicError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::ParseInt(error)
    }
}

impl From<std::str::Utf8Error> for KanadicError {
    fn from(error: std::str::Utf8Error) -> Self {
        Self::Utf8(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = KanadicError::malformed_input("matrix", "truncated stream");
        assert_eq!(e.to_string(), "MalformedInputError: matrix: truncated stream");

        let e = KanadicError::invalid_argument("costs", "length mismatch");
        assert_eq!(e.to_string(), "InvalidArgumentError: costs: length mismatch");
    }
}
