//! kanadic 辞書コンパイラのメインエントリーポイント
//!
//! このモジュールは、入力メソッド用の辞書を構築するためのサブコマンドを提供します。
//! 語彙CSVと接続行列からのバイナリ辞書の構築と、接続コスト表の書き出しを行うCLIツールです。

mod build;
mod matrix;

use clap::Parser;
use thiserror::Error;

use crate::{build::BuildError, matrix::MatrixError};

/// コマンドライン引数の構造体
///
/// `clap`を使用してコマンドライン引数をパースします。
#[derive(Parser, Debug)]
#[clap(name = "compile", version)]
struct Cli {
    /// 実行するサブコマンド
    #[clap(subcommand)]
    command: Command,
}

/// 利用可能なサブコマンド
#[derive(Parser, Debug)]
enum Command {
    /// ソースファイルからバイナリ辞書を構築します
    ///
    /// 語彙ファイル(lex.csv)と接続行列(matrix.def)からバイナリ形式の辞書を生成します。
    Build(build::Args),

    /// 接続行列を単体のコスト表として書き出します
    ///
    /// 圧縮ブロック形式、非圧縮形式、旧形式のいずれかで出力します。
    Matrix(matrix::Args),
}

/// コンパイラの実行中に発生する可能性のあるエラー
///
/// 各サブコマンドで発生したエラーをラップします。
#[derive(Debug, Error)]
pub enum CompileError {
    /// 辞書ビルド中のエラー
    #[error(transparent)]
    BuildError(#[from] BuildError),
    /// コスト表の書き出し中のエラー
    #[error(transparent)]
    MatrixError(#[from] MatrixError),
}

/// メイン関数
///
/// コマンドライン引数をパースし、指定されたサブコマンドを実行します。
///
/// # エラー
///
/// 各サブコマンドの実行中にエラーが発生した場合、そのエラーが返されます。
fn main() -> Result<(), CompileError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Build(args) => Ok(build::run(args)?),
        Command::Matrix(args) => Ok(matrix::run(args)?),
    }
}
