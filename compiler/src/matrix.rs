//! 接続コスト表の書き出しモジュール
//!
//! matrix.defを読み込み、辞書とは独立したコスト表ファイルとして書き出します。

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use kanadic::errors::KanadicError;
use kanadic::ConnectionCostTable;

use clap::{Parser, ValueEnum};

/// 書き出し形式
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Format {
    /// 次元付きの圧縮ブロック
    Block,
    /// 非圧縮の短整数配列
    Raw,
    /// 長さを含まない圧縮ストリーム(旧形式)
    Legacy,
}

/// matrixコマンドの引数
#[derive(Parser, Debug)]
#[clap(
    name = "matrix",
    about = "A program to export the connection cost table."
)]
pub struct Args {
    /// Matrix definition file (matrix.def).
    #[clap(short = 'm', long)]
    matrix_in: PathBuf,

    /// File to which the cost table is output.
    #[clap(short = 'o', long)]
    table_out: PathBuf,

    /// Output format.
    #[clap(short = 'f', long, value_enum, default_value = "block")]
    format: Format,
}

/// コスト表の書き出し中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum MatrixError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// コスト表の構築エラー
    #[error("Connection cost table failed: {0}")]
    Kanadic(#[from] KanadicError),
}

/// matrixコマンドを実行する
///
/// 旧形式で書き出した場合は、読み込みに必要な展開後のバイト数を標準出力に表示します。
///
/// # エラー
///
/// ファイルの読み書きやmatrix.defの解析に失敗した場合、`MatrixError`を返します。
pub fn run(args: Args) -> Result<(), MatrixError> {
    eprintln!("Loading the matrix definition...");
    let conn = ConnectionCostTable::from_matrix_def(File::open(&args.matrix_in)?)?;

    let mut wtr = BufWriter::new(File::create(&args.table_out)?);
    match args.format {
        Format::Block => conn.write_block(&mut wtr)?,
        Format::Raw => conn.write_raw(&mut wtr)?,
        Format::Legacy => {
            let byte_len = ConnectionCostTable::build(conn.costs(), &mut wtr)?;
            println!("{byte_len}");
        }
    }
    wtr.flush()?;

    eprintln!("Successfully wrote the cost table to {}", args.table_out.display());
    Ok(())
}
