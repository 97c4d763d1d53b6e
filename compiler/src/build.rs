//! システム辞書のビルドモジュール
//!
//! このモジュールは、辞書ソースファイル(lex.csv, matrix.def)から
//! バイナリ形式のシステム辞書を構築する機能を提供します。
//! 接続行列はmatrix.defのほか、旧形式の圧縮コスト表からも読み込めます。

use std::path::PathBuf;
use std::{fs::File, io};

use kanadic::dictionary::{
    ConnectorView, DictionaryInner, LexiconBuilder, SystemDictionaryBuilder,
};
use kanadic::errors::KanadicError;
use kanadic::{ConnectionCostTable, Dictionary};

use clap::Parser;

/// ビルドコマンドの引数
///
/// システム辞書をビルドするために必要な入力ファイルと出力先を指定します。
#[derive(Parser, Debug)]
#[clap(
    name = "build",
    about = "A program to build the system dictionary."
)]
pub struct Args {
    /// System lexicon file (lex.csv).
    #[clap(short = 'l', long)]
    lexicon_in: PathBuf,

    /// Matrix definition file (matrix.def).
    ///
    /// If this argument is not specified, the compiler considers `--legacy-matrix-in`
    /// and `--legacy-matrix-len` arguments.
    #[clap(short = 'm', long)]
    matrix_in: Option<PathBuf>,

    /// Legacy compressed connection cost table.
    #[clap(long)]
    legacy_matrix_in: Option<PathBuf>,

    /// Uncompressed byte length of the legacy connection cost table.
    #[clap(long)]
    legacy_matrix_len: Option<usize>,

    /// File to which the binary dictionary is output (in zstd).
    #[clap(short = 'o', long)]
    sysdic_out: PathBuf,

    /// Skips malformed lexicon rows instead of failing.
    #[clap(long)]
    skip_invalid_rows: bool,

    /// Zstandard compression level.
    #[clap(long, default_value = "19")]
    level: i32,
}

/// ビルド処理中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// 不正な引数の組み合わせ
    ///
    /// `--matrix-in`または`--legacy-matrix-{in,len}`のすべてが
    /// 指定されている必要があります。
    #[error(
        "Invalid argument combination: Either --matrix-in or all of \
        --legacy-matrix-{{in,len}} must be specified."
    )]
    InvalidSourceArguments,

    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 辞書構築エラー
    #[error("Dictionary building failed: {0}")]
    Kanadic(#[from] KanadicError),
}

/// 辞書ビルドのソースファイル情報
pub enum BuildSource {
    /// matrix.defファイルから構築
    FromMatrix {
        /// 語彙ファイル(lex.csv)のパス
        lexicon: PathBuf,
        /// 連接コスト定義ファイル(matrix.def)のパス
        matrix: PathBuf,
    },
    /// 旧形式の圧縮コスト表から構築
    FromLegacyMatrix {
        /// 語彙ファイル(lex.csv)のパス
        lexicon: PathBuf,
        /// 圧縮コスト表のパス
        matrix: PathBuf,
        /// 展開後のバイト数
        byte_len: usize,
    },
}

/// コマンドライン引数からビルドソースを決定する
///
/// # エラー
///
/// 不正な引数の組み合わせの場合、`BuildError::InvalidSourceArguments`を返します。
fn get_source_from_args(args: &Args) -> Result<BuildSource, BuildError> {
    if let Some(matrix_in) = &args.matrix_in {
        Ok(BuildSource::FromMatrix {
            lexicon: args.lexicon_in.clone(),
            matrix: matrix_in.clone(),
        })
    } else if let (Some(matrix), Some(byte_len)) = (&args.legacy_matrix_in, args.legacy_matrix_len) {
        Ok(BuildSource::FromLegacyMatrix {
            lexicon: args.lexicon_in.clone(),
            matrix: matrix.clone(),
            byte_len,
        })
    } else {
        Err(BuildError::InvalidSourceArguments)
    }
}

/// ビルドコマンドを実行する
///
/// 指定されたソースファイルから辞書を構築し、zstd圧縮したバイナリ形式で出力します。
///
/// # エラー
///
/// ファイルの読み書きや辞書構築に失敗した場合、`BuildError`を返します。
pub fn run(args: Args) -> Result<(), BuildError> {
    let source = get_source_from_args(&args)?;
    let builder = LexiconBuilder::new().skip_invalid_rows(args.skip_invalid_rows);

    eprintln!("Compiling the system dictionary...");
    let dict = Dictionary::from_inner(build_dictionary(&source, &builder)?);
    eprintln!(
        "{} readings, {} entries, {} x {} connection costs",
        dict.lexicon().readings().num_words(),
        dict.lexicon().num_entries(),
        dict.connector().num_left(),
        dict.connector().num_right(),
    );

    eprintln!("Writing the system dictionary...");
    dict.write_zstd(File::create(&args.sysdic_out)?, args.level)?;

    eprintln!("Successfully built the dictionary to {}", args.sysdic_out.display());
    Ok(())
}

/// 指定されたソースファイルから辞書を構築する
///
/// CLIに依存しないコアのビルドロジックです。
///
/// # エラー
///
/// ファイルの読み込みや辞書構築に失敗した場合、`BuildError`を返します。
pub fn build_dictionary(
    source: &BuildSource,
    builder: &LexiconBuilder,
) -> Result<DictionaryInner, BuildError> {
    let dict = match source {
        BuildSource::FromMatrix { lexicon, matrix } => {
            let lexicon = builder.build_from_reader(File::open(lexicon)?)?;
            let connector = ConnectionCostTable::from_matrix_def(File::open(matrix)?)?;
            SystemDictionaryBuilder::build(lexicon, connector)?
        }
        BuildSource::FromLegacyMatrix {
            lexicon,
            matrix,
            byte_len,
        } => SystemDictionaryBuilder::from_legacy_readers(
            File::open(lexicon)?,
            File::open(matrix)?,
            *byte_len,
            builder,
        )?,
    };
    Ok(dict)
}
