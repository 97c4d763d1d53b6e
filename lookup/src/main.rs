//! 辞書を検索するユーティリティ
//!
//! このバイナリは、標準入力から1行ずつ読みを受け取り、
//! 指定された検索モード(prefix、predict、exact、candidates)で辞書を引いて結果を出力します。

use std::error::Error;
use std::io::{BufRead, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

use kanadic::dictionary::LexEntry;
use kanadic::{CandidateType, Dictionary};

use clap::Parser;

/// 検索モード
#[derive(Clone, Debug)]
enum SearchMode {
    Prefix,
    Predict,
    Exact,
    Candidates,
}

impl FromStr for SearchMode {
    type Err = &'static str;

    /// 文字列から検索モードをパースする
    ///
    /// # 引数
    ///
    /// * `mode` - パース対象の文字列("prefix"、"predict"、"exact"、"candidates"のいずれか)
    ///
    /// # 戻り値
    ///
    /// パースに成功した場合は対応する `SearchMode`、失敗した場合はエラーメッセージ
    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "prefix" => Ok(Self::Prefix),
            "predict" => Ok(Self::Predict),
            "exact" => Ok(Self::Exact),
            "candidates" => Ok(Self::Candidates),
            _ => Err("Could not parse a mode"),
        }
    }
}

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(name = "lookup", about = "Looks up readings in a compiled dictionary")]
struct Args {
    /// System dictionary.
    #[clap(short = 'i', long)]
    sysdic: PathBuf,

    /// Reads the dictionary as zstd. Implied by a `.zst` extension.
    #[clap(long)]
    zstd: bool,

    /// Search mode. Choices are prefix, predict, exact, and candidates.
    #[clap(short = 'M', long, default_value = "prefix")]
    mode: SearchMode,

    /// Maximum number of words returned by predictive search.
    #[clap(short = 'n', long, default_value = "20")]
    limit: usize,

    /// Right context id of the preceding word, used to score candidates.
    #[clap(short = 'p', long)]
    prev_right_id: Option<u16>,
}

/// 1語を出力する
fn write_entry<W: Write>(out: &mut W, e: &LexEntry) -> std::io::Result<()> {
    writeln!(
        out,
        "{}\t{}\tleft_id={}\tright_id={}\tword_cost={}",
        e.reading, e.surface, e.context.left_id, e.context.right_id, e.cost,
    )
}

/// メイン関数
///
/// 辞書をロードし、標準入力から読み込んだ読みで辞書を検索して、
/// 結果を標準出力に出力します。
///
/// # 戻り値
///
/// 実行が成功した場合は `Ok(())`、エラーが発生した場合はエラー情報
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    eprintln!("Loading the dictionary...");
    let zstd = args.zstd || args.sysdic.extension().is_some_and(|ext| ext == "zst");
    let dict = if zstd {
        Dictionary::from_zstd(&args.sysdic)?
    } else {
        Dictionary::from_path(&args.sysdic)?
    };

    eprintln!("Ready to look up");

    let is_tty = atty::is(atty::Stream::Stdout);

    let out = std::io::stdout();
    let mut out = BufWriter::new(out.lock());
    let lines = std::io::stdin().lock().lines();
    for line in lines {
        let line = line?;
        let input = line.trim();
        let lexicon = dict.lexicon();
        match args.mode {
            SearchMode::Prefix => {
                for e in lexicon.common_prefix_entries(input) {
                    write_entry(&mut out, &e)?;
                }
            }
            SearchMode::Predict => {
                for e in lexicon.predictive_entries(input, args.limit) {
                    write_entry(&mut out, &e)?;
                }
            }
            SearchMode::Exact => {
                for e in lexicon.entries_of(input) {
                    write_entry(&mut out, &e)?;
                }
            }
            SearchMode::Candidates => {
                for c in dict.candidates(input, CandidateType::NBest, args.prev_right_id) {
                    writeln!(
                        &mut out,
                        "{}\tlength={}\tscore={}",
                        c.string(),
                        c.length(),
                        c.score(),
                    )?;
                }
            }
        }
        out.write_all(b"EOS\n")?;
        if is_tty {
            out.flush()?;
        }
    }

    Ok(())
}
