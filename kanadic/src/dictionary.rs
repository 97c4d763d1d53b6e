//! 辞書モジュール。
//!
//! このモジュールは、変換候補の検索に必要な辞書データの読み込み、構築、管理を行います。
//! 主な機能として以下を提供します:
//!
//! - rkyvによる辞書の直列化と読み込み
//! - Zstandard圧縮辞書の展開
//! - 別スレッドでの辞書の読み込み
//! - 読みから変換候補の組み立て
//!
//! # 辞書の読み込み方法
//!
//! - [`Dictionary::from_path`]: ファイルパスから辞書を読み込む
//! - [`Dictionary::read`]: リーダーから辞書を読み込む
//! - [`Dictionary::from_zstd`]: Zstandard圧縮辞書を読み込む
//! - [`Dictionary::spawn_load`]: 別スレッドで辞書を読み込む
//!
//! # 辞書のビルド
//!
//! [`SystemDictionaryBuilder`]を使用して、CSV形式のソースデータから辞書を構築できます。
pub mod builder;
pub mod connector;
pub mod lexicon;
pub mod pos_table;
pub mod token_array;

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use rkyv::rancor::Error;
use rkyv::util::AlignedVec;
use rkyv::{
    api::serialize_using, ser::allocator::Arena, ser::sharing::Share, ser::writer::IoWriter,
    ser::Serializer, util::with_arena, Archive, Deserialize, Serialize,
};

use crate::candidate::{Candidate, CandidateType};
use crate::codec;
use crate::errors::{KanadicError, Result};

pub use crate::dictionary::builder::SystemDictionaryBuilder;
pub use crate::dictionary::connector::{ConnectionCostTable, ConnectorView, MAX_COST};
pub use crate::dictionary::lexicon::{LexEntry, Lexicon, LexiconBuilder};
pub use crate::dictionary::pos_table::{PosTable, WordContext};

/// kanadic辞書を識別するマジックバイト。
///
/// この定数のバージョンは辞書フォーマットのバージョンを示しており、
/// クレートのセマンティックバージョンからは切り離されています。
pub const MODEL_MAGIC: &[u8] = b"KanadicDictionary 0.1\n";

const MODEL_MAGIC_LEN: usize = MODEL_MAGIC.len();
const RKYV_ALIGNMENT: usize = 16;
const PADDING_LEN: usize = (RKYV_ALIGNMENT - (MODEL_MAGIC_LEN % RKYV_ALIGNMENT)) % RKYV_ALIGNMENT;

/// [`Dictionary`]の内部データ。
///
/// 語彙と接続コスト表を保持します。
#[derive(Debug, Archive, Serialize, Deserialize)]
pub struct DictionaryInner {
    lexicon: Lexicon,
    connector: ConnectionCostTable,
}

impl DictionaryInner {
    /// 語彙への参照を取得します。
    #[inline(always)]
    pub const fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// 接続コスト表への参照を取得します。
    #[inline(always)]
    pub const fn connector(&self) -> &ConnectionCostTable {
        &self.connector
    }

    /// 辞書データを`rkyv`フォーマットを使用してライターにシリアライズします。
    ///
    /// 出力はマジックバイト、アライメント用のパディング、アーカイブ本体の順です。
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use std::fs::File;
    /// use kanadic::SystemDictionaryBuilder;
    ///
    /// let dict = SystemDictionaryBuilder::from_readers(
    ///     "とうきょう,1,1,100,東京\n".as_bytes(),
    ///     "2 2\n1 1 -50\n".as_bytes(),
    /// )?;
    ///
    /// let mut file = File::create("system.dic")?;
    /// dict.write(&mut file)?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # エラー
    ///
    /// この関数は以下の場合にエラーを返します:
    /// - 基礎となる`writer`への書き込みに失敗した場合(例: I/Oエラー)。
    /// - `rkyv`シリアライゼーションプロセスでエラーが発生した場合。
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        wtr.write_all(MODEL_MAGIC)?;

        let padding_bytes = vec![0xFF; PADDING_LEN];
        wtr.write_all(&padding_bytes)?;

        with_arena(|arena: &mut Arena| {
            let writer = IoWriter::new(&mut wtr);
            let mut serializer = Serializer::new(writer, arena.acquire(), Share::new());
            serialize_using::<_, Error>(self, &mut serializer)
        })
        .map_err(|e| {
            KanadicError::invalid_state("rkyv serialization failed".to_string(), e.to_string())
        })?;

        wtr.flush()?;
        Ok(())
    }
}

/// 変換候補の検索に使う読み取り専用の辞書。
///
/// 複製しても内部データは共有されるため、複数のスレッドから
/// ロックなしで同時に参照できます。
#[derive(Debug, Clone)]
pub struct Dictionary {
    inner: Arc<DictionaryInner>,
}

impl Dictionary {
    /// `DictionaryInner`から辞書を作成します。
    pub fn from_inner(dict: DictionaryInner) -> Self {
        Self {
            inner: Arc::new(dict),
        }
    }

    /// 語彙への参照を取得します。
    #[inline(always)]
    pub fn lexicon(&self) -> &Lexicon {
        self.inner.lexicon()
    }

    /// 接続コスト表への参照を取得します。
    #[inline(always)]
    pub fn connector(&self) -> &ConnectionCostTable {
        self.inner.connector()
    }

    /// 辞書データをライターにシリアライズします。
    ///
    /// 形式は[`DictionaryInner::write`]と同じです。
    pub fn write<W>(&self, wtr: W) -> Result<()>
    where
        W: Write,
    {
        self.inner.write(wtr)
    }

    /// 辞書データをZstandardで圧縮してライターに書き込みます。
    ///
    /// # 引数
    ///
    /// * `wtr` - 出力先
    /// * `level` - 圧縮レベル
    pub fn write_zstd<W>(&self, wtr: W, level: i32) -> Result<()>
    where
        W: Write,
    {
        let mut encoder = zstd::Encoder::new(wtr, level)?;
        self.write(&mut encoder)?;
        encoder.finish()?;
        Ok(())
    }

    /// リーダーから辞書を読み込みます。
    ///
    /// アーカイブを検証した後、所有データとして復元します。
    ///
    /// # エラー
    ///
    /// この関数は以下の場合にエラーを返します:
    /// - データを読み込めない場合。
    /// - マジックナンバーが一致しない場合。
    /// - アーカイブが壊れている場合。
    pub fn read<R: Read>(mut rdr: R) -> Result<Self> {
        let mut magic = [0; MODEL_MAGIC_LEN];
        codec::read_exact_or_malformed(&mut rdr, &mut magic, "dictionary")?;

        if &magic[..] != MODEL_MAGIC {
            return Err(KanadicError::invalid_argument(
                "rdr",
                "The magic number of the input model mismatches.",
            ));
        }

        let mut padding_buf = vec![0; PADDING_LEN];
        codec::read_exact_or_malformed(&mut rdr, &mut padding_buf, "dictionary")?;

        let mut buffer = Vec::new();
        rdr.read_to_end(&mut buffer)?;

        let mut aligned_bytes = AlignedVec::<RKYV_ALIGNMENT>::with_capacity(buffer.len());
        aligned_bytes.extend_from_slice(&buffer);

        let inner = rkyv::from_bytes::<DictionaryInner, Error>(&aligned_bytes).map_err(|e| {
            KanadicError::malformed_input(
                "dictionary",
                format!("rkyv validation failed. The dictionary file may be corrupted or incompatible: {e}"),
            )
        })?;
        inner.lexicon.validate()?;
        inner.connector.validate()?;

        Ok(Self::from_inner(inner))
    }

    /// ファイルパスから辞書を読み込みます。
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::read(BufReader::new(File::open(path)?))
    }

    /// Zstandard圧縮された辞書ファイルを読み込みます。
    ///
    /// 展開はメモリ上で行われ、一時ファイルは作成しません。
    pub fn from_zstd<P: AsRef<Path>>(path: P) -> Result<Self> {
        let decoder = zstd::Decoder::new(File::open(path)?)?;
        Self::read(decoder)
    }

    /// 別スレッドで辞書の読み込みを開始します。
    ///
    /// 拡張子が`zst`のファイルはZstandard圧縮辞書として読み込みます。
    /// 読み込みの完了は[`DictionaryLoader::wait`]で待ちます。
    pub fn spawn_load<P: Into<PathBuf>>(path: P) -> DictionaryLoader {
        let path = path.into();
        let handle = thread::spawn(move || {
            if path.extension().is_some_and(|ext| ext == "zst") {
                Self::from_zstd(&path)
            } else {
                Self::from_path(&path)
            }
        });
        DictionaryLoader { handle }
    }

    /// 読みが完全に一致する語を変換候補として返します。
    ///
    /// 候補はスコアの昇順に並びます。
    ///
    /// # 引数
    ///
    /// * `reading` - 読み
    /// * `kind` - 候補の種類
    /// * `prev_right_id` - 直前の語の右文脈ID。文頭では`None`
    pub fn candidates(
        &self,
        reading: &str,
        kind: CandidateType,
        prev_right_id: Option<u16>,
    ) -> Vec<Candidate> {
        let reading_len = reading.chars().count();
        let mut candidates: Vec<Candidate> = self
            .lexicon()
            .entries_of(reading)
            .into_iter()
            .map(|e| {
                Candidate::assemble(
                    e.surface,
                    reading_len,
                    e.cost,
                    Some(e.context),
                    kind,
                    prev_right_id,
                    self.connector(),
                )
            })
            .collect();
        candidates.sort_by_key(|c| c.score());
        candidates
    }
}

/// 別スレッドで読み込み中の辞書
pub struct DictionaryLoader {
    handle: JoinHandle<Result<Dictionary>>,
}

impl DictionaryLoader {
    /// 読み込みが完了するまで待ち、辞書を返します。
    ///
    /// # エラー
    ///
    /// 読み込みに失敗した場合はそのエラーを返します。
    /// 読み込みスレッドがパニックした場合は[`KanadicError::ThreadPanic`]を返します。
    pub fn wait(self) -> Result<Dictionary> {
        self.handle.join().map_err(|e| {
            let msg = e
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| e.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            log::error!("[kanadic] dictionary loading thread panicked: {msg}");
            KanadicError::ThreadPanic(msg)
        })?
    }

    /// 読み込みが完了しているかどうかを返します。
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
