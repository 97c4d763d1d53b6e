//! 辞書の語彙情報を管理するモジュール
//!
//! 読みのトライ、表層形のトライ、読みごとの語の一覧、品詞テーブルを
//! まとめて保持し、読みから語を引く機能を提供します。
//!
//! ソースは`読み,左文脈ID,右文脈ID,コスト,表層形`の形式のCSVです。

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

use rkyv::{Archive, Deserialize, Serialize};

use crate::dictionary::connector::ConnectorView;
use crate::dictionary::pos_table::{PosTable, WordContext};
use crate::dictionary::token_array::{Surface, TokenArray, TokenEntry};
use crate::errors::{KanadicError, Result};
use crate::trie::{BuildTrie, LoudsTrie};
use crate::utils::{hira_to_kata, parse_csv_row};

const NUM_FIELDS: usize = 5;

/// 読みごとに語を引ける語彙
#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
pub struct Lexicon {
    readings: LoudsTrie,
    surfaces: LoudsTrie,
    tokens: TokenArray,
    pos_table: PosTable,
}

/// 語彙から引いた1語
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexEntry {
    pub reading: String,
    pub surface: String,
    pub context: WordContext,
    pub cost: i16,
}

/// ソースCSVの1行
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RawLexEntry {
    pub reading: String,
    pub surface: String,
    pub context: WordContext,
    pub cost: i16,
}

impl Lexicon {
    /// CSV形式の辞書ファイルから新しいインスタンスを構築します。
    ///
    /// 不正な行があると失敗します。不正な行を読み飛ばす場合は
    /// [`LexiconBuilder`]を使用してください。
    ///
    /// # エラー
    ///
    /// ファイルフォーマットが不正な場合にエラーを返します。
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        LexiconBuilder::new().build_from_reader(rdr)
    }

    /// エントリのリストから新しいインスタンスを構築します。
    ///
    /// 読みは辞書順に並べられ、その順番が読みの語IDになります。
    /// 読みのトライには、その読みに属する語の最小コストを格納します。
    pub(crate) fn from_entries(entries: &[RawLexEntry]) -> Result<Self> {
        let mut groups: BTreeMap<&str, Vec<&RawLexEntry>> = BTreeMap::new();
        for e in entries {
            groups.entry(e.reading.as_str()).or_default().push(e);
        }

        let mut reading_trie = BuildTrie::new();
        for (reading, group) in &groups {
            let best = group.iter().map(|e| e.cost).min().unwrap_or_default();
            if !reading_trie.insert(reading, best) {
                return Err(KanadicError::invalid_argument(
                    "entries",
                    "includes an empty reading.",
                ));
            }
        }

        let surface_words: BTreeSet<&str> = entries
            .iter()
            .filter(|e| e.surface != e.reading && e.surface != hira_to_kata(&e.reading))
            .map(|e| e.surface.as_str())
            .collect();
        let surface_records: Vec<(&str, i16)> = surface_words.into_iter().map(|s| (s, 0)).collect();
        let surfaces = LoudsTrie::from_records(&surface_records)?;

        let pos_table = PosTable::from_contexts(entries.iter().map(|e| e.context))?;
        let pos_map = pos_table.index_map();

        let mut token_groups = Vec::with_capacity(groups.len());
        for (reading, group) in &groups {
            let katakana = hira_to_kata(reading);
            let mut tokens = Vec::with_capacity(group.len());
            for e in group {
                let surface = if e.surface == *reading {
                    Surface::Reading
                } else if e.surface == katakana {
                    Surface::Katakana
                } else {
                    let node = surfaces.node_index(&e.surface).ok_or_else(|| {
                        KanadicError::invalid_state("surface missing from the trie", e.surface.clone())
                    })?;
                    Surface::Node(u32::try_from(node)?)
                };
                let pos_index = pos_map.get(&e.context).copied().ok_or_else(|| {
                    KanadicError::invalid_state("context missing from the POS table", e.surface.clone())
                })?;
                tokens.push(TokenEntry {
                    pos_index,
                    word_cost: e.cost,
                    surface,
                });
            }
            token_groups.push(tokens);
        }

        let lexicon = Self {
            readings: LoudsTrie::from_build_trie(&reading_trie)?,
            surfaces,
            tokens: TokenArray::from_groups(token_groups)?,
            pos_table,
        };
        log::debug!(
            "[kanadic] built lexicon: {} readings, {} entries, {} POS pairs",
            lexicon.readings.num_words(),
            lexicon.tokens.num_tokens(),
            lexicon.pos_table.len()
        );
        Ok(lexicon)
    }

    /// 読みのトライを返します。
    #[inline(always)]
    pub fn readings(&self) -> &LoudsTrie {
        &self.readings
    }

    /// 表層形のトライを返します。
    #[inline(always)]
    pub fn surfaces(&self) -> &LoudsTrie {
        &self.surfaces
    }

    /// 品詞テーブルを返します。
    #[inline(always)]
    pub fn pos_table(&self) -> &PosTable {
        &self.pos_table
    }

    /// 語の総数を返します。
    #[inline(always)]
    pub fn num_entries(&self) -> usize {
        self.tokens.num_tokens()
    }

    fn expand(&self, reading: &str, term_id: u32) -> impl Iterator<Item = LexEntry> + '_ {
        let reading = reading.to_string();
        self.tokens.entries(term_id).filter_map(move |t| {
            let context = self.pos_table.get(t.pos_index)?;
            let surface = match t.surface {
                Surface::Reading => reading.clone(),
                Surface::Katakana => hira_to_kata(&reading),
                Surface::Node(n) => self.surfaces.word(n as usize),
            };
            Some(LexEntry {
                reading: reading.clone(),
                surface,
                context,
                cost: t.word_cost,
            })
        })
    }

    /// 読みが完全に一致する語を返します。
    pub fn entries_of(&self, reading: &str) -> Vec<LexEntry> {
        let Some(term_id) = self
            .readings
            .node_index(reading)
            .and_then(|node| self.readings.term_id(node))
        else {
            return vec![];
        };
        self.expand(reading, term_id).collect()
    }

    /// 入力の接頭辞になっている読みの語を、読みの短い順に返します。
    pub fn common_prefix_entries(&self, input: &str) -> Vec<LexEntry> {
        self.readings
            .common_prefix_search(input)
            .flat_map(|m| self.expand(&m.word, m.term_id).collect::<Vec<_>>())
            .collect()
    }

    /// `prefix`で始まる読みを最大`limit`個選び、その語を返します。
    pub fn predictive_entries(&self, prefix: &str, limit: usize) -> Vec<LexEntry> {
        self.readings
            .predictive_search(prefix, limit)
            .into_iter()
            .flat_map(|m| self.expand(&m.word, m.term_id).collect::<Vec<_>>())
            .collect()
    }

    /// 文脈IDがコネクターで有効かどうかをチェックします。
    ///
    /// # 引数
    ///
    /// * `conn` - コネクター
    ///
    /// # 戻り値
    ///
    /// すべてのIDが有効な場合は `true`
    pub fn verify<C>(&self, conn: &C) -> bool
    where
        C: ConnectorView,
    {
        self.pos_table.contexts().iter().all(|ctx| {
            usize::from(ctx.right_id) < conn.num_left() && usize::from(ctx.left_id) < conn.num_right()
        })
    }

    /// 読み込んだ語彙の各部が互いに整合しているかを検証します。
    pub(crate) fn validate(&self) -> Result<()> {
        self.readings.validate()?;
        self.surfaces.validate()?;
        self.tokens
            .validate(self.surfaces.num_nodes(), self.pos_table.len())?;
        if self.tokens.num_readings() != self.readings.num_words() {
            return Err(KanadicError::malformed_input(
                "lexicon",
                "the token array does not match the reading trie",
            ));
        }
        Ok(())
    }
}

/// CSVから[`Lexicon`]を構築するビルダー
#[derive(Debug, Clone, Default)]
pub struct LexiconBuilder {
    skip_invalid_rows: bool,
}

impl LexiconBuilder {
    /// 新しいビルダーを作成します。
    pub const fn new() -> Self {
        Self {
            skip_invalid_rows: false,
        }
    }

    /// 不正な行を警告ログに残して読み飛ばすかどうかを設定します。
    ///
    /// 既定では不正な行があると構築に失敗します。
    pub const fn skip_invalid_rows(mut self, yes: bool) -> Self {
        self.skip_invalid_rows = yes;
        self
    }

    /// CSVを読み込み、[`Lexicon`]を構築します。
    ///
    /// 読みまたは表層形が空の行は常に警告ログに残して読み飛ばします。
    ///
    /// # エラー
    ///
    /// 読み込みに失敗した場合、入力がUTF-8でない場合、
    /// または不正な行がある場合にエラーを返します。
    pub fn build_from_reader<R>(&self, mut rdr: R) -> Result<Lexicon>
    where
        R: Read,
    {
        let mut buf = vec![];
        rdr.read_to_end(&mut buf)?;
        let text = std::str::from_utf8(&buf)?;
        let entries = self.parse_csv(text, "lex.csv")?;
        Lexicon::from_entries(&entries)
    }

    pub(crate) fn parse_csv(&self, text: &str, name: &'static str) -> Result<Vec<RawLexEntry>> {
        let mut entries = vec![];
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_row(line, name) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {
                    log::warn!("[kanadic] {name}:{}: skipped a row with an empty field", i + 1);
                }
                Err(e) if self.skip_invalid_rows => {
                    log::warn!("[kanadic] {name}:{}: skipped an invalid row: {e}", i + 1);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(entries)
    }
}

fn parse_row(line: &str, name: &'static str) -> Result<Option<RawLexEntry>> {
    let fields = parse_csv_row(line);
    if fields.len() < NUM_FIELDS {
        return Err(KanadicError::malformed_input(
            name,
            format!("a row must have {NUM_FIELDS} fields: {line}"),
        ));
    }
    let left_id = fields[1].trim().parse()?;
    let right_id = fields[2].trim().parse()?;
    let cost = fields[3].trim().parse()?;
    let (reading, surface) = (&fields[0], &fields[4]);
    if reading.is_empty() || surface.is_empty() {
        return Ok(None);
    }
    Ok(Some(RawLexEntry {
        reading: reading.clone(),
        surface: surface.clone(),
        context: WordContext::new(left_id, right_id),
        cost,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEX_CSV: &str = "\
きょう,1,1,300,今日
きょう,2,2,500,京
きょう,1,1,800,きょう
きょうと,3,3,400,京都
かな,1,1,200,カナ
かな,1,1,250,仮名
";

    fn surfaces(entries: &[LexEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.surface.as_str()).collect()
    }

    #[test]
    fn test_entries_of() {
        let lex = Lexicon::from_reader(LEX_CSV.as_bytes()).unwrap();
        assert_eq!(lex.num_entries(), 6);
        assert_eq!(lex.readings().num_words(), 3);

        let e = lex.entries_of("きょう");
        assert_eq!(surfaces(&e), vec!["今日", "京", "きょう"]);
        assert_eq!(e[1].context, WordContext::new(2, 2));
        assert_eq!(e[1].cost, 500);

        assert_eq!(surfaces(&lex.entries_of("かな")), vec!["カナ", "仮名"]);
        assert!(lex.entries_of("きょ").is_empty());
        assert!(lex.entries_of("なし").is_empty());
    }

    #[test]
    fn test_reading_cost_is_best_entry() {
        let lex = Lexicon::from_reader(LEX_CSV.as_bytes()).unwrap();
        let node = lex.readings().node_index("きょう").unwrap();
        assert_eq!(lex.readings().cost(node), Some(300));
    }

    #[test]
    fn test_surface_trie_excludes_kana() {
        let lex = Lexicon::from_reader(LEX_CSV.as_bytes()).unwrap();
        assert!(lex.surfaces().contains("京都"));
        assert!(!lex.surfaces().contains("カナ"));
        assert!(!lex.surfaces().contains("きょう"));
    }

    #[test]
    fn test_prefix_and_predictive() {
        let lex = Lexicon::from_reader(LEX_CSV.as_bytes()).unwrap();
        let e = lex.common_prefix_entries("きょうとし");
        assert_eq!(surfaces(&e), vec!["今日", "京", "きょう", "京都"]);

        let e = lex.predictive_entries("きょ", 1);
        assert!(e.iter().all(|e| e.reading == "きょう"));
        assert_eq!(lex.predictive_entries("きょ", 10).len(), 4);
    }

    #[test]
    fn test_invalid_rows() {
        let csv = "きょう,1,1,300,今日\nこわれた,1\nから,0,0,0,\n";
        assert!(matches!(
            Lexicon::from_reader(csv.as_bytes()),
            Err(KanadicError::MalformedInput(_))
        ));

        let lex = LexiconBuilder::new()
            .skip_invalid_rows(true)
            .build_from_reader(csv.as_bytes())
            .unwrap();
        assert_eq!(lex.num_entries(), 1);

        assert!(Lexicon::from_reader("きょう,x,1,300,今日".as_bytes()).is_err());
    }
}
