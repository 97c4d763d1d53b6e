//! 辞書の構築と読み書きに関するテスト

use std::fs::File;

use tempfile::tempdir;

use crate::candidate::CandidateType;
use crate::dictionary::{Dictionary, SystemDictionaryBuilder};
use crate::errors::KanadicError;

const LEX_CSV: &str = include_str!("./resources/lex.csv");
const MATRIX_DEF: &str = include_str!("./resources/matrix.def");

fn build_dict() -> Dictionary {
    let inner = SystemDictionaryBuilder::from_readers(LEX_CSV.as_bytes(), MATRIX_DEF.as_bytes())
        .unwrap();
    Dictionary::from_inner(inner)
}

fn assert_same_lookups(a: &Dictionary, b: &Dictionary) {
    for input in ["きょうとし", "かなだ", "き", "なし"] {
        assert_eq!(
            a.lexicon().common_prefix_entries(input),
            b.lexicon().common_prefix_entries(input)
        );
    }
    for prefix in ["", "か", "きょう"] {
        assert_eq!(
            a.lexicon().predictive_entries(prefix, 5),
            b.lexicon().predictive_entries(prefix, 5)
        );
    }
    assert_eq!(a.connector(), b.connector());
}

#[test]
fn test_lookup() {
    let dict = build_dict();
    assert_eq!(dict.lexicon().num_entries(), 12);

    let surfaces: Vec<_> = dict
        .lexicon()
        .common_prefix_entries("きょうとし")
        .into_iter()
        .map(|e| e.surface)
        .collect();
    assert_eq!(
        surfaces,
        vec!["今日", "京", "きょう", "キョウ", "京都", "京都市"]
    );
}

#[test]
fn test_candidates() {
    let dict = build_dict();

    let c = dict.candidates("かな", CandidateType::PartialReading, None);
    assert_eq!(c.len(), 2);
    assert_eq!(c[0].string(), "仮名");
    assert_eq!(c[0].score(), 2500);
    assert_eq!(c[0].length(), 2);
    assert_eq!(c[0].kind(), CandidateType::PartialReading);

    // right_id 1 -> left_id 1: 412, left_id 3: 77
    let c = dict.candidates("かな", CandidateType::PartialReading, Some(1));
    assert_eq!(c[0].score(), 2500 + 412);
    assert_eq!(c[1].score(), 3200 + 77);

    // right_id 3 -> left_id 3 is missing from matrix.def
    let c = dict.candidates("かな", CandidateType::PartialReading, Some(3));
    assert_eq!(c[0].string(), "仮名");
    assert_eq!(c[1].score(), 3200 + i32::from(i16::MAX));

    assert!(dict.candidates("なし", CandidateType::NBest, None).is_empty());
}

#[test]
fn test_write_read() {
    let dict = build_dict();
    let mut buf = vec![];
    dict.write(&mut buf).unwrap();

    let loaded = Dictionary::read(buf.as_slice()).unwrap();
    assert_same_lookups(&dict, &loaded);
}

#[test]
fn test_read_rejects_bad_input() {
    let dict = build_dict();
    let mut buf = vec![];
    dict.write(&mut buf).unwrap();

    let mut bad_magic = buf.clone();
    bad_magic[0] = b'X';
    assert!(matches!(
        Dictionary::read(bad_magic.as_slice()),
        Err(KanadicError::InvalidArgument(_))
    ));

    let truncated = &buf[..buf.len() / 2];
    assert!(Dictionary::read(truncated).is_err());

    assert!(matches!(
        Dictionary::read(&b"Kana"[..]),
        Err(KanadicError::MalformedInput(_))
    ));
    assert!(matches!(
        Dictionary::read(&buf[..18]),
        Err(KanadicError::MalformedInput(_))
    ));
}

#[test]
fn test_read_corrupted_bytes() {
    let dict = build_dict();
    let mut buf = vec![];
    dict.write(&mut buf).unwrap();

    for pos in 0..buf.len() {
        for mask in [0x01, 0x80, 0xFF] {
            let mut corrupted = buf.clone();
            corrupted[pos] ^= mask;
            // 読み込めた辞書は検索してもパニックしない
            let Ok(dict) = Dictionary::read(corrupted.as_slice()) else {
                continue;
            };
            for input in ["きょうとし", "かなだ", "き", ""] {
                dict.lexicon().common_prefix_entries(input);
                dict.lexicon().predictive_entries(input, 10);
                dict.candidates(input, CandidateType::NBest, Some(0));
            }
        }
    }
}

#[test]
fn test_files_and_background_load() {
    let dict = build_dict();
    let dir = tempdir().unwrap();

    let plain = dir.path().join("system.dic");
    dict.write(File::create(&plain).unwrap()).unwrap();
    let zst = dir.path().join("system.dic.zst");
    dict.write_zstd(File::create(&zst).unwrap(), 3).unwrap();

    assert_same_lookups(&dict, &Dictionary::from_path(&plain).unwrap());
    assert_same_lookups(&dict, &Dictionary::from_zstd(&zst).unwrap());

    let loaded = Dictionary::spawn_load(&zst).wait().unwrap();
    assert_same_lookups(&dict, &loaded);

    let shared = loaded.clone();
    let handle = std::thread::spawn(move || shared.lexicon().entries_of("き").len());
    assert_eq!(handle.join().unwrap(), 2);

    let missing = Dictionary::spawn_load(dir.path().join("missing.dic")).wait();
    assert!(matches!(missing, Err(KanadicError::IoError(_))));
}
