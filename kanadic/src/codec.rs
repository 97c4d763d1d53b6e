//! 配列のバイナリ符号化と圧縮
//!
//! 既存の辞書アセットと互換のビッグエンディアン形式で配列を読み書きします。
//!
//! | 配列 | 形式 |
//! |------|------|
//! | `i16` | `[i32 要素数][要素数 × i16]` |
//! | `char` | `[u8 要素数][要素数 × u8]` |
//! | `i32` | `[u8 要素数][要素数 × u8]` |
//! | `bool` | `[u8 要素数][要素数 × u8 (0/1)]` |
//!
//! `char`・`i32`・`bool`の形式は要素数も値も1バイトに切り詰められます。
//! 旧形式との互換性のため形式は変えず、情報が失われる書き込みは警告ログに残します。

use std::io::{self, BufWriter, Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::errors::{KanadicError, Result};

pub(crate) fn read_exact_or_malformed<R: Read>(rdr: &mut R, buf: &mut [u8], what: &'static str) -> Result<()> {
    rdr.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            KanadicError::malformed_input(what, "unexpected end of stream")
        }
        _ => KanadicError::from(e),
    })
}

/// ヘッダーが示す`len`バイトを読み込みます。読み込んだ分だけ領域を確保します。
fn read_len_or_malformed<R: Read>(rdr: &mut R, len: u64, what: &'static str) -> Result<Vec<u8>> {
    let mut buf = vec![];
    rdr.by_ref().take(len).read_to_end(&mut buf)?;
    if buf.len() as u64 != len {
        return Err(KanadicError::malformed_input(
            what,
            format!("expected {len} bytes, got {}", buf.len()),
        ));
    }
    Ok(buf)
}

fn warn_if_lossy(what: &str, len: usize, lossy_values: usize) {
    if len > usize::from(u8::MAX) {
        log::warn!("[kanadic] {what} array of {len} elements: count truncated to one byte");
    }
    if lossy_values != 0 {
        log::warn!("[kanadic] {what} array: {lossy_values} values truncated to one byte");
    }
}

/// `i16`配列を書き込みます。
///
/// # エラー
///
/// 書き込みに失敗した場合、または要素数が`i32`で表せない場合にエラーを返します。
pub fn write_short_array<W: Write>(wtr: W, values: &[i16]) -> Result<()> {
    let mut wtr = BufWriter::new(wtr);
    wtr.write_all(&i32::try_from(values.len())?.to_be_bytes())?;
    for v in values {
        wtr.write_all(&v.to_be_bytes())?;
    }
    wtr.flush()?;
    Ok(())
}

/// [`write_short_array`]で書き込まれた`i16`配列を読み込みます。
///
/// # エラー
///
/// 要素数が負の場合やストリームが途中で終わった場合は
/// [`KanadicError::MalformedInput`]を返します。
pub fn read_short_array<R: Read>(mut rdr: R) -> Result<Vec<i16>> {
    let mut buf = [0; 4];
    read_exact_or_malformed(&mut rdr, &mut buf, "short array")?;
    let len = i32::from_be_bytes(buf);
    let len = u64::try_from(len)
        .map_err(|_| KanadicError::malformed_input("short array", format!("negative length {len}")))?;

    let bytes = read_len_or_malformed(&mut rdr, len * 2, "short array")?;
    be_bytes_to_i16s(&bytes)
}

/// `char`配列を旧形式で書き込みます。
///
/// 各文字はコードポイントの下位1バイトだけが書き込まれます。
pub fn write_char_array<W: Write>(wtr: W, values: &[char]) -> Result<()> {
    let lossy = values.iter().filter(|&&c| u32::from(c) > 0xFF).count();
    warn_if_lossy("char", values.len(), lossy);

    let mut wtr = BufWriter::new(wtr);
    wtr.write_all(&[values.len() as u8])?;
    let bytes: Vec<u8> = values.iter().map(|&c| u32::from(c) as u8).collect();
    wtr.write_all(&bytes)?;
    wtr.flush()?;
    Ok(())
}

/// [`write_char_array`]で書き込まれた`char`配列を読み込みます。
pub fn read_char_array<R: Read>(mut rdr: R) -> Result<Vec<char>> {
    let bytes = read_byte_array(&mut rdr, "char array")?;
    Ok(bytes.into_iter().map(char::from).collect())
}

/// `i32`配列を旧形式で書き込みます。
///
/// 各値は下位1バイトだけが書き込まれます。
pub fn write_int_array<W: Write>(wtr: W, values: &[i32]) -> Result<()> {
    let lossy = values.iter().filter(|&&v| !(0..=0xFF).contains(&v)).count();
    warn_if_lossy("int", values.len(), lossy);

    let mut wtr = BufWriter::new(wtr);
    wtr.write_all(&[values.len() as u8])?;
    let bytes: Vec<u8> = values.iter().map(|&v| v as u8).collect();
    wtr.write_all(&bytes)?;
    wtr.flush()?;
    Ok(())
}

/// [`write_int_array`]で書き込まれた`i32`配列を読み込みます。
pub fn read_int_array<R: Read>(mut rdr: R) -> Result<Vec<i32>> {
    let bytes = read_byte_array(&mut rdr, "int array")?;
    Ok(bytes.into_iter().map(i32::from).collect())
}

/// `bool`配列を旧形式で書き込みます。
pub fn write_bool_array<W: Write>(wtr: W, values: &[bool]) -> Result<()> {
    warn_if_lossy("bool", values.len(), 0);

    let mut wtr = BufWriter::new(wtr);
    wtr.write_all(&[values.len() as u8])?;
    let bytes: Vec<u8> = values.iter().map(|&b| u8::from(b)).collect();
    wtr.write_all(&bytes)?;
    wtr.flush()?;
    Ok(())
}

/// [`write_bool_array`]で書き込まれた`bool`配列を読み込みます。
pub fn read_bool_array<R: Read>(mut rdr: R) -> Result<Vec<bool>> {
    let bytes = read_byte_array(&mut rdr, "bool array")?;
    Ok(bytes.into_iter().map(|b| b != 0).collect())
}

fn read_byte_array<R: Read>(rdr: &mut R, what: &'static str) -> Result<Vec<u8>> {
    let mut len = [0; 1];
    read_exact_or_malformed(rdr, &mut len, what)?;
    let mut bytes = vec![0; usize::from(len[0])];
    read_exact_or_malformed(rdr, &mut bytes, what)?;
    Ok(bytes)
}

/// `i16`列をビッグエンディアンのバイト列に変換します。
pub fn i16s_to_be_bytes(values: &[i16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

/// ビッグエンディアンのバイト列を`i16`列に変換します。
///
/// # エラー
///
/// バイト数が奇数の場合は[`KanadicError::MalformedInput`]を返します。
pub fn be_bytes_to_i16s(bytes: &[u8]) -> Result<Vec<i16>> {
    if bytes.len() % 2 != 0 {
        return Err(KanadicError::malformed_input(
            "short bytes",
            format!("odd byte length {}", bytes.len()),
        ));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|c| i16::from_be_bytes([c[0], c[1]]))
        .collect())
}

/// バイト列をzlib形式で圧縮します。
///
/// 出力は展開後の長さを含まないため、呼び出し側で長さを保持する必要があります。
pub fn deflate(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// [`deflate`]で圧縮されたバイト列を展開します。
///
/// # 引数
///
/// * `bytes` - 圧縮データ
/// * `expected_len` - 展開後のバイト数
///
/// # エラー
///
/// データが壊れている場合や、展開後の長さが`expected_len`と異なる場合は
/// [`KanadicError::MalformedInput`]を返します。
pub fn inflate(bytes: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(bytes).take(expected_len as u64 + 1);
    let mut out = vec![];
    decoder
        .read_to_end(&mut out)
        .map_err(|e| KanadicError::malformed_input("deflate stream", e.to_string()))?;
    if out.len() != expected_len {
        return Err(KanadicError::malformed_input(
            "deflate stream",
            format!("expected {expected_len} bytes, got {}", out.len()),
        ));
    }
    Ok(out)
}

/// 自己記述的な圧縮ブロックを書き込みます。
///
/// 形式は`[u32 展開後の長さ][u32 圧縮後の長さ][圧縮データ]`(ビッグエンディアン)です。
pub fn write_deflate_block<W: Write>(mut wtr: W, bytes: &[u8]) -> Result<()> {
    let compressed = deflate(bytes)?;
    wtr.write_all(&u32::try_from(bytes.len())?.to_be_bytes())?;
    wtr.write_all(&u32::try_from(compressed.len())?.to_be_bytes())?;
    wtr.write_all(&compressed)?;
    Ok(())
}

/// [`write_deflate_block`]で書き込まれたブロックを読み込み、展開します。
///
/// # エラー
///
/// ブロックが途中で終わっている場合や、展開後の長さが一致しない場合は
/// [`KanadicError::MalformedInput`]を返します。
pub fn read_deflate_block<R: Read>(mut rdr: R) -> Result<Vec<u8>> {
    let mut header = [0; 8];
    read_exact_or_malformed(&mut rdr, &mut header, "deflate block")?;
    let raw_len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    let compressed_len = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);

    let compressed = read_len_or_malformed(&mut rdr, u64::from(compressed_len), "deflate block")?;
    inflate(&compressed, usize::try_from(raw_len)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_array_layout() {
        let mut buf = vec![];
        write_short_array(&mut buf, &[1, -2, 0x1234]).unwrap();
        assert_eq!(
            buf,
            vec![0, 0, 0, 3, 0x00, 0x01, 0xFF, 0xFE, 0x12, 0x34]
        );
        assert_eq!(read_short_array(buf.as_slice()).unwrap(), vec![1, -2, 0x1234]);
    }

    #[test]
    fn test_short_array_truncated() {
        let buf = [0, 0, 0, 3, 0x00, 0x01];
        assert!(matches!(
            read_short_array(&buf[..]),
            Err(KanadicError::MalformedInput(_))
        ));
        let buf = [0xFF, 0xFF, 0xFF, 0xFF];
        assert!(matches!(
            read_short_array(&buf[..]),
            Err(KanadicError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_legacy_arrays() {
        let mut buf = vec![];
        write_char_array(&mut buf, &['a', 'z']).unwrap();
        assert_eq!(buf, vec![2, b'a', b'z']);
        assert_eq!(read_char_array(buf.as_slice()).unwrap(), vec!['a', 'z']);

        let mut buf = vec![];
        write_bool_array(&mut buf, &[true, false, true]).unwrap();
        assert_eq!(buf, vec![3, 1, 0, 1]);
        assert_eq!(
            read_bool_array(buf.as_slice()).unwrap(),
            vec![true, false, true]
        );
    }

    #[test]
    fn test_legacy_arrays_truncate() {
        let mut buf = vec![];
        write_int_array(&mut buf, &[7, 300]).unwrap();
        assert_eq!(buf, vec![2, 7, 44]);
        assert_eq!(read_int_array(buf.as_slice()).unwrap(), vec![7, 44]);

        let mut buf = vec![];
        write_char_array(&mut buf, &['あ']).unwrap();
        assert_eq!(buf, vec![1, 0x42]);

        let values = vec![true; 257];
        let mut buf = vec![];
        write_bool_array(&mut buf, &values).unwrap();
        assert_eq!(buf[0], 1);
        assert_eq!(read_bool_array(buf.as_slice()).unwrap(), vec![true]);
    }

    #[test]
    fn test_inflate_deflate() {
        let data: Vec<u8> = (0..2000u32).map(|i| (i * 7 % 251) as u8).collect();
        let compressed = deflate(&data).unwrap();
        assert_eq!(inflate(&compressed, data.len()).unwrap(), data);

        assert!(inflate(&compressed, data.len() - 1).is_err());
        assert!(inflate(&compressed, data.len() + 1).is_err());
        assert!(inflate(&compressed[..compressed.len() / 2], data.len()).is_err());
    }

    #[test]
    fn test_deflate_block() {
        let values: Vec<i16> = (-500..500).collect();
        let mut buf = vec![];
        write_deflate_block(&mut buf, &i16s_to_be_bytes(&values)).unwrap();

        let bytes = read_deflate_block(buf.as_slice()).unwrap();
        assert_eq!(be_bytes_to_i16s(&bytes).unwrap(), values);

        assert!(read_deflate_block(&buf[..buf.len() - 1]).is_err());
        assert!(be_bytes_to_i16s(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_oversized_lengths() {
        let buf = [0x7F, 0xFF, 0xFF, 0xFF, 0x00, 0x01];
        assert!(matches!(
            read_short_array(&buf[..]),
            Err(KanadicError::MalformedInput(_))
        ));

        let buf = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x78, 0x9C];
        assert!(matches!(
            read_deflate_block(&buf[..]),
            Err(KanadicError::MalformedInput(_))
        ));

        let compressed = deflate(&[1, 2, 3]).unwrap();
        let mut buf = vec![0xFF, 0xFF, 0xFF, 0xFF];
        buf.extend_from_slice(&u32::try_from(compressed.len()).unwrap().to_be_bytes());
        buf.extend_from_slice(&compressed);
        assert!(matches!(
            read_deflate_block(buf.as_slice()),
            Err(KanadicError::MalformedInput(_))
        ));
    }
}
