//! ユーティリティ関数を提供するモジュール
//!
//! CSV行の解析と、かなの変換を含みます。

use csv_core::ReadFieldResult;

/// CSV形式の行を解析してフィールドのベクターに分割する
///
/// ダブルクォートで囲まれたフィールドや、フィールド内のカンマも正しく処理します。
///
/// # 引数
///
/// * `row` - 解析するCSV形式の文字列
///
/// # 戻り値
///
/// 解析されたフィールドを格納する文字列のベクター
///
/// # 例
///
/// ```
/// # use kanadic::utils::parse_csv_row;
/// let fields = parse_csv_row("とうきょう,1,1,100,東京");
/// assert_eq!(fields, vec!["とうきょう", "1", "1", "100", "東京"]);
///
/// let fields_with_quote = parse_csv_row("かんま,0,0,0,\"1,2\"");
/// assert_eq!(fields_with_quote[4], "1,2");
/// ```
pub fn parse_csv_row(row: &str) -> Vec<String> {
    let mut fields = vec![];
    let mut rdr = csv_core::Reader::new();
    let mut bytes = row.as_bytes();
    let mut output = [0; 4096];
    loop {
        let (result, nin, nout) = rdr.read_field(bytes, &mut output);
        let end = match result {
            ReadFieldResult::InputEmpty => true,
            ReadFieldResult::Field { .. } => false,
            ReadFieldResult::End => true,
            ReadFieldResult::OutputFull => true,
        };
        fields.push(String::from_utf8_lossy(&output[..nout]).into_owned());
        if end {
            break;
        }
        bytes = &bytes[nin..];
    }
    fields
}

/// ひらがなをカタカナに変換します。
///
/// ひらがな以外の文字はそのまま残します。
pub fn hira_to_kata(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ぁ'..='ゖ' | 'ゝ' | 'ゞ' => char::from_u32(u32::from(c) + 0x60).unwrap_or(c),
            _ => c,
        })
        .collect()
}
