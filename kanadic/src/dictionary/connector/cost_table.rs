//! 行列形式の接続コスト表
//!
//! コストは`data[left_id * num_right + right_id]`の平坦な配列で保持します。
//! 行は前の語の右文脈ID、列は次の語の左文脈IDです。

use std::io::{BufRead, BufReader, Read, Write};

use rkyv::{Archive, Deserialize, Serialize};

use crate::codec;
use crate::dictionary::connector::ConnectorView;
use crate::errors::{KanadicError, Result};

/// 表に存在しない組に対して返されるコスト
pub const MAX_COST: i16 = i16::MAX;

/// 文脈IDは`u16`なので、一辺の長さは`u16::MAX + 1`までです。
const MAX_DIMENSION: usize = u16::MAX as usize + 1;

/// 接続コストの行列
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct ConnectionCostTable {
    data: Vec<i16>,
    num_left: usize,
    num_right: usize,
}

impl ConnectionCostTable {
    /// 平坦なコスト配列から表を作成します。
    ///
    /// # エラー
    ///
    /// `costs`の長さが`num_left * num_right`と一致しない場合にエラーを返します。
    pub fn new(num_left: usize, num_right: usize, costs: Vec<i16>) -> Result<Self> {
        if num_left.checked_mul(num_right) != Some(costs.len()) {
            return Err(KanadicError::invalid_argument(
                "costs",
                format!(
                    "expected {num_left} x {num_right} costs, got {}",
                    costs.len()
                ),
            ));
        }
        Ok(Self {
            data: costs,
            num_left,
            num_right,
        })
    }

    /// 正方行列として表を作成します。一辺の長さは要素数の平方根です。
    ///
    /// # エラー
    ///
    /// 要素数が平方数でない場合にエラーを返します。
    pub fn from_square(costs: Vec<i16>) -> Result<Self> {
        let side = costs.len().isqrt();
        if side * side != costs.len() {
            return Err(KanadicError::invalid_argument(
                "costs",
                format!("{} is not a square number", costs.len()),
            ));
        }
        Self::new(side, side, costs)
    }

    /// `matrix.def`形式のテキストから表を作成します。
    ///
    /// 1行目が`行数 列数`、以降の各行が`左ID 右ID コスト`です。
    /// 記載のない組には[`MAX_COST`]が入ります。
    ///
    /// # エラー
    ///
    /// 書式が不正な場合、またはIDが範囲外の場合にエラーを返します。
    pub fn from_matrix_def<R: Read>(rdr: R) -> Result<Self> {
        let mut lines = BufReader::new(rdr).lines();

        let header = lines
            .next()
            .ok_or_else(|| KanadicError::malformed_input("matrix.def", "empty input"))??;
        let (num_left, num_right) = match parse_fields(&header)?.as_slice() {
            &[l, r] => (usize::try_from(l)?, usize::try_from(r)?),
            _ => {
                return Err(KanadicError::malformed_input(
                    "matrix.def",
                    format!("invalid header: {header}"),
                ));
            }
        };

        if num_left > MAX_DIMENSION || num_right > MAX_DIMENSION {
            return Err(KanadicError::malformed_input(
                "matrix.def",
                format!("dimensions exceed {MAX_DIMENSION}: {header}"),
            ));
        }
        let size = num_left.checked_mul(num_right).ok_or_else(|| {
            KanadicError::malformed_input("matrix.def", format!("too large dimensions: {header}"))
        })?;

        let mut data = vec![MAX_COST; size];
        for line in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let &[left, right, cost] = parse_fields(&line)?.as_slice() else {
                return Err(KanadicError::malformed_input(
                    "matrix.def",
                    format!("invalid line: {line}"),
                ));
            };
            let (left, right) = (usize::try_from(left)?, usize::try_from(right)?);
            if left >= num_left || right >= num_right {
                return Err(KanadicError::malformed_input(
                    "matrix.def",
                    format!("ids out of range: {line}"),
                ));
            }
            data[left * num_right + right] = i16::try_from(cost)?;
        }

        Self::new(num_left, num_right, data)
    }

    /// 読み込んだ表の大きさが次元と一致しているかを検証します。
    pub(crate) fn validate(&self) -> Result<()> {
        if self.num_left.checked_mul(self.num_right) != Some(self.data.len()) {
            return Err(KanadicError::malformed_input(
                "connection cost table",
                format!(
                    "expected {} x {} costs, got {}",
                    self.num_left,
                    self.num_right,
                    self.data.len()
                ),
            ));
        }
        Ok(())
    }

    /// 接続コストを返します。
    ///
    /// 表の範囲外の組には[`MAX_COST`]を返します。
    ///
    /// # 引数
    ///
    /// * `left_id` - 前の語の右文脈ID
    /// * `right_id` - 次の語の左文脈ID
    #[inline(always)]
    pub fn cost(&self, left_id: u16, right_id: u16) -> i16 {
        let (left, right) = (usize::from(left_id), usize::from(right_id));
        if left >= self.num_left || right >= self.num_right {
            return MAX_COST;
        }
        self.data[left * self.num_right + right]
    }

    /// 平坦なコスト配列を返します。
    #[inline(always)]
    pub fn costs(&self) -> &[i16] {
        &self.data
    }

    /// 旧形式の圧縮コスト表を書き込みます。
    ///
    /// ビッグエンディアンの`i16`列をzlib形式で圧縮したものだけを書き込みます。
    /// 展開後のバイト数は出力に含まれないため、戻り値を別途保存してください。
    ///
    /// # 戻り値
    ///
    /// 展開後のバイト数
    pub fn build<W: Write>(costs: &[i16], mut wtr: W) -> Result<usize> {
        let bytes = codec::i16s_to_be_bytes(costs);
        wtr.write_all(&codec::deflate(&bytes)?)?;
        wtr.flush()?;
        Ok(bytes.len())
    }

    /// 旧形式の圧縮コスト表を読み込みます。
    ///
    /// # エラー
    ///
    /// データが壊れている場合や長さが一致しない場合は
    /// [`KanadicError::MalformedInput`]を返します。
    pub fn try_read<R: Read>(mut rdr: R, byte_len: usize) -> Result<Vec<i16>> {
        let mut compressed = vec![];
        rdr.read_to_end(&mut compressed)?;
        codec::be_bytes_to_i16s(&codec::inflate(&compressed, byte_len)?)
    }

    /// 旧形式の圧縮コスト表を読み込みます。
    ///
    /// 失敗した場合はエラーログを出力し、空の配列を返します。
    /// 空の表で辞書を組み立てないよう、通常は[`load`](Self::load)を使用してください。
    pub fn read<R: Read>(rdr: R, byte_len: usize) -> Vec<i16> {
        match Self::try_read(rdr, byte_len) {
            Ok(costs) => costs,
            Err(e) => {
                log::error!("[kanadic] failed to read the connection cost table: {e}");
                vec![]
            }
        }
    }

    /// 旧形式の圧縮コスト表を正方行列として読み込みます。
    ///
    /// # エラー
    ///
    /// 読み込みに失敗して表が空になった場合は[`KanadicError::MalformedInput`]を返します。
    pub fn load<R: Read>(rdr: R, byte_len: usize) -> Result<Self> {
        let costs = Self::read(rdr, byte_len);
        if costs.is_empty() {
            return Err(KanadicError::malformed_input(
                "connection cost table",
                "the table is empty",
            ));
        }
        Self::from_square(costs)
    }

    /// 行数・列数を含む自己記述的な圧縮ブロックとして書き込みます。
    pub fn write_block<W: Write>(&self, mut wtr: W) -> Result<()> {
        wtr.write_all(&u32::try_from(self.num_left)?.to_be_bytes())?;
        wtr.write_all(&u32::try_from(self.num_right)?.to_be_bytes())?;
        codec::write_deflate_block(&mut wtr, &codec::i16s_to_be_bytes(&self.data))?;
        wtr.flush()?;
        Ok(())
    }

    /// [`write_block`](Self::write_block)で書き込まれた表を読み込みます。
    pub fn read_block<R: Read>(mut rdr: R) -> Result<Self> {
        let mut dims = [0; 8];
        rdr.read_exact(&mut dims).map_err(|_| {
            KanadicError::malformed_input("connection cost block", "truncated header")
        })?;
        let num_left = u32::from_be_bytes([dims[0], dims[1], dims[2], dims[3]]);
        let num_right = u32::from_be_bytes([dims[4], dims[5], dims[6], dims[7]]);
        let costs = codec::be_bytes_to_i16s(&codec::read_deflate_block(&mut rdr)?)?;
        Self::new(usize::try_from(num_left)?, usize::try_from(num_right)?, costs)
            .map_err(|e| KanadicError::malformed_input("connection cost block", e.to_string()))
    }

    /// 非圧縮の`i16`配列として書き込みます。
    pub fn write_raw<W: Write>(&self, wtr: W) -> Result<()> {
        codec::write_short_array(wtr, &self.data)
    }

    /// [`write_raw`](Self::write_raw)で書き込まれた正方行列を読み込みます。
    pub fn read_raw<R: Read>(rdr: R) -> Result<Self> {
        let costs = codec::read_short_array(rdr)?;
        Self::from_square(costs)
            .map_err(|e| KanadicError::malformed_input("connection cost array", e.to_string()))
    }
}

impl ConnectorView for ConnectionCostTable {
    #[inline(always)]
    fn num_left(&self) -> usize {
        self.num_left
    }

    #[inline(always)]
    fn num_right(&self) -> usize {
        self.num_right
    }
}

fn parse_fields(line: &str) -> Result<Vec<i64>> {
    line.split_ascii_whitespace()
        .map(|s| s.parse::<i64>().map_err(KanadicError::from))
        .collect()
}
