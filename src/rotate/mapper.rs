//! 把共享的旋转参考（锚偏移或比对列）换算成每条序列自己的 0-based 切点。

use crate::align::{AlignmentHit, Strand};
use crate::util::dna;

/// 归一化到 0..len；负数按欧几里得余数回绕。len 为 0 时无意义。
pub fn normalize_offset(raw: i64, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(raw.rem_euclid(len as i64) as usize)
}

/// 逐序列策略下的切点，hit 是该序列自己的最佳命中（subject 为加倍序列）。
///
/// 正向：`(subject_start - 1 + anchor_offset) mod L`。
/// 反向：结果位于反向互补后的坐标系，`(L - subject_end + anchor_offset) mod L`，
/// 即把 `subject_end` 映射到互补链上的位置再加锚偏移。
pub fn pairwise_start(hit: &AlignmentHit, anchor_offset: usize, len: usize) -> Option<usize> {
    let raw = match hit.strand() {
        Strand::Forward => hit.subject_start as i64 - 1 + anchor_offset as i64,
        Strand::Reverse => len as i64 - hit.subject_end as i64 + anchor_offset as i64,
    };
    normalize_offset(raw, len)
}

/// 比对列 -> 切点：该行在 `column`（1-based）之前的非 gap 碱基数。
///
/// 该列为碱基时等于“数到该列的计数减一”；为 gap 时切在其后的第一个碱基。
/// 列越界或行中没有碱基时返回 None。
pub fn column_offset(row: &[u8], column: usize) -> Option<usize> {
    if column == 0 || column > row.len() {
        return None;
    }
    let before = row[..column - 1].iter().filter(|&&b| !dna::is_gap(b)).count();
    let ungapped = before + row[column - 1..].iter().filter(|&&b| !dna::is_gap(b)).count();
    normalize_offset(before as i64, ungapped)
}

/// 旋转点（非 gap 计数，1-based）-> 比对列（1-based）
pub fn point_to_column(row: &[u8], point: usize) -> Option<usize> {
    if point == 0 {
        return None;
    }
    let mut count = 0usize;
    for (i, &b) in row.iter().enumerate() {
        if !dna::is_gap(b) {
            count += 1;
            if count == point {
                return Some(i + 1);
            }
        }
    }
    None
}
