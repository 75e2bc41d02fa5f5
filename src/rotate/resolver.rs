use serde::Serialize;

use super::mapper;
use crate::align::{AlignmentHit, Strand};

/// 整次运行共享的一个旋转参考
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RotationReference {
    /// 没有任何命中：全部序列原样通过
    None,
    /// 锚序列坐标系中的偏移（逐序列策略）
    AnchorOffset(usize),
    /// 多序列比对中的 1-based 列号（比对列策略）
    Column(usize),
}

/// 所有序列的命中里得分最高的一个，返回 (序列下标, 命中)
pub fn best_of<'a>(hits: &'a [Option<AlignmentHit>]) -> Option<(usize, &'a AlignmentHit)> {
    let mut best: Option<(usize, &AlignmentHit)> = None;
    for (i, h) in hits.iter().enumerate() {
        if let Some(h) = h {
            if best.map(|(_, b)| h.score > b.score).unwrap_or(true) {
                best = Some((i, h));
            }
        }
    }
    best
}

/// ANCHOR_OFFSET：保守标志位于锚序列中的位置；无命中时为 0
pub fn anchor_offset(best: Option<&AlignmentHit>) -> usize {
    match best {
        None => 0,
        Some(h) => match h.strand() {
            Strand::Reverse => h.query_end.saturating_sub(1),
            Strand::Forward => h.query_start.saturating_sub(1),
        },
    }
}

/// ROTATION_POINT：最佳命中序列中对应锚第一个碱基的非 gap 位置（1-based）。
/// 落在加倍序列起点之前时加一个序列长度回绕。
pub fn rotation_point(hit: &AlignmentHit, ungapped_len: usize) -> i64 {
    let point = hit.subject_start as i64 - hit.query_start as i64 + 1;
    if point < 1 {
        point + ungapped_len as i64
    } else {
        point
    }
}

/// ROTATION_COLUMN：在最佳行上把旋转点换算成列。
/// 旋转点超出该行碱基数属于退化输入，回退到第 1 列。
pub fn rotation_column(hit: &AlignmentHit, row: &[u8]) -> usize {
    let ungapped = row.iter().filter(|&&b| !crate::util::dna::is_gap(b)).count();
    let point = rotation_point(hit, ungapped);
    if point < 1 || point as usize > ungapped {
        log::warn!(
            "rotation point {} outside the best sequence (length {}), using column 1",
            point,
            ungapped
        );
        return 1;
    }
    mapper::point_to_column(row, point as usize).unwrap_or(1)
}
