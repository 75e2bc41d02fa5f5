use std::borrow::Cow;

use crate::align::{AlignmentHit, Strand};
use crate::util::dna;

/// 由获胜命中的 query 坐标顺序判断方向
#[inline]
pub fn detect(hit: &AlignmentHit) -> Strand {
    hit.strand()
}

/// 反向时先做反向互补，之后的切点都在互补后的坐标系里解释
pub fn orient(bases: &[u8], strand: Strand) -> Cow<'_, [u8]> {
    match strand {
        Strand::Forward => Cow::Borrowed(bases),
        Strand::Reverse => Cow::Owned(dna::revcomp(bases)),
    }
}
