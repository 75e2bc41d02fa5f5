//! 比对 oracle：引擎只依赖这里的两个 trait，具体比对器可替换。

pub mod blast;
pub mod hit;
pub mod local;
pub mod msa;
pub mod sw;

pub use blast::Blastn;
pub use hit::{best_hit, AlignmentHit, Strand};
pub use local::{LocalAligner, SmithWaterman};
pub use msa::{GappedRows, Mafft, MultiAligner, PrecomputedMsa};
pub use sw::{local_sw, SwParams};

/// 命中过滤条件
#[derive(Debug, Clone, Copy, Default)]
pub struct HitFilter {
    pub min_score: f64,
    pub min_identity: f64,
    /// 只接受指定方向的命中
    pub strand: Option<Strand>,
}

impl HitFilter {
    pub fn accepts(&self, hit: &AlignmentHit) -> bool {
        hit.passes(self.min_score, self.min_identity) && self.strand.map_or(true, |s| hit.strand() == s)
    }
}

/// 用锚序列比对加倍后的 subject，返回通过过滤的最佳命中
pub fn best_doubled_hit(
    aligner: &dyn LocalAligner,
    anchor: &[u8],
    bases: &[u8],
    filter: HitFilter,
) -> Result<Option<AlignmentHit>, crate::error::RotateError> {
    if bases.is_empty() || anchor.is_empty() {
        return Ok(None);
    }
    let subject = crate::util::dna::doubled(bases);
    let hits = aligner.align(anchor, &subject)?;
    Ok(best_hit(hits.iter().filter(|h| filter.accepts(h))).cloned())
}
