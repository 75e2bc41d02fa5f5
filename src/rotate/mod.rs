//! 旋转引擎：三阶段流水线
//!
//! 1. 收集命中：锚序列对每条（加倍后的）序列做局部比对；
//! 2. 解析参考：在全部命中（以及多序列比对）之上确定唯一的旋转参考，这是全局屏障；
//! 3. 逐序列旋转：把参考映射到每条序列、按方向反向互补、旋转并校验。
//!
//! 阶段 1 与阶段 3 按序列并行（rayon），结果按输入顺序收集。

pub mod mapper;
pub mod resolver;
pub mod rotator;
pub mod strand;

use rayon::prelude::*;
use serde::Serialize;

use crate::align::{self, AlignmentHit, GappedRows, HitFilter, LocalAligner, MultiAligner, Strand};
use crate::error::RotateError;
use crate::store::{Sequence, SequenceStore};
use crate::util::dna;

pub use resolver::RotationReference;
pub use rotator::IntegrityFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// 多序列比对中的共享列（默认）
    Column,
    /// 逐序列偏移，直接来自两两比对
    Pairwise,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Column => write!(f, "column"),
            Strategy::Pairwise => write!(f, "pairwise"),
        }
    }
}

/// 低于此得分的命中不参与旋转；随机序列间的短局部匹配得分远低于它
pub const DEFAULT_MIN_SCORE: f64 = 20.0;

#[derive(Debug, Clone, Copy)]
pub struct RotateOpt {
    pub strategy: Strategy,
    /// 低于该得分的命中视为不存在
    pub min_score: f64,
    /// 低于该 identity（百分比）的命中视为不存在
    pub min_identity: f64,
}

impl Default for RotateOpt {
    fn default() -> Self {
        Self { strategy: Strategy::Column, min_score: DEFAULT_MIN_SCORE, min_identity: 0.0 }
    }
}

impl RotateOpt {
    fn filter(&self) -> HitFilter {
        HitFilter { min_score: self.min_score, min_identity: self.min_identity, strand: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Rotated,
    /// 偏移为 0 且为正向链，输出即输入
    InPhase,
    /// 整个集合与锚序列都没有命中
    NoHomology,
    Unmappable { reason: String },
    Rejected { failure: IntegrityFailure },
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Rotated => write!(f, "rotated"),
            Outcome::InPhase => write!(f, "in_phase"),
            Outcome::NoHomology => write!(f, "no_homology"),
            Outcome::Unmappable { reason } => write!(f, "unmappable: {}", reason),
            Outcome::Rejected { failure } => write!(f, "rejected: {}", failure),
        }
    }
}

/// 每条序列一条，仅用于报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RotationLogEntry {
    pub id: String,
    pub original_length: usize,
    pub offset: Option<usize>,
    pub strand: Strand,
    pub rotated_length: usize,
    pub composition_match: bool,
    pub outcome: Outcome,
}

impl RotationLogEntry {
    pub fn is_rotated(&self) -> bool {
        self.outcome == Outcome::Rotated
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub rotated: usize,
    pub passed_through: usize,
}

impl Summary {
    pub fn from_log(log: &[RotationLogEntry]) -> Self {
        let rotated = log.iter().filter(|e| e.is_rotated()).count();
        Self { total: log.len(), rotated, passed_through: log.len() - rotated }
    }
}

#[derive(Debug)]
pub struct RotationRun {
    pub strategy: Strategy,
    pub reference: RotationReference,
    pub anchor_id: String,
    pub anchor_offset: usize,
    /// 给出旋转参考的那条序列
    pub best_hit_id: Option<String>,
    /// 与输入同序，锚序列在原位置
    pub sequences: Vec<Sequence>,
    pub log: Vec<RotationLogEntry>,
    pub summary: Summary,
}

struct Rotated {
    seq: Sequence,
    entry: RotationLogEntry,
}

fn passthrough(seq: &Sequence, strand: Strand, outcome: Outcome) -> Rotated {
    Rotated {
        seq: seq.clone(),
        entry: RotationLogEntry {
            id: seq.id.clone(),
            original_length: seq.len(),
            offset: None,
            strand,
            rotated_length: seq.len(),
            composition_match: true,
            outcome,
        },
    }
}

fn unmappable(seq: &Sequence, strand: Strand, reason: &str) -> Rotated {
    log::debug!("{}: passed through unrotated ({})", seq.id, reason);
    passthrough(seq, strand, Outcome::Unmappable { reason: reason.to_string() })
}

/// 对已定向的碱基做带校验的旋转；失败时输出原始（未互补）序列
fn apply(seq: &Sequence, oriented: &[u8], strand: Strand, offset: i64) -> Rotated {
    match rotator::checked_rotate(oriented, offset) {
        Ok(_) if offset == 0 && strand == Strand::Forward => {
            log::debug!("{}: already in phase", seq.id);
            let mut out = passthrough(seq, strand, Outcome::InPhase);
            out.entry.offset = Some(0);
            out
        }
        Ok(bases) => {
            let composition_match = dna::composition(&bases) == dna::composition(oriented);
            log::debug!("{}: rotated by {} on {} strand", seq.id, offset, strand);
            Rotated {
                entry: RotationLogEntry {
                    id: seq.id.clone(),
                    original_length: seq.len(),
                    offset: Some(offset as usize),
                    strand,
                    rotated_length: bases.len(),
                    composition_match,
                    outcome: Outcome::Rotated,
                },
                seq: seq.with_bases(bases),
            }
        }
        Err(failure) => {
            log::warn!("{}: rotation by {} rejected: {}", seq.id, offset, failure);
            let mut out = passthrough(seq, strand, Outcome::Rejected { failure });
            out.entry.composition_match = !matches!(failure, IntegrityFailure::CompositionChanged);
            out
        }
    }
}

fn rotate_pairwise(seq: &Sequence, hit: Option<&AlignmentHit>, reference: RotationReference) -> Rotated {
    let anchor_offset = match reference {
        RotationReference::AnchorOffset(o) => o,
        _ => return passthrough(seq, Strand::Forward, Outcome::NoHomology),
    };
    let Some(hit) = hit else {
        return unmappable(seq, Strand::Forward, "no alignment hit against the anchor");
    };
    let strand = strand::detect(hit);
    let oriented = strand::orient(&seq.bases, strand);
    match mapper::pairwise_start(hit, anchor_offset, seq.len()) {
        Some(start) => apply(seq, &oriented, strand, start as i64),
        None => unmappable(seq, strand, "empty sequence"),
    }
}

fn rotate_column(seq: &Sequence, oriented: &Sequence, strand: Strand, rows: &GappedRows, reference: RotationReference) -> Rotated {
    let column = match reference {
        RotationReference::Column(c) => c,
        _ => return passthrough(seq, strand, Outcome::NoHomology),
    };
    let Some(row) = rows.get(&seq.id) else {
        return unmappable(seq, strand, "no row in the multiple alignment");
    };
    let ungapped = dna::strip_gaps(row);
    if !ungapped.eq_ignore_ascii_case(&oriented.bases) {
        return unmappable(seq, strand, "alignment row does not match the sequence");
    }
    match mapper::column_offset(row, column) {
        Some(start) => apply(seq, &oriented.bases, strand, start as i64),
        None => unmappable(seq, strand, "no bases in alignment row"),
    }
}

/// 阶段 1/2/3 的中间结果
struct Resolved {
    reference: RotationReference,
    anchor_offset: usize,
    best_hit_id: Option<String>,
    rotated: Vec<Rotated>,
}

pub struct RotationEngine<'a> {
    local: &'a dyn LocalAligner,
    multi: Option<&'a dyn MultiAligner>,
    opt: RotateOpt,
}

impl<'a> RotationEngine<'a> {
    pub fn new(local: &'a dyn LocalAligner, opt: RotateOpt) -> Self {
        Self { local, multi: None, opt }
    }

    pub fn with_multi(mut self, multi: &'a dyn MultiAligner) -> Self {
        self.multi = Some(multi);
        self
    }

    pub fn run(&self, store: &SequenceStore, anchor_id: &str) -> Result<RotationRun, RotateError> {
        if store.is_empty() {
            return Err(RotateError::EmptyInput);
        }
        let anchor = store
            .get(anchor_id)
            .ok_or_else(|| RotateError::AnchorNotFound(anchor_id.to_string()))?;
        let targets: Vec<&Sequence> = store.iter().filter(|s| s.id != anchor.id).collect();

        log::info!(
            "rotating {} sequences against anchor '{}' ({} bp), strategy {}",
            targets.len(),
            anchor.id,
            anchor.len(),
            self.opt.strategy
        );

        let resolved = match self.opt.strategy {
            Strategy::Pairwise => self.run_pairwise(anchor, &targets)?,
            Strategy::Column => self.run_column(anchor, &targets)?,
        };

        let anchor_out = match resolved.reference {
            RotationReference::None => passthrough(anchor, Strand::Forward, Outcome::NoHomology),
            _ => apply(anchor, &anchor.bases, Strand::Forward, resolved.anchor_offset as i64),
        };

        let mut sequences = Vec::with_capacity(store.len());
        let mut log = Vec::with_capacity(store.len());
        let mut rest = resolved.rotated.into_iter();
        for s in store.iter() {
            let r = if s.id == anchor.id {
                Rotated { seq: anchor_out.seq.clone(), entry: anchor_out.entry.clone() }
            } else {
                match rest.next() {
                    Some(r) => r,
                    None => unreachable!("one result per non-anchor sequence"),
                }
            };
            sequences.push(r.seq);
            log.push(r.entry);
        }

        let summary = Summary::from_log(&log);
        log::info!(
            "{} of {} sequences rotated, {} passed through unrotated",
            summary.rotated,
            summary.total,
            summary.passed_through
        );

        Ok(RotationRun {
            strategy: self.opt.strategy,
            reference: resolved.reference,
            anchor_id: anchor.id.clone(),
            anchor_offset: resolved.anchor_offset,
            best_hit_id: resolved.best_hit_id,
            sequences,
            log,
            summary,
        })
    }

    /// 阶段 1：锚序列对每条加倍序列的最佳命中，与输入同序
    fn collect_hits(&self, anchor: &[u8], seqs: &[&Sequence], filter: HitFilter) -> Result<Vec<Option<AlignmentHit>>, RotateError> {
        seqs.par_iter()
            .map(|s| align::best_doubled_hit(self.local, anchor, &s.bases, filter))
            .collect()
    }

    fn run_pairwise(&self, anchor: &Sequence, targets: &[&Sequence]) -> Result<Resolved, RotateError> {
        let hits = self.collect_hits(&anchor.bases, targets, self.opt.filter())?;

        // barrier: the offset is fixed before any sequence is touched
        let best = resolver::best_of(&hits);
        let anchor_offset = resolver::anchor_offset(best.map(|(_, h)| h));
        let reference = match best {
            Some((i, h)) => {
                log::info!(
                    "best hit: {} (score {:.1}, {} strand), anchor offset {}",
                    targets[i].id,
                    h.score,
                    h.strand(),
                    anchor_offset
                );
                RotationReference::AnchorOffset(anchor_offset)
            }
            None => {
                log::warn!("no sequence aligns to the anchor; nothing will be rotated");
                RotationReference::None
            }
        };
        let best_hit_id = best.map(|(i, _)| targets[i].id.clone());

        let rotated = targets
            .par_iter()
            .zip(hits.par_iter())
            .map(|(s, h)| rotate_pairwise(s, h.as_ref(), reference))
            .collect();

        Ok(Resolved { reference, anchor_offset, best_hit_id, rotated })
    }

    fn run_column(&self, anchor: &Sequence, targets: &[&Sequence]) -> Result<Resolved, RotateError> {
        let multi = self
            .multi
            .ok_or_else(|| RotateError::unavailable("multiple aligner", "none configured"))?;

        // strand normalization before the multiple alignment
        let hits = self.collect_hits(&anchor.bases, targets, self.opt.filter())?;
        let strands: Vec<Strand> = hits
            .iter()
            .map(|h| h.as_ref().map_or(Strand::Forward, strand::detect))
            .collect();
        let oriented: Vec<Sequence> = targets
            .iter()
            .zip(&strands)
            .map(|(s, &st)| s.with_bases(strand::orient(&s.bases, st).into_owned()))
            .collect();
        let n_rev = strands.iter().filter(|&&s| s == Strand::Reverse).count();
        if n_rev > 0 {
            log::info!("{} sequences reverse-complemented before alignment", n_rev);
        }

        let rows = multi.align_multi(&oriented)?;
        log::info!("{}: {} rows aligned", multi.name(), rows.len());

        // best forward hit of the anchor on the ungapped, doubled rows
        let forward = HitFilter { strand: Some(Strand::Forward), ..self.opt.filter() };
        let row_hits: Vec<Option<AlignmentHit>> = oriented
            .par_iter()
            .map(|s| match rows.get(&s.id) {
                Some(row) => align::best_doubled_hit(self.local, &anchor.bases, &dna::strip_gaps(row), forward),
                None => Ok(None),
            })
            .collect::<Result<_, _>>()?;

        let best = resolver::best_of(&row_hits);
        let (reference, best_hit_id) = match best {
            Some((i, h)) => {
                let id = &oriented[i].id;
                let column = resolver::rotation_column(h, &rows[id]);
                log::info!("best hit: {} (score {:.1}), rotation column {}", id, h.score, column);
                (RotationReference::Column(column), Some(id.clone()))
            }
            None => {
                log::warn!("no sequence aligns to the anchor; nothing will be rotated");
                (RotationReference::None, None)
            }
        };

        let rotated = (0..targets.len())
            .into_par_iter()
            .map(|i| rotate_column(targets[i], &oriented[i], strands[i], &rows, reference))
            .collect();

        Ok(Resolved { reference, anchor_offset: 0, best_hit_id, rotated })
    }
}
