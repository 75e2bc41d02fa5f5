use std::cell::RefCell;

use super::hit::AlignmentHit;
use super::sw::{local_sw_with_buf, SwBuffer, SwParams};
use crate::error::RotateError;
use crate::util::dna;

/// 局部比对 oracle：返回 query 对 subject 的命中，按得分从高到低排列。
///
/// 反向命中遵循 query 递减的约定（见 [`AlignmentHit`]）。实现必须可以跨线程共享。
pub trait LocalAligner: Send + Sync {
    fn name(&self) -> &str;

    fn align(&self, query: &[u8], subject: &[u8]) -> Result<Vec<AlignmentHit>, RotateError>;
}

thread_local! {
    static SW_BUF: RefCell<SwBuffer> = RefCell::new(SwBuffer::new());
}

/// 进程内 Smith-Waterman，正反两条链都比
#[derive(Debug, Clone, Copy, Default)]
pub struct SmithWaterman {
    pub params: SwParams,
}

impl SmithWaterman {
    pub fn new(params: SwParams) -> Self {
        Self { params }
    }
}

impl LocalAligner for SmithWaterman {
    fn name(&self) -> &str {
        "smith-waterman"
    }

    fn align(&self, query: &[u8], subject: &[u8]) -> Result<Vec<AlignmentHit>, RotateError> {
        let qlen = query.len();
        let rc = dna::revcomp(query);

        let (fwd, rev) = SW_BUF.with(|cell| {
            let mut buf = cell.borrow_mut();
            let fwd = local_sw_with_buf(query, subject, self.params, &mut buf);
            let rev = local_sw_with_buf(&rc, subject, self.params, &mut buf);
            (fwd, rev)
        });

        let mut hits = Vec::with_capacity(2);
        if fwd.score > 0 {
            hits.push(AlignmentHit {
                query_start: fwd.query_start + 1,
                query_end: fwd.query_end,
                subject_start: fwd.ref_start + 1,
                subject_end: fwd.ref_end,
                score: fwd.score as f64,
                identity: fwd.identity(),
            });
        }
        // single-base hits carry no orientation
        if rev.score > 0 && rev.query_end - rev.query_start > 1 {
            // revcomp index i is query index qlen - 1 - i
            hits.push(AlignmentHit {
                query_start: qlen - rev.query_start,
                query_end: qlen - rev.query_end + 1,
                subject_start: rev.ref_start + 1,
                subject_end: rev.ref_end,
                score: rev.score as f64,
                identity: rev.identity(),
            });
        }
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::hit::{best_hit, Strand};

    const ANCHOR: &[u8] = b"AAACTTGTTGGTGTGTTTT";
    const SEQ1: &[u8] = b"TGTTTTAAACTTGTTGGTG";

    #[test]
    fn forward_hit_on_doubled_subject() {
        let sw = SmithWaterman::default();
        let hits = sw.align(ANCHOR, &dna::doubled(SEQ1)).unwrap();
        let best = best_hit(&hits).unwrap();
        assert_eq!(best.strand(), Strand::Forward);
        assert_eq!((best.query_start, best.query_end), (1, 19));
        assert_eq!((best.subject_start, best.subject_end), (7, 25));
        assert!((best.identity - 100.0).abs() < 1e-9);
    }

    #[test]
    fn reverse_hit_uses_descending_query() {
        let sw = SmithWaterman::default();
        let subject = dna::doubled(&dna::revcomp(SEQ1));
        let hits = sw.align(ANCHOR, &subject).unwrap();
        let best = best_hit(&hits).unwrap();
        assert_eq!(best.strand(), Strand::Reverse);
        assert_eq!((best.query_start, best.query_end), (19, 1));
        assert_eq!((best.subject_start, best.subject_end), (14, 32));
    }

    #[test]
    fn hits_sorted_best_first() {
        let sw = SmithWaterman::default();
        let hits = sw.align(ANCHOR, &dna::doubled(SEQ1)).unwrap();
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn unrelated_subject_gives_weak_or_no_hit() {
        let sw = SmithWaterman::default();
        let hits = sw.align(b"AAAAAAAAAAAA", b"CCCCCCCCCCCCCCCC").unwrap();
        assert!(hits.is_empty());
    }
}
