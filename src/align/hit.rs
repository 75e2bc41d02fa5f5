use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strand {
    Forward,
    Reverse,
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

/// 局部比对命中，坐标为 1-based 闭区间，位于实际比较的两条字符串上。
///
/// 反向命中时 query 坐标递减、subject 坐标递增，`query_start` 与
/// `subject_start` 配对。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentHit {
    pub query_start: usize,
    pub query_end: usize,
    pub subject_start: usize,
    pub subject_end: usize,
    pub score: f64,
    /// 百分比 identity（0..=100）
    pub identity: f64,
}

impl AlignmentHit {
    #[inline]
    pub fn strand(&self) -> Strand {
        if self.query_start > self.query_end {
            Strand::Reverse
        } else {
            Strand::Forward
        }
    }

    pub fn passes(&self, min_score: f64, min_identity: f64) -> bool {
        self.score >= min_score && self.identity >= min_identity
    }
}

/// 得分最高的命中；并列时保留先出现的那个
pub fn best_hit<'a, I>(hits: I) -> Option<&'a AlignmentHit>
where
    I: IntoIterator<Item = &'a AlignmentHit>,
{
    let mut best: Option<&AlignmentHit> = None;
    for h in hits {
        if best.map(|b| h.score > b.score).unwrap_or(true) {
            best = Some(h);
        }
    }
    best
}
