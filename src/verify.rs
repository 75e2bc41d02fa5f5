//! 事后校验：旋转结果中的每条记录必须是原序列（或其反向互补）的环状置换。

use serde::Serialize;

use crate::align::Strand;
use crate::store::SequenceStore;
use crate::util::dna;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    /// rotated == rotate_left(original 或其反向互补, offset)
    Permutation { strand: Strand, offset: usize },
    NotPermutation,
    MissingOriginal,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyEntry {
    pub id: String,
    pub verdict: Verdict,
}

/// 在加倍序列中找到 candidate 的最小起点
pub fn find_rotation(original: &[u8], candidate: &[u8]) -> Option<usize> {
    if original.len() != candidate.len() {
        return None;
    }
    if original.is_empty() {
        return Some(0);
    }
    let d = dna::doubled(original);
    let n = original.len();
    (0..n).find(|&k| d[k..k + n].eq_ignore_ascii_case(candidate))
}

pub fn classify(original: &[u8], candidate: &[u8]) -> Verdict {
    if let Some(offset) = find_rotation(original, candidate) {
        return Verdict::Permutation { strand: Strand::Forward, offset };
    }
    if let Some(offset) = find_rotation(&dna::revcomp(original), candidate) {
        return Verdict::Permutation { strand: Strand::Reverse, offset };
    }
    Verdict::NotPermutation
}

/// 按 rotated 的顺序逐条比对
pub fn verify_sets(original: &SequenceStore, rotated: &SequenceStore) -> Vec<VerifyEntry> {
    rotated
        .iter()
        .map(|r| {
            let verdict = match original.get(&r.id) {
                Some(o) => classify(&o.bases, &r.bases),
                None => Verdict::MissingOriginal,
            };
            VerifyEntry { id: r.id.clone(), verdict }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Sequence;

    #[test]
    fn finds_forward_and_reverse_permutations() {
        let s = b"TGTTTTAAACTTGTTGGTG";
        assert_eq!(
            classify(s, b"AAACTTGTTGGTGTGTTTT"),
            Verdict::Permutation { strand: Strand::Forward, offset: 6 }
        );
        let rc = dna::revcomp(s);
        assert_eq!(
            classify(&rc, b"AAACTTGTTGGTGTGTTTT"),
            Verdict::Permutation { strand: Strand::Reverse, offset: 6 }
        );
        assert_eq!(classify(s, b"AAACTTGTTGGTGTGTTTA"), Verdict::NotPermutation);
        assert_eq!(classify(s, b"AAAC"), Verdict::NotPermutation);
    }

    #[test]
    fn verify_sets_reports_missing_ids() {
        let orig = SequenceStore::from_sequences(vec![Sequence::new("a", b"ACGTT".to_vec())]).unwrap();
        let rot = SequenceStore::from_sequences(vec![
            Sequence::new("a", b"TTACG".to_vec()),
            Sequence::new("b", b"ACGTT".to_vec()),
        ])
        .unwrap();
        let res = verify_sets(&orig, &rot);
        assert_eq!(res[0].verdict, Verdict::Permutation { strand: Strand::Forward, offset: 3 });
        assert_eq!(res[1].verdict, Verdict::MissingOriginal);
    }
}
