use serde::Serialize;
use thiserror::Error;

use crate::util::dna;

/// 旋转候选未通过完整性检查的原因
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum IntegrityFailure {
    #[error("offset {offset} outside 0..{len}")]
    OffsetOutOfRange { offset: i64, len: usize },
    #[error("length changed from {before} to {after}")]
    LengthChanged { before: usize, after: usize },
    #[error("character composition changed")]
    CompositionChanged,
    #[error("rotating back does not reproduce the input")]
    NotReversible,
    #[error("symbol {symbol:#04x} outside the nucleotide alphabet")]
    ForeignSymbol { symbol: u8 },
}

/// 环状左旋：bases[start..] + bases[..start]。要求 start <= len。
pub fn rotate_left(bases: &[u8], start: usize) -> Vec<u8> {
    let (head, tail) = bases.split_at(start);
    let mut out = Vec::with_capacity(bases.len());
    out.extend_from_slice(tail);
    out.extend_from_slice(head);
    out
}

/// 检查 candidate 是否为 original 左旋 start 位的结果
pub fn verify_rotation(original: &[u8], candidate: &[u8], start: usize) -> Result<(), IntegrityFailure> {
    let len = original.len();
    if start >= len.max(1) {
        return Err(IntegrityFailure::OffsetOutOfRange { offset: start as i64, len });
    }
    if candidate.len() != len {
        return Err(IntegrityFailure::LengthChanged { before: len, after: candidate.len() });
    }
    if dna::composition(candidate) != dna::composition(original) {
        return Err(IntegrityFailure::CompositionChanged);
    }
    let back = if len == 0 { 0 } else { (len - start) % len };
    if rotate_left(candidate, back) != original {
        return Err(IntegrityFailure::NotReversible);
    }
    if let Some(&b) = candidate.iter().find(|&&b| !dna::is_nucleotide(b)) {
        return Err(IntegrityFailure::ForeignSymbol { symbol: b });
    }
    Ok(())
}

/// 带安全检查的旋转：偏移越界或任一检查失败都拒绝候选，由调用方输出原序列
pub fn checked_rotate(bases: &[u8], offset: i64) -> Result<Vec<u8>, IntegrityFailure> {
    let len = bases.len();
    if offset < 0 || offset as u64 >= len.max(1) as u64 {
        return Err(IntegrityFailure::OffsetOutOfRange { offset, len });
    }
    let start = offset as usize;
    let candidate = rotate_left(bases, start);
    verify_rotation(bases, &candidate, start)?;
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_doubling_example() {
        // hit at subject 6..15 on the doubled string means offset 5
        let s = b"ABCDEFGHIJ";
        let d = dna::doubled(s);
        assert_eq!(&d[5..15], b"FGHIJABCDE");
        assert_eq!(rotate_left(s, 5), b"FGHIJABCDE");
    }

    #[test]
    fn round_trip_every_offset() {
        let s = b"AAACTTGTTGGTGTGTTTT";
        let len = s.len();
        for k in 0..len {
            let r = rotate_left(s, k);
            assert_eq!(r.len(), len);
            assert_eq!(dna::composition(&r), dna::composition(s));
            assert_eq!(rotate_left(&r, (len - k) % len), s.to_vec(), "k={}", k);
        }
    }

    #[test]
    fn worked_scenario_rotates_onto_anchor() {
        let seq1 = b"TGTTTTAAACTTGTTGGTG";
        assert_eq!(checked_rotate(seq1, 6).unwrap(), b"AAACTTGTTGGTGTGTTTT");
    }

    #[test]
    fn checked_rotate_rejects_bad_offsets() {
        let s = b"ACGTACGT";
        assert_eq!(
            checked_rotate(s, 8),
            Err(IntegrityFailure::OffsetOutOfRange { offset: 8, len: 8 })
        );
        assert_eq!(
            checked_rotate(s, -3),
            Err(IntegrityFailure::OffsetOutOfRange { offset: -3, len: 8 })
        );
        assert!(checked_rotate(b"", 0).is_err());
    }

    #[test]
    fn verify_catches_corrupted_candidates() {
        let s = b"ACGTTGCA";
        assert_eq!(
            verify_rotation(s, b"GTTGCAA", 2),
            Err(IntegrityFailure::LengthChanged { before: 8, after: 7 })
        );
        assert_eq!(verify_rotation(s, b"GTTGCAAA", 2), Err(IntegrityFailure::CompositionChanged));
        // right composition, wrong arrangement
        assert_eq!(verify_rotation(s, b"GTTGCACA", 2), Err(IntegrityFailure::NotReversible));
        assert_eq!(verify_rotation(s, b"GTTGCAAC", 2), Ok(()));
    }

    #[test]
    fn verify_rejects_foreign_symbols() {
        let s = b"ACXT";
        assert_eq!(checked_rotate(s, 1), Err(IntegrityFailure::ForeignSymbol { symbol: b'X' }));
        assert!(checked_rotate(b"acgtn", 2).is_ok());
    }
}
