/// 可接受的核苷酸字母表（IUPAC，大小写不敏感）
pub const NUCLEOTIDES: &[u8] = b"ACGTURYSWKMBDHVN";

#[inline]
pub fn is_nucleotide(b: u8) -> bool {
    NUCLEOTIDES.contains(&b.to_ascii_uppercase())
}

#[inline]
pub fn is_gap(b: u8) -> bool {
    b == b'-' || b == b'.'
}

/// IUPAC 互补，保留大小写；无法识别的符号原样返回
#[inline]
pub fn complement(base: u8) -> u8 {
    let c = match base.to_ascii_uppercase() {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' | b'U' => b'A',
        b'R' => b'Y',
        b'Y' => b'R',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        b'S' => b'S',
        b'W' => b'W',
        b'N' => b'N',
        _ => return base,
    };
    if base.is_ascii_lowercase() {
        c.to_ascii_lowercase()
    } else {
        c
    }
}

pub fn revcomp(seq: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(seq.len());
    for &b in seq.iter().rev() {
        out.push(complement(b));
    }
    out
}

pub fn strip_gaps(seq: &[u8]) -> Vec<u8> {
    seq.iter().copied().filter(|&b| !is_gap(b)).collect()
}

/// 环状序列加倍：S + S，使局部比对可以跨越人为的线性起点
pub fn doubled(seq: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(seq.len() * 2);
    out.extend_from_slice(seq);
    out.extend_from_slice(seq);
    out
}

/// 大小写折叠后的字符多重集（排序后比较）
pub fn composition(seq: &[u8]) -> Vec<u8> {
    let mut v: Vec<u8> = seq.iter().map(u8::to_ascii_uppercase).collect();
    v.sort_unstable();
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revcomp_basic() {
        assert_eq!(revcomp(b"AAAC"), b"GTTT");
        assert_eq!(revcomp(b"ACGT"), b"ACGT");
    }

    #[test]
    fn revcomp_iupac_and_case() {
        assert_eq!(revcomp(b"RYKMBVDH"), b"DHBVKMRY");
        assert_eq!(revcomp(b"SWN"), b"NWS");
        assert_eq!(revcomp(b"acgU"), b"Acgt");
    }

    #[test]
    fn revcomp_is_involution_for_dna() {
        let s = b"ACGTTGCANRYACG";
        assert_eq!(revcomp(&revcomp(s)), s.to_vec());
    }

    #[test]
    fn gaps_are_stripped() {
        assert_eq!(strip_gaps(b"-AC--G.T-"), b"ACGT");
    }

    #[test]
    fn alphabet_membership() {
        assert!(is_nucleotide(b'a'));
        assert!(is_nucleotide(b'N'));
        assert!(!is_nucleotide(b'X'));
        assert!(!is_nucleotide(b'-'));
    }

    #[test]
    fn doubling() {
        assert_eq!(doubled(b"ABC"), b"ABCABC");
        assert!(doubled(b"").is_empty());
    }
}
