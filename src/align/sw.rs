const NEG_INF: i32 = i32::MIN / 4;

#[derive(Clone, Copy, Debug)]
pub struct SwParams {
    pub match_score: i32,
    pub mismatch_penalty: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
    /// None 表示全矩阵；环状加倍后的 subject 上命中可能远离对角线
    pub band_width: Option<usize>,
}

impl Default for SwParams {
    fn default() -> Self {
        Self {
            match_score: 2,
            mismatch_penalty: 3,
            gap_open: 5,
            gap_extend: 2,
            band_width: None,
        }
    }
}

/// 局部对齐结果，区间为 0-based 半开区间
#[derive(Debug, PartialEq, Eq)]
pub struct SwResult {
    pub score: i32,
    pub query_start: usize,
    pub query_end: usize,
    pub ref_start: usize,
    pub ref_end: usize,
    /// 对齐列数（M + I + D）
    pub aln_len: u32,
    pub matches: u32,
}

impl SwResult {
    fn empty() -> Self {
        Self {
            score: 0,
            query_start: 0,
            query_end: 0,
            ref_start: 0,
            ref_end: 0,
            aln_len: 0,
            matches: 0,
        }
    }

    pub fn identity(&self) -> f64 {
        if self.aln_len == 0 {
            return 0.0;
        }
        self.matches as f64 * 100.0 / self.aln_len as f64
    }
}

/// 仿射间隙 Smith-Waterman 局部对齐（可选带状）
/// 使用可复用的缓冲区以减少内存分配
pub fn local_sw(query: &[u8], reference: &[u8], p: SwParams) -> SwResult {
    local_sw_with_buf(query, reference, p, &mut SwBuffer::new())
}

/// DP 工作缓冲区，可跨调用复用
#[derive(Default)]
pub struct SwBuffer {
    h: Vec<i32>,
    e: Vec<i32>,
    f: Vec<i32>,
}

impl SwBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn resize(&mut self, size: usize) {
        self.h.clear();
        self.e.clear();
        self.f.clear();
        self.h.resize(size, 0);
        self.e.resize(size, NEG_INF);
        self.f.resize(size, NEG_INF);
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Trace {
    H,
    E,
    F,
}

pub fn local_sw_with_buf(query: &[u8], reference: &[u8], p: SwParams, buf: &mut SwBuffer) -> SwResult {
    let m = query.len();
    let n = reference.len();

    if m == 0 || n == 0 {
        return SwResult::empty();
    }

    let cols = n + 1;
    buf.resize((m + 1) * cols);
    let h = &mut buf.h;
    let e = &mut buf.e;
    let f = &mut buf.f;

    let subst = |a: u8, b: u8| {
        if a.eq_ignore_ascii_case(&b) {
            p.match_score
        } else {
            -p.mismatch_penalty
        }
    };

    let mut best_score = 0i32;
    let mut best_i = 0usize;
    let mut best_j = 0usize;

    for i in 1..=m {
        let mut j_start = 1usize;
        let mut j_end = n;
        if let Some(band) = p.band_width {
            j_start = i.saturating_sub(band).max(1);
            j_end = (i + band).min(n);
        }
        if j_start > j_end {
            continue;
        }

        for j in j_start..=j_end {
            let idx = i * cols + j;
            let up_idx = (i - 1) * cols + j;
            let left_idx = i * cols + (j - 1);
            let diag_idx = (i - 1) * cols + (j - 1);

            let e_open = h[up_idx] - p.gap_open - p.gap_extend;
            let e_ext = e[up_idx] - p.gap_extend;
            e[idx] = e_open.max(e_ext);

            let f_open = h[left_idx] - p.gap_open - p.gap_extend;
            let f_ext = f[left_idx] - p.gap_extend;
            f[idx] = f_open.max(f_ext);

            let val = (h[diag_idx] + subst(query[i - 1], reference[j - 1]))
                .max(e[idx])
                .max(f[idx])
                .max(0);
            h[idx] = val;

            if val > best_score {
                best_score = val;
                best_i = i;
                best_j = j;
            }
        }
    }

    if best_score <= 0 {
        return SwResult::empty();
    }

    // backtrack from best cell, following the affine state
    let mut i = best_i;
    let mut j = best_j;
    let mut state = Trace::H;
    let mut aln_len = 0u32;
    let mut matches = 0u32;

    while i > 0 && j > 0 {
        let idx = i * cols + j;
        match state {
            Trace::H => {
                let h_here = h[idx];
                if h_here == 0 {
                    break;
                }
                let diag_idx = (i - 1) * cols + (j - 1);
                if h_here == h[diag_idx] + subst(query[i - 1], reference[j - 1]) {
                    if query[i - 1].eq_ignore_ascii_case(&reference[j - 1]) {
                        matches += 1;
                    }
                    aln_len += 1;
                    i -= 1;
                    j -= 1;
                } else if h_here == e[idx] {
                    state = Trace::E;
                } else if h_here == f[idx] {
                    state = Trace::F;
                } else {
                    break;
                }
            }
            Trace::E => {
                let up_idx = (i - 1) * cols + j;
                if e[idx] == h[up_idx] - p.gap_open - p.gap_extend {
                    state = Trace::H;
                }
                aln_len += 1;
                i -= 1;
            }
            Trace::F => {
                let left_idx = i * cols + (j - 1);
                if f[idx] == h[left_idx] - p.gap_open - p.gap_extend {
                    state = Trace::H;
                }
                aln_len += 1;
                j -= 1;
            }
        }
    }

    SwResult {
        score: best_score,
        query_start: i,
        query_end: best_i,
        ref_start: j,
        ref_end: best_j,
        aln_len,
        matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_params() -> SwParams {
        SwParams {
            match_score: 2,
            mismatch_penalty: 1,
            gap_open: 1,
            gap_extend: 0,
            band_width: Some(8),
        }
    }

    #[test]
    fn sw_perfect_match() {
        let p = default_params();
        let res = local_sw(b"ACGT", b"ACGT", p);
        assert_eq!(res.score, 8);
        assert_eq!(res.query_start, 0);
        assert_eq!(res.query_end, 4);
        assert_eq!(res.ref_start, 0);
        assert_eq!(res.ref_end, 4);
        assert_eq!(res.aln_len, 4);
        assert_eq!(res.matches, 4);
        assert!((res.identity() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn sw_single_mismatch() {
        let p = default_params();
        let res = local_sw(b"AGGT", b"ACGT", p);
        assert_eq!(res.score, 3 * 2 - 1);
        assert_eq!(res.aln_len, 4);
        assert_eq!(res.matches, 3);
    }

    #[test]
    fn sw_single_insertion() {
        let p = default_params();
        let res = local_sw(b"ACGGT", b"ACGT", p);
        assert_eq!(res.score, 7);
        assert_eq!(res.query_end - res.query_start, 5);
        assert_eq!(res.ref_end - res.ref_start, 4);
        assert_eq!(res.aln_len, 5);
        assert_eq!(res.matches, 4);
    }

    #[test]
    fn sw_is_case_insensitive() {
        let res = local_sw(b"acgt", b"ACGT", default_params());
        assert_eq!(res.score, 8);
    }

    #[test]
    fn sw_empty_inputs() {
        let p = default_params();
        assert_eq!(local_sw(b"", b"ACGT", p).score, 0);
        assert_eq!(local_sw(b"ACGT", b"", p).score, 0);
    }

    #[test]
    fn sw_full_matrix_finds_off_diagonal_hit() {
        let p = SwParams::default();
        // anchor sits far from the main diagonal of the doubled subject
        let anchor = b"AAACTTGTTGGTGTGTTTT";
        let subject = b"TGTTTTAAACTTGTTGGTGTGTTTTAAACTTGTTGGTG";
        let res = local_sw(anchor, subject, p);
        assert_eq!(res.score, 38);
        assert_eq!((res.query_start, res.query_end), (0, 19));
        assert_eq!((res.ref_start, res.ref_end), (6, 25));
    }

    #[test]
    fn sw_buffer_reuse() {
        let p = default_params();
        let mut buf = SwBuffer::new();
        let r1 = local_sw_with_buf(b"ACGT", b"ACGT", p, &mut buf);
        assert_eq!(r1.score, 8);
        let r2 = local_sw_with_buf(b"AGGT", b"ACGT", p, &mut buf);
        assert_eq!(r2.matches, 3);
    }
}
