use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::RotateError;
use crate::io::fasta::{self, FastaReader};
use crate::store::Sequence;

/// id -> 带 gap 的比对行，所有行等长
pub type GappedRows = HashMap<String, Vec<u8>>;

/// 多序列比对 oracle
pub trait MultiAligner: Send + Sync {
    fn name(&self) -> &str;

    fn align_multi(&self, seqs: &[Sequence]) -> Result<GappedRows, RotateError>;
}

/// 所有行必须等长（比对列）
pub fn check_rows(tool: &str, rows: &GappedRows) -> Result<usize, RotateError> {
    let mut width: Option<usize> = None;
    for (id, row) in rows {
        match width {
            None => width = Some(row.len()),
            Some(w) if w != row.len() => {
                return Err(RotateError::failed(
                    tool,
                    format!("row '{}' has {} columns, expected {}", id, row.len(), w),
                ));
            }
            Some(_) => {}
        }
    }
    Ok(width.unwrap_or(0))
}

fn rows_from_fasta(tool: &str, text: &[u8]) -> Result<GappedRows, RotateError> {
    let records = FastaReader::new(text)
        .read_all()
        .map_err(|e| RotateError::failed(tool, e))?;
    let mut rows = GappedRows::with_capacity(records.len());
    for rec in records {
        // '.' and '-' both mean gap; keep a single symbol
        let row = rec.seq.into_iter().map(|b| if b == b'.' { b'-' } else { b }).collect();
        rows.insert(rec.id, row);
    }
    check_rows(tool, &rows)?;
    Ok(rows)
}

/// 调用外部 `mafft --auto`，从 stdout 读取比对结果
#[derive(Debug, Clone)]
pub struct Mafft {
    pub program: PathBuf,
    pub threads: usize,
}

impl Default for Mafft {
    fn default() -> Self {
        Self { program: PathBuf::from("mafft"), threads: 1 }
    }
}

impl Mafft {
    pub fn new(program: impl Into<PathBuf>, threads: usize) -> Self {
        Self { program: program.into(), threads: threads.max(1) }
    }
}

impl MultiAligner for Mafft {
    fn name(&self) -> &str {
        "mafft"
    }

    fn align_multi(&self, seqs: &[Sequence]) -> Result<GappedRows, RotateError> {
        let tool = self.name();
        if seqs.len() < 2 {
            // nothing to align against; a single sequence is its own alignment
            return Ok(seqs.iter().map(|s| (s.id.clone(), s.bases.clone())).collect());
        }

        let mut input = tempfile::Builder::new()
            .suffix(".fa")
            .tempfile()
            .map_err(|e| RotateError::failed(tool, e))?;
        for s in seqs {
            fasta::write_record(&mut input, &s.id, &s.bases).map_err(|e| RotateError::failed(tool, e))?;
        }
        input.flush().map_err(|e| RotateError::failed(tool, e))?;

        log::debug!("running {} on {} sequences", self.program.display(), seqs.len());
        let output = Command::new(&self.program)
            .args(["--auto", "--quiet", "--preservecase", "--thread"])
            .arg(self.threads.to_string())
            .arg(input.path())
            .output()
            .map_err(|e| RotateError::unavailable(tool, format!("{}: {}", self.program.display(), e)))?;

        if !output.status.success() {
            return Err(RotateError::failed(
                tool,
                format!("exit status {}: {}", output.status, String::from_utf8_lossy(&output.stderr).trim()),
            ));
        }
        let rows = rows_from_fasta(tool, &output.stdout)?;
        if rows.is_empty() {
            return Err(RotateError::failed(tool, "empty alignment output"));
        }
        Ok(rows)
    }
}

/// 用户预先准备好的比对（gapped FASTA）。行的方向由用户负责。
#[derive(Debug, Clone, Default)]
pub struct PrecomputedMsa {
    rows: GappedRows,
}

impl PrecomputedMsa {
    pub fn from_rows(rows: GappedRows) -> Result<Self, RotateError> {
        check_rows("precomputed alignment", &rows)?;
        Ok(Self { rows })
    }

    pub fn from_file(path: &Path) -> Result<Self, RotateError> {
        let text = std::fs::read(path)
            .map_err(|e| RotateError::unavailable("precomputed alignment", format!("{}: {}", path.display(), e)))?;
        let rows = rows_from_fasta("precomputed alignment", &text)?;
        Ok(Self { rows })
    }
}

impl MultiAligner for PrecomputedMsa {
    fn name(&self) -> &str {
        "precomputed alignment"
    }

    /// 只返回请求的 id；缺行的序列由调用方按不可映射处理
    fn align_multi(&self, seqs: &[Sequence]) -> Result<GappedRows, RotateError> {
        Ok(seqs
            .iter()
            .filter_map(|s| self.rows.get(&s.id).map(|r| (s.id.clone(), r.clone())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_gapped_fasta() {
        let rows = rows_from_fasta("t", b">a desc\nAC--GT\n>b\n-acg.t\n").unwrap();
        assert_eq!(rows["a"], b"AC--GT");
        assert_eq!(rows["b"], b"-ACG-T");
    }

    #[test]
    fn unequal_rows_are_rejected() {
        let err = rows_from_fasta("t", b">a\nAC-GT\n>b\nACGT\n").unwrap_err();
        assert!(matches!(err, RotateError::OracleFailed { .. }));
    }

    #[test]
    fn precomputed_returns_requested_rows_only() {
        let mut rows = GappedRows::new();
        rows.insert("a".into(), b"AC-GT".to_vec());
        rows.insert("b".into(), b"ACGT-".to_vec());
        let msa = PrecomputedMsa::from_rows(rows).unwrap();
        let seqs = vec![Sequence::new("b", b"ACGT".to_vec()), Sequence::new("z", b"A".to_vec())];
        let got = msa.align_multi(&seqs).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got["b"], b"ACGT-");
    }

    #[test]
    fn precomputed_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aln.fa");
        std::fs::write(&path, b">a\nA-CGT\n>b\nAACGT\n").unwrap();
        let msa = PrecomputedMsa::from_file(&path).unwrap();
        let got = msa.align_multi(&[Sequence::new("a", b"ACGT".to_vec())]).unwrap();
        assert_eq!(got["a"], b"A-CGT");
        assert!(PrecomputedMsa::from_file(&dir.path().join("none.fa")).is_err());
    }

    #[test]
    fn missing_mafft_is_unavailable() {
        let m = Mafft::new("/nonexistent/mafft-for-tests", 1);
        let seqs = vec![Sequence::new("a", b"ACGT".to_vec()), Sequence::new("b", b"ACGA".to_vec())];
        assert!(matches!(m.align_multi(&seqs), Err(RotateError::OracleUnavailable { .. })));
    }
}
