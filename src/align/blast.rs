use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use super::hit::AlignmentHit;
use super::local::LocalAligner;
use crate::error::RotateError;
use crate::io::fasta;

const OUTFMT: &str = "6 qstart qend sstart send bitscore pident";

/// 调用外部 `blastn`（`-subject` 模式，无需建库）
#[derive(Debug, Clone)]
pub struct Blastn {
    pub program: PathBuf,
    pub word_size: usize,
}

impl Default for Blastn {
    fn default() -> Self {
        Self { program: PathBuf::from("blastn"), word_size: 7 }
    }
}

impl Blastn {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), ..Self::default() }
    }
}

fn temp_fasta(label: &str, seq: &[u8]) -> std::io::Result<tempfile::NamedTempFile> {
    let mut f = tempfile::Builder::new().suffix(".fa").tempfile()?;
    fasta::write_record(&mut f, label, seq)?;
    f.flush()?;
    Ok(f)
}

impl LocalAligner for Blastn {
    fn name(&self) -> &str {
        "blastn"
    }

    fn align(&self, query: &[u8], subject: &[u8]) -> Result<Vec<AlignmentHit>, RotateError> {
        let tool = self.name();
        let q = temp_fasta("query", query).map_err(|e| RotateError::failed(tool, e))?;
        let s = temp_fasta("subject", subject).map_err(|e| RotateError::failed(tool, e))?;

        let output = Command::new(&self.program)
            .arg("-query")
            .arg(q.path())
            .arg("-subject")
            .arg(s.path())
            .args(["-strand", "both", "-outfmt", OUTFMT])
            .arg("-word_size")
            .arg(self.word_size.to_string())
            .output()
            .map_err(|e| RotateError::unavailable(tool, format!("{}: {}", self.program.display(), e)))?;

        if !output.status.success() {
            return Err(RotateError::failed(
                tool,
                format!("exit status {}: {}", output.status, String::from_utf8_lossy(&output.stderr).trim()),
            ));
        }
        let mut hits = parse_tabular(&String::from_utf8_lossy(&output.stdout))
            .map_err(|m| RotateError::failed(tool, m))?;
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(hits)
    }
}

/// 解析 `-outfmt 6` 输出。blastn 的负链命中是 subject 递减，这里翻成 query 递减。
pub fn parse_tabular(text: &str) -> Result<Vec<AlignmentHit>, String> {
    let mut hits = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 6 {
            return Err(format!("line {}: expected 6 columns, got {}", lineno + 1, fields.len()));
        }
        let int = |i: usize| {
            fields[i]
                .trim()
                .parse::<usize>()
                .map_err(|e| format!("line {}: column {}: {}", lineno + 1, i + 1, e))
        };
        let float = |i: usize| {
            fields[i]
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("line {}: column {}: {}", lineno + 1, i + 1, e))
        };
        let (qs, qe, ss, se) = (int(0)?, int(1)?, int(2)?, int(3)?);
        let (score, identity) = (float(4)?, float(5)?);

        let hit = if ss > se {
            AlignmentHit {
                query_start: qe,
                query_end: qs,
                subject_start: se,
                subject_end: ss,
                score,
                identity,
            }
        } else {
            AlignmentHit {
                query_start: qs,
                query_end: qe,
                subject_start: ss,
                subject_end: se,
                score,
                identity,
            }
        };
        hits.push(hit);
    }
    Ok(hits)
}
