use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::rotate::{RotationLogEntry, RotationReference, RotationRun, Strategy, Summary};

/// 运行元信息，写入 JSON 报告
#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub input_file: Option<String>,
    pub anchor: String,
    pub strategy: Strategy,
    pub command_line: Option<String>,
    pub timestamp: String,
}

impl RunMeta {
    pub fn new(input_file: Option<&Path>, anchor: &str, strategy: Strategy) -> Self {
        Self {
            input_file: input_file.map(|p| p.display().to_string()),
            anchor: anchor.to_string(),
            strategy,
            command_line: Some(std::env::args().collect::<Vec<_>>().join(" ")),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    meta: &'a RunMeta,
    reference: RotationReference,
    anchor_offset: usize,
    best_hit: Option<&'a str>,
    summary: Summary,
    sequences: &'a [RotationLogEntry],
}

pub fn write_json<W: Write>(out: W, meta: &RunMeta, run: &RotationRun) -> Result<()> {
    let report = JsonReport {
        meta,
        reference: run.reference,
        anchor_offset: run.anchor_offset,
        best_hit: run.best_hit_id.as_deref(),
        summary: run.summary,
        sequences: &run.log,
    };
    serde_json::to_writer_pretty(out, &report)?;
    Ok(())
}

pub fn write_tsv<W: Write>(mut out: W, run: &RotationRun) -> Result<()> {
    writeln!(out, "#id\toriginal_length\toffset\tstrand\trotated_length\tcomposition_match\toutcome")?;
    for e in &run.log {
        let offset = e.offset.map(|o| o.to_string()).unwrap_or_else(|| "*".to_string());
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            e.id, e.original_length, offset, e.strand, e.rotated_length, e.composition_match, e.outcome
        )?;
    }
    writeln!(
        out,
        "#summary\ttotal={}\trotated={}\tpassed_through={}",
        run.summary.total, run.summary.rotated, run.summary.passed_through
    )?;
    Ok(())
}

/// 按扩展名选择格式：`.json` 写 JSON，其余写 TSV
pub fn write_report(path: &Path, meta: &RunMeta, run: &RotationRun) -> Result<()> {
    let fh = std::fs::File::create(path)
        .map_err(|e| anyhow::anyhow!("cannot create report '{}': {}", path.display(), e))?;
    let out = std::io::BufWriter::new(fh);
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => write_json(out, meta, run),
        _ => write_tsv(out, run),
    }
}
