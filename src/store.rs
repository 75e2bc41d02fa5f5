use std::collections::HashMap;
use std::path::Path;

use crate::error::RotateError;
use crate::io::fasta::{self, FastaRecord};
use crate::util::dna;

/// 单条线性化序列（已去 gap）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub id: String,
    pub label: String,
    pub bases: Vec<u8>,
}

impl Sequence {
    /// id 取 label 的第一个空白分隔 token
    pub fn new(label: impl Into<String>, bases: Vec<u8>) -> Self {
        let label = label.into();
        let id = label.split_whitespace().next().unwrap_or("").to_string();
        Self { id, label, bases }
    }

    pub fn from_record(rec: &FastaRecord) -> Self {
        let bases = dna::strip_gaps(&rec.seq)
            .into_iter()
            .map(|b| b.to_ascii_uppercase())
            .collect();
        Self { id: rec.id.clone(), label: rec.label(), bases }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// 同 id/label、换一份碱基
    pub fn with_bases(&self, bases: Vec<u8>) -> Self {
        Self { id: self.id.clone(), label: self.label.clone(), bases }
    }
}

/// 一次运行内的序列集合，保持输入顺序并按 id 索引
#[derive(Debug, Default)]
pub struct SequenceStore {
    seqs: Vec<Sequence>,
    index: HashMap<String, usize>,
}

impl SequenceStore {
    pub fn from_sequences(seqs: Vec<Sequence>) -> Result<Self, RotateError> {
        if seqs.is_empty() {
            return Err(RotateError::EmptyInput);
        }
        let mut index = HashMap::with_capacity(seqs.len());
        for (i, s) in seqs.iter().enumerate() {
            if index.insert(s.id.clone(), i).is_some() {
                return Err(RotateError::DuplicateId(s.id.clone()));
            }
        }
        Ok(Self { seqs, index })
    }

    pub fn from_records(records: &[FastaRecord]) -> Result<Self, RotateError> {
        Self::from_sequences(records.iter().map(Sequence::from_record).collect())
    }

    pub fn read_fasta(path: &Path) -> anyhow::Result<Self> {
        let records = fasta::read_fasta_file(path)?;
        let store = Self::from_records(&records)
            .map_err(|e| anyhow::anyhow!("invalid input '{}': {}", path.display(), e))?;
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Sequence> {
        self.index.get(id).map(|&i| &self.seqs[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sequence> {
        self.seqs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_first_label_token() {
        let s = Sequence::new("sat_12 chr3:100-271 copy", b"ACGT".to_vec());
        assert_eq!(s.id, "sat_12");
        assert_eq!(s.label, "sat_12 chr3:100-271 copy");
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn records_are_cleaned() {
        let rec = FastaRecord {
            id: "m1".into(),
            desc: Some("x".into()),
            seq: b"ac-GT..n".to_vec(),
        };
        let s = Sequence::from_record(&rec);
        assert_eq!(s.bases, b"ACGTN");
        assert_eq!(s.label, "m1 x");
    }

    #[test]
    fn store_keeps_order_and_index() {
        let store = SequenceStore::from_sequences(vec![
            Sequence::new("b", b"AA".to_vec()),
            Sequence::new("a", b"CC".to_vec()),
        ])
        .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("b").unwrap().bases, b"AA");
        assert!(store.get("c").is_none());
        let ids: Vec<&str> = store.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn empty_and_duplicate_inputs_are_fatal() {
        assert!(matches!(
            SequenceStore::from_sequences(Vec::new()),
            Err(RotateError::EmptyInput)
        ));
        let dup = vec![Sequence::new("a", b"A".to_vec()), Sequence::new("a x", b"C".to_vec())];
        assert!(matches!(
            SequenceStore::from_sequences(dup),
            Err(RotateError::DuplicateId(id)) if id == "a"
        ));
    }
}
