//! # satrot
//!
//! 环状卫星 DNA 单体的相位归一化：以一条锚序列为参照，把集合中每条序列旋转到同一个
//! 起点，之后的多序列比对才不会因为任意的线性起点产生虚假 gap。
//!
//! 处理流程：
//!
//! - **命中收集**：锚序列对每条加倍后的序列（S + S）做局部比对，跨越环状接口的命中也能找到
//! - **参考解析**：选出得分最高的命中，得到锚偏移（逐序列策略）或比对列（比对列策略）
//! - **坐标映射**：把共享参考换算成每条序列自己的切点，反向链先做反向互补
//! - **安全旋转**：旋转后校验长度、组成、可逆性与字母表，任一失败则原样输出
//!
//! ## 快速示例
//!
//! ```rust
//! use satrot::align::SmithWaterman;
//! use satrot::rotate::{RotateOpt, RotationEngine, Strategy};
//! use satrot::store::{Sequence, SequenceStore};
//!
//! let store = SequenceStore::from_sequences(vec![
//!     Sequence::new("anchor", b"AAACTTGTTGGTGTGTTTT".to_vec()),
//!     Sequence::new("seq1", b"TGTTTTAAACTTGTTGGTG".to_vec()),
//! ])
//! .unwrap();
//!
//! let sw = SmithWaterman::default();
//! let opt = RotateOpt { strategy: Strategy::Pairwise, ..RotateOpt::default() };
//! let run = RotationEngine::new(&sw, opt).run(&store, "anchor").unwrap();
//! assert_eq!(run.sequences[1].bases, b"AAACTTGTTGGTGTGTTTT");
//! ```
//!
//! ## 模块说明
//!
//! - [`io`] — FASTA 读写
//! - [`store`] — 序列集合
//! - [`align`] — 比对 oracle（Smith-Waterman / blastn / mafft / 预计算比对）
//! - [`rotate`] — 旋转引擎
//! - [`report`] — 旋转日志（TSV / JSON）
//! - [`verify`] — 旋转结果的事后校验
//! - [`util`] — 反向互补、去 gap 等 DNA 工具函数

pub mod align;
pub mod error;
pub mod io;
pub mod report;
pub mod rotate;
pub mod store;
pub mod util;
pub mod verify;

pub use error::RotateError;
