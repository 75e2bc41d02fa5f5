use criterion::{black_box, criterion_group, criterion_main, Criterion};

use satrot::align::{self, LocalAligner, SmithWaterman, SwParams};
use satrot::rotate::{rotator, RotateOpt, RotationEngine, Strategy};
use satrot::store::{Sequence, SequenceStore};
use satrot::util::dna;

fn make_monomer(len: usize, seed: u32) -> Vec<u8> {
    let bases = [b'A', b'C', b'G', b'T'];
    let mut seq = Vec::with_capacity(len);
    let mut x: u32 = seed;
    for _ in 0..len {
        x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        seq.push(bases[(x >> 16) as usize % 4]);
    }
    seq
}

fn bench_sw_doubled(c: &mut Criterion) {
    let anchor = make_monomer(171, 42);
    let subject = dna::doubled(&rotator::rotate_left(&anchor, 60));

    c.bench_function("local_sw_171bp_vs_doubled", |b| {
        b.iter(|| {
            black_box(align::local_sw(black_box(&anchor), black_box(&subject), SwParams::default()));
        })
    });

    let sw = SmithWaterman::default();
    c.bench_function("sw_both_strands_171bp", |b| {
        b.iter(|| {
            black_box(sw.align(black_box(&anchor), black_box(&subject)).ok());
        })
    });
}

fn bench_checked_rotate(c: &mut Criterion) {
    let seq = make_monomer(5_000, 7);
    c.bench_function("checked_rotate_5k", |b| {
        b.iter(|| {
            black_box(rotator::checked_rotate(black_box(&seq), 1_234).ok());
        })
    });
}

fn bench_pairwise_run(c: &mut Criterion) {
    let anchor = make_monomer(171, 42);
    let mut seqs = vec![Sequence::new("anchor", anchor.clone())];
    for i in 0..32usize {
        let mut b = rotator::rotate_left(&anchor, (i * 17) % anchor.len());
        if i % 2 == 1 {
            b = dna::revcomp(&b);
        }
        seqs.push(Sequence::new(format!("m{}", i), b));
    }
    let store = SequenceStore::from_sequences(seqs).expect("store");
    let sw = SmithWaterman::default();
    let opt = RotateOpt { strategy: Strategy::Pairwise, ..RotateOpt::default() };

    c.bench_function("pairwise_run_32x171bp", |b| {
        b.iter(|| {
            black_box(RotationEngine::new(&sw, opt).run(black_box(&store), "anchor").ok());
        })
    });
}

criterion_group!(benches, bench_sw_doubled, bench_checked_rotate, bench_pairwise_run);
criterion_main!(benches);
