//! LOUDSトライの検索ベンチマーク
//!
//! 合成したかなの語彙に対して、共通接頭辞検索と予測検索の速度を計測します。

use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kanadic::{BuildTrie, LoudsTrie};

const KANA: &[char] = &[
    'あ', 'い', 'う', 'え', 'お', 'か', 'き', 'く', 'け', 'こ', 'さ', 'し', 'す', 'せ', 'そ', 'た',
    'ち', 'つ', 'て', 'と', 'な', 'に', 'ぬ', 'ね', 'の', 'ん',
];

/// 決まった種から語を生成する
fn synthetic_words(n: usize) -> Vec<String> {
    let mut x: u64 = 0x2545_f491_4f6c_dd1d;
    (0..n)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            let len = 1 + (x % 6) as usize;
            (0..len)
                .map(|i| KANA[((x >> (i * 5)) % KANA.len() as u64) as usize])
                .collect()
        })
        .collect()
}

fn bench_search(c: &mut Criterion) {
    let words = synthetic_words(200_000);
    let mut build = BuildTrie::new();
    for (i, w) in words.iter().enumerate() {
        build.insert(w, (i % 5000) as i16);
    }
    let trie = LoudsTrie::from_build_trie(&build).expect("failed to build the trie");

    let queries: Vec<&str> = words.iter().step_by(97).map(String::as_str).collect();

    let mut group = c.benchmark_group("LOUDS Search");
    group.throughput(Throughput::Elements(queries.len() as u64));
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(10));

    group.bench_function(BenchmarkId::new("CommonPrefix", queries.len()), |b| {
        b.iter(|| {
            let mut n = 0;
            for q in &queries {
                n += trie.common_prefix_search(q).count();
            }
            n
        });
    });

    for limit in [10, 100] {
        group.bench_function(BenchmarkId::new("Predictive", limit), |b| {
            b.iter(|| {
                let mut n = 0;
                for q in &queries {
                    let prefix: String = q.chars().take(1).collect();
                    n += trie.predictive_search(&prefix, limit).len();
                }
                n
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
