use core::hash::BuildHasher;
use core::hint::black_box;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use f64_hash_set::F64HashSet;
use f64_hash_set::bits::canonical_bits;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Normal;
use rand_distr::Zipf;
use siphasher::sip::SipHasher;

#[derive(Clone, Default)]
struct SipHashBuilder {
    k0: u64,
    k1: u64,
}

impl SipHashBuilder {
    fn random() -> Self {
        Self {
            k0: OsRng.try_next_u64().unwrap_or(0),
            k1: OsRng.try_next_u64().unwrap_or(0),
        }
    }
}

impl BuildHasher for SipHashBuilder {
    type Hasher = SipHasher;

    fn build_hasher(&self) -> Self::Hasher {
        SipHasher::new_with_keys(self.k0, self.k1)
    }
}

/// The operations every contender supports, on `f64` keys with the same
/// NaN and signed-zero rules.
trait FloatSet {
    const NAME: &'static str;

    fn with_capacity(capacity: usize) -> Self;
    fn insert(&mut self, value: f64) -> bool;
    fn contains(&self, value: f64) -> bool;
    fn remove(&mut self, value: f64) -> bool;
    fn sum(&self) -> f64;
}

impl FloatSet for F64HashSet {
    const NAME: &'static str = "f64_hash_set";

    fn with_capacity(capacity: usize) -> Self {
        F64HashSet::with_capacity(capacity)
    }

    fn insert(&mut self, value: f64) -> bool {
        F64HashSet::insert(self, value)
    }

    fn contains(&self, value: f64) -> bool {
        F64HashSet::contains(self, value)
    }

    fn remove(&mut self, value: f64) -> bool {
        F64HashSet::remove(self, value)
    }

    fn sum(&self) -> f64 {
        self.iter().sum()
    }
}

impl FloatSet for hashbrown::HashSet<u64> {
    const NAME: &'static str = "hashbrown";

    fn with_capacity(capacity: usize) -> Self {
        hashbrown::HashSet::with_capacity(capacity)
    }

    fn insert(&mut self, value: f64) -> bool {
        hashbrown::HashSet::insert(self, canonical_bits(value))
    }

    fn contains(&self, value: f64) -> bool {
        hashbrown::HashSet::contains(self, &canonical_bits(value))
    }

    fn remove(&mut self, value: f64) -> bool {
        hashbrown::HashSet::remove(self, &canonical_bits(value))
    }

    fn sum(&self) -> f64 {
        self.iter().map(|&bits| f64::from_bits(bits)).sum()
    }
}

impl FloatSet for std::collections::HashSet<u64, SipHashBuilder> {
    const NAME: &'static str = "std_siphash";

    fn with_capacity(capacity: usize) -> Self {
        std::collections::HashSet::with_capacity_and_hasher(capacity, SipHashBuilder::random())
    }

    fn insert(&mut self, value: f64) -> bool {
        std::collections::HashSet::insert(self, canonical_bits(value))
    }

    fn contains(&self, value: f64) -> bool {
        std::collections::HashSet::contains(self, &canonical_bits(value))
    }

    fn remove(&mut self, value: f64) -> bool {
        std::collections::HashSet::remove(self, &canonical_bits(value))
    }

    fn sum(&self) -> f64 {
        self.iter().map(|&bits| f64::from_bits(bits)).sum()
    }
}

/// How benchmark keys are drawn.
#[derive(Clone, Copy, Debug)]
enum Keys {
    /// Uniformly random finite bit patterns.
    Uniform,
    /// Normally distributed measurements, the common real-world shape.
    Normal,
    /// Small whole numbers; only the high bits of the pattern vary.
    Integral,
}

fn make_keys(kind: Keys, count: usize, rng: &mut SmallRng) -> Vec<f64> {
    let mut seen = hashbrown::HashSet::with_capacity(count);
    let normal = Normal::new(100.0, 15.0).unwrap();
    let mut keys = Vec::with_capacity(count);
    let mut next_integral = 0u32;
    while keys.len() < count {
        let value = match kind {
            Keys::Uniform => f64::from_bits(rng.random::<u64>()),
            Keys::Normal => rng.sample(normal),
            Keys::Integral => {
                next_integral += 1;
                f64::from(next_integral)
            }
        };
        if value.is_finite() && seen.insert(value.to_bits()) {
            keys.push(value);
        }
    }
    keys
}

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

const KEYS: &[Keys] = &[Keys::Uniform, Keys::Normal, Keys::Integral];

fn bench_insert<S: FloatSet>(c: &mut Criterion, preallocate: bool) {
    for &kind in KEYS {
        let mut group = c.benchmark_group(format!(
            "insert{}_{:?}",
            if preallocate { "_preallocated" } else { "" },
            kind
        ));
        group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

        let mut rng = SmallRng::from_os_rng();
        for &size in SIZES {
            let keys = make_keys(kind, size, &mut rng);
            group.throughput(Throughput::Elements(size as u64));
            group.bench_function(format!("{}/{}", S::NAME, size), |b| {
                b.iter_batched(
                    || {
                        let mut keys = keys.clone();
                        keys.shuffle(&mut SmallRng::from_os_rng());
                        keys
                    },
                    |keys| {
                        let mut set = S::with_capacity(if preallocate { size } else { 0 });
                        for key in keys {
                            black_box(set.insert(key));
                        }
                        black_box(set)
                    },
                    BatchSize::SmallInput,
                )
            });
        }
        group.finish();
    }
}

fn bench_find<S: FloatSet>(c: &mut Criterion) {
    for &kind in KEYS {
        let mut group = c.benchmark_group(format!("find_hit_miss_{:?}", kind));
        group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

        let mut rng = SmallRng::from_os_rng();
        for &size in SIZES {
            let keys = make_keys(kind, size * 2, &mut rng);
            let mut set = S::with_capacity(0);
            for &key in &keys[..size] {
                set.insert(key);
            }
            let mut probes = keys.clone();
            probes.shuffle(&mut rng);

            group.throughput(Throughput::Elements(probes.len() as u64));
            group.bench_function(format!("{}/{}", S::NAME, size), |b| {
                b.iter(|| {
                    let mut hits = 0usize;
                    for &key in &probes {
                        hits += set.contains(black_box(key)) as usize;
                    }
                    black_box(hits)
                })
            });
        }
        group.finish();
    }
}

fn bench_remove<S: FloatSet>(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove_Uniform");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    let mut rng = SmallRng::from_os_rng();
    for &size in SIZES {
        let keys = make_keys(Keys::Uniform, size, &mut rng);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("{}/{}", S::NAME, size), |b| {
            b.iter_batched(
                || {
                    let mut set = S::with_capacity(0);
                    for &key in &keys {
                        set.insert(key);
                    }
                    let mut keys = keys.clone();
                    keys.shuffle(&mut SmallRng::from_os_rng());
                    (set, keys)
                },
                |(mut set, keys)| {
                    for key in keys {
                        black_box(set.remove(key));
                    }
                    black_box(set)
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_iteration<S: FloatSet>(c: &mut Criterion) {
    let mut group = c.benchmark_group("iteration_Normal");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    let mut rng = SmallRng::from_os_rng();
    for &size in SIZES {
        let mut set = S::with_capacity(0);
        for key in make_keys(Keys::Normal, size, &mut rng) {
            set.insert(key);
        }
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("{}/{}", S::NAME, size), |b| {
            b.iter(|| black_box(set.sum()))
        });
    }
    group.finish();
}

/// Inserts, finds and removes keys picked from a Zipf distribution, so that
/// a few hot keys churn in and out of the set.
fn bench_churn_zipf<S: FloatSet>(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn_zipf");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    let mut rng = SmallRng::from_os_rng();
    for &size in SIZES {
        let keys = make_keys(Keys::Uniform, size * 2, &mut rng);
        let pick = Zipf::new(keys.len() as f64, 1.0).unwrap();
        let operations = (0..size * 3)
            .map(|_| {
                let index = rng.sample(pick) as usize - 1;
                (rng.random_range(0..3u8), keys[index])
            })
            .collect::<Vec<(u8, f64)>>();

        group.throughput(Throughput::Elements(operations.len() as u64));
        group.bench_function(format!("{}/{}", S::NAME, size), |b| {
            b.iter_batched(
                || S::with_capacity(0),
                |mut set| {
                    for &(op, key) in &operations {
                        match op {
                            0 => black_box(set.insert(key)),
                            1 => black_box(set.contains(key)),
                            _ => black_box(set.remove(key)),
                        };
                    }
                    black_box(set)
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_all<S: FloatSet>(c: &mut Criterion) {
    bench_insert::<S>(c, false);
    bench_insert::<S>(c, true);
    bench_find::<S>(c);
    bench_remove::<S>(c);
    bench_iteration::<S>(c);
    bench_churn_zipf::<S>(c);
}

criterion_group!(
    benches,
    bench_all::<F64HashSet>,
    bench_all::<hashbrown::HashSet<u64>>,
    bench_all::<std::collections::HashSet<u64, SipHashBuilder>>,
);

criterion_main!(benches);
