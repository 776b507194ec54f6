//! Benchmarks for the hot paths of the routing core: pheromone selection
//! under varying neighbor-set sizes, and the update pass a reinforcement
//! or evaporation event drives across a destination's whole neighbor set.

use anthocnet::address::{Address, Instant};
use anthocnet::core::RoutingTable;
use anthocnet::host::traits::RandomSource;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

struct FixedRng(f64);
impl RandomSource for FixedRng {
    fn uniform_f64(&self) -> f64 {
        self.0
    }
    fn uniform_int(&self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            lo
        } else {
            lo + (hi - lo) / 2
        }
    }
}

fn addr(n: u16) -> Address {
    Address::new(10, (n >> 8) as u8, (n & 0xff) as u8, 1)
}

fn build_table(neighbor_count: usize) -> RoutingTable {
    let mut rt = RoutingTable::new(0.001);
    let dest = addr(0);
    for i in 0..neighbor_count {
        let nb = addr((i + 1) as u16);
        rt.add_neighbor(nb, Instant(0), 0);
        rt.update_pheromone(dest, nb, 0.5, 0.7, 0.9);
    }
    rt
}

fn bench_select_route(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_route");
    let rng = FixedRng(0.42);

    for size in [4, 32, 256].iter() {
        let rt = build_table(*size);
        group.bench_with_input(BenchmarkId::new("neighbors", size), size, |b, _| {
            b.iter(|| black_box(rt.select_route(addr(0), 1.0, &rng)));
        });
    }

    group.finish();
}

fn bench_update_pheromone(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_pheromone");

    for size in [4, 32, 256].iter() {
        group.bench_with_input(BenchmarkId::new("neighbors", size), size, |b, &size| {
            let mut rt = build_table(size);
            let target = addr(1);
            b.iter(|| {
                rt.update_pheromone(black_box(addr(0)), black_box(target), black_box(0.6), 0.7, 0.9);
            });
        });
    }

    group.finish();
}

fn bench_construct_hello_msg(c: &mut Criterion) {
    let mut group = c.benchmark_group("construct_hello_msg");

    for size in [4, 32, 256].iter() {
        let rt = build_table(*size);
        group.bench_with_input(BenchmarkId::new("neighbors", size), size, |b, _| {
            b.iter(|| black_box(rt.construct_hello_msg(addr(0), 10)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_select_route, bench_update_pheromone, bench_construct_hello_msg);
criterion_main!(benches);
