use clonevo_sim::evolution::{
    EffectDistribution, Multiplicative, NoRecombination, Region, RegionMutationModel,
    SelectedRegion, WrightFisherRules,
};
use clonevo_sim::simulation::{EvolveParams, Population, RemovalPolicy, evolve, reproduce};
use clonevo_sim::storage::RecordNothing;
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::hint::black_box;

const MU_NEUTRAL: f64 = 0.01;
const MU_SELECTED: f64 = 0.001;

fn mutation_model() -> RegionMutationModel {
    let sregion = SelectedRegion::new(
        Region::default(),
        EffectDistribution::Gamma {
            mean: -0.05,
            shape: 0.3,
        },
        1.0,
    )
    .unwrap();
    RegionMutationModel::new(MU_NEUTRAL, MU_SELECTED, vec![Region::default()], vec![sregion])
        .unwrap()
}

/// Population run to near mutation-drift balance.
fn burned_in(n: u32) -> Population {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
    let mut pop = Population::new(n).unwrap();
    let params = EvolveParams::new(vec![n; 2 * n as usize])
        .with_mutation_rates(MU_NEUTRAL, MU_SELECTED);
    evolve(
        &mut rng,
        &mut pop,
        &params,
        &mutation_model(),
        &NoRecombination,
        &mut WrightFisherRules::new(Multiplicative::default()),
        &mut RecordNothing,
    )
    .unwrap();
    pop
}

fn bench_reproduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("reproduce");
    let model = mutation_model();

    for n in [100u32, 1_000, 5_000] {
        let pop = burned_in(n);
        group.throughput(Throughput::Elements(u64::from(n)));
        group.bench_with_input(BenchmarkId::new("one_generation", n), &pop, |b, pop| {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
            let mut rules = WrightFisherRules::new(Multiplicative::default());
            b.iter_batched(
                || pop.clone(),
                |mut pop| {
                    let wbar = reproduce(
                        &mut rng,
                        &mut pop,
                        n,
                        MU_NEUTRAL + MU_SELECTED,
                        &model,
                        &NoRecombination,
                        &mut rules,
                        0.0,
                        RemovalPolicy::All,
                    )
                    .unwrap();
                    black_box(wbar)
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_evolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("evolve");
    group.sample_size(10);
    let model = mutation_model();

    for n in [100u32, 1_000] {
        let generations = 100;
        group.throughput(Throughput::Elements(generations as u64));
        group.bench_with_input(BenchmarkId::new("constant_size", n), &n, |b, &n| {
            b.iter(|| {
                let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
                let mut pop = Population::new(n).unwrap();
                let params = EvolveParams::new(vec![n; generations])
                    .with_mutation_rates(MU_NEUTRAL, MU_SELECTED);
                evolve(
                    &mut rng,
                    &mut pop,
                    &params,
                    &model,
                    &NoRecombination,
                    &mut WrightFisherRules::new(Multiplicative::default()),
                    &mut RecordNothing,
                )
                .unwrap();
                black_box(pop.mutations().len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reproduce, bench_evolve);
criterion_main!(benches);
