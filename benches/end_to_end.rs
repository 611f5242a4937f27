use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;
use toy_bfv_sigmoid::math::generate_primes;
use toy_bfv_sigmoid::sigmoid::{RING_DEGREE, SigmoidConfig, SigmoidEvaluator};

fn bench_sigmoid_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("sigmoid_pipeline");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(30));

    let evaluator =
        SigmoidEvaluator::<RING_DEGREE>::new(&SigmoidConfig::default().seed(123))
            .expect("default parameters build");
    let encrypted = evaluator.encrypt_scalar(2).expect("encrypt");

    group.bench_function("encrypt", |b| {
        b.iter(|| black_box(evaluator.encrypt_scalar(black_box(2)).unwrap()));
    });
    group.bench_function("evaluate", |b| {
        b.iter(|| black_box(evaluator.evaluate_sigmoid(black_box(&encrypted)).unwrap()));
    });
    group.bench_function("full_run", |b| {
        b.iter(|| black_box(evaluator.run(black_box(2)).unwrap()));
    });

    group.finish();
}

fn bench_primitives(c: &mut Criterion) {
    let mut group = c.benchmark_group("bfv_primitives");
    group.sample_size(10);

    let evaluator =
        SigmoidEvaluator::<RING_DEGREE>::new(&SigmoidConfig::default().seed(7))
            .expect("default parameters build");
    let ctx = evaluator.context();
    let x = evaluator.encrypt_scalar(3).expect("encrypt");
    let product = ctx.evaluator().multiply(&x, &x).expect("multiply");

    group.bench_function("multiply", |b| {
        b.iter(|| black_box(ctx.evaluator().multiply(black_box(&x), &x).unwrap()));
    });
    group.bench_function("relinearize", |b| {
        b.iter(|| {
            black_box(
                ctx.evaluator()
                    .relinearize(black_box(&product), ctx.relin_key())
                    .unwrap(),
            )
        });
    });
    group.bench_function("decrypt", |b| {
        b.iter(|| black_box(evaluator.decrypt_scalar(black_box(&x)).unwrap()));
    });

    group.finish();
}

fn bench_prime_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_primes");
    let configs = [(50u32, 6usize, 8192u64), (61, 6, 8192)];

    for &(bits, count, degree) in &configs {
        let label = format!("{bits}b_{count}x_deg{degree}");
        group.bench_with_input(
            BenchmarkId::from_parameter(label),
            &(bits, count, degree),
            |b, &(bits, count, degree)| {
                b.iter(|| black_box(generate_primes(bits, count, degree, &[])));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sigmoid_pipeline,
    bench_primitives,
    bench_prime_generation
);
criterion_main!(benches);
