use common::BookingId;
use criterion::{Criterion, criterion_group, criterion_main};
use saga::{
    BookingRequest, CompensationMode, DinnerRequest, HotelRequest, IdempotencyCaches,
    InMemorySagaJournal, ParkingRequest, SagaConfig, SagaCoordinator, SimulatedDinnerSystem,
    SimulatedHotelSystem, SimulatedParkingSystem,
};

type BenchCoordinator = SagaCoordinator<
    InMemorySagaJournal,
    SimulatedHotelSystem,
    SimulatedDinnerSystem,
    SimulatedParkingSystem,
>;

fn coordinator(mode: CompensationMode) -> BenchCoordinator {
    SagaCoordinator::new(
        InMemorySagaJournal::new(),
        SimulatedHotelSystem::new(),
        SimulatedDinnerSystem::new(),
        SimulatedParkingSystem::new(),
        IdempotencyCaches::new(),
    )
    .with_config(SagaConfig::default().with_compensation_mode(mode))
}

fn request(booking_id: String, space_type: &str) -> BookingRequest {
    BookingRequest {
        booking_id: BookingId::new(booking_id),
        user_id: "bench-user".to_string(),
        hotel: HotelRequest {
            hotel_id: "h1".to_string(),
            ..Default::default()
        },
        dinner: DinnerRequest {
            menu_type: "standard".to_string(),
            ..Default::default()
        },
        parking: ParkingRequest {
            space_type: space_type.to_string(),
            ..Default::default()
        },
    }
}

fn bench_happy_path(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let coordinator = coordinator(CompensationMode::Sequential);
    let mut n = 0u64;

    c.bench_function("saga/happy_path", |b| {
        b.iter(|| {
            n += 1;
            let req = request(format!("bench-{n}"), "standard");
            rt.block_on(async {
                let outcome = coordinator.run_booking(req).await.unwrap();
                assert!(outcome.success);
            });
        });
    });
}

fn bench_cached_rerun(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let coordinator = coordinator(CompensationMode::Sequential);
    let req = request("bench-cached".to_string(), "standard");
    rt.block_on(async { coordinator.run_booking(req.clone()).await.unwrap() });

    c.bench_function("saga/cached_rerun", |b| {
        b.iter(|| {
            rt.block_on(async {
                coordinator.run_booking(req.clone()).await.unwrap();
            });
        });
    });
}

fn bench_compensation(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    for mode in [CompensationMode::Sequential, CompensationMode::Parallel] {
        let coordinator = coordinator(mode);
        let mut n = 0u64;

        c.bench_function(&format!("saga/compensate_{mode}"), |b| {
            b.iter(|| {
                n += 1;
                let req = request(format!("bench-{mode}-{n}"), "full");
                rt.block_on(async {
                    let outcome = coordinator.run_booking(req).await.unwrap();
                    assert_eq!(outcome.compensations.len(), 2);
                });
            });
        });
    }
}

criterion_group!(
    benches,
    bench_happy_path,
    bench_cached_rerun,
    bench_compensation
);
criterion_main!(benches);
