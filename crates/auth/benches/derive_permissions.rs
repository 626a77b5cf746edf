use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use blogdesk_auth::session::USER_KEY;
use blogdesk_auth::{Authority, KeyValueStore, MemoryStore, PermissionGate, Principal, Role, SessionStore, derive_permissions};

fn principal_with(roles: usize, per_role: usize) -> Principal {
    (0..roles).fold(Principal::default(), |p, r| {
        let role = (0..per_role).fold(Role::new(format!("ROLE_{r}")), |role, a| {
            role.grant(Authority::from(format!("AUTH_{r}_{a}")))
        });
        p.with_role(role)
    })
}

/// Pure derivation from an in-memory principal.
fn bench_derive(c: &mut Criterion) {
    let mut group = c.benchmark_group("derive_permissions");
    for (roles, per_role) in [(1, 5), (3, 10), (10, 20)] {
        let principal = principal_with(roles, per_role);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{roles}x{per_role}")),
            &principal,
            |b, p| b.iter(|| derive_permissions(black_box(Some(p)))),
        );
    }
    group.finish();
}

/// Full gate query: read record, parse, derive, test membership.
fn bench_gate_query(c: &mut Criterion) {
    let mut store = MemoryStore::new();
    let record = principal_with(3, 10).to_record().expect("encode principal");
    store.set(USER_KEY, &record).expect("memory store write");
    let gate = PermissionGate::new(SessionStore::new(store));
    let probe = Authority::from("AUTH_2_9".to_string());

    c.bench_function("gate_has_authority", |b| {
        b.iter(|| gate.has_authority(black_box(&probe)))
    });
}

criterion_group!(benches, bench_derive, bench_gate_query);
criterion_main!(benches);
