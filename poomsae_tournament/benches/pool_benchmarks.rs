use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use poomsae_tournament::rules::{BeltGrade, ParticipantSnapshot, TeamSnapshot, build_pools};
use poomsae_tournament::tournament::models::Sex;

/// Helper to create a deterministic field of N teams with mixed grades,
/// sexes and roster sizes.
fn setup_teams(n_teams: usize) -> Vec<TeamSnapshot> {
    (0..n_teams)
        .map(|i| {
            let size = i % 4 + 1;
            let participants = (0..size)
                .map(|j| {
                    let grade = BeltGrade::ALL[(i + j * 3) % 15];
                    let sex = if (i + j) % 2 == 0 {
                        Sex::Female
                    } else {
                        Sex::Male
                    };
                    ParticipantSnapshot {
                        name: format!("competitor {i}-{j}"),
                        belt_grade: grade.code().to_string(),
                        sex,
                        birthdate: NaiveDate::from_ymd_opt(1980 + (i % 30) as i32, 1, 1).unwrap(),
                    }
                })
                .collect();
            TeamSnapshot {
                id: i as i64 + 1,
                participants,
            }
        })
        .collect()
}

/// Benchmark a full pool build at realistic tournament sizes
fn bench_build_pools(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_pools");
    for n_teams in [16, 64, 256, 1024] {
        let teams = setup_teams(n_teams);
        group.bench_with_input(BenchmarkId::from_parameter(n_teams), &teams, |b, teams| {
            b.iter(|| build_pools(teams));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build_pools);
criterion_main!(benches);
