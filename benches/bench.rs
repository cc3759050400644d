use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;
use sudoku_sat::sat::cnf::Cnf;
use sudoku_sat::sat::dpll::Dpll;
use sudoku_sat::sat::variable_selection::Heuristic;
use sudoku_sat::sudoku::solver::{Board, EXAMPLE_FOUR, EXAMPLE_NINE, Sudoku};

fn sudoku_cnf(board: Board) -> Option<Cnf> {
    Sudoku::new(board).map(|s| s.to_cnf())
}

/// Random 3-SAT near the phase transition (4.26 clauses per variable).
fn random_3sat(rng: &mut fastrand::Rng, num_vars: u32) -> Cnf {
    let num_clauses = (f64::from(num_vars) * 4.26) as usize;
    let clauses = (0..num_clauses)
        .map(|_| {
            (0..3)
                .map(|_| {
                    let v = rng.i32(1..=num_vars as i32);
                    if rng.bool() { v } else { -v }
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    Cnf::from(clauses)
}

fn bench_sudoku(c: &mut Criterion) {
    let mut group = c.benchmark_group("sudoku - heuristic");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(20));

    let puzzles = [
        ("4x4", sudoku_cnf(Board::from(EXAMPLE_FOUR))),
        ("9x9", sudoku_cnf(Board::from(EXAMPLE_NINE))),
    ];

    for (name, cnf) in puzzles {
        let Some(cnf) = cnf else {
            eprintln!("Invalid example board {name}");
            continue;
        };
        for heuristic in Heuristic::ALL {
            group.bench_with_input(BenchmarkId::new(heuristic.to_string(), name), &cnf, |b, cnf| {
                b.iter(|| {
                    let mut solver = Dpll::new(cnf.clone(), heuristic);
                    black_box(solver.solve())
                });
            });
        }
    }

    group.finish();
}

fn bench_3sat(c: &mut Criterion) {
    let mut rng = fastrand::Rng::with_seed(20);
    let cnfs = (0..50).map(|_| random_3sat(&mut rng, 20)).collect::<Vec<_>>();

    let mut group = c.benchmark_group("3sat - heuristic");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(20));

    for heuristic in Heuristic::ALL {
        group.bench_function(heuristic.to_string(), |b| {
            b.iter(|| {
                for cnf in &cnfs {
                    let mut solver = Dpll::new(cnf.clone(), heuristic);
                    black_box(solver.solve()).ok();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sudoku, bench_3sat);

criterion_main!(benches);
