use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sim_runtime::{apply_ceo_action, new_game_ceo, random_event, CeoAction};

fn bench_ceo_year(c: &mut Criterion) {
    c.bench_function("ceo 360 scripted turns", |b| {
        b.iter(|| {
            let mut rng = ChaCha8Rng::seed_from_u64(42);
            let mut state = new_game_ceo("Bench", &mut rng);
            for _ in 0..360 {
                let msg = apply_ceo_action(&mut state, CeoAction::Rest, &mut rng);
                state.push_message(msg);
                if let Some(event) = random_event(&mut state, &mut rng) {
                    state.push_message(event);
                }
                state.advance_day(&mut rng);
                if state.check_victory_or_defeat().is_some() {
                    break;
                }
            }
            black_box(state.message_log.len())
        })
    });
}

criterion_group!(benches, bench_ceo_year);
criterion_main!(benches);
