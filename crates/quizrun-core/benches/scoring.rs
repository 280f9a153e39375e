use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizrun_core::model::{Explanation, Question, Quiz};
use quizrun_core::presenter::ResultsView;
use quizrun_core::scoring::score_attempt;

fn make_quiz(len: usize) -> Quiz {
    let questions = (0..len)
        .map(|i| Question {
            id: i.to_string(),
            text: format!("Question {i}?"),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_option_index: (i % 4).to_string(),
            hint: None,
            explanation: Explanation::Text("because".into()),
        })
        .collect();
    Quiz {
        id: "bench".into(),
        source_id: "1".into(),
        title: "Bench".into(),
        questions,
        time_limit_secs: 1200,
        partially_loaded: false,
    }
}

fn answers(len: usize) -> BTreeMap<String, String> {
    (0..len)
        .filter(|i| i % 3 != 0)
        .map(|i| (i.to_string(), ((i + i / 2) % 4).to_string()))
        .collect()
}

fn bench_score_attempt(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_attempt");

    for len in [5, 50, 500] {
        let quiz = make_quiz(len);
        let answers = answers(len);
        group.bench_function(format!("questions={len}"), |b| {
            b.iter(|| score_attempt(black_box(&quiz), black_box(&answers), black_box(300)))
        });
    }

    group.finish();
}

fn bench_results_view(c: &mut Criterion) {
    let quiz = make_quiz(50);
    let results = score_attempt(&quiz, &answers(50), 300);
    c.bench_function("results_view/questions=50", |b| {
        b.iter(|| ResultsView::build(black_box(&quiz), black_box(&results)))
    });
}

criterion_group!(benches, bench_score_attempt, bench_results_view);
criterion_main!(benches);
