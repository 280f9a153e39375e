use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

use quizrun_core::loader::normalize_question;
use quizrun_core::model::Explanation;
use quizrun_core::presenter::resolve_explanation;

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_question");

    let canonical = json!({
        "id": 17,
        "question": "Which language is Swift?",
        "options": ["Kotlin", "Swift", "Go", "Dart"],
        "correct_option_index": 1,
        "hint": "Apple",
        "explanation": {"A": "No", "B": "Yes", "C": "No", "D": "No"}
    });
    let aliased = json!({
        "question_text": "  Which language is Swift?  ",
        "options": ["Kotlin", "Swift", 3, true],
        "answer": "B",
        "hint_text": "Apple",
        "explanation_text": "{\"B\": \"Yes\"}"
    });

    group.bench_function("canonical", |b| b.iter(|| normalize_question(black_box(&canonical))));
    group.bench_function("aliased", |b| b.iter(|| normalize_question(black_box(&aliased))));

    group.finish();
}

fn bench_resolve_explanation(c: &mut Criterion) {
    let keyed = Explanation::from_value(&json!({"A": "a", "B": "b", "C": "c", "D": "d"}));
    let text = Explanation::Text("plain".into());

    c.bench_function("resolve_explanation/keyed", |b| {
        b.iter(|| resolve_explanation(black_box(&keyed), black_box(Some("2"))))
    });
    c.bench_function("resolve_explanation/text", |b| {
        b.iter(|| resolve_explanation(black_box(&text), black_box(Some("2"))))
    });
}

criterion_group!(benches, bench_normalize, bench_resolve_explanation);
criterion_main!(benches);
