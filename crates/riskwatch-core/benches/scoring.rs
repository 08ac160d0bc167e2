use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use riskwatch_core::model::{Assignment, Catalog, Course, CourseEnrollment, Semester, Student, Term};
use riskwatch_core::risk::{gpa_risk, RiskEngine};

fn catalog(depth: usize) -> Catalog {
    let courses = (0..depth)
        .map(|i| Course {
            code: format!("CS{}", 100 + i),
            title: format!("Course {i}"),
            credit: 3,
            prereq: if i == 0 {
                vec![]
            } else {
                vec![format!("CS{}", 99 + i)]
            },
        })
        .collect();
    Catalog::new(courses)
}

fn make_student(assignments: usize, current: &[String]) -> Student {
    let today = NaiveDate::from_ymd_opt(2025, 10, 15).unwrap();
    let mut student = Student::new(1, "bench");
    student.gpa = 2.4;
    student.absence_bits = 0b1011_0110_1101;
    student.terms = vec![Term {
        year: 2025,
        semester: Semester::Fall,
        courses: current.iter().map(CourseEnrollment::new).collect(),
    }];
    student.assignments = (0..assignments)
        .map(|i| Assignment {
            deadline: today + chrono::Days::new((i % 30) as u64),
            done: i % 3 == 0,
        })
        .collect();
    student
}

fn bench_calculate(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculate");
    let today = NaiveDate::from_ymd_opt(2025, 10, 15).unwrap();
    let graph = catalog(50).build_graph().unwrap();
    let engine = RiskEngine::with_defaults(&graph).unwrap();

    group.bench_function("empty", |b| {
        let student = Student::new(1, "empty");
        b.iter(|| engine.calculate_at(black_box(&student), today))
    });

    group.bench_function("typical", |b| {
        let student = make_student(20, &["CS110".into(), "CS120".into()]);
        b.iter(|| engine.calculate_at(black_box(&student), today))
    });

    group.bench_function("deep_prereqs", |b| {
        let student = make_student(200, &["CS149".into(), "CS148".into(), "CS140".into()]);
        b.iter(|| engine.calculate_at(black_box(&student), today))
    });

    group.finish();
}

fn bench_gpa(c: &mut Criterion) {
    c.bench_function("gpa_risk", |b| b.iter(|| gpa_risk(black_box(2.3))));
}

criterion_group!(benches, bench_calculate, bench_gpa);
criterion_main!(benches);
