use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mcfg::{from_str_into, to_string, Attribute, Schema};

#[derive(Clone)]
struct User {
    id: u32,
    name: String,
    email: String,
    active: bool,
}

#[derive(Clone)]
struct Metadata {
    created: String,
    updated: String,
    version: u32,
}

#[derive(Clone)]
struct Account {
    user: User,
    metadata: Metadata,
    tags: Vec<String>,
    scores: Vec<i64>,
}

impl Schema for User {
    fn attributes() -> Vec<Attribute<Self>> {
        vec![
            Attribute::scalar("id", |u: &Self| &u.id, |u: &mut Self| &mut u.id),
            Attribute::scalar("name", |u: &Self| &u.name, |u: &mut Self| &mut u.name),
            Attribute::scalar("email", |u: &Self| &u.email, |u: &mut Self| &mut u.email)
                .comment("Contact address"),
            Attribute::scalar("active", |u: &Self| &u.active, |u: &mut Self| &mut u.active),
        ]
    }
}

impl Schema for Metadata {
    fn attributes() -> Vec<Attribute<Self>> {
        vec![
            Attribute::scalar("created", |m: &Self| &m.created, |m: &mut Self| &mut m.created),
            Attribute::scalar("updated", |m: &Self| &m.updated, |m: &mut Self| &mut m.updated),
            Attribute::scalar("version", |m: &Self| &m.version, |m: &mut Self| &mut m.version),
        ]
    }
}

impl Schema for Account {
    fn attributes() -> Vec<Attribute<Self>> {
        vec![
            Attribute::nested("user", |a: &Self| &a.user, |a: &mut Self| &mut a.user),
            Attribute::nested("metadata", |a: &Self| &a.metadata, |a: &mut Self| {
                &mut a.metadata
            }),
            Attribute::list("tags", |a: &Self| &a.tags, |a: &mut Self| &mut a.tags),
            Attribute::list("scores", |a: &Self| &a.scores, |a: &mut Self| &mut a.scores),
        ]
    }
}

fn user() -> User {
    User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        active: true,
    }
}

fn account(scores: usize) -> Account {
    Account {
        user: user(),
        metadata: Metadata {
            created: "2023-01-01T00:00:00Z".to_string(),
            updated: "2023-12-31T23:59:59Z".to_string(),
            version: 3,
        },
        tags: vec![
            "important".to_string(),
            "verified".to_string(),
            "production".to_string(),
        ],
        scores: (0..scores as i64).map(|i| i * 37 - 500).collect(),
    }
}

fn benchmark_write_simple(c: &mut Criterion) {
    let user = user();

    c.bench_function("write_simple_schema", |b| {
        b.iter(|| to_string(black_box(&user)))
    });
}

fn benchmark_read_simple(c: &mut Criterion) {
    let text = to_string(&user()).unwrap();

    c.bench_function("read_simple_schema", |b| {
        b.iter(|| {
            let mut target = user();
            from_str_into(black_box(&text), &mut target)
        })
    });
}

fn benchmark_nested(c: &mut Criterion) {
    let data = account(10);
    let text = to_string(&data).unwrap();

    c.bench_function("write_nested_schema", |b| {
        b.iter(|| to_string(black_box(&data)))
    });

    c.bench_function("read_nested_schema", |b| {
        b.iter(|| {
            let mut target = data.clone();
            from_str_into(black_box(&text), &mut target)
        })
    });
}

fn benchmark_lists(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_size");

    for size in [10, 100, 1000].iter() {
        let data = account(*size);
        let text = to_string(&data).unwrap();

        group.bench_with_input(BenchmarkId::new("write", size), &data, |b, data| {
            b.iter(|| to_string(black_box(data)))
        });

        group.bench_with_input(BenchmarkId::new("read", size), &text, |b, text| {
            b.iter(|| {
                let mut target = account(0);
                from_str_into(black_box(text), &mut target)
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_write_simple,
    benchmark_read_simple,
    benchmark_nested,
    benchmark_lists
);
criterion_main!(benches);
