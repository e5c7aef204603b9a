use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shelf_core::{Book, SortField, SortOrder, ViewQuery};

fn make_books(count: usize) -> Vec<Book> {
    (0..count)
        .filter_map(|i| Book::new(&format!("Title {}", (i * 7919) % count), &format!("Author {}", i % 97)))
        .collect()
}

fn bench_view_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("ViewQuery::apply");

    for size in [100usize, 1_000, 10_000] {
        let books = make_books(size);

        group.bench_with_input(BenchmarkId::new("sort_title", size), &books, |b, books| {
            let query = ViewQuery::new("", SortField::Title, SortOrder::Asc);
            b.iter(|| black_box(query.apply(books).len()));
        });

        group.bench_with_input(BenchmarkId::new("filter_author_desc", size), &books, |b, books| {
            let query = ViewQuery::new("author 4", SortField::Author, SortOrder::Desc);
            b.iter(|| black_box(query.apply(books).len()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_view_sort);
criterion_main!(benches);
