// Copyright (c) 2026 Bountyy Oy. All rights reserved.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lighthttp::http::{decode_text, FormParams};
use lighthttp::{Cookie, CookieJar};
use url::Url;

fn form_encoding_benchmark(c: &mut Criterion) {
    let mut form = FormParams::default();
    form.insert("email", "sss@ggg.com");
    form.insert("comment", "aaa bbb !@#$%^&*()_+|");
    form.insert("word", "привет мир");

    c.bench_function("form_encode_utf8", |b| {
        b.iter(|| black_box(form.encode().unwrap()))
    });

    form.set_charset("windows-1251");
    c.bench_function("form_encode_cp1251", |b| {
        b.iter(|| black_box(form.encode().unwrap()))
    });
}

fn cookie_header_benchmark(c: &mut Criterion) {
    let jar = CookieJar::new();
    for i in 0..50 {
        jar.add(Cookie::new("example.com", format!("c{}", i), "value").path(format!("/p{}", i % 5)));
    }
    let url = Url::parse("https://example.com/p3/page").unwrap();

    c.bench_function("cookie_header", |b| {
        b.iter(|| black_box(jar.get_cookie_header(&url)))
    });
}

fn text_decoding_benchmark(c: &mut Criterion) {
    let body = "Съешь же ещё этих мягких французских булок. ".repeat(200);
    let (encoded, _, _) = encoding_rs::WINDOWS_1251.encode(&body);

    c.bench_function("decode_cp1251", |b| {
        b.iter(|| black_box(decode_text(&encoded, Some("windows-1251")).unwrap()))
    });
}

criterion_group!(
    benches,
    form_encoding_benchmark,
    cookie_header_benchmark,
    text_decoding_benchmark
);
criterion_main!(benches);
