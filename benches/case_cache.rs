use cipherpath::{
    cache::CaseCache,
    config::{CaseCacheConfig, Config},
    crypto::PassthroughCodec,
    fs::{DirectoryScanner, NoStreams, ResolveContext},
    Result,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

/// Flat directory with a fixed set of names
struct FlatScanner {
    names: Vec<String>,
}

impl DirectoryScanner for FlatScanner {
    fn list(&self, _dir: &str) -> Result<Vec<String>> {
        Ok(self.names.clone())
    }
}

fn scanner(entries: usize) -> Arc<FlatScanner> {
    Arc::new(FlatScanner {
        names: (0..entries).map(|i| format!("File-{:05}.Txt", i)).collect(),
    })
}

fn config() -> CaseCacheConfig {
    CaseCacheConfig {
        case_insensitive: true,
        ttl_secs: 0,
    }
}

fn bench_lookup(c: &mut Criterion) {
    let cache = CaseCache::new(&config(), scanner(10_000));
    cache.load_directory("\\file-00000.txt");

    c.bench_function("case_cache_warm_lookup", |b| {
        b.iter(|| cache.lookup(black_box("\\FILE-04242.TXT"), false))
    });
}

fn bench_resolve(c: &mut Criterion) {
    let mut mount = Config::with_root("C:\\vault");
    mount.cache = config();

    let cache = Arc::new(CaseCache::new(&mount.cache, scanner(1_000)));
    let ctx = ResolveContext::new(
        &mount,
        cache,
        Arc::new(PassthroughCodec::new("C:\\vault")),
        Arc::new(NoStreams),
    )
    .expect("context");

    c.bench_function("resolve_forward_warm", |b| {
        b.iter(|| ctx.resolve(black_box("\\file-00500.txt:Zone:$DATA"), false))
    });
}

criterion_group!(benches, bench_lookup, bench_resolve);
criterion_main!(benches);
