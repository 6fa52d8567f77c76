//! Bridge throughput benches: byte-mode reads and whole-chunk pulls.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tbridge::{InputStream, OutputStream};

const CHUNK: usize = 4 * 1024;
const CHUNKS: usize = 16;

fn bench_input_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("input_stream");
    group.throughput(Throughput::Bytes((CHUNK * CHUNKS) as u64));

    group.bench_function("push_read_sync", |b| {
        let data = vec![0xa5u8; CHUNK];
        b.iter(|| {
            let stream = InputStream::new();
            for _ in 0..CHUNKS {
                stream.push(data.clone()).unwrap();
            }
            stream.close();
            let mut total = 0;
            loop {
                let bytes = stream.read_sync(1500);
                if bytes.is_empty() {
                    break;
                }
                total += bytes.len();
            }
            black_box(total)
        });
    });

    group.finish();
}

fn bench_output_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("output_stream");
    group.throughput(Throughput::Bytes((CHUNK * CHUNKS) as u64));

    group.bench_function("write_pull", |b| {
        let data = vec![0x5au8; CHUNK];
        b.iter(|| {
            let stream = OutputStream::new();
            for _ in 0..CHUNKS {
                stream.write_sync(data.clone()).unwrap();
            }
            let mut total = 0;
            while let Some(chunk) = stream.pull() {
                total += chunk.len();
            }
            black_box(total)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_input_stream, bench_output_stream);
criterion_main!(benches);
