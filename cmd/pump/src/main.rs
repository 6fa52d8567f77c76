//! Pump example
//!
//! Moves a payload through the full bridge: a producer worker pushes
//! uneven chunks into an InputStream, the serving loop consumes them with
//! parked reads resolved via a SweepQueue and copies them into an
//! OutputStream, and a draining worker pulls them back out. The gate is
//! consulted before the blocking work is dispatched.
//!
//! # Environment Variables
//!
//! - `TBR_PAYLOAD_KB` - Payload size in KiB (default 256)
//! - `TBR_THREAD_LIMIT` / `TBR_SPARE_THREADS` - Gate configuration
//! - `TBR_LOG_LEVEL=debug` - Set log level (off, error, warn, info, debug, trace)
//! - `TBR_FLUSH_EPRINT=1` - Flush debug output immediately

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use tbridge::{
    binfo, env_get, BridgeConfig, ConcurrencyGate, InputStream, OutputStream, PoolTelemetry,
    ReadOutcome, Sweep, SweepQueue,
};

/// Demo pool telemetry: producers bump `active` around blocking work.
struct DemoPool {
    active: AtomicUsize,
    pending: AtomicUsize,
}

impl PoolTelemetry for DemoPool {
    fn active_requests(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    fn pending_requests(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

// TBR_LOG_LEVEL=debug cargo run -p tbridge-pump
fn main() {
    println!("=== tbridge Pump Example ===\n");

    let payload_kb: usize = env_get("TBR_PAYLOAD_KB", 256);
    let source: Vec<u8> = (0..payload_kb * 1024).map(|i| (i * 31 % 251) as u8).collect();

    let pool = Arc::new(DemoPool {
        active: AtomicUsize::new(0),
        pending: AtomicUsize::new(0),
    });
    let gate = Arc::new(ConcurrencyGate::new(
        &BridgeConfig::from_env(),
        Arc::clone(&pool) as Arc<dyn PoolTelemetry>,
    ));

    if gate.is_choking() {
        println!("Gate is choking before we even started; aborting");
        return;
    }

    let sweeps = SweepQueue::new();
    let input = Arc::new(InputStream::new());
    input.set_wake(sweeps.hook(Arc::clone(&input) as Arc<dyn Sweep>));
    let output = Arc::new(OutputStream::new());

    let start = Instant::now();

    // Producer worker: holds a gate reservation for the blocking work.
    let producer = {
        let input = Arc::clone(&input);
        let gate = Arc::clone(&gate);
        let pool = Arc::clone(&pool);
        let source = source.clone();
        thread::spawn(move || {
            let _reservation = gate.reserve().expect("gate at capacity");
            pool.active.fetch_add(1, Ordering::SeqCst);
            binfo!("producer: reserved a pool thread, pushing {} bytes", source.len());

            let mut offset = 0;
            let mut step = 1;
            while offset < source.len() {
                let end = (offset + step).min(source.len());
                input.push(&source[offset..end]).unwrap();
                offset = end;
                step = step % 4096 + 97;
            }
            input.close();

            pool.active.fetch_sub(1, Ordering::SeqCst);
            binfo!("producer: done");
        })
    };

    // Draining worker: whole chunks out to the blocking sink.
    let drainer = {
        let output = Arc::clone(&output);
        thread::spawn(move || {
            let mut sink = Vec::new();
            loop {
                match output.pull() {
                    Some(chunk) => sink.extend_from_slice(chunk.as_slice()),
                    None if output.is_drained() => break,
                    None => thread::sleep(Duration::from_millis(1)),
                }
            }
            binfo!("drainer: pulled {} bytes", sink.len());
            sink
        })
    };

    // Serving loop.
    let (tx, rx) = mpsc::channel();
    let mut copied = 0usize;
    loop {
        let tx = tx.clone();
        input
            .read(1500, Box::new(move |o| tx.send(o).unwrap()))
            .unwrap();

        let outcome = loop {
            if let Ok(outcome) = rx.try_recv() {
                break outcome;
            }
            sweeps.wait(Some(Duration::from_millis(20)));
            sweeps.drain();
        };

        match outcome {
            ReadOutcome::Bytes(bytes) if bytes.is_empty() => {
                output.close();
                break;
            }
            ReadOutcome::Bytes(bytes) => {
                copied += bytes.len();
                output.write_sync(bytes).unwrap();
            }
            ReadOutcome::Aborted => unreachable!("nobody cancels here"),
        }
    }

    producer.join().unwrap();
    let sink = drainer.join().unwrap();
    let elapsed = start.elapsed();

    assert_eq!(sink, source);
    println!(
        "\nCopied {} bytes through the bridge in {:?} ({} loop passes of <= 1500 bytes)",
        sink.len(),
        elapsed,
        (copied + 1499) / 1500,
    );
    println!("Gate reservations back to pre-charge: {}", gate.reserved_count());
    println!("\n=== Example Complete ===");
}
