use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use roomalloc::engine::Engine;
use roomalloc::model::{Ms, Span};

const HOUR: Ms = 3_600_000;
const DAY: Ms = 24 * HOUR;

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    if latencies.is_empty() {
        println!("  {label}: no samples");
        return;
    }
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    println!("  {label}:");
    println!(
        "    n={}, avg={:.3}ms, p50={:.3}ms, p95={:.3}ms, p99={:.3}ms, max={:.3}ms",
        latencies.len(),
        avg.as_secs_f64() * 1000.0,
        percentile(latencies, 50.0).as_secs_f64() * 1000.0,
        percentile(latencies, 95.0).as_secs_f64() * 1000.0,
        percentile(latencies, 99.0).as_secs_f64() * 1000.0,
        latencies[latencies.len() - 1].as_secs_f64() * 1000.0,
    );
}

/// Morning or afternoon half-day window of `day`.
fn half_day(day: Ms, pm: bool) -> Span {
    let base = day * DAY;
    if pm {
        Span::new(base + 13 * HOUR, base + 17 * HOUR)
    } else {
        Span::new(base + 9 * HOUR, base + 12 * HOUR)
    }
}

async fn phase1_sequential(engine: &Engine) {
    let n = 20_000;
    let mut latencies = Vec::with_capacity(n);
    let start = Instant::now();
    let mut assigned = 0usize;

    for i in 0..n {
        let course = i % 40;
        let day = (i / 40) as Ms;
        let span = half_day(day, i % 2 == 1);
        let id = format!("C{course}-G1-{}-part{i}-S1", if i % 2 == 1 { "pm" } else { "am" });
        let t = Instant::now();
        if let Ok(Some(_)) = engine.reserve("Seq-Centre", span, &id, Some(20)).await {
            assigned += 1;
        }
        latencies.push(t.elapsed());
    }

    let elapsed = start.elapsed();
    let ops = n as f64 / elapsed.as_secs_f64();
    println!(
        "  {n} reservations ({assigned} assigned) in {:.2}s = {ops:.0} ops/sec",
        elapsed.as_secs_f64()
    );
    print_latency("reserve latency", &mut latencies);
}

async fn phase2_concurrent(engine: Arc<Engine>) {
    let n_tasks = 32;
    let n_per_task = 2_000;
    let n_locations = 8;

    let start = Instant::now();
    let mut handles = Vec::new();

    for t in 0..n_tasks {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let location = format!("Centre-{}", t % n_locations);
            for j in 0..n_per_task {
                let span = half_day((j / 2) as Ms, j % 2 == 1);
                let id = format!("T{t}-G{}-S{j}", j % 5);
                let _ = engine.reserve(&location, span, &id, Some(10)).await;
                // Churn: release every third reservation.
                if j % 3 == 0 {
                    engine.release(&id).await;
                }
            }
        }));
    }

    for h in handles {
        let _ = h.await;
    }

    let elapsed = start.elapsed();
    let total = n_tasks * n_per_task;
    let ops = total as f64 / elapsed.as_secs_f64();
    println!(
        "  {n_tasks} tasks x {n_per_task} reservations over {n_locations} locations = {total} total in {:.2}s = {ops:.0} ops/sec",
        elapsed.as_secs_f64()
    );
}

async fn phase3_read_under_load(engine: Arc<Engine>) {
    for i in 0..500 {
        let span = half_day((i / 2) as Ms, i % 2 == 1);
        let _ = engine
            .reserve("Read-Centre", span, &format!("R{i}-G1-S1"), Some(10))
            .await;
    }

    let stop = Arc::new(AtomicBool::new(false));
    let mut writer_handles = Vec::new();
    for w in 0..4 {
        let engine = engine.clone();
        let stop = stop.clone();
        writer_handles.push(tokio::spawn(async move {
            let mut i: Ms = 0;
            while !stop.load(Ordering::Relaxed) {
                let span = half_day(i, w % 2 == 1);
                let id = format!("W{w}-G1-S{i}");
                let _ = engine.reserve("Read-Centre", span, &id, Some(10)).await;
                engine.release(&id).await;
                i += 1;
            }
        }));
    }

    let n_readers = 8;
    let reads_per_reader = 5_000;
    let mut reader_handles = Vec::new();
    for r in 0..n_readers {
        let engine = engine.clone();
        reader_handles.push(tokio::spawn(async move {
            let mut latencies = Vec::with_capacity(reads_per_reader);
            for i in 0..reads_per_reader {
                let span = half_day(((r + i) % 250) as Ms, i % 2 == 1);
                let t = Instant::now();
                let _ = engine.is_available("Read-Centre", span, Some(10)).await;
                let _ = engine.find_free_index("Read-Centre", span, 10).await;
                latencies.push(t.elapsed());
            }
            latencies
        }));
    }

    let mut all_latencies = Vec::new();
    for h in reader_handles {
        if let Ok(latencies) = h.await {
            all_latencies.extend(latencies);
        }
    }

    stop.store(true, Ordering::Relaxed);
    for h in writer_handles {
        let _ = h.await;
    }

    print_latency("availability query", &mut all_latencies);
}

async fn phase4_contention(engine: Arc<Engine>) {
    let n_tasks = 64;
    let capacity = 10u32;
    let span = Span::new(9 * HOUR, 12 * HOUR);
    let assigned = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();
    let mut handles = Vec::new();
    for t in 0..n_tasks {
        let engine = engine.clone();
        let assigned = assigned.clone();
        handles.push(tokio::spawn(async move {
            let id = format!("Hot-G{t}-S1");
            if let Ok(Some(_)) = engine.reserve("Hot-Centre", span, &id, Some(capacity)).await {
                assigned.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }
    for h in handles {
        let _ = h.await;
    }

    let ok = assigned.load(Ordering::Relaxed);
    println!(
        "  {n_tasks} tasks racing for {capacity} classrooms: {ok} assigned in {:.2}ms",
        start.elapsed().as_secs_f64() * 1000.0
    );
    if ok != capacity as usize {
        eprintln!("  unexpected assignment count: {ok}");
    }
}

#[tokio::main]
async fn main() {
    println!("=== roomalloc stress benchmark ===\n");

    println!("[phase 1] sequential reserve throughput");
    phase1_sequential(&Engine::new()).await;

    println!("\n[phase 2] concurrent reserve/release throughput");
    phase2_concurrent(Arc::new(Engine::new())).await;

    println!("\n[phase 3] read latency under write load");
    phase3_read_under_load(Arc::new(Engine::new())).await;

    println!("\n[phase 4] single-slot contention");
    phase4_contention(Arc::new(Engine::new())).await;

    println!("\n=== benchmark complete ===");
}
