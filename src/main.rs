use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use clap::Parser;
use crossbeam::channel::{bounded, select};
use hashtag_trends::{
    IngestPool, Post, Result, SharedTracker, SystemClock, TrendError,
    config::Args,
    pipeline::feed_lines,
    report::{render_growth, render_trends},
};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    args.validate()?;
    let tracker = SharedTracker::new(args.tracker_config()?);
    info!(region = %args.region, "tracker ready");

    if args.stdin {
        stream_stdin(&tracker, args.workers)?;
    } else {
        tracker.ingest(Post::new("Test tweet #Riyadh #Tech", args.region.as_str()));
        tracker.ingest(Post::new("Another tweet #Jeddah #Tech", args.region.as_str()));
    }

    println!("Top Trends:");
    print!("{}", render_trends(&tracker.top_trends(args.limit)));
    if let Some(hours) = args.window_hours {
        println!("Trends in the last {hours} hours:");
        print!("{}", render_trends(&tracker.trends_in_window(hours, args.limit)));
    }
    if args.growth {
        println!("Growth Rates:");
        print!("{}", render_growth(&tracker.growth_rates()));
    }
    Ok(())
}

fn stream_stdin(tracker: &SharedTracker, workers: usize) -> Result<()> {
    let pool = Arc::new(IngestPool::new(workers, tracker.clone())?);
    let cancelled = Arc::new(AtomicBool::new(false));

    let (interrupt_tx, interrupt_rx) = bounded(1);
    ctrlc::set_handler(move || {
        let _ = interrupt_tx.try_send(());
    })?;

    let (done_tx, done_rx) = bounded(1);
    {
        let pool = Arc::clone(&pool);
        let cancelled = Arc::clone(&cancelled);
        thread::spawn(move || {
            let fed = feed_lines(io::stdin().lock(), &pool, &SystemClock, &cancelled);
            let _ = done_tx.send(fed);
        });
    }

    let fed = select! {
        recv(done_rx) -> fed => fed.unwrap_or_else(|_| {
            Err(TrendError::Pipeline("stdin reader exited without a result".into()))
        }).map(Some),
        recv(interrupt_rx) -> _ => {
            cancelled.store(true, Ordering::Release);
            Ok(None)
        }
    };
    pool.join();
    match fed? {
        Some(submitted) => {
            info!(submitted, accepted = tracker.len(), "finished reading stdin");
        }
        None => {
            info!(accepted = tracker.len(), "interrupted, reporting on what was ingested so far");
        }
    }
    Ok(())
}
