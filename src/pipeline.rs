use std::{
    io::BufRead,
    sync::{
        Arc, Condvar, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
};

use crossbeam::channel::{Receiver, Sender, unbounded};
use tracing::{debug, info, warn};

use crate::{
    clock::Clock,
    error::{Result, TrendError},
    post::Post,
    shared::SharedTracker,
};

/// Turns `"<LOCATION> <content...>"` into a post stamped with `clock`.
/// The content may be empty; a blank line is an error.
pub fn parse_line<C: Clock>(line: &str, clock: &C) -> Result<Post> {
    let line = line.trim();
    if line.is_empty() {
        return Err(TrendError::Parse("blank line".into()));
    }
    let (location, content) = match line.split_once(char::is_whitespace) {
        Some((location, content)) => (location, content.trim_start()),
        None => (line, ""),
    };
    Ok(Post::with_clock(content, location, clock))
}

/// Parses each line of `reader` and submits it to `pool` until EOF or until
/// `cancelled` is set. Invalid UTF-8 is replaced rather than rejected and
/// blank lines are skipped. Returns the number submitted.
pub fn feed_lines<R, C>(
    mut reader: R,
    pool: &IngestPool,
    clock: &C,
    cancelled: &AtomicBool,
) -> Result<usize>
where
    R: BufRead,
    C: Clock,
{
    let mut submitted = 0;
    let mut buf = Vec::new();
    loop {
        if cancelled.load(Ordering::Acquire) {
            debug!(submitted, "stopped reading on cancel");
            break;
        }
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        match parse_line(&String::from_utf8_lossy(&buf), clock) {
            Ok(post) => {
                pool.submit(post)?;
                submitted += 1;
            }
            Err(e) => warn!(%e, "skipping line"),
        }
    }
    Ok(submitted)
}

struct Worker {
    id: usize,
    thread: Option<JoinHandle<()>>,
}

/// Posts handed to the pool but not yet ingested.
#[derive(Default)]
struct Backlog {
    pending: Mutex<usize>,
    cvar: Condvar,
}

impl Backlog {
    fn start_post(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        *pending += 1;
    }

    fn finish_post(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        *pending -= 1;
        if *pending == 0 {
            self.cvar.notify_all();
        }
    }

    fn wait_empty(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        while *pending > 0 {
            pending = self.cvar.wait(pending).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Fixed set of threads draining a channel of posts into a shared tracker.
pub struct IngestPool {
    workers: Vec<Worker>,
    backlog: Arc<Backlog>,
    sender: Option<Sender<Post>>,
}

impl IngestPool {
    pub fn new<C>(size: usize, tracker: SharedTracker<C>) -> Result<Self>
    where
        C: Clock + Send + Sync + 'static,
    {
        if size == 0 {
            return Err(TrendError::Config("ingest pool needs at least one worker".into()));
        }
        let backlog = Arc::new(Backlog::default());
        let (s, r) = unbounded();
        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let backlog = Arc::clone(&backlog);
            let tracker = tracker.clone();
            let r: Receiver<Post> = r.clone();
            let thread = thread::Builder::new()
                .name(format!("ingest-{id}"))
                .spawn(move || {
                    while let Ok(post) = r.recv() {
                        tracker.ingest(post);
                        backlog.finish_post();
                    }
                    debug!(worker = id, "ingest worker exiting");
                })?;
            workers.push(Worker {
                id,
                thread: Some(thread),
            });
        }
        info!(workers = size, "ingest pool started");
        Ok(Self {
            workers,
            backlog,
            sender: Some(s),
        })
    }

    pub fn submit(&self, post: Post) -> Result<()> {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| TrendError::Pipeline("ingest pool is shut down".into()))?;
        self.backlog.start_post();
        if sender.send(post).is_err() {
            self.backlog.finish_post();
            return Err(TrendError::Pipeline("all ingest workers have exited".into()));
        }
        Ok(())
    }

    /// Blocks until every submitted post has been ingested.
    pub fn join(&self) {
        self.backlog.wait_empty();
    }

    /// Closes the channel and waits for the workers to drain it.
    pub fn shutdown(&mut self) {
        if self.sender.take().is_none() {
            return;
        }
        for worker in &mut self.workers {
            if let Some(handle) = worker.thread.take() {
                if handle.join().is_err() {
                    warn!(worker = worker.id, "ingest worker panicked");
                }
            }
        }
        info!("ingest pool stopped");
    }
}

impl Drop for IngestPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
