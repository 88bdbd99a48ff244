use futures::FutureExt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::oneshot;

type Op = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

struct Job {
    op: Op,
    done: oneshot::Sender<()>,
}

tokio::task_local! {
    /// Set while the worker is executing a submission. A submit from inside
    /// this scope is re-entrant and runs inline.
    static ON_QUEUE: ();
}

/// Global "user input enabled" flag, suspended for the duration of every
/// queue submission and restored to its pre-submission value afterwards.
///
/// An operation may call [`InputGate::deny`] to intentionally leave input
/// disabled past its own completion; nothing can leave the gate more open
/// than it was before the operation ran.
#[derive(Clone, Debug)]
pub struct InputGate {
    enabled: Arc<AtomicBool>,
    held: Arc<AtomicBool>,
}

impl Default for InputGate {
    fn default() -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
            held: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl InputGate {
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
    /// Re-enable input, e.g. when a decision window opens.
    pub fn allow(&self) {
        self.held.store(false, Ordering::Release);
        self.enabled.store(true, Ordering::Release);
    }
    /// Force input off, sticking past the surrounding submission.
    pub fn deny(&self) {
        self.held.store(true, Ordering::Release);
        self.enabled.store(false, Ordering::Release);
    }
    fn suspend(&self) -> bool {
        self.enabled.swap(false, Ordering::AcqRel)
    }
    fn restore(&self, prior: bool) {
        if !self.held.load(Ordering::Acquire) {
            self.enabled.store(prior, Ordering::Release);
        }
    }
}

/// FIFO execution serializer for state-mutating, animation-bearing work.
///
/// Submissions run one at a time, strictly in submission order. A running
/// operation may submit further operations and await them without deadlock:
/// nested submissions execute inline on the worker, so a composed flow
/// flattens to one total order. An error or panic inside an operation is
/// caught at the queue boundary; the queue always proceeds to the next
/// submission.
#[derive(Clone)]
pub struct MutationQueue {
    tx: UnboundedSender<Job>,
    gate: InputGate,
}

impl MutationQueue {
    pub fn new(gate: InputGate) -> Self {
        let (tx, mut rx) = unbounded_channel::<Job>();
        let worker = {
            let gate = gate.clone();
            async move {
                while let Some(job) = rx.recv().await {
                    let prior = gate.suspend();
                    Self::run(job.op).await;
                    gate.restore(prior);
                    let _ = job.done.send(());
                }
            }
        };
        tokio::spawn(ON_QUEUE.scope((), worker));
        Self { tx, gate }
    }

    pub fn gate(&self) -> &InputGate {
        &self.gate
    }

    /// Run `op` after every earlier submission has completed, and resolve
    /// once it has. Called from inside a running operation, runs `op`
    /// immediately in place.
    pub async fn submit<F>(&self, op: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        if ON_QUEUE.try_with(|_| ()).is_ok() {
            let prior = self.gate.suspend();
            Self::run(Box::pin(op)).await;
            self.gate.restore(prior);
            return;
        }
        let (done, waited) = oneshot::channel();
        let job = Job {
            op: Box::pin(op),
            done,
        };
        if self.tx.send(job).is_err() {
            log::error!("[queue] worker gone, dropping submission");
            return;
        }
        let _ = waited.await;
    }

    /// Guaranteed-cleanup execution: failures and panics are contained here
    /// so the queue can never wedge.
    async fn run(op: Op) {
        match std::panic::AssertUnwindSafe(op).catch_unwind().await {
            Ok(Ok(())) => (),
            Ok(Err(e)) => log::warn!("[queue] operation failed: {:#}", e),
            Err(_) => log::error!("[queue] operation panicked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn queue() -> MutationQueue {
        MutationQueue::new(InputGate::default())
    }

    #[tokio::test]
    async fn completions_in_submission_order() {
        let q = queue();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut handles = Vec::new();
        for i in 0..8u32 {
            let q = q.clone();
            let seen = seen.clone();
            handles.push(tokio::spawn(async move {
                q.submit(async move {
                    // later submissions must not overtake this sleep
                    tokio::time::sleep(Duration::from_millis(8 - i as u64)).await;
                    seen.lock().unwrap().push(i);
                    Ok(())
                })
                .await;
            }));
            // pin submission order
            tokio::task::yield_now().await;
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(*seen.lock().unwrap(), (0..8).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn at_most_one_running() {
        let q = queue();
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for _ in 0..6 {
            let q = q.clone();
            let running = running.clone();
            let peak = peak.clone();
            handles.push(tokio::spawn(async move {
                q.submit(async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                })
                .await;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reentrant_submission_flattens() {
        let q = queue();
        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let inner_q = q.clone();
            let seen = seen.clone();
            q.submit(async move {
                seen.lock().unwrap().push("outer:start");
                for label in ["inner:1", "inner:2"] {
                    let seen = seen.clone();
                    inner_q
                        .submit(async move {
                            seen.lock().unwrap().push(label);
                            Ok(())
                        })
                        .await;
                }
                seen.lock().unwrap().push("outer:end");
                Ok(())
            })
            .await;
        }
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["outer:start", "inner:1", "inner:2", "outer:end"]
        );
    }

    #[tokio::test]
    async fn failure_releases_the_queue() {
        let q = queue();
        q.submit(async { anyhow::bail!("animation exploded") }).await;
        let ran = Arc::new(AtomicBool::new(false));
        {
            let ran = ran.clone();
            q.submit(async move {
                ran.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await;
        }
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn gate_suspends_and_restores() {
        let q = queue();
        assert!(q.gate().enabled());
        let gate = q.gate().clone();
        q.submit(async move {
            assert!(!gate.enabled());
            Ok(())
        })
        .await;
        assert!(q.gate().enabled());
    }

    #[tokio::test]
    async fn deny_sticks_past_completion() {
        let q = queue();
        let gate = q.gate().clone();
        q.submit(async move {
            gate.deny();
            Ok(())
        })
        .await;
        assert!(!q.gate().enabled());
        q.gate().allow();
        assert!(q.gate().enabled());
    }
}
