//! Shards a batch of per-walker environment transitions across a fixed
//! pool of worker threads and rejoins the results in chunk order (§4.5).

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::env::{Environment, TransitionBatch};
use crate::error::SwarmError;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

enum Message<S, A> {
    Call {
        states: Vec<S>,
        actions: Vec<A>,
        dt: Vec<u32>,
    },
    Close,
}

enum Reply<S> {
    Result(TransitionBatch<S>),
    Exception(String),
}

struct WorkerHandle<S, A> {
    tx: Sender<Message<S, A>>,
    rx: Receiver<Reply<S>>,
    handle: Option<JoinHandle<()>>,
}

/// a fixed-size pool of worker threads, each holding an independent clone
/// of the environment, communicating over the wire protocol in §4.5
pub struct ParallelExecutor<E: Environment> {
    workers: Vec<WorkerHandle<E::State, E::Action>>,
}

impl<E> ParallelExecutor<E>
where
    E: Environment + Clone + 'static,
{
    pub fn new(env: E, n_workers: usize) -> Self {
        assert!(n_workers > 0, "n_workers must be at least 1");
        let workers = (0..n_workers)
            .map(|id| {
                let (tx, worker_rx) = mpsc::channel::<Message<E::State, E::Action>>();
                let (worker_tx, rx) = mpsc::channel::<Reply<E::State>>();
                let worker_env = env.clone();
                let handle = thread::Builder::new()
                    .name(format!("fractal-swarm-worker-{id}"))
                    .spawn(move || worker_loop(worker_env, worker_rx, worker_tx))
                    .expect("spawn worker thread");
                WorkerHandle {
                    tx,
                    rx,
                    handle: Some(handle),
                }
            })
            .collect();
        Self { workers }
    }

    pub fn n_workers(&self) -> usize {
        self.workers.len()
    }

    /// split `states`/`actions`/`dt` into `n_workers` contiguous chunks
    /// (the last chunk absorbs the remainder), dispatch one `CALL` per
    /// worker, and concatenate the replies back to length N
    pub fn make_transitions(
        &self,
        states: &[E::State],
        actions: &[E::Action],
        dt: &[u32],
    ) -> Result<TransitionBatch<E::State>, SwarmError> {
        let n = states.len();
        let bounds = chunk_bounds(n, self.workers.len());

        for (worker, &(start, end)) in self.workers.iter().zip(bounds.iter()) {
            let msg = Message::Call {
                states: states[start..end].to_vec(),
                actions: actions[start..end].to_vec(),
                dt: dt[start..end].to_vec(),
            };
            worker
                .tx
                .send(msg)
                .expect("worker thread should still be alive");
        }

        let mut out = TransitionBatch {
            states: Vec::with_capacity(n),
            observs: Vec::with_capacity(n),
            rewards: Vec::with_capacity(n),
            oobs: Vec::with_capacity(n),
            terminals: Vec::with_capacity(n),
        };
        for (id, worker) in self.workers.iter().enumerate() {
            match worker.rx.recv() {
                Ok(Reply::Result(batch)) => {
                    out.states.extend(batch.states);
                    out.observs.extend(batch.observs);
                    out.rewards.extend(batch.rewards);
                    out.oobs.extend(batch.oobs);
                    out.terminals.extend(batch.terminals);
                }
                Ok(Reply::Exception(message)) => {
                    log::warn!("worker {id} raised an exception: {message}");
                    return Err(SwarmError::WorkerException {
                        worker: id,
                        source: anyhow::anyhow!(message),
                    });
                }
                Err(_) => {
                    return Err(SwarmError::WorkerException {
                        worker: id,
                        source: anyhow::anyhow!("worker channel closed unexpectedly"),
                    })
                }
            }
        }
        Ok(out)
    }
}

impl<E: Environment> Drop for ParallelExecutor<E> {
    fn drop(&mut self) {
        for worker in &self.workers {
            let _ = worker.tx.send(Message::Close);
        }
        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take() {
                let _ = handle.join();
            }
        }
    }
}

/// contiguous chunk `[start, end)` bounds for `n` items split across
/// `n_workers`, with the last chunk absorbing the remainder
fn chunk_bounds(n: usize, n_workers: usize) -> Vec<(usize, usize)> {
    let base = n / n_workers;
    let mut bounds = Vec::with_capacity(n_workers);
    let mut start = 0;
    for i in 0..n_workers {
        let end = if i + 1 == n_workers { n } else { start + base };
        bounds.push((start, end));
        start = end;
    }
    bounds
}

fn worker_loop<E>(
    env: E,
    rx: Receiver<Message<E::State, E::Action>>,
    tx: Sender<Reply<E::State>>,
) where
    E: Environment,
{
    loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(Message::Close) => break,
            Ok(Message::Call { states, actions, dt }) => {
                let outcome = catch_unwind(AssertUnwindSafe(|| {
                    env.make_transitions(&states, &actions, &dt)
                }));
                let reply = match outcome {
                    Ok(batch) => Reply::Result(batch),
                    Err(payload) => Reply::Exception(panic_message(payload)),
                };
                if tx.send(reply).is_err() {
                    break;
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked with a non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_bounds_absorb_remainder_in_last_chunk() {
        assert_eq!(chunk_bounds(10, 3), vec![(0, 3), (3, 6), (6, 10)]);
        assert_eq!(chunk_bounds(4, 4), vec![(0, 1), (1, 2), (2, 3), (3, 4)]);
        assert_eq!(chunk_bounds(4, 1), vec![(0, 4)]);
    }

    #[derive(Clone)]
    struct Echo;

    impl Environment for Echo {
        type State = i32;
        type Action = i32;

        fn reset(&self, _n: usize) -> crate::env::ResetBatch<i32> {
            crate::env::ResetBatch {
                state: 0,
                observ: vec![0.0],
                reward: 0.0,
                oob: false,
                terminal: false,
            }
        }

        fn make_transitions(&self, states: &[i32], actions: &[i32], _dt: &[u32]) -> TransitionBatch<i32> {
            let next: Vec<i32> = states.iter().zip(actions).map(|(s, a)| s + a).collect();
            let n = next.len();
            TransitionBatch {
                observs: next.iter().map(|&v| vec![v as f32]).collect(),
                states: next,
                rewards: vec![0.0; n],
                oobs: vec![false; n],
                terminals: vec![false; n],
            }
        }

        fn action_space(&self) -> crate::env::ActionSpace {
            crate::env::ActionSpace::Discrete { n: 1 }
        }
    }

    #[test]
    fn parallel_result_matches_serial_for_order_independent_env() {
        let states: Vec<i32> = (0..12).collect();
        let actions: Vec<i32> = (0..12).map(|i| i * 2).collect();
        let dt = vec![1; 12];

        let serial = Echo.make_transitions(&states, &actions, &dt);

        for n_workers in [1, 2, 3, 4, 6, 12] {
            let executor = ParallelExecutor::new(Echo, n_workers);
            let parallel = executor.make_transitions(&states, &actions, &dt).unwrap();
            assert_eq!(parallel.states, serial.states, "n_workers={n_workers}");
        }
    }
}
