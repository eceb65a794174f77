// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{DispatchError, WorkloadError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::timeout;

type Outcome<T> = Result<T, WorkloadError>;

/// Creates the dedicated one-shot channel for a single worker.
pub fn result_channel<T>(worker_id: usize) -> (ResultSender<T>, ResultReceiver<T>) {
    let (tx, rx) = oneshot::channel();
    (
        ResultSender { worker_id, tx },
        ResultReceiver { worker_id, rx },
    )
}

/// Write end, owned by the worker. Dropping it unsent closes the channel.
#[derive(Debug)]
pub struct ResultSender<T> {
    worker_id: usize,
    tx: oneshot::Sender<Outcome<T>>,
}

impl<T> ResultSender<T> {
    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    /// Returns false if the dispatcher is no longer listening.
    pub fn send(self, outcome: Outcome<T>) -> bool {
        self.tx.send(outcome).is_ok()
    }
}

/// Read end, owned by the dispatcher and read exactly once.
#[derive(Debug)]
pub struct ResultReceiver<T> {
    worker_id: usize,
    rx: oneshot::Receiver<Outcome<T>>,
}

impl<T> ResultReceiver<T> {
    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    pub async fn recv_within(self, wait: Duration) -> Result<T, DispatchError> {
        let worker = self.worker_id;
        match timeout(wait, self.rx).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(err))) => Err(DispatchError::WorkerResultMissing {
                worker,
                reason: err.to_string(),
            }),
            Ok(Err(_)) => Err(DispatchError::WorkerResultMissing {
                worker,
                reason: "worker terminated without writing a result".to_string(),
            }),
            Err(_) => Err(DispatchError::WorkerResultMissing {
                worker,
                reason: format!("no result within {wait:?}"),
            }),
        }
    }
}
