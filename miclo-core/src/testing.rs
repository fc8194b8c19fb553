//! Scripted in-memory remote used by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::remote::{Endpoint, FetchError, RemoteSource, SubmissionError};
use crate::submit::ProductSubmission;

#[derive(Clone)]
struct Scripted {
    result: Result<Vec<Value>, ()>,
    delay: Duration,
}

#[derive(Default)]
pub(crate) struct FakeRemote {
    queued: Mutex<HashMap<Endpoint, VecDeque<Scripted>>>,
    defaults: Mutex<HashMap<Endpoint, Scripted>>,
    calls: Mutex<Vec<Endpoint>>,
    submit_result: Mutex<Option<Result<Value, u16>>>,
    submissions: Mutex<Vec<(Option<String>, ProductSubmission)>>,
}

impl FakeRemote {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every fetch of `endpoint` returns `records` until changed.
    pub(crate) fn set(&self, endpoint: Endpoint, records: Vec<Value>) {
        self.defaults.lock().unwrap().insert(
            endpoint,
            Scripted {
                result: Ok(records),
                delay: Duration::ZERO,
            },
        );
    }

    /// Every fetch of `endpoint` fails until changed.
    pub(crate) fn fail(&self, endpoint: Endpoint) {
        self.defaults.lock().unwrap().insert(
            endpoint,
            Scripted {
                result: Err(()),
                delay: Duration::ZERO,
            },
        );
    }

    /// Queues a one-shot response that settles after `delay`.
    pub(crate) fn push_delayed(&self, endpoint: Endpoint, records: Vec<Value>, delay: Duration) {
        self.queued
            .lock()
            .unwrap()
            .entry(endpoint)
            .or_default()
            .push_back(Scripted {
                result: Ok(records),
                delay,
            });
    }

    /// Queues a one-shot failure that settles after `delay`.
    pub(crate) fn push_failure(&self, endpoint: Endpoint, delay: Duration) {
        self.queued
            .lock()
            .unwrap()
            .entry(endpoint)
            .or_default()
            .push_back(Scripted {
                result: Err(()),
                delay,
            });
    }

    pub(crate) fn calls(&self, endpoint: Endpoint) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|e| **e == endpoint)
            .count()
    }

    pub(crate) fn call_order(&self) -> Vec<Endpoint> {
        self.calls.lock().unwrap().clone()
    }

    /// Submissions answer with `record`, or fail with `status`.
    pub(crate) fn set_submit_result(&self, result: Result<Value, u16>) {
        *self.submit_result.lock().unwrap() = Some(result);
    }

    pub(crate) fn submissions(&self) -> Vec<(Option<String>, ProductSubmission)> {
        self.submissions.lock().unwrap().clone()
    }

    fn next(&self, endpoint: Endpoint) -> Scripted {
        let queued = self
            .queued
            .lock()
            .unwrap()
            .get_mut(&endpoint)
            .and_then(|queue| queue.pop_front());

        queued.unwrap_or_else(|| {
            self.defaults
                .lock()
                .unwrap()
                .get(&endpoint)
                .cloned()
                .unwrap_or(Scripted {
                    result: Ok(Vec::new()),
                    delay: Duration::ZERO,
                })
        })
    }
}

#[async_trait]
impl RemoteSource for FakeRemote {
    async fn fetch_records(&self, endpoint: Endpoint) -> Result<Vec<Value>, FetchError> {
        self.calls.lock().unwrap().push(endpoint);
        let scripted = self.next(endpoint);

        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }

        scripted.result.map_err(|()| FetchError::Status {
            endpoint: endpoint.to_string(),
            status: 503,
        })
    }

    async fn submit_product(
        &self,
        product_id: Option<&str>,
        submission: &ProductSubmission,
    ) -> Result<Value, SubmissionError> {
        self.submissions
            .lock()
            .unwrap()
            .push((product_id.map(str::to_string), submission.clone()));

        match self.submit_result.lock().unwrap().clone() {
            Some(Ok(record)) => Ok(record),
            Some(Err(status)) => Err(SubmissionError::Status(status)),
            None => Err(SubmissionError::Http("no submit result scripted".to_string())),
        }
    }
}
