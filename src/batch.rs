use crate::{
    engine::{Engine, ProcessingResult, Status},
    parser::ParseError,
};
use crossbeam_channel::{bounded, unbounded};
use serde::Serialize;
use std::thread;
use tracing::{debug, instrument, trace, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInput {
    pub source: String,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub source: String,
    pub result: Result<ProcessingResult, ParseError>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub accepted: usize,
    pub rejected: usize,
    pub unsupported: usize,
    pub error: usize,
    pub unparseable: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.accepted + self.rejected + self.unsupported + self.error + self.unparseable
    }
}

impl<'a> FromIterator<&'a BatchOutcome> for BatchSummary {
    fn from_iter<I: IntoIterator<Item = &'a BatchOutcome>>(iter: I) -> Self {
        let mut summary = BatchSummary::default();
        for outcome in iter {
            match outcome.result.as_ref().map(|r| r.status) {
                Ok(Status::Accepted) => summary.accepted += 1,
                Ok(Status::Rejected) => summary.rejected += 1,
                Ok(Status::Unsupported) => summary.unsupported += 1,
                Ok(Status::Error) => summary.error += 1,
                Err(_) => summary.unparseable += 1,
            }
        }
        summary
    }
}

/// Process every input on `workers` threads. Outcomes come back in input
/// order whatever order the workers finish in.
#[instrument(level = "debug", skip(engine, inputs), fields(inputs = inputs.len()))]
pub fn run(engine: &Engine, inputs: Vec<BatchInput>, workers: usize) -> Vec<BatchOutcome> {
    let count = inputs.len();
    let workers = workers.clamp(1, count.max(1));
    let (job_tx, job_rx) = bounded::<(usize, BatchInput)>(workers);
    let (result_tx, result_rx) = unbounded::<(usize, BatchOutcome)>();

    thread::scope(|scope| {
        for worker in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for (index, input) in job_rx.iter() {
                    trace!(worker, index, source = %input.source, "processing");
                    let result = engine.process(&input.raw, &input.source);
                    let outcome = BatchOutcome {
                        source: input.source,
                        result,
                    };
                    if result_tx.send((index, outcome)).is_err() {
                        break;
                    }
                }
            });
        }

        for job in inputs.into_iter().enumerate() {
            if job_tx.send(job).is_err() {
                warn!("all batch workers exited early");
                break;
            }
        }
        drop(job_tx);
    });
    drop(result_tx);

    let mut outcomes: Vec<Option<BatchOutcome>> = vec![None; count];
    for (index, outcome) in result_rx.iter() {
        outcomes[index] = Some(outcome);
    }
    debug!(workers, count, "batch finished");
    outcomes.into_iter().flatten().collect()
}
