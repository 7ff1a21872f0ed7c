//! Inference Batcher

use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

use crate::predictor::{Predictor, RulPrediction};
use crate::InferenceError;
use frame_loader::RawReading;

type Reply = oneshot::Sender<Result<RulPrediction, InferenceError>>;

/// Queued prediction request
struct PredictionRequest {
    reading: RawReading,
    reply: Reply,
}

/// Client side of the batcher channel
#[derive(Clone)]
pub struct BatcherHandle {
    sender: mpsc::Sender<PredictionRequest>,
}

impl BatcherHandle {
    /// Queue a reading and wait for its prediction
    pub async fn predict(&self, reading: RawReading) -> Result<RulPrediction, InferenceError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(PredictionRequest { reading, reply })
            .await
            .map_err(|_| InferenceError::BatcherClosed)?;
        response.await.map_err(|_| InferenceError::BatcherClosed)?
    }
}

/// Inference batcher for collecting requests into batches
pub struct InferenceBatcher {
    /// Channel receiver for incoming requests
    receiver: mpsc::Receiver<PredictionRequest>,
    /// Batch size threshold
    batch_size: usize,
    /// Timeout for batch collection (ms)
    timeout_ms: u64,
}

impl InferenceBatcher {
    /// Create a channel pair for the batcher
    pub fn channel(batch_size: usize, timeout_ms: u64) -> (BatcherHandle, Self) {
        let batch_size = batch_size.max(1);
        info!(
            "Creating inference batcher: batch_size={}, timeout={}ms",
            batch_size, timeout_ms
        );
        let (sender, receiver) = mpsc::channel(batch_size * 2);
        (
            BatcherHandle { sender },
            Self {
                receiver,
                batch_size,
                timeout_ms,
            },
        )
    }

    /// Run until every handle is dropped
    pub async fn run(&mut self, predictor: &Predictor) {
        info!("Starting inference batcher");

        loop {
            let mut batch = Vec::with_capacity(self.batch_size);
            let timeout_duration = Duration::from_millis(self.timeout_ms);

            // Wait for first item
            match self.receiver.recv().await {
                Some(request) => batch.push(request),
                None => {
                    debug!("Batcher channel closed");
                    break;
                }
            }

            // Try to collect more until batch is full or timeout
            while batch.len() < self.batch_size {
                match timeout(timeout_duration, self.receiver.recv()).await {
                    Ok(Some(request)) => batch.push(request),
                    Ok(None) => break,
                    Err(_) => break,
                }
            }

            debug!("Processing batch of {} readings", batch.len());

            for request in batch {
                let result = predictor.predict(&request.reading);
                if request.reply.send(result).is_err() {
                    debug!("Requester dropped before reply");
                }
            }
        }

        info!("Inference batcher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::InferenceAdapter;
    use crate::regressor::ConstantRegressor;
    use drift_monitor::{BaselineStats, DriftMonitor};
    use feature_engine::FeatureSchema;
    use std::sync::Arc;

    fn predictor() -> Predictor {
        let adapter =
            InferenceAdapter::from_baseline(FeatureSchema::fd001(), &BaselineStats::fd001());
        Predictor::new(
            adapter,
            Arc::new(ConstantRegressor(20.0)),
            Arc::new(DriftMonitor::fd001()),
        )
        .unwrap()
    }

    fn reading() -> RawReading {
        BaselineStats::fd001()
            .iter()
            .fold(RawReading::new(), |r, (name, mean)| r.with(name, mean))
    }

    #[tokio::test]
    async fn test_batched_requests_get_replies() {
        let predictor = Arc::new(predictor());
        let (handle, mut batcher) = InferenceBatcher::channel(4, 10);

        let worker = {
            let predictor = Arc::clone(&predictor);
            tokio::spawn(async move { batcher.run(&predictor).await })
        };

        let mut pending = Vec::new();
        for _ in 0..6 {
            let handle = handle.clone();
            pending.push(tokio::spawn(async move { handle.predict(reading()).await }));
        }
        let bad = handle.predict(RawReading::new()).await;

        for task in pending {
            let prediction = task.await.unwrap().unwrap();
            assert_eq!(prediction.predicted_rul, 20.0);
        }
        assert!(bad.is_err());
        assert_eq!(predictor.drift().len(), 6);

        drop(handle);
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_batcher() {
        let (handle, batcher) = InferenceBatcher::channel(4, 10);
        drop(batcher);
        assert!(matches!(
            handle.predict(reading()).await,
            Err(InferenceError::BatcherClosed)
        ));
    }
}
