//! Process-local counter for single-worker deployments and tests.

use tokio::sync::Mutex;

use crate::counter::{CounterError, RequestCounter};

/// In-memory counter behind an async mutex.
///
/// Each operation takes the lock independently, so the get/increment pair of
/// two interleaved tasks can still observe the same index — the same
/// contract as the shared backend, just confined to one process.
#[derive(Debug, Default)]
pub struct MemoryCounter {
    value: Mutex<u64>,
}

impl MemoryCounter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RequestCounter for MemoryCounter {
    async fn get(&self) -> Result<u64, CounterError> {
        Ok(*self.value.lock().await)
    }

    async fn increment(&self) -> Result<(), CounterError> {
        *self.value.lock().await += 1;
        Ok(())
    }

    async fn reset(&self) -> Result<(), CounterError> {
        *self.value.lock().await = 0;
        Ok(())
    }

    async fn fetch_increment(&self) -> Result<u64, CounterError> {
        let mut value = self.value.lock().await;
        let before = *value;
        *value += 1;
        Ok(before)
    }
}
