//! Session services — drafts and the coordinator that batches them.
//!
//! ARCHITECTURE
//! ============
//! `draft` owns the per-image state machine; `session` owns the ordered
//! draft sequence, board distribution, validation, and submission fan-out.

pub mod draft;
pub mod session;

#[cfg(test)]
pub mod test_helpers {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::Semaphore;

    use crate::board::Board;
    use crate::image::ImageSource;
    use crate::remote::types::{PinError, PinId, PinPayload, RemoteBoardSource};

    const OPEN_GATE_PERMITS: usize = 1 << 16;

    /// Scriptable remote: boards and per-image pin failures are configurable,
    /// and every call is recorded.
    pub struct MockRemote {
        boards: Mutex<Result<Vec<Board>, PinError>>,
        failures: Mutex<HashMap<String, PinError>>,
        pub created: Mutex<Vec<PinPayload>>,
        fetch_calls: AtomicUsize,
        gate: Semaphore,
    }

    impl MockRemote {
        pub fn new(boards: Vec<Board>) -> Self {
            Self {
                boards: Mutex::new(Ok(boards)),
                failures: Mutex::new(HashMap::new()),
                created: Mutex::new(Vec::new()),
                fetch_calls: AtomicUsize::new(0),
                gate: Semaphore::new(OPEN_GATE_PERMITS),
            }
        }

        /// Remote whose `create_pin` blocks until `release` is called.
        pub fn gated(boards: Vec<Board>) -> Self {
            let mut mock = Self::new(boards);
            mock.gate = Semaphore::new(0);
            mock
        }

        pub fn release(&self, n: usize) {
            self.gate.add_permits(n);
        }

        pub fn set_boards(&self, boards: Result<Vec<Board>, PinError>) {
            *self.boards.lock().unwrap() = boards;
        }

        pub fn fail_image(&self, image_name: &str, error: PinError) {
            self.failures.lock().unwrap().insert(image_name.to_string(), error);
        }

        pub fn fetch_calls(&self) -> usize {
            self.fetch_calls.load(Ordering::SeqCst)
        }

        pub fn created_images(&self) -> Vec<String> {
            self.created
                .lock()
                .unwrap()
                .iter()
                .map(|p| p.image.name().to_string())
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl RemoteBoardSource for MockRemote {
        async fn fetch_boards(&self) -> Result<Vec<Board>, PinError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            self.boards.lock().unwrap().clone()
        }

        async fn create_pin(&self, payload: &PinPayload) -> Result<PinId, PinError> {
            let n = {
                let mut created = self.created.lock().unwrap();
                created.push(payload.clone());
                created.len()
            };
            let _permit = self.gate.acquire().await.unwrap();
            if let Some(err) = self.failures.lock().unwrap().get(payload.image.name()) {
                return Err(err.clone());
            }
            Ok(PinId(format!("pin-{n}")))
        }
    }

    pub fn image(name: &str) -> ImageSource {
        ImageSource::new(name, "image/png", vec![0_u8; 4])
    }
}
