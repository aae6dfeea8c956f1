//! Mock oracle for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use gabarito_core::error::RecognitionError;
use gabarito_core::extraction::{ExtractedAnswer, RawExtraction};
use gabarito_core::model::Mark;
use gabarito_core::traits::{RecognizeRequest, VisionOracle};

/// A scripted oracle for exercising the grading flow without real API calls.
pub struct MockOracle {
    extraction: Option<RawExtraction>,
    call_count: AtomicU32,
    last_request: Mutex<Option<RecognizeRequest>>,
}

impl MockOracle {
    /// A mock that always reports the given extraction.
    pub fn with_extraction(extraction: RawExtraction) -> Self {
        Self {
            extraction: Some(extraction),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Convenience: a mock that marks the given letters for questions 1..N.
    pub fn reading(student_name: &str, marks: &[Mark]) -> Self {
        Self::with_extraction(RawExtraction {
            student_name: student_name.to_string(),
            answers: marks
                .iter()
                .enumerate()
                .map(|(i, &mark)| ExtractedAnswer {
                    question_number: (i + 1) as u32,
                    mark,
                })
                .collect(),
        })
    }

    /// A mock whose every call fails with a network error.
    pub fn unreachable() -> Self {
        Self {
            extraction: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Number of recognize calls made.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The last request received.
    pub fn last_request(&self) -> Option<RecognizeRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionOracle for MockOracle {
    fn name(&self) -> &str {
        "mock"
    }

    async fn recognize(
        &self,
        request: &RecognizeRequest,
    ) -> Result<RawExtraction, RecognitionError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        match &self.extraction {
            Some(extraction) => Ok(extraction.clone()),
            None => Err(RecognitionError::Network("mock oracle unreachable".into())),
        }
    }
}
