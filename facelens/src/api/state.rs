use std::sync::Arc;

use crate::config::Config;
use crate::faces::FaceComparator;
use crate::ocr::TextRecognizer;
use crate::staging::StagingArea;

/// Read-only state shared by every request.
///
/// Engines are built once at startup and injected behind their traits so
/// tests can substitute fakes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub staging: StagingArea,
    pub faces: Arc<dyn FaceComparator>,
    pub ocr: Arc<dyn TextRecognizer>,
}

impl AppState {
    pub fn new(
        config: Config,
        staging: StagingArea,
        faces: Arc<dyn FaceComparator>,
        ocr: Arc<dyn TextRecognizer>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            staging,
            faces,
            ocr,
        }
    }
}
