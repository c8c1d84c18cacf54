//! Classifier wrapper
//!
//! [`Classifier`] is the inference seam: a loaded model that maps an
//! [`ImageTensor`] to class probabilities. [`ModelLoader`] turns an artifact
//! path into a classifier, and [`ClassifierHandle`] loads it lazily, once,
//! on first use.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use burn::module::Module;
use burn::record::CompactRecorder;
use burn::tensor::{backend::Backend, Tensor, TensorData};
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::preprocess::ImageTensor;
use crate::backend::{default_device, InferenceBackend};
use crate::model::{MobileNet, ModelConfig};
use crate::utils::error::{DiagnosisError, Result};

/// A loaded, ready-to-run classifier
pub trait Classifier: Send + Sync {
    /// Width of the output probability vector
    fn num_classes(&self) -> usize;

    /// Run one forward pass and return softmax probabilities
    fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>>;
}

/// Builds a [`Classifier`] from a serialized artifact
pub trait ModelLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Arc<dyn Classifier>>;
}

/// Burn model behind a mutex (Burn modules are `Send` but not `Sync`)
pub struct BurnClassifier<B: Backend> {
    model: Mutex<MobileNet<B>>,
    device: B::Device,
    num_classes: usize,
}

impl<B: Backend> BurnClassifier<B> {
    pub fn new(model: MobileNet<B>, device: B::Device) -> Self {
        let num_classes = model.num_classes();
        Self {
            model: Mutex::new(model),
            device,
            num_classes,
        }
    }
}

impl<B: Backend> Classifier for BurnClassifier<B> {
    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>> {
        let data = TensorData::new(input.as_slice().to_vec(), input.shape());
        let tensor = Tensor::<B, 4>::from_data(data, &self.device);

        let model = self
            .model
            .lock()
            .map_err(|_| DiagnosisError::Inference("classifier lock poisoned".to_string()))?;
        let output = model.forward_softmax(tensor);

        output
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| DiagnosisError::Inference(format!("Failed to extract probabilities: {:?}", e)))
    }
}

/// Loads `CompactRecorder` records into a [`MobileNet`] on the inference backend
#[derive(Debug, Clone, Default)]
pub struct BurnModelLoader {
    config: ModelConfig,
}

impl BurnModelLoader {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }
}

impl ModelLoader for BurnModelLoader {
    fn load(&self, path: &Path) -> Result<Arc<dyn Classifier>> {
        let device = default_device();
        let model: MobileNet<InferenceBackend> = MobileNet::new(&self.config, &device);

        let model = model
            .load_file(path.to_path_buf(), &CompactRecorder::new(), &device)
            .map_err(|e| DiagnosisError::ModelLoad {
                path: path.to_path_buf(),
                reason: format!("{:?}", e),
            })?;

        Ok(Arc::new(BurnClassifier::new(model, device)))
    }
}

/// Observable lifecycle of a [`ClassifierHandle`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ClassifierStatus {
    Unloaded,
    Loading,
    Ready,
    LoadFailed { error: String },
}

/// Lazily initialized, shared classifier
///
/// The first caller of [`ClassifierHandle::get`] loads the model; concurrent
/// callers wait on the same load. A failed load leaves the cell empty, so the
/// next request tries again (e.g. once the artifact has been deployed).
pub struct ClassifierHandle {
    model_path: PathBuf,
    expected_classes: usize,
    loader: Arc<dyn ModelLoader>,
    cell: OnceCell<Arc<dyn Classifier>>,
    status: RwLock<ClassifierStatus>,
}

impl ClassifierHandle {
    pub fn new(
        model_path: impl Into<PathBuf>,
        expected_classes: usize,
        loader: Arc<dyn ModelLoader>,
    ) -> Self {
        Self {
            model_path: model_path.into(),
            expected_classes,
            loader,
            cell: OnceCell::new(),
            status: RwLock::new(ClassifierStatus::Unloaded),
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn is_ready(&self) -> bool {
        self.cell.initialized()
    }

    pub fn status(&self) -> ClassifierStatus {
        self.status
            .read()
            .map(|s| s.clone())
            .unwrap_or(ClassifierStatus::Unloaded)
    }

    fn set_status(&self, status: ClassifierStatus) {
        if let Ok(mut current) = self.status.write() {
            *current = status;
        }
    }

    /// Return the loaded classifier, loading it on first use
    pub async fn get(&self) -> Result<Arc<dyn Classifier>> {
        self.cell
            .get_or_try_init(|| self.load())
            .await
            .map(Arc::clone)
    }

    async fn load(&self) -> Result<Arc<dyn Classifier>> {
        self.set_status(ClassifierStatus::Loading);

        let result = self.load_inner().await;
        match &result {
            Ok(_) => self.set_status(ClassifierStatus::Ready),
            Err(e) => {
                warn!("Model load failed: {}", e);
                self.set_status(ClassifierStatus::LoadFailed {
                    error: e.to_string(),
                });
            }
        }
        result
    }

    async fn load_inner(&self) -> Result<Arc<dyn Classifier>> {
        if !self.model_path.exists() {
            return Err(DiagnosisError::ModelNotFound(self.model_path.clone()));
        }

        let start = Instant::now();
        let loader = Arc::clone(&self.loader);
        let path = self.model_path.clone();
        let classifier = tokio::task::spawn_blocking(move || loader.load(&path))
            .await
            .map_err(|e| DiagnosisError::Inference(format!("model load task failed: {}", e)))??;

        if classifier.num_classes() != self.expected_classes {
            return Err(DiagnosisError::ClassCountMismatch {
                expected: self.expected_classes,
                actual: classifier.num_classes(),
            });
        }

        info!(
            "Disease model loaded from {} in {:.2}s",
            self.model_path.display(),
            start.elapsed().as_secs_f64()
        );
        Ok(classifier)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed probability vector
    pub(crate) struct FixedClassifier {
        pub probabilities: Vec<f32>,
    }

    impl Classifier for FixedClassifier {
        fn num_classes(&self) -> usize {
            self.probabilities.len()
        }

        fn predict(&self, _input: &ImageTensor) -> Result<Vec<f32>> {
            Ok(self.probabilities.clone())
        }
    }

    /// Counts loads and hands out a [`FixedClassifier`]
    pub(crate) struct CountingLoader {
        pub loads: AtomicUsize,
        pub probabilities: Vec<f32>,
    }

    impl CountingLoader {
        pub(crate) fn new(probabilities: Vec<f32>) -> Self {
            Self {
                loads: AtomicUsize::new(0),
                probabilities,
            }
        }
    }

    impl ModelLoader for CountingLoader {
        fn load(&self, _path: &Path) -> Result<Arc<dyn Classifier>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok(Arc::new(FixedClassifier {
                probabilities: self.probabilities.clone(),
            }))
        }
    }

    fn artifact() -> tempfile::NamedTempFile {
        tempfile::Builder::new().suffix(".mpk").tempfile().unwrap()
    }

    #[tokio::test]
    async fn test_missing_artifact_reports_path() {
        let loader = Arc::new(CountingLoader::new(vec![1.0; 15]));
        let handle = ClassifierHandle::new("/nonexistent/model_penyakit.mpk", 15, loader.clone());

        assert_eq!(handle.status(), ClassifierStatus::Unloaded);
        let err = handle.get().await.err().unwrap();
        assert!(matches!(err, DiagnosisError::ModelNotFound(_)));
        assert!(err.to_string().contains("/nonexistent/model_penyakit.mpk"));
        assert!(matches!(handle.status(), ClassifierStatus::LoadFailed { .. }));
        assert_eq!(loader.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_requests_load_once() {
        let file = artifact();
        let loader = Arc::new(CountingLoader::new(vec![0.5; 15]));
        let handle = Arc::new(ClassifierHandle::new(file.path(), 15, loader.clone()));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let handle = Arc::clone(&handle);
                tokio::spawn(async move { handle.get().await.map(|c| c.num_classes()) })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), 15);
        }
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert_eq!(handle.status(), ClassifierStatus::Ready);
        assert!(handle.is_ready());
    }

    #[tokio::test]
    async fn test_retries_after_artifact_appears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model_penyakit.mpk");
        let loader = Arc::new(CountingLoader::new(vec![0.1; 15]));
        let handle = ClassifierHandle::new(&path, 15, loader.clone());

        assert!(handle.get().await.is_err());

        std::fs::write(&path, b"weights").unwrap();
        assert!(handle.get().await.is_ok());
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_class_count_mismatch() {
        let file = artifact();
        let loader = Arc::new(CountingLoader::new(vec![0.1; 38]));
        let handle = ClassifierHandle::new(file.path(), 15, loader);

        let err = handle.get().await.err().unwrap();
        assert!(matches!(
            err,
            DiagnosisError::ClassCountMismatch { expected: 15, actual: 38 }
        ));
    }

    #[tokio::test]
    async fn test_burn_loader_roundtrip_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.mpk");

        let config = ModelConfig::new(15, 32).with_width_multiplier(0.25);
        let device = default_device();
        let model: MobileNet<InferenceBackend> = MobileNet::new(&config, &device);
        model
            .save_file(path.clone(), &CompactRecorder::new())
            .unwrap();

        let loader = Arc::new(BurnModelLoader::new(config));
        let handle = ClassifierHandle::new(&path, 15, loader);
        let classifier = handle.get().await.unwrap();

        let input = ImageTensor::new(
            (0..3 * 32 * 32).map(|i| (i % 7) as f32 / 7.0 - 0.5).collect(),
            32,
            32,
        )
        .unwrap();

        let first = classifier.predict(&input).unwrap();
        let second = classifier.predict(&input).unwrap();
        assert_eq!(first.len(), 15);
        assert_eq!(first, second);
        assert!((first.iter().sum::<f32>() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_burn_loader_rejects_garbage() {
        let file = artifact();
        std::fs::write(file.path(), b"not a record").unwrap();

        let loader = BurnModelLoader::new(ModelConfig::new(15, 32).with_width_multiplier(0.25));
        let err = loader.load(file.path()).err().unwrap();
        assert!(matches!(err, DiagnosisError::ModelLoad { .. }));
    }
}
