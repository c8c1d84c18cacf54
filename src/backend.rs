//! Backend abstraction - inference-only backend selection
//!
//! NdArray (CPU) by default, CUDA when the `cuda` feature is enabled.
//! No autodiff: the classifier is never trained here.

use tracing::{debug, warn};

// --------------------------------------------------------------------------------
// BACKEND SELECTION: CUDA (opt-in) or NdArray (default)
// --------------------------------------------------------------------------------

#[cfg(feature = "cuda")]
pub type InferenceBackend = burn_cuda::Cuda;

#[cfg(all(not(feature = "cuda"), feature = "ndarray"))]
pub type InferenceBackend = burn_ndarray::NdArray;

#[cfg(all(not(feature = "cuda"), not(feature = "ndarray")))]
compile_error!("At least one backend (cuda or ndarray) must be enabled!");

/// Get the default device
pub fn default_device() -> <InferenceBackend as burn::tensor::backend::Backend>::Device {
    <InferenceBackend as burn::tensor::backend::Backend>::Device::default()
}

/// Get a human-readable name for the current backend
pub fn backend_name() -> &'static str {
    #[cfg(feature = "cuda")]
    {
        "CUDA (GPU)"
    }

    #[cfg(all(not(feature = "cuda"), feature = "ndarray"))]
    {
        "NdArray (CPU)"
    }
}

/// Apply the process-wide CPU math toggle
///
/// When `disable_optimizations` is set, the global rayon pool backing the
/// NdArray kernels is pinned to a single thread so reductions run in a fixed
/// order. Outputs are unaffected apart from floating-point rounding. Has to run
/// before the first inference; a pool that already exists is left alone.
///
/// Returns `true` if this call installed the single-threaded pool.
pub fn configure_cpu_math(disable_optimizations: bool) -> bool {
    if !disable_optimizations {
        debug!("CPU math optimizations enabled");
        return false;
    }

    match rayon::ThreadPoolBuilder::new().num_threads(1).build_global() {
        Ok(()) => {
            debug!("CPU math optimizations disabled (single-threaded kernels)");
            true
        }
        Err(e) => {
            warn!("Could not pin CPU math pool, keeping existing one: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_available() {
        let _device = default_device();
        assert!(!backend_name().is_empty());
    }

    #[test]
    fn test_configure_cpu_math() {
        assert!(!configure_cpu_math(false));

        // Another test may already have started the global pool
        if configure_cpu_math(true) {
            assert_eq!(rayon::current_num_threads(), 1);
        }

        // The global pool can only be installed once per process
        assert!(!configure_cpu_math(true));
    }
}
