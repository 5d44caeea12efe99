use async_trait::async_trait;
use instant::Duration;

/// Async sleep, injected so polling loops stay testable
#[async_trait(?Send)]
pub trait Timer {
    async fn sleep(&self, duration: Duration);
}

/// Tokio-backed timer for native builds
#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
#[async_trait(?Send)]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Browser timer (`setTimeout`)
#[cfg(feature = "browser")]
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooTimer;

#[cfg(feature = "browser")]
#[async_trait(?Send)]
impl Timer for GlooTimer {
    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}
