use crate::application::SdkLoaderConfig;
use crate::error::{SdkError, SdkErrorKind};
use crate::infrastructure::{SdkProvider, Timer};
use std::cell::RefCell;
use std::rc::Rc;

/// Readiness of the engine SDK
#[derive(Debug, Clone, PartialEq)]
pub enum SdkReadiness<H> {
    Loading,
    Ready(H),
    Failed(SdkError),
}

impl<H> SdkReadiness<H> {
    pub fn is_ready(&self) -> bool {
        matches!(self, SdkReadiness::Ready(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SdkReadiness::Loading)
    }

    pub fn handle(&self) -> Option<&H> {
        match self {
            SdkReadiness::Ready(h) => Some(h),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&SdkError> {
        match self {
            SdkReadiness::Failed(e) => Some(e),
            _ => None,
        }
    }
}

type ReadinessObserver<H> = Rc<dyn Fn(&SdkReadiness<H>)>;

struct LoaderState<H> {
    readiness: SdkReadiness<H>,
    retries_used: u32,
    /// Bumped by every load and by cancel; a poll loop only writes while its
    /// generation is current.
    generation: u64,
}

/// Polls for the CDN-loaded SDK global with a bounded window
pub struct SdkLoader<P: SdkProvider, T: Timer> {
    provider: P,
    timer: T,
    config: SdkLoaderConfig,
    state: RefCell<LoaderState<P::Handle>>,
    observer: Option<ReadinessObserver<P::Handle>>,
}

impl<P, T> SdkLoader<P, T>
where
    P: SdkProvider,
    P::Handle: 'static,
    T: Timer,
{
    pub fn new(provider: P, timer: T, config: SdkLoaderConfig) -> Self {
        Self {
            provider,
            timer,
            config,
            state: RefCell::new(LoaderState {
                readiness: SdkReadiness::Loading,
                retries_used: 0,
                generation: 0,
            }),
            observer: None,
        }
    }

    /// Called after every readiness transition
    pub fn with_observer(mut self, observer: impl Fn(&SdkReadiness<P::Handle>) + 'static) -> Self {
        self.observer = Some(Rc::new(observer));
        self
    }

    pub fn readiness(&self) -> SdkReadiness<P::Handle> {
        self.state.borrow().readiness.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.state.borrow().readiness.is_ready()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().readiness.is_loading()
    }

    pub fn error(&self) -> Option<SdkError> {
        self.state.borrow().readiness.error().cloned()
    }

    pub fn handle(&self) -> Option<P::Handle> {
        self.state.borrow().readiness.handle().cloned()
    }

    pub fn retries_used(&self) -> u32 {
        self.state.borrow().retries_used
    }

    /// Run one full polling sequence.
    ///
    /// Checks immediately, then once per poll interval until the SDK shows up
    /// or `max_check_attempts` checks have been made.
    pub async fn load(&self) -> SdkReadiness<P::Handle> {
        let generation = self.begin();
        let max_attempts = self.config.max_check_attempts.max(1);

        tracing::info!("📦 Starting SDK load sequence");

        for attempt in 1..=max_attempts {
            if !self.is_current(generation) {
                tracing::debug!("⏹️  SDK polling superseded at attempt {}", attempt);
                return self.readiness();
            }

            tracing::debug!(
                "🔎 Checking for SDK global (attempt {}/{})",
                attempt,
                max_attempts
            );

            if let Some(handle) = self.provider.try_get() {
                tracing::info!("✅ SDK global found after {} attempt(s)", attempt);
                self.finish(generation, SdkReadiness::Ready(handle));
                return self.readiness();
            }

            if attempt == max_attempts {
                tracing::error!("❌ SDK global not found after {} attempts", attempt);
                self.finish(generation, SdkReadiness::Failed(SdkError::cdn_load(attempt)));
                return self.readiness();
            }

            self.timer.sleep(self.config.poll_interval()).await;
        }

        self.readiness()
    }

    /// Restart polling, up to `max_retries` times.
    ///
    /// Past the budget this fails with [`SdkErrorKind::Initialization`] and
    /// does not poll again.
    pub async fn retry(&self) -> SdkReadiness<P::Handle> {
        let max_retries = self.config.max_retries;
        let granted = {
            let mut state = self.state.borrow_mut();
            if state.retries_used < max_retries {
                state.retries_used += 1;
                Some(state.retries_used)
            } else {
                None
            }
        };

        match granted {
            Some(n) => {
                tracing::info!("🔁 SDK retry attempt {}/{}", n, max_retries);
                self.load().await
            }
            None => {
                tracing::error!("❌ SDK max retries reached");
                let failed = {
                    let mut state = self.state.borrow_mut();
                    state.generation += 1;
                    state.readiness =
                        SdkReadiness::Failed(SdkError::retries_exhausted(state.retries_used));
                    state.readiness.clone()
                };
                self.notify(&failed);
                failed
            }
        }
    }

    /// Stop any in-flight polling; its later wake-ups become no-ops.
    pub fn cancel(&self) {
        self.state.borrow_mut().generation += 1;
        tracing::debug!("⏹️  SDK polling cancelled");
    }

    fn begin(&self) -> u64 {
        let (generation, readiness) = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            state.readiness = SdkReadiness::Loading;
            (state.generation, state.readiness.clone())
        };
        self.notify(&readiness);
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.state.borrow().generation == generation
    }

    fn finish(&self, generation: u64, readiness: SdkReadiness<P::Handle>) {
        {
            let mut state = self.state.borrow_mut();
            if state.generation != generation {
                return;
            }
            if readiness.is_ready() {
                state.retries_used = 0;
            }
            state.readiness = readiness.clone();
        }
        self.notify(&readiness);
    }

    fn notify(&self, readiness: &SdkReadiness<P::Handle>) {
        if let Some(observer) = &self.observer {
            observer(readiness);
        }
    }
}

/// Whether a failed readiness can still be retried without a reload
pub fn is_retryable(error: &SdkError) -> bool {
    error.kind == SdkErrorKind::CdnLoad
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InstantTimer, ScriptedSdk};
    use instant::Duration;

    fn loader(sdk: ScriptedSdk, timer: InstantTimer) -> SdkLoader<ScriptedSdk, InstantTimer> {
        SdkLoader::new(sdk, timer, SdkLoaderConfig::default())
    }

    #[tokio::test]
    async fn test_ready_immediately() {
        let sdk = ScriptedSdk::appears_at(1);
        let timer = InstantTimer::new();
        let loader = loader(sdk.clone(), timer.clone());

        let readiness = loader.load().await;

        assert!(readiness.is_ready());
        assert_eq!(sdk.checks(), 1);
        assert_eq!(timer.total_slept(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_ready_within_window_for_every_attempt() {
        for k in 1..=30u32 {
            let sdk = ScriptedSdk::appears_at(k);
            let timer = InstantTimer::new();
            let loader = loader(sdk.clone(), timer.clone());

            let readiness = loader.load().await;

            assert!(readiness.is_ready(), "attempt {} should be ready", k);
            assert_eq!(sdk.checks(), k);
            assert!(timer.total_slept() <= Duration::from_millis(3000));
            assert_eq!(
                timer.total_slept(),
                Duration::from_millis(100) * (k - 1)
            );
        }
    }

    #[tokio::test]
    async fn test_fails_with_cdn_load_after_window() {
        let sdk = ScriptedSdk::appears_at(31);
        let loader = loader(sdk.clone(), InstantTimer::new());

        let readiness = loader.load().await;

        let error = readiness.error().unwrap();
        assert_eq!(error.kind, SdkErrorKind::CdnLoad);
        assert_eq!(error.attempts_made, 30);
        assert_eq!(sdk.checks(), 30);
        assert!(!loader.is_loading());
        assert!(is_retryable(error));
    }

    #[tokio::test]
    async fn test_retry_budget_then_initialization_error() {
        let sdk = ScriptedSdk::never();
        let loader = loader(sdk.clone(), InstantTimer::new());

        loader.load().await;
        for _ in 0..3 {
            let r = loader.retry().await;
            assert_eq!(r.error().unwrap().kind, SdkErrorKind::CdnLoad);
        }
        let checks_before = sdk.checks();
        assert_eq!(checks_before, 4 * 30);

        for _ in 0..2 {
            let r = loader.retry().await;
            assert_eq!(r.error().unwrap().kind, SdkErrorKind::Initialization);
        }
        assert_eq!(sdk.checks(), checks_before, "exhausted retry must not poll");
    }

    #[tokio::test]
    async fn test_retry_succeeds_and_resets_budget() {
        let sdk = ScriptedSdk::appears_at(35);
        let loader = loader(sdk.clone(), InstantTimer::new());

        assert!(!loader.load().await.is_ready());
        assert!(loader.retry().await.is_ready());
        assert_eq!(loader.retries_used(), 0);
        assert!(loader.handle().is_some());
    }

    #[tokio::test]
    async fn test_cancel_stops_polling() {
        let sdk = ScriptedSdk::never();
        let timer = InstantTimer::new();
        let loader = Rc::new(loader(sdk.clone(), timer.clone()));

        let l = loader.clone();
        timer.on_sleep(move |n| {
            if n == 5 {
                l.cancel();
            }
        });

        let readiness = loader.load().await;

        assert!(readiness.is_loading());
        assert_eq!(sdk.checks(), 5);
    }

    #[tokio::test]
    async fn test_observer_sees_transitions() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let loader = SdkLoader::new(
            ScriptedSdk::appears_at(2),
            InstantTimer::new(),
            SdkLoaderConfig::default(),
        )
        .with_observer(move |r| s.borrow_mut().push(r.is_ready()));

        loader.load().await;

        assert_eq!(*seen.borrow(), vec![false, true]);
    }
}
