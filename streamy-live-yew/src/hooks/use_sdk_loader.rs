use crate::infrastructure::{WindowSdk, ZegoSdk};
use streamy_live_core::application::{SdkLoader, SdkLoaderConfig, SdkReadiness};
use streamy_live_core::infrastructure::GlooTimer;
use yew::prelude::*;

/// SDK readiness plus a manual retry
#[derive(Clone, PartialEq)]
pub struct SdkLoaderHandle {
    pub readiness: SdkReadiness<ZegoSdk>,
    pub retries_used: u32,
    pub max_retries: u32,
    pub retry: Callback<()>,
}

/// Poll for the CDN engine global for as long as the component is mounted
#[hook]
pub fn use_sdk_loader(config: SdkLoaderConfig) -> SdkLoaderHandle {
    let readiness = use_state(|| SdkReadiness::<ZegoSdk>::Loading);
    let retries_used = use_state(|| 0u32);
    let max_retries = config.max_retries;

    let loader = {
        let setter = readiness.setter();
        use_memo((), move |_| {
            SdkLoader::new(WindowSdk::default(), GlooTimer, config)
                .with_observer(move |r| setter.set(r.clone()))
        })
    };

    {
        let loader = loader.clone();
        use_effect_with((), move |_| {
            let running = loader.clone();
            wasm_bindgen_futures::spawn_local(async move {
                running.load().await;
            });
            move || loader.cancel()
        });
    }

    let retry = {
        let loader = loader.clone();
        let retries_used = retries_used.setter();
        Callback::from(move |_: ()| {
            let loader = loader.clone();
            let retries_used = retries_used.clone();
            wasm_bindgen_futures::spawn_local(async move {
                loader.retry().await;
                retries_used.set(loader.retries_used());
            });
        })
    };

    SdkLoaderHandle {
        readiness: (*readiness).clone(),
        retries_used: *retries_used,
        max_retries,
        retry,
    }
}
