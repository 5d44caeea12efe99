use cucumber::{given, then, when};
use std::time::Duration;
use streamy_live_core::application::SdkReadiness;
use streamy_live_core::testing::ScriptedSdk;
use streamy_live_tests::LiveWorld;

// ===== Given Steps =====

#[given(expr = "the SDK global appears on check {int}")]
async fn sdk_appears_on(world: &mut LiveWorld, attempt: u32) {
    world.with_sdk(ScriptedSdk::appears_at(attempt));
}

#[given("the SDK global never appears")]
async fn sdk_never_appears(world: &mut LiveWorld) {
    world.with_sdk(ScriptedSdk::never());
}

// ===== When Steps =====

#[when("the SDK is loaded")]
async fn sdk_is_loaded(world: &mut LiveWorld) {
    world.loader().load().await;
}

#[when(expr = "the SDK is retried {int} time(s)")]
async fn sdk_is_retried(world: &mut LiveWorld, times: u32) {
    for _ in 0..times {
        world.loader().retry().await;
    }
}

// ===== Then Steps =====

#[then("the SDK is ready")]
async fn sdk_is_ready(world: &mut LiveWorld) {
    assert!(
        world.loader().is_ready(),
        "Expected Ready, got {:?}",
        world.loader().readiness()
    );
}

#[then(expr = "the SDK failed with {string}")]
async fn sdk_failed_with(world: &mut LiveWorld, kind: String) {
    match world.loader().readiness() {
        SdkReadiness::Failed(e) => assert_eq!(e.kind.as_str(), kind),
        other => panic!("Expected Failed({}), got {:?}", kind, other),
    }
}

#[then(expr = "the loader checked {int} times")]
async fn loader_checked(world: &mut LiveWorld, checks: u32) {
    let sdk = world.sdk.as_ref().expect("No SDK configured");
    assert_eq!(sdk.checks(), checks);
}

#[then(expr = "the loader waited {int} ms in total")]
async fn loader_waited(world: &mut LiveWorld, millis: u64) {
    assert_eq!(world.timer.total_slept(), Duration::from_millis(millis));
}
