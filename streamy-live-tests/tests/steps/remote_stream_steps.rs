use cucumber::{given, then, when};
use streamy_live_core::infrastructure::StreamUpdateKind;
use streamy_live_core::testing::EngineCall;
use streamy_live_tests::LiveWorld;

async fn announce(world: &mut LiveWorld, kind: StreamUpdateKind, stream_id: &str, user_id: &str) {
    let room = world
        .controller
        .key()
        .map(|k| k.room_id.to_string())
        .expect("No room opened");
    world.engines.emit_streams(kind, &room, &[(stream_id, user_id)]);
    world.controller.pump_events().await;
}

// ===== Given / When Steps =====

#[given(expr = "the engine announces stream {string} from {string}")]
async fn engine_has_announced(world: &mut LiveWorld, stream_id: String, user_id: String) {
    announce(world, StreamUpdateKind::Add, &stream_id, &user_id).await;
}

#[when(expr = "the engine announces stream {string} from {string}")]
async fn engine_announces(world: &mut LiveWorld, stream_id: String, user_id: String) {
    announce(world, StreamUpdateKind::Add, &stream_id, &user_id).await;
}

#[when(expr = "the engine removes stream {string} from {string}")]
async fn engine_removes(world: &mut LiveWorld, stream_id: String, user_id: String) {
    announce(world, StreamUpdateKind::Delete, &stream_id, &user_id).await;
}

// ===== Then Steps =====

#[then("no stream is played")]
async fn no_stream_played(world: &mut LiveWorld) {
    assert_eq!(
        world.count(|c| matches!(c, EngineCall::StartPlaying(_))),
        0
    );
    assert_eq!(world.sink.remote_count(), 0);
}

#[then(expr = "stream {string} was played {int} time(s)")]
async fn stream_played(world: &mut LiveWorld, stream_id: String, times: usize) {
    assert_eq!(
        world.count(|c| *c == EngineCall::StartPlaying(stream_id.clone())),
        times
    );
}

#[then(expr = "stream {string} is bound to a surface")]
async fn stream_bound(world: &mut LiveWorld, stream_id: String) {
    assert!(world.sink.remote(&stream_id).is_some());
}

#[then(expr = "stream {string} is not bound to a surface")]
async fn stream_not_bound(world: &mut LiveWorld, stream_id: String) {
    assert!(world.sink.remote(&stream_id).is_none());
    assert!(world.controller.remote_streams().is_empty());
}
