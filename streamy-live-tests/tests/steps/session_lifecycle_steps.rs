use cucumber::{given, then, when};
use streamy_live_core::application::GUEST_USER_ID_KEY;
use streamy_live_core::domain::{Role, RoomId, SessionKey, SessionPhase};
use streamy_live_core::error::{LiveError, MediaErrorReason};
use streamy_live_core::infrastructure::SessionStore;
use streamy_live_core::testing::EngineCall;
use streamy_live_tests::LiveWorld;

fn role(raw: &str) -> Role {
    match raw {
        "host" => Role::Host,
        "audience" => Role::Audience,
        other => panic!("Unknown role '{}'", other),
    }
}

fn is_logout(call: &EngineCall) -> bool {
    matches!(call, EngineCall::LogoutRoom { .. })
}

// ===== Given Steps =====

#[given(expr = "an anonymous viewer with guest id {string}")]
async fn anonymous_viewer_with_id(world: &mut LiveWorld, guest_id: String) {
    world.storage.set(GUEST_USER_ID_KEY, &guest_id);
    world.subject = Some(world.guests.subject_for(None));
}

#[given(expr = "the camera is blocked with {string}")]
async fn camera_blocked(world: &mut LiveWorld, dom_name: String) {
    world.engines.fail_capture(&dom_name);
}

// ===== When Steps =====

#[given(expr = "the user opens room {int} as {word}")]
async fn user_has_opened_room(world: &mut LiveWorld, room_id: u64, as_role: String) {
    world.open_room(room_id, role(&as_role)).await;
}

#[when(expr = "the user opens room {int} as {word}")]
async fn user_opens_room(world: &mut LiveWorld, room_id: u64, as_role: String) {
    world.open_room(room_id, role(&as_role)).await;
}

#[when("the user leaves the room")]
async fn user_leaves(world: &mut LiveWorld) {
    world.controller.teardown().await;
}

#[when(expr = "the user leaves room {int} while the login is pending")]
async fn user_leaves_during_login(world: &mut LiveWorld, room_id: u64) {
    let subject = world.subject();
    let key = SessionKey::new(RoomId::new(room_id), Role::Audience);
    let token = world
        .tokens
        .fetch_token(key.room_id, key.role, &subject)
        .await
        .expect("Token should be issued");
    let gate = world.engines.gate_login();

    let world = &*world;
    let activation = world.controller.sync(world.inputs(key, Some(token)));
    let leave = async {
        tokio::task::yield_now().await;
        world.controller.invalidate();
        let _ = gate.send(());
        world.controller.teardown().await;
    };
    let (result, _) = futures::join!(activation, leave);
    assert!(result.is_ok(), "Superseded login must not fail: {:?}", result);
}

// ===== Then Steps =====

#[then(expr = "the engine logged into room {string} with token {string} as {string}")]
async fn engine_logged_in(world: &mut LiveWorld, room_id: String, token: String, user_id: String) {
    let login = world
        .engines
        .calls()
        .into_iter()
        .find(|c| matches!(c, EngineCall::LoginRoom { .. }))
        .expect("No login happened");

    match login {
        EngineCall::LoginRoom {
            room_id: r,
            token: t,
            user_id: u,
            ..
        } => {
            assert_eq!(r, room_id);
            assert_eq!(t, token);
            assert_eq!(u, user_id);
        }
        other => panic!("Unexpected call {:?}", other),
    }
}

#[then(expr = "the session went through {string}")]
async fn session_went_through(world: &mut LiveWorld, phases: String) {
    let expected: Vec<&str> = phases.split(',').map(str::trim).collect();
    assert_eq!(*world.phases.borrow(), expected);
}

#[then(expr = "the stream {string} is published")]
async fn stream_is_published(world: &mut LiveWorld, stream_id: String) {
    assert_eq!(
        world.count(|c| *c == EngineCall::StartPublishing(stream_id.clone())),
        1
    );
    assert!(world.controller.is_publishing());
}

#[then("the local preview is shown")]
async fn local_preview_shown(world: &mut LiveWorld) {
    assert!(world.sink.local().is_some());
}

#[then("no camera was captured")]
async fn no_camera(world: &mut LiveWorld) {
    assert_eq!(world.count(|c| *c == EngineCall::CreateStream), 0);
    assert_eq!(world.count(|c| matches!(c, EngineCall::StartPublishing(_))), 0);
}

#[then(expr = "engine {int} logged out exactly once")]
async fn engine_logged_out_once(world: &mut LiveWorld, instance: u32) {
    let logouts = world
        .engines
        .log()
        .iter()
        .filter(|(i, c)| *i == instance && is_logout(c))
        .count();
    assert_eq!(logouts, 1);
}

#[then(expr = "engine {int} destroyed its local stream exactly once")]
async fn engine_destroyed_stream_once(world: &mut LiveWorld, instance: u32) {
    let destroyed = world
        .engines
        .log()
        .iter()
        .filter(|(i, c)| *i == instance && matches!(c, EngineCall::DestroyStream(_)))
        .count();
    assert_eq!(destroyed, 1);
}

#[then(expr = "engine {int} was released before engine {int} logged in")]
async fn released_before_login(world: &mut LiveWorld, old: u32, new: u32) {
    let log = world.engines.log();
    let released = log
        .iter()
        .position(|(i, c)| *i == old && *c == EngineCall::Destroy)
        .expect("Old engine was never released");
    let login = log
        .iter()
        .position(|(i, c)| *i == new && matches!(c, EngineCall::LoginRoom { .. }))
        .expect("New engine never logged in");
    assert!(released < login);
}

#[then(expr = "the engine logged out {int} time(s)")]
async fn engine_logged_out(world: &mut LiveWorld, times: usize) {
    assert_eq!(world.count(is_logout), times);
}

#[then(expr = "the engine destroyed {int} local stream(s)")]
async fn engine_destroyed_streams(world: &mut LiveWorld, times: usize) {
    assert_eq!(
        world.count(|c| matches!(c, EngineCall::DestroyStream(_))),
        times
    );
}

#[then(expr = "the session is {string}")]
async fn session_is(world: &mut LiveWorld, phase: String) {
    assert_eq!(world.controller.phase().name(), phase);
}

#[then("the session failed with a permission error")]
async fn session_failed_with_permission_error(world: &mut LiveWorld) {
    match world.controller.phase() {
        SessionPhase::Error(LiveError::MediaAcquisition(e)) => {
            assert_eq!(e.reason, MediaErrorReason::PermissionDenied)
        }
        other => panic!("Expected a media error, got {:?}", other),
    }
}
