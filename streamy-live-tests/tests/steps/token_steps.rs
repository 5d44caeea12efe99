use cucumber::{given, then, when};
use std::time::Duration;
use streamy_live_core::domain::{Role, RoomId, Subject};
use streamy_live_core::error::{LiveError, Severity, TokenError};
use streamy_live_core::testing::ActorCall;
use streamy_live_tests::LiveWorld;

fn error_code(error: &TokenError) -> &'static str {
    match error {
        TokenError::NotAuthenticated => "not-authenticated",
        TokenError::NotConfigured => "not-configured",
        TokenError::Unauthorized => "unauthorized",
        TokenError::RoomNotFound => "room-not-found",
        TokenError::ActorUnavailable => "actor-unavailable",
        TokenError::Unknown(_) => "unknown",
    }
}

// ===== Given Steps =====

#[given(expr = "a signed-in user {string}")]
async fn signed_in_user(world: &mut LiveWorld, principal: String) {
    world.subject = Some(world.guests.subject_for(Some(&principal)));
}

#[given("an anonymous viewer")]
async fn anonymous_viewer(world: &mut LiveWorld) {
    world.subject = Some(world.guests.subject_for(None));
}

#[given(expr = "the backend issues host token {string}")]
async fn backend_issues_host_token(world: &mut LiveWorld, token: String) {
    world.actor.set_host_token(&token);
}

#[given(expr = "the backend issues audience token {string}")]
async fn backend_issues_audience_token(world: &mut LiveWorld, token: String) {
    world.actor.set_audience_token(&token);
}

#[given(expr = "the backend rejects token requests with {string}")]
async fn backend_rejects(world: &mut LiveWorld, message: String) {
    world.actor.reject_tokens(&message);
}

// ===== When Steps =====

async fn request_token(world: &mut LiveWorld, room_id: u64, role: Role) {
    let subject = world.subject();
    match world.tokens.fetch_token(RoomId::new(room_id), role, &subject).await {
        Ok(token) => {
            world.last_token = Some(token);
            world.last_error = None;
        }
        Err(e) => {
            world.last_token = None;
            world.last_error = Some(e.into());
        }
    }
}

#[when(expr = "the user requests a host token for room {int}")]
async fn request_host_token(world: &mut LiveWorld, room_id: u64) {
    request_token(world, room_id, Role::Host).await;
}

#[when(expr = "the user requests an audience token for room {int}")]
async fn request_audience_token(world: &mut LiveWorld, room_id: u64) {
    request_token(world, room_id, Role::Audience).await;
}

#[when(expr = "{int} minutes pass")]
async fn minutes_pass(world: &mut LiveWorld, minutes: u64) {
    world.clock.advance(Duration::from_secs(minutes * 60));
}

// ===== Then Steps =====

#[then(expr = "the token is {string}")]
async fn token_is(world: &mut LiveWorld, expected: String) {
    let token = world.last_token.as_ref().expect("No token received");
    assert_eq!(token.value(), expected);
}

#[then(expr = "the backend was asked for a host token for room {int} as {string}")]
async fn backend_asked_for_host_token(world: &mut LiveWorld, room_id: u64, user_id: String) {
    assert!(world
        .actor
        .calls()
        .contains(&ActorCall::HostToken { room_id, user_id }));
    assert!(matches!(world.subject, Some(Subject::Authenticated(_))));
}

#[then(expr = "the token request failed with {string}")]
async fn token_request_failed(world: &mut LiveWorld, code: String) {
    let error = world.token_error().expect("Expected a token error");
    assert_eq!(error_code(&error), code);
}

#[then("the backend received no token requests")]
async fn no_token_requests(world: &mut LiveWorld) {
    assert_eq!(world.actor.token_calls(), 0);
}

#[then(expr = "the backend received {int} token request(s)")]
async fn token_requests(world: &mut LiveWorld, count: usize) {
    assert_eq!(world.actor.token_calls(), count);
}

#[then(expr = "the error is shown as informational with title {string}")]
async fn error_is_informational(world: &mut LiveWorld, title: String) {
    let error: &LiveError = world.last_error.as_ref().expect("No error recorded");
    assert_eq!(error.severity(), Severity::Informational);
    assert_eq!(error.title(), title);
}
