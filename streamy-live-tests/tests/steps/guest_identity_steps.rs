use cucumber::{then, when};
use streamy_live_core::domain::GuestIdentity;
use streamy_live_tests::LiveWorld;

// ===== When Steps =====

#[when("the guest id is requested")]
async fn guest_id_requested(world: &mut LiveWorld) {
    let id = world.guests.get_or_create_guest_id();
    world.guest_ids.push(id);
}

#[when("the guest id is cleared")]
async fn guest_id_cleared(world: &mut LiveWorld) {
    world.guests.clear_guest_id();
}

// ===== Then Steps =====

#[then("both guest ids are the same")]
async fn guest_ids_same(world: &mut LiveWorld) {
    assert_eq!(world.guest_ids.len(), 2);
    assert_eq!(world.guest_ids[0], world.guest_ids[1]);
}

#[then("the guest ids differ")]
async fn guest_ids_differ(world: &mut LiveWorld) {
    assert_eq!(world.guest_ids.len(), 2);
    assert_ne!(world.guest_ids[0], world.guest_ids[1]);
}

#[then(expr = "the guest id looks like {string}")]
async fn guest_id_format(world: &mut LiveWorld, _pattern: String) {
    let id = world.guest_ids.last().expect("No guest id requested");
    assert!(GuestIdentity::is_guest_id(id), "Malformed guest id {}", id);

    let parts: Vec<&str> = id.split('_').collect();
    assert_eq!(parts.len(), 3);
    assert!(parts[1].parse::<u64>().is_ok());
    assert_eq!(parts[2].len(), 9);
}

#[then("no guest id is stored")]
async fn no_guest_id(world: &mut LiveWorld) {
    assert!(world.storage.is_empty());
}
