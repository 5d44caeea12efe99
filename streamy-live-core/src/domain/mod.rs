mod guest;
mod room;
mod session;
mod token;

pub use guest::GuestIdentity;
pub use room::{InvalidRoomId, Role, RoomId, SessionKey, StreamId};
pub use session::{Epoch, SessionPhase};
pub use token::{SessionToken, Subject};
