use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend room identifier (a natural number on the actor side)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(u64);

impl RoomId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a route segment is not a valid room id
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid room id: {0:?}")]
pub struct InvalidRoomId(pub String);

impl FromStr for RoomId {
    type Err = InvalidRoomId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(RoomId)
            .map_err(|_| InvalidRoomId(s.to_string()))
    }
}

impl From<u64> for RoomId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Role of the local participant in a live room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Publishes camera and microphone
    Host,
    /// Receive-only viewer
    Audience,
}

impl Role {
    pub fn from_is_host(is_host: bool) -> Self {
        if is_host {
            Role::Host
        } else {
            Role::Audience
        }
    }

    pub fn is_host(&self) -> bool {
        matches!(self, Role::Host)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Host => "host",
            Role::Audience => "audience",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The target of one activation: which room, in which role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub room_id: RoomId,
    pub role: Role,
}

impl SessionKey {
    pub fn new(room_id: RoomId, role: Role) -> Self {
        Self { room_id, role }
    }

    pub fn host(room_id: impl Into<RoomId>) -> Self {
        Self::new(room_id.into(), Role::Host)
    }

    pub fn audience(room_id: impl Into<RoomId>) -> Self {
        Self::new(room_id.into(), Role::Audience)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room {} as {}", self.room_id, self.role)
    }
}

/// Opaque identifier of one published stream within a room
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StreamId(String);

impl StreamId {
    const PUBLISH_SUFFIX: &'static str = "main";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Stream id the local publisher uses in `room_id`.
    ///
    /// Derived from the room and the publishing user so two hosts in the same
    /// room never collide.
    pub fn for_publisher(room_id: RoomId, user_id: &str) -> Self {
        Self(format!("{}_{}_{}", room_id, user_id, Self::PUBLISH_SUFFIX))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StreamId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
