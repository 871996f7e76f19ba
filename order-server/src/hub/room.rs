//! Room keys and connection identities

use std::fmt;

/// Hub-local connection handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(pub(crate) u64);

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Room address
///
/// Table and staff rooms live in separate namespaces, so a table and a staff
/// member that happen to share an id never share a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomKey(String);

impl RoomKey {
    pub fn table(table_id: &str) -> Self {
        Self(format!("table:{table_id}"))
    }

    pub fn staff(staff_id: &str) -> Self {
        Self(format!("staff:{staff_id}"))
    }

    /// Private room of an anonymous connection without a table
    pub fn connection(conn: ConnId) -> Self {
        Self(format!("conn:{}", conn.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who is on the other end of a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Authenticated staff member
    Staff(String),
    /// Anonymous customer session bound to a table
    Table(String),
    /// Neither credential nor table
    Anonymous,
}

impl Identity {
    /// The room a connection joins as soon as it registers
    pub fn personal_room(&self, conn: ConnId) -> RoomKey {
        match self {
            Identity::Staff(id) => RoomKey::staff(id),
            Identity::Table(id) => RoomKey::table(id),
            Identity::Anonymous => RoomKey::connection(conn),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Staff(id) => write!(f, "staff:{id}"),
            Identity::Table(id) => write!(f, "table:{id}"),
            Identity::Anonymous => f.write_str("anonymous"),
        }
    }
}
