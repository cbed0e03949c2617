//! Connected clients

use std::path::PathBuf;

/// Opaque identifier of a client connection
///
/// Ids are never reused within one [`Display`](super::Display), so a `ClientId` stays a
/// valid key into per-client maps after the client is gone. It just resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl ClientId {
    /// Build an id from its raw value
    ///
    /// Only meaningful for ids previously handed out by a display.
    pub const fn from_raw(raw: u64) -> ClientId {
        ClientId(raw)
    }

    /// The raw value of this id
    pub const fn as_raw(&self) -> u64 {
        self.0
    }
}

/// What the transport knows about the peer of a connection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientCredentials {
    /// Process id of the peer, if it could be determined
    pub pid: Option<u32>,
    /// Path of the peer's executable, if it could be determined
    pub executable: Option<PathBuf>,
    /// Restricted interfaces this client was explicitly granted
    pub granted_interfaces: Vec<String>,
}

impl ClientCredentials {
    /// Credentials of a peer running in the compositor's own process
    pub fn own_process() -> ClientCredentials {
        ClientCredentials {
            pid: Some(std::process::id()),
            ..Default::default()
        }
    }

    /// Whether the peer is the compositor process itself
    pub fn is_own_process(&self) -> bool {
        self.pid == Some(std::process::id())
    }

    /// Whether `interface` was explicitly granted to the peer
    pub fn grants(&self, interface: &str) -> bool {
        self.granted_interfaces.iter().any(|granted| granted == interface)
    }
}

/// First protocol id available for objects created by the server
pub(crate) const SERVER_ID_START: u32 = 0xff00_0000;

#[derive(Debug)]
pub(crate) struct ClientConnection {
    pub(crate) credentials: ClientCredentials,
    pub(crate) alive: bool,
    pub(crate) failed: bool,
    next_server_id: u32,
}

impl ClientConnection {
    pub(crate) fn new(credentials: ClientCredentials) -> ClientConnection {
        ClientConnection {
            credentials,
            alive: true,
            failed: false,
            next_server_id: SERVER_ID_START,
        }
    }

    /// A client accepts requests and events until it disconnects or gets a protocol error
    pub(crate) fn is_active(&self) -> bool {
        self.alive && !self.failed
    }

    /// Allocate the next server-side id, `None` once the id space is exhausted
    pub(crate) fn allocate_server_id(&mut self) -> Option<u32> {
        let id = self.next_server_id;
        if id == 0 {
            return None;
        }
        self.next_server_id = id.wrapping_add(1);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_ids_run_out() {
        let mut client = ClientConnection::new(ClientCredentials::default());
        assert_eq!(client.allocate_server_id(), Some(SERVER_ID_START));
        client.next_server_id = u32::MAX;
        assert_eq!(client.allocate_server_id(), Some(u32::MAX));
        assert_eq!(client.allocate_server_id(), None);
    }

    #[test]
    fn grants() {
        let credentials = ClientCredentials {
            granted_interfaces: vec!["org_kde_plasma_window_management".into()],
            ..Default::default()
        };
        assert!(credentials.grants("org_kde_plasma_window_management"));
        assert!(!credentials.grants("org_kde_kwin_remote_access_manager"));
        assert!(!credentials.is_own_process());
        assert!(ClientCredentials::own_process().is_own_process());
    }
}
