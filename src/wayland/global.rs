//! Globals advertised to clients

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use super::client::{ClientCredentials, ClientId};
use super::display::DisplayHandle;
use super::interface::Interface;
use super::resource::{DataInit, New, ObjectId, ResourceSet};

/// Name of a global, as advertised in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlobalId(u32);

impl GlobalId {
    pub(crate) fn new(name: u32) -> GlobalId {
        GlobalId(name)
    }

    /// The registry name of this global
    pub fn name(&self) -> u32 {
        self.0
    }
}

/// Public description of a global
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalInfo {
    /// Registry name
    pub id: GlobalId,
    /// Interface of the global
    pub interface: &'static str,
    /// Highest version clients can bind
    pub version: u32,
}

/// Handling of binds to globals of interface `I` with global data `G`
pub trait GlobalDispatch<I: Interface, G, D = Self> {
    /// A client bound the global
    ///
    /// `resource` carries the negotiated version. It gets registered in the resource set of
    /// the global as soon as it is initialized.
    fn bind(
        state: &mut D,
        handle: &DisplayHandle,
        client: ClientId,
        resource: New<I>,
        global_data: &G,
        data_init: &mut DataInit<'_, D>,
    );

    /// Whether the global should be advertised to and bindable by `client`
    fn can_view(_client: ClientId, _credentials: &ClientCredentials, _global_data: &G) -> bool {
        true
    }
}

/// A global advertised by the display
///
/// Globals of this protocol family are never retracted, this handle simply gives access to
/// the resources bound to it.
pub struct Global<I: Interface> {
    info: GlobalInfo,
    resources: ResourceSet<I>,
}

impl<I: Interface> Global<I> {
    pub(crate) fn new(info: GlobalInfo, resources: ResourceSet<I>) -> Global<I> {
        Global { info, resources }
    }

    /// Registry name of the global
    pub fn id(&self) -> GlobalId {
        self.info.id
    }

    /// Highest version clients can bind
    pub fn version(&self) -> u32 {
        self.info.version
    }

    /// Every live resource bound to this global
    pub fn resources(&self) -> &ResourceSet<I> {
        &self.resources
    }
}

impl<I: Interface> Clone for Global<I> {
    fn clone(&self) -> Self {
        Global {
            info: self.info.clone(),
            resources: self.resources.clone(),
        }
    }
}

impl<I: Interface> fmt::Debug for Global<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Global")
            .field("name", &self.info.id.name())
            .field("interface", &I::NAME)
            .field("version", &self.info.version)
            .field("resources", &self.resources.len())
            .finish()
    }
}

/// Decides which globals each client gets to see
pub trait GlobalFilter {
    /// Whether `global` is visible to `client`
    fn can_view(&self, client: ClientId, credentials: &ClientCredentials, global: &GlobalInfo) -> bool;
}

impl<F> GlobalFilter for F
where
    F: Fn(ClientId, &ClientCredentials, &GlobalInfo) -> bool,
{
    fn can_view(&self, client: ClientId, credentials: &ClientCredentials, global: &GlobalInfo) -> bool {
        self(client, credentials, global)
    }
}

/// Filter hiding privileged interfaces from untrusted clients
///
/// A restricted interface is visible to clients running in the compositor process, and
/// to clients whose credentials grant it explicitly. Every other interface is visible to
/// everyone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictedInterfaces {
    interfaces: HashSet<String>,
}

impl Default for RestrictedInterfaces {
    fn default() -> Self {
        RestrictedInterfaces::new([
            "org_kde_kwin_remote_access_manager",
            "org_kde_plasma_window_management",
        ])
    }
}

impl RestrictedInterfaces {
    /// Restrict the given interfaces
    pub fn new<S: Into<String>>(interfaces: impl IntoIterator<Item = S>) -> RestrictedInterfaces {
        RestrictedInterfaces {
            interfaces: interfaces.into_iter().map(Into::into).collect(),
        }
    }

    /// Add an interface to the restricted set
    pub fn restrict(&mut self, interface: impl Into<String>) {
        self.interfaces.insert(interface.into());
    }

    /// Whether `interface` is restricted
    pub fn is_restricted(&self, interface: &str) -> bool {
        self.interfaces.contains(interface)
    }

    /// Whether a client with `credentials` may use `interface`
    pub fn allows(&self, credentials: &ClientCredentials, interface: &str) -> bool {
        !self.is_restricted(interface) || credentials.is_own_process() || credentials.grants(interface)
    }
}

impl GlobalFilter for RestrictedInterfaces {
    fn can_view(&self, _client: ClientId, credentials: &ClientCredentials, global: &GlobalInfo) -> bool {
        self.allows(credentials, global.interface)
    }
}

pub(crate) struct GlobalRecord<I: Interface, G> {
    data: G,
    resources: ResourceSet<I>,
}

impl<I: Interface, G> GlobalRecord<I, G> {
    pub(crate) fn new(data: G, resources: ResourceSet<I>) -> GlobalRecord<I, G> {
        GlobalRecord { data, resources }
    }
}

pub(crate) type BindFn<D> = fn(&mut D, &DisplayHandle, &Rc<dyn Any>, ObjectId, u32);
pub(crate) type CanViewFn = fn(&Rc<dyn Any>, ClientId, &ClientCredentials) -> bool;

pub(crate) fn global_bind<I, G, D>(
    state: &mut D,
    handle: &DisplayHandle,
    record: &Rc<dyn Any>,
    id: ObjectId,
    version: u32,
) where
    I: Interface,
    G: 'static,
    D: GlobalDispatch<I, G> + 'static,
{
    let Some(record) = record.downcast_ref::<GlobalRecord<I, G>>() else {
        return;
    };
    let new = New::with_set(id, version, record.resources.clone());
    let mut data_init = DataInit::new(handle);
    <D as GlobalDispatch<I, G>>::bind(state, handle, id.client_id(), new, &record.data, &mut data_init);
}

pub(crate) fn global_can_view<I, G, D>(
    record: &Rc<dyn Any>,
    client: ClientId,
    credentials: &ClientCredentials,
) -> bool
where
    I: Interface,
    G: 'static,
    D: GlobalDispatch<I, G> + 'static,
{
    record
        .downcast_ref::<GlobalRecord<I, G>>()
        .map(|record| <D as GlobalDispatch<I, G>>::can_view(client, credentials, &record.data))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restricted_interfaces() {
        let filter = RestrictedInterfaces::default();
        let stranger = ClientCredentials {
            pid: Some(1),
            ..Default::default()
        };
        let granted = ClientCredentials {
            pid: Some(1),
            granted_interfaces: vec!["org_kde_kwin_remote_access_manager".into()],
            ..Default::default()
        };

        assert!(filter.allows(&stranger, "wl_output"));
        assert!(!filter.allows(&stranger, "org_kde_plasma_window_management"));
        assert!(filter.allows(&granted, "org_kde_kwin_remote_access_manager"));
        assert!(!filter.allows(&granted, "org_kde_plasma_window_management"));
        assert!(filter.allows(&ClientCredentials::own_process(), "org_kde_plasma_window_management"));
    }
}
