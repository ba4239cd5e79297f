//! The automation surface aplus needs from the host application.

use crate::error::HostResult;
use ap_core::Value;
use std::path::Path;

/// A node of the host's variable tree.
///
/// Nodes are cheap handles onto host state: cloning one does not copy the
/// subtree, and `set_value` takes `&self` because the host owns the storage.
pub trait HostNode: Clone {
    /// Direct child by name, `None` if there is no such child.
    fn element(&self, name: &str) -> HostResult<Option<Self>>;

    /// Descendant by backslash-separated path, `None` if any segment is missing.
    fn find_node(&self, path: &str) -> HostResult<Option<Self>>;

    fn value(&self) -> HostResult<Value>;

    fn set_value(&self, value: &Value) -> HostResult<()>;
}

/// One automation server instance with (at most) one open document.
///
/// Calls block until the host answers. `run` and `reinit` in particular may
/// take as long as the simulation does.
pub trait AutomationServer {
    type Node: HostNode;

    fn load_document(&self, path: &Path) -> HostResult<()>;

    fn set_visible(&self, visible: bool) -> HostResult<()>;

    fn set_suppress_dialogs(&self, suppress: bool) -> HostResult<()>;

    fn run(&self) -> HostResult<()>;

    fn reinit(&self) -> HostResult<()>;

    fn close_document(&self, path: &Path) -> HostResult<()>;

    /// Terminate the host's own top-level session.
    fn quit(&self) -> HostResult<()>;

    /// Root of the variable tree of the open document.
    fn tree(&self) -> HostResult<Self::Node>;
}
