//! In-memory host: a variable tree plus a record of every server call.
//!
//! `MemoryServer` is a shared handle (cloning it shares state), so a test can
//! hand one clone to a `Simulation` and keep another to inspect calls and tree
//! contents afterwards.

use crate::error::{HostError, HostResult};
use crate::server::{AutomationServer, HostNode};
use ap_core::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// A call received by a [`MemoryServer`], in order of arrival.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerCall {
    LoadDocument(PathBuf),
    SetVisible(bool),
    SetSuppressDialogs(bool),
    Run,
    Reinit,
    CloseDocument(PathBuf),
    Quit,
}

struct NodeData {
    name: String,
    children: BTreeMap<String, MemoryNode>,
    /// `None` for folders, `Some` for scalar leaves.
    value: Option<Value>,
}

/// Node of an in-memory variable tree.
#[derive(Clone)]
pub struct MemoryNode(Rc<RefCell<NodeData>>);

impl std::fmt::Debug for MemoryNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("MemoryNode")
            .field("name", &data.name)
            .field("children", &data.children.len())
            .field("value", &data.value)
            .finish()
    }
}

impl MemoryNode {
    fn new(name: &str, value: Option<Value>) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            name: name.to_string(),
            children: BTreeMap::new(),
            value,
        })))
    }

    /// An empty folder node.
    pub fn folder(name: &str) -> Self {
        Self::new(name, None)
    }

    /// Root of a document with the standard `Data\Blocks` and `Data\Streams` folders.
    pub fn document() -> Self {
        let root = Self::folder("Root");
        root.insert_folder(r"Data\Blocks");
        root.insert_folder(r"Data\Streams");
        root
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    fn child_or_insert(&self, segment: &str) -> MemoryNode {
        self.0
            .borrow_mut()
            .children
            .entry(segment.to_string())
            .or_insert_with(|| MemoryNode::folder(segment))
            .clone()
    }

    fn walk_or_insert(&self, path: &str) -> MemoryNode {
        path.split('\\')
            .filter(|s| !s.is_empty())
            .fold(self.clone(), |node, segment| node.child_or_insert(segment))
    }

    /// Create the folders along `path` (existing ones are kept).
    pub fn insert_folder(&self, path: &str) -> MemoryNode {
        self.walk_or_insert(path)
    }

    /// Create or overwrite a scalar leaf at `path`, creating folders on the way.
    pub fn insert_path(&self, path: &str, value: impl Into<Value>) -> MemoryNode {
        let node = self.walk_or_insert(path);
        node.0.borrow_mut().value = Some(value.into());
        node
    }

    /// Value stored at `path`, if the path exists and is a leaf.
    pub fn get_path(&self, path: &str) -> Option<Value> {
        let node = self.lookup(path)?;
        let data = node.0.borrow();
        data.value.clone()
    }

    fn lookup(&self, path: &str) -> Option<MemoryNode> {
        let mut node = self.clone();
        for segment in path.split('\\').filter(|s| !s.is_empty()) {
            let next = node.0.borrow().children.get(segment).cloned()?;
            node = next;
        }
        Some(node)
    }
}

impl HostNode for MemoryNode {
    fn element(&self, name: &str) -> HostResult<Option<Self>> {
        Ok(self.0.borrow().children.get(name).cloned())
    }

    fn find_node(&self, path: &str) -> HostResult<Option<Self>> {
        Ok(self.lookup(path))
    }

    fn value(&self) -> HostResult<Value> {
        let data = self.0.borrow();
        data.value.clone().ok_or_else(|| HostError::NotScalar {
            name: data.name.clone(),
        })
    }

    fn set_value(&self, value: &Value) -> HostResult<()> {
        let mut data = self.0.borrow_mut();
        match data.value {
            Some(_) => {
                data.value = Some(value.clone());
                Ok(())
            }
            None => Err(HostError::NotScalar {
                name: data.name.clone(),
            }),
        }
    }
}

type RunHook = Box<dyn FnMut(&MemoryNode)>;

#[derive(Default)]
struct ServerState {
    documents: HashMap<PathBuf, MemoryNode>,
    open: Option<MemoryNode>,
    visible: bool,
    suppress_dialogs: bool,
    calls: Vec<ServerCall>,
    on_run: Option<RunHook>,
}

/// In-memory automation server.
#[derive(Clone, Default)]
pub struct MemoryServer(Rc<RefCell<ServerState>>);

impl MemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document that `load_document(path)` will open.
    pub fn with_document(self, path: impl Into<PathBuf>, root: MemoryNode) -> Self {
        self.0.borrow_mut().documents.insert(path.into(), root);
        self
    }

    /// Stand in for the calculation: `hook` gets the open tree on every `run`.
    pub fn on_run(self, hook: impl FnMut(&MemoryNode) + 'static) -> Self {
        self.0.borrow_mut().on_run = Some(Box::new(hook));
        self
    }

    pub fn calls(&self) -> Vec<ServerCall> {
        self.0.borrow().calls.clone()
    }

    pub fn is_visible(&self) -> bool {
        self.0.borrow().visible
    }

    pub fn dialogs_suppressed(&self) -> bool {
        self.0.borrow().suppress_dialogs
    }

    fn record(&self, call: ServerCall) {
        self.0.borrow_mut().calls.push(call);
    }

    fn open_tree(&self, member: &'static str) -> HostResult<MemoryNode> {
        self.0.borrow().open.clone().ok_or(HostError::Call {
            member,
            message: "no document is open".to_string(),
        })
    }
}

impl AutomationServer for MemoryServer {
    type Node = MemoryNode;

    fn load_document(&self, path: &Path) -> HostResult<()> {
        self.record(ServerCall::LoadDocument(path.to_path_buf()));
        let mut state = self.0.borrow_mut();
        let root = state
            .documents
            .get(path)
            .cloned()
            .ok_or_else(|| HostError::Load {
                path: path.to_path_buf(),
                message: "The system cannot find the file specified.".to_string(),
            })?;
        state.open = Some(root);
        Ok(())
    }

    fn set_visible(&self, visible: bool) -> HostResult<()> {
        self.record(ServerCall::SetVisible(visible));
        self.0.borrow_mut().visible = visible;
        Ok(())
    }

    fn set_suppress_dialogs(&self, suppress: bool) -> HostResult<()> {
        self.record(ServerCall::SetSuppressDialogs(suppress));
        self.0.borrow_mut().suppress_dialogs = suppress;
        Ok(())
    }

    fn run(&self) -> HostResult<()> {
        self.record(ServerCall::Run);
        let tree = self.open_tree("Run")?;
        // Take the hook out so it may freely touch the tree.
        let hook = self.0.borrow_mut().on_run.take();
        if let Some(mut hook) = hook {
            hook(&tree);
            self.0.borrow_mut().on_run = Some(hook);
        }
        Ok(())
    }

    fn reinit(&self) -> HostResult<()> {
        self.record(ServerCall::Reinit);
        self.open_tree("Reinit").map(|_| ())
    }

    fn close_document(&self, path: &Path) -> HostResult<()> {
        self.record(ServerCall::CloseDocument(path.to_path_buf()));
        self.0.borrow_mut().open = None;
        Ok(())
    }

    fn quit(&self) -> HostResult<()> {
        self.record(ServerCall::Quit);
        Ok(())
    }

    fn tree(&self) -> HostResult<MemoryNode> {
        self.open_tree("Tree")
    }
}
