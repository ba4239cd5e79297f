//! Unit-operation blocks.

use crate::simulation::Simulation;
use ap_core::{ApResult, Value};
use ap_host::{AutomationServer, HostError, HostNode};
use std::marker::PhantomData;

/// A block node of an open simulation.
///
/// Blocks have no mnemonic tables; variables are addressed by their path
/// relative to the block, e.g. `Input\TEMP` or `Output\QCALC`.
pub struct ProcessBlock<'s, S: AutomationServer> {
    name: String,
    node: S::Node,
    _simulation: PhantomData<&'s Simulation<S>>,
}

impl<'s, S: AutomationServer> ProcessBlock<'s, S> {
    pub(crate) fn new(name: &str, node: S::Node) -> Self {
        Self {
            name: name.to_string(),
            node,
            _simulation: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node(&self) -> &S::Node {
        &self.node
    }

    pub fn get_node_value(&self, path: &str) -> ApResult<Value> {
        Ok(self.find(path)?.value()?)
    }

    pub fn set_node_value(&self, path: &str, value: &Value) -> ApResult<()> {
        Ok(self.find(path)?.set_value(value)?)
    }

    fn find(&self, path: &str) -> Result<S::Node, HostError> {
        self.node
            .find_node(path)?
            .ok_or_else(|| HostError::NodeMissing {
                path: format!(r"{}\{}", self.name, path),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ap_core::ApError;
    use ap_host::{MemoryNode, MemoryServer};

    #[test]
    fn raw_paths_relative_to_block() {
        let node = MemoryNode::folder("B1");
        node.insert_path(r"Input\TEMP", 400.0);
        let block: ProcessBlock<'_, MemoryServer> = ProcessBlock::new("B1", node.clone());

        assert_eq!(block.get_node_value(r"Input\TEMP").unwrap(), Value::Real(400.0));
        block.set_node_value(r"Input\TEMP", &Value::Real(410.0)).unwrap();
        assert_eq!(node.get_path(r"Input\TEMP"), Some(Value::Real(410.0)));

        let err = block.get_node_value(r"Output\QCALC").unwrap_err();
        assert!(matches!(err, ApError::HostAccess { ref path, .. } if path == r"B1\Output\QCALC"));
    }
}
