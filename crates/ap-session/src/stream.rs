//! Material streams and their mnemonic properties.

use crate::outcome::{BatchOutcome, Diagnostic};
use crate::simulation::Simulation;
use ap_core::{
    ApResult, Mnemonic, PropertyKey, PropertyMap, ReadProperty, Value, WriteProperty, resolve_path,
};
use ap_host::{AutomationServer, HostError, HostNode};
use std::marker::PhantomData;
use tracing::debug;

/// A stream node of an open simulation.
///
/// Borrowed from its [`Simulation`], so it cannot outlive the document.
pub struct ProcessStream<'s, S: AutomationServer> {
    name: String,
    node: S::Node,
    _simulation: PhantomData<&'s Simulation<S>>,
}

impl<'s, S: AutomationServer> ProcessStream<'s, S> {
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

    /// Underlying host node, for variables no mnemonic covers.
    pub fn node(&self) -> &S::Node {
        &self.node
    }

    /// Read calculated results. Keys that fail are logged and left out.
    ///
    /// Valid mnemonics: `TEMP`, `PRES`, `MOLEFLOW`, `MASSFLOW`, `VOLUMETRICFLOW`,
    /// `MASSENTHALPY`, `MOLEENTHALPY`, and per component `COMPMOLEFLOW`,
    /// `COMPMASSFLOW`, `COMPMOLEFRAC`, `COMPMASSFRAC`. Units are those of the
    /// document.
    pub fn get_properties<K>(&self, keys: impl IntoIterator<Item = K>) -> PropertyMap
    where
        K: Into<PropertyKey>,
    {
        self.get_properties_report(keys).values
    }

    /// Like [`ProcessStream::get_properties`], also returning what went wrong.
    pub fn get_properties_report<K>(&self, keys: impl IntoIterator<Item = K>) -> BatchOutcome
    where
        K: Into<PropertyKey>,
    {
        let mut outcome = BatchOutcome::default();
        for key in keys.into_iter().map(Into::into) {
            match self.read(&key) {
                Ok(value) => {
                    outcome.values.insert(key, value);
                }
                Err(diag) => {
                    diag.emit(&self.name);
                    outcome.diagnostics.push(diag);
                }
            }
        }
        outcome
    }

    /// Write specifications. Keys that fail are logged and skipped.
    ///
    /// Valid mnemonics: `TEMP`, `PRES`, `FLOW` (on the basis set by
    /// `FLOWBASIS`: `MASS`, `MOLE`, `STDVOL`, `VOLUME`), `VAPFRAC`, `FLASHTYPE`
    /// (`TP`, `TV`, `PV`), and per component `COMPFLOW` (on the basis set by
    /// `COMPBASIS`: `MASS-FLOW`, `MOLE-FLOW`, `STDVOL-FLOW`, `MASS-FRAC`,
    /// `MOLE-FRAC`, `STDVOL-FRAC`, `MASS-CONC`, `MOLE-CONC`).
    pub fn set_properties(&self, values: &PropertyMap) {
        self.set_properties_report(values);
    }

    /// Like [`ProcessStream::set_properties`], also returning what went wrong.
    pub fn set_properties_report(&self, values: &PropertyMap) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for (key, value) in values {
            match self.write(key, value) {
                Ok(()) => {
                    outcome.values.insert(key.clone(), value.clone());
                }
                Err(diag) => {
                    diag.emit(&self.name);
                    outcome.diagnostics.push(diag);
                }
            }
        }
        outcome
    }

    /// Read a single result, failing instead of skipping.
    pub fn get_property(&self, key: impl Into<PropertyKey>) -> ApResult<Value> {
        Ok(self.read(&key.into())?)
    }

    /// Write a single specification, failing instead of skipping.
    pub fn set_property(
        &self,
        key: impl Into<PropertyKey>,
        value: impl Into<Value>,
    ) -> ApResult<()> {
        Ok(self.write(&key.into(), &value.into())?)
    }

    fn locate<M: Mnemonic>(&self, key: &PropertyKey) -> Result<(String, S::Node), Diagnostic> {
        let path =
            resolve_path::<M>(key).map_err(|_| Diagnostic::UnknownKey { key: key.clone() })?;
        debug!(stream = %self.name, %key, path = %path, "resolved property path");

        let node = self
            .node
            .find_node(&path)
            .and_then(|found| found.ok_or_else(|| HostError::NodeMissing { path: path.clone() }))
            .map_err(|e| host_access(key, &path, e))?;
        Ok((path, node))
    }

    fn read(&self, key: &PropertyKey) -> Result<Value, Diagnostic> {
        let (path, node) = self.locate::<ReadProperty>(key)?;
        node.value().map_err(|e| host_access(key, &path, e))
    }

    fn write(&self, key: &PropertyKey, value: &Value) -> Result<(), Diagnostic> {
        let (path, node) = self.locate::<WriteProperty>(key)?;
        node.set_value(value).map_err(|e| host_access(key, &path, e))
    }
}

fn host_access(key: &PropertyKey, path: &str, err: HostError) -> Diagnostic {
    Diagnostic::HostAccess {
        key: key.clone(),
        path: path.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ap_host::{MemoryNode, MemoryServer};

    fn stream_node() -> MemoryNode {
        let node = MemoryNode::folder("S1");
        node.insert_path(r"Output\TEMP_OUT\MIXED", 350.0);
        node.insert_path(r"Output\MOLEFLOW\MIXED\CO2", 12.5);
        node.insert_path(r"Input\TEMP\MIXED", Value::Empty);
        node
    }

    fn stream(node: &MemoryNode) -> ProcessStream<'static, MemoryServer> {
        ProcessStream::new("S1", node.clone())
    }

    #[test]
    fn reads_plain_and_component_keys() {
        let node = stream_node();
        let s1 = stream(&node);
        let props = s1.get_properties([
            PropertyKey::from("TEMP"),
            PropertyKey::from(("COMPMOLEFLOW", "CO2")),
        ]);
        assert_eq!(props.len(), 2);
        assert_eq!(props[&PropertyKey::from("TEMP")], Value::Real(350.0));
        assert_eq!(
            props[&PropertyKey::from(("COMPMOLEFLOW", "CO2"))],
            Value::Real(12.5)
        );
    }

    #[test]
    fn missing_node_is_a_host_access_diagnostic() {
        let node = stream_node();
        let outcome = stream(&node).get_properties_report(["PRES"]);
        assert!(outcome.values.is_empty());
        assert_eq!(
            outcome.diagnostics,
            vec![Diagnostic::HostAccess {
                key: "PRES".into(),
                path: r"Output\PRES_OUT\MIXED".into(),
                message: r"Node not found: Output\PRES_OUT\MIXED".into(),
            }]
        );
    }

    #[test]
    fn folder_node_cannot_be_read() {
        let node = stream_node();
        // COMPMOLEFLOW without a component lands on the folder above the components.
        let outcome = stream(&node).get_properties_report(["COMPMOLEFLOW"]);
        assert!(outcome.values.is_empty());
        assert!(matches!(
            outcome.diagnostics[0],
            Diagnostic::HostAccess { .. }
        ));
    }

    #[test]
    fn strict_single_key_access() {
        let node = stream_node();
        let s1 = stream(&node);
        assert_eq!(s1.get_property("TEMP").unwrap(), Value::Real(350.0));
        assert!(s1.get_property("FLOW").is_err());

        s1.set_property("TEMP", 320.0).unwrap();
        assert_eq!(node.get_path(r"Input\TEMP\MIXED"), Some(Value::Real(320.0)));
        assert!(s1.set_property("PRES", 2.0).is_err());
    }
}
