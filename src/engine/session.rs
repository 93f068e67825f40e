// One wrapped forwarding call per native entry point.
use crate::core::error::Error;
use crate::core::fault::Fault;
use crate::core::wrapper::{self, CallResult};

use super::{Backend, Engine, NameLookup, NodeId, Query};

type Wrapped<T> = Result<CallResult<T>, Error>;

/// Owns an engine and routes every call through the capture/classify wrapper.
pub struct Session<E> {
    engine: E,
}

impl<E: Engine> Session<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    fn call<T>(&mut self, label: &str, f: impl FnOnce(&mut E) -> Result<T, Fault>) -> Wrapped<T> {
        let engine = &mut self.engine;
        wrapper::call(label, || f(engine))
    }

    pub fn version(&mut self) -> Wrapped<()> {
        self.call("version", |engine| engine.version())
    }

    pub fn status(&mut self) -> Wrapped<()> {
        self.call("status", |engine| engine.status())
    }

    /// Clears engine state; call before processing a new set of models.
    pub fn reset(&mut self) -> Wrapped<()> {
        self.call("reset", |engine| engine.reset())
    }

    /// Loads one file, resolved through the engine's own search path.
    pub fn load(&mut self, filename: &str) -> Wrapped<()> {
        self.call("load", |engine| engine.load(filename))
    }

    /// Loads files in order, stopping after the first call that reports errors.
    pub fn load_all<I, S>(&mut self, files: I) -> Result<Vec<CallResult<()>>, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut results = Vec::new();
        for file in files {
            let result = self.load(file.as_ref())?;
            let clean = result.is_clean();
            results.push(result);
            if !clean {
                break;
            }
        }
        Ok(results)
    }

    pub fn analyze(&mut self) -> Wrapped<bool> {
        self.call("analyze", |engine| engine.analyze())
    }

    pub fn instantiate(&mut self, root_system: &str) -> Wrapped<()> {
        self.call("instantiate", |engine| engine.instantiate(root_system))
    }

    pub fn generate(&mut self, backend: Backend) -> Wrapped<()> {
        self.call("generate", |engine| engine.generate(backend))
    }

    pub fn query(&mut self, query: Query) -> Wrapped<Vec<NodeId>> {
        self.call(query.entry_point(), |engine| engine.list(&query))
    }

    pub fn get_packages(&mut self) -> Wrapped<Vec<NodeId>> {
        self.query(Query::Packages)
    }

    pub fn get_import_declarations(&mut self) -> Wrapped<Vec<NodeId>> {
        self.query(Query::ImportDeclarations)
    }

    pub fn get_alias_declarations(&mut self) -> Wrapped<Vec<NodeId>> {
        self.query(Query::AliasDeclarations)
    }

    pub fn get_component_types(&mut self, category: &str) -> Wrapped<Vec<NodeId>> {
        self.query(Query::ComponentTypes(category.to_string()))
    }

    pub fn get_component_implementations(&mut self, category: &str) -> Wrapped<Vec<NodeId>> {
        self.query(Query::ComponentImplementations(category.to_string()))
    }

    pub fn get_annexes(&mut self) -> Wrapped<Vec<NodeId>> {
        self.query(Query::Annexes)
    }

    pub fn get_prototypes(&mut self) -> Wrapped<Vec<NodeId>> {
        self.query(Query::Prototypes)
    }

    pub fn get_prototype_bindings(&mut self) -> Wrapped<Vec<NodeId>> {
        self.query(Query::PrototypeBindings)
    }

    pub fn get_flow_specifications(&mut self) -> Wrapped<Vec<NodeId>> {
        self.query(Query::FlowSpecifications)
    }

    pub fn get_flow_implementations(&mut self) -> Wrapped<Vec<NodeId>> {
        self.query(Query::FlowImplementations)
    }

    pub fn get_modes(&mut self) -> Wrapped<Vec<NodeId>> {
        self.query(Query::Modes)
    }

    pub fn get_mode_transitions(&mut self) -> Wrapped<Vec<NodeId>> {
        self.query(Query::ModeTransitions)
    }

    pub fn get_in_modes(&mut self) -> Wrapped<Vec<NodeId>> {
        self.query(Query::InModes)
    }

    pub fn get_property_sets(&mut self) -> Wrapped<Vec<NodeId>> {
        self.query(Query::PropertySets)
    }

    pub fn get_property_types(&mut self, property_set: &NodeId) -> Wrapped<Vec<NodeId>> {
        self.query(Query::PropertyTypes(property_set.clone()))
    }

    pub fn get_property_definitions(&mut self, property_set: &NodeId) -> Wrapped<Vec<NodeId>> {
        self.query(Query::PropertyDefinitions(property_set.clone()))
    }

    pub fn get_property_constants(&mut self, property_set: &NodeId) -> Wrapped<Vec<NodeId>> {
        self.query(Query::PropertyConstants(property_set.clone()))
    }

    pub fn get_instances(&mut self, category: &str) -> Wrapped<Vec<NodeId>> {
        self.query(Query::Instances(category.to_string()))
    }

    fn name_of(&mut self, lookup: NameLookup, node: &NodeId) -> Wrapped<String> {
        self.call(lookup.entry_point(), |engine| engine.name_of(lookup, node))
    }

    pub fn get_component_name(&mut self, node: &NodeId) -> Wrapped<String> {
        self.name_of(NameLookup::ComponentName, node)
    }

    pub fn get_component_fullname(&mut self, node: &NodeId) -> Wrapped<String> {
        self.name_of(NameLookup::ComponentFullname, node)
    }

    pub fn get_instance_name(&mut self, node: &NodeId) -> Wrapped<String> {
        self.name_of(NameLookup::InstanceName, node)
    }

    pub fn get_node_id(&mut self, name: &str) -> Wrapped<NodeId> {
        self.call("get_node_id", |engine| engine.node_id(name))
    }

    /// Id of the root of the current instance tree.
    pub fn get_root(&mut self) -> Wrapped<NodeId> {
        self.call("get_root", |engine| engine.root())
    }
}
