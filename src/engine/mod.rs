//! Purpose: Describe the native engine call contract and expose every entry point through the wrapper.
//! Exports: `Engine`, `Session`, `Query`, `NameLookup`, `NodeId`, `Backend`.
//! Role: Seam between callers and the opaque native engine; adds no model semantics.
//! Invariants: Arguments pass through unchanged; values come back opaque.
//! Invariants: Engine implementations report failure as `Fault`, never by panicking.
mod backend;
mod session;

use serde::Serialize;

use crate::core::fault::Fault;

pub use backend::Backend;
pub use session::Session;

/// Opaque node identifier handed out by the engine.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// List-valued engine queries. Categories are passed through as opaque names.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Query {
    Packages,
    ImportDeclarations,
    AliasDeclarations,
    ComponentTypes(String),
    ComponentImplementations(String),
    Annexes,
    Prototypes,
    PrototypeBindings,
    FlowSpecifications,
    FlowImplementations,
    Modes,
    ModeTransitions,
    InModes,
    PropertySets,
    PropertyTypes(NodeId),
    PropertyDefinitions(NodeId),
    PropertyConstants(NodeId),
    Instances(String),
}

impl Query {
    pub fn entry_point(&self) -> &'static str {
        match self {
            Query::Packages => "get_packages",
            Query::ImportDeclarations => "get_import_declarations",
            Query::AliasDeclarations => "get_alias_declarations",
            Query::ComponentTypes(_) => "get_component_types",
            Query::ComponentImplementations(_) => "get_component_implementations",
            Query::Annexes => "get_annexes",
            Query::Prototypes => "get_prototypes",
            Query::PrototypeBindings => "get_prototype_bindings",
            Query::FlowSpecifications => "get_flow_specifications",
            Query::FlowImplementations => "get_flow_implementations",
            Query::Modes => "get_modes",
            Query::ModeTransitions => "get_mode_transitions",
            Query::InModes => "get_in_modes",
            Query::PropertySets => "get_property_sets",
            Query::PropertyTypes(_) => "get_property_types",
            Query::PropertyDefinitions(_) => "get_property_definitions",
            Query::PropertyConstants(_) => "get_property_constants",
            Query::Instances(_) => "get_instances",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NameLookup {
    ComponentName,
    ComponentFullname,
    InstanceName,
}

impl NameLookup {
    pub fn entry_point(self) -> &'static str {
        match self {
            NameLookup::ComponentName => "get_component_name",
            NameLookup::ComponentFullname => "get_component_fullname",
            NameLookup::InstanceName => "get_instance_name",
        }
    }
}

/// The native model-processing engine.
///
/// Implementations may write anything to stdout/stderr, through any layer;
/// the session captures it. A failed call returns the engine's rendered
/// fault text.
pub trait Engine {
    fn version(&mut self) -> Result<(), Fault>;
    fn status(&mut self) -> Result<(), Fault>;
    fn reset(&mut self) -> Result<(), Fault>;
    fn load(&mut self, filename: &str) -> Result<(), Fault>;
    fn analyze(&mut self) -> Result<bool, Fault>;
    fn instantiate(&mut self, root_system: &str) -> Result<(), Fault>;
    fn generate(&mut self, backend: Backend) -> Result<(), Fault>;
    fn list(&mut self, query: &Query) -> Result<Vec<NodeId>, Fault>;
    fn name_of(&mut self, lookup: NameLookup, node: &NodeId) -> Result<String, Fault>;
    fn node_id(&mut self, name: &str) -> Result<NodeId, Fault>;
    fn root(&mut self) -> Result<NodeId, Fault>;
}
