//! The handle-based assembly graph and its mutation API.
pub mod assembly;
pub mod builder;
pub mod copy;
pub mod edge;
pub mod identity;
pub mod mutation;
pub mod node;
pub mod query;

pub use assembly::AssemblyGraph;
pub use builder::AssemblyBuilder;
pub use edge::EdgeRef;
pub use node::MemberRef;
