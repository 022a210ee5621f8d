// Bookmark transcoder shared type definitions
// Each submodule defines types used across the parser, converter, serializer and store.

pub mod errors;
pub mod node;
pub mod record;
pub mod settings;
pub mod tree_node;
