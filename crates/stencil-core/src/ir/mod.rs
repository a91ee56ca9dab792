//! Intermediate Representation (IR) for Stencil
//!
//! The IR is the annotated tree produced by binding and optimization and
//! consumed by source emission. Element nodes carry the components bound to
//! them so emission never has to re-run matching.

pub mod node;

pub use node::{ComponentBinding, DocumentIr, IrNode, IrNodeKind};
