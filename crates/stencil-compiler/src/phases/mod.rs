//! Built-in phases
//!
//! Phase order values leave room for host phases in between.

pub mod binding;
pub mod lowering;
pub mod optimization;
pub mod parsing;
pub mod syntax_tree;

pub use binding::BindingPhase;
pub use lowering::IrLoweringPhase;
pub use optimization::OptimizationPhase;
pub use parsing::ParsingPhase;
pub use syntax_tree::SyntaxTreePhase;

pub const PARSING_ORDER: i32 = 100;
pub const SYNTAX_TREE_ORDER: i32 = 200;
pub const BINDING_ORDER: i32 = 300;
pub const IR_LOWERING_ORDER: i32 = 400;
pub const OPTIMIZATION_ORDER: i32 = 500;
