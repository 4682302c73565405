//! Result assembly and reporting policy
pub mod assembler;
pub mod inclusion;

pub use self::assembler::ResultAssembler;
pub use self::inclusion::InclusionPolicy;
