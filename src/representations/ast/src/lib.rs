mod annotation;
mod datatype;
mod expr;
mod file;
mod member;
mod modifiers;
mod positional;
mod type_decl;

pub use annotation::*;
pub use datatype::*;
pub use expr::*;
pub use file::*;
pub use member::*;
pub use modifiers::*;
pub use positional::*;
pub use type_decl::*;
