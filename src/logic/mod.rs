pub mod catalogue;
pub mod diagnostics;
pub mod diagram;
pub mod diff;
pub mod extract;
pub mod minimal;
pub mod source_diff;
pub mod viewer;

pub use catalogue::*;
pub use diagnostics::*;
pub use diagram::*;
pub use diff::*;
pub use extract::*;
pub use minimal::*;
pub use source_diff::*;
pub use viewer::*;
