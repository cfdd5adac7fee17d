pub mod attribute_cache;
pub mod github;
pub mod traits;
pub mod tree_cache;

pub use attribute_cache::*;
pub use github::*;
pub use traits::*;
pub use tree_cache::*;
