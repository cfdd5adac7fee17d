pub mod attribute;
pub mod catalogue;
pub mod diff;
pub mod view;

pub use attribute::*;
pub use catalogue::*;
pub use diff::*;
pub use view::*;
