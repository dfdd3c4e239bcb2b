pub use builder::RouterBuilder;
pub use pattern::{Params, PathPattern};
pub use table::{Fallback, Id, Lookup, Route, RouteTable};

mod builder;
mod pattern;
mod table;
