mod error;
mod overrides;
mod resolver;

pub use error::ResolveError;
pub use overrides::TaskResourceOverrides;
pub use resolver::{ArnResolver, ResolveContext, Resolver};
