pub mod cache;
pub mod clustering;
pub mod expr;
pub mod implementations;
pub mod registry;
pub mod system;
pub mod trait_def;

pub use cache::ToolCache;
pub use registry::ToolRegistry;
pub use system::ToolSystem;
pub use trait_def::Tool;

pub(crate) use implementations::dataset_overview;
