// Resource declarations for sea-orm entities

pub mod traits;

pub use traits::Resource;
