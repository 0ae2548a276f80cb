pub mod fixtures;
pub mod identity;
pub mod normalize;
pub mod producer;
pub mod quota;
pub mod store;
