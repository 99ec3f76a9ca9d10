pub mod engine;
pub mod limits;
pub mod model;
pub mod observability;
pub mod plan;
pub mod tenant;
