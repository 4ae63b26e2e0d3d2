//! Core graph data structures

mod edge;
pub mod gml;
mod interaction;
mod node;


pub use edge::{
    EdgeKey, InteractionDetail, WeightedEdge, DEFAULT_EVIDENCE, DEFAULT_INTERACTION_TYPE,
    DEFAULT_LOCATION, DEFAULT_SENTIMENT,
};
pub use interaction::{GraphError, GraphResult, InteractionGraph};
pub use node::NodeAnnotation;
