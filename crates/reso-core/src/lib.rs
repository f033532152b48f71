pub mod audio;
pub mod constants;
pub mod graph;
pub mod interaction;
pub mod metrics;
pub mod physics;
pub mod sketch;
pub mod storage;
pub mod tags;
pub mod uniforms;

pub use audio::*;
pub use graph::*;
pub use interaction::*;
pub use metrics::*;
pub use physics::*;
pub use sketch::*;
pub use storage::*;
pub use tags::*;
pub use uniforms::*;
