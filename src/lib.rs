pub extern crate nalgebra as na;

pub mod body;
pub mod collision;
pub mod debris;
pub mod errors;
pub mod ingest;
pub mod model;
pub mod output;
pub mod propagator;
pub mod scenario;
pub mod shells;
pub mod sim_info;
pub mod units;

pub use body::{BodyId, IdAllocator, ObjectClass, OrbitingBody, SizeClass};
pub use errors::{InvalidBodyError, SimError};
pub use model::Model;
pub use scenario::Config;
pub use shells::ShellIndex;
