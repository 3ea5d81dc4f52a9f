mod cv;
mod pv;

pub mod op;

pub use cv::{Cv, CvConversionError};
pub use pv::Pv;
