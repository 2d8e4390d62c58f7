pub mod coil;
pub mod range;
pub mod time;

pub use coil::*;
pub use range::*;
pub use time::*;
