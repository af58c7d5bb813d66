mod segment_1d;

pub use segment_1d::*;
