mod memory;
mod universe;

pub use memory::{Clock, MemoryCandleSource};
pub use universe::{StaticUniverse, StaticVolumes, BINANCE_TOP_15};
