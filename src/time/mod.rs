pub mod offset;
pub mod ticks;
pub mod timestamp;

pub use offset::TimeOffset;
pub use ticks::Ticks;
pub use timestamp::Timestamp;
