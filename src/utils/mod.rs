pub mod clock;
pub mod decimal;
pub mod java_random;
pub mod jwt;
pub mod keyed_lock;
pub mod parameter_error_handler;
pub mod random;

pub use clock::{Clock, ManualClock, SystemClock};
pub use keyed_lock::KeyedLock;
pub use parameter_error_handler::json_error_handler;
pub use parameter_error_handler::query_error_handler;
pub use random::{RandomSource, SequenceRandom, ThreadRandom};
