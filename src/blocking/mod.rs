pub mod index;
pub mod strategy;
pub mod stream;

pub use index::BucketIndex;
pub use strategy::{BlockingKey, BlockingStrategy};
pub use stream::{block, CandidatePair, CandidateStream};
pub(crate) use stream::check_provenance;
