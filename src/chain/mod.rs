//! Chain collaborator seam: query/executor traits and the paper backend

pub mod paper;
pub mod traits;

pub use paper::PaperChain;
pub use traits::{ChainExecutor, ChainQuery};
