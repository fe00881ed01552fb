pub mod ports;
pub mod optimize_use_case;
pub mod retrieve_use_case;

pub use optimize_use_case::{OptimizeOutcome, OptimizeUseCase};
pub use retrieve_use_case::{AccessContext, RetrieveUseCase};
