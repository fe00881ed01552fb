// Record refinement pipeline: processing stages and storage sink

pub mod processing;
pub mod storage;
