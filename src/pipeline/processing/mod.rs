// Pipeline processing stages, in execution order

pub mod normalize;
pub mod metadata;
pub mod quality;
pub mod refine;
pub mod anonymize;
pub mod enrich;
