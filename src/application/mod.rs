// Model lifecycle: training, persistence orchestration and inference
pub mod ml;
