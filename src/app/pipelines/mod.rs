pub mod tier1_pipeline;
