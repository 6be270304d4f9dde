// Application layer: concrete pipelines wired from core parts.

pub mod pipelines;
