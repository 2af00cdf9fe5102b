pub mod app;
pub mod generators;
pub mod grid;
pub mod solvers;
pub mod sorting;
