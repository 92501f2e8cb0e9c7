pub mod qpso;

pub use qpso::QPSOSolver;
