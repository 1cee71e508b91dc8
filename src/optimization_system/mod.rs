pub mod objective;
pub mod range_optimizer;
