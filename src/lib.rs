pub mod block;
pub mod blocks;
pub mod cosim;
pub mod demo;
pub mod model;
pub mod project;
pub mod sched;
pub mod signal;
pub mod sim;

#[cfg(test)]
mod test;
