//! Built-in blocks.
//!
//! Leaf collaborators of the scheduler: each type only implements the
//! [`Block`](crate::block::Block) contract, the runtime knows nothing about them.

mod algebraic_function;
mod delay;
mod derivator;
mod external_input;
mod file_source;
mod function_source;
mod gain;
mod integrator;
mod mux;
mod pid;
mod product;
mod saturation;
mod sources;
mod sum;
mod zero_order_hold;

pub use algebraic_function::AlgebraicFunction;
pub use delay::Delay;
pub use derivator::DiscreteDerivator;
pub use external_input::ExternalInput;
pub use file_source::{FileSource, Playback, TIME_COLUMN};
pub use function_source::FunctionSource;
pub use gain::Gain;
pub use integrator::{DiscreteIntegrator, IntegrationMethod};
pub use mux::Mux;
pub use pid::Pid;
pub use product::Product;
pub use saturation::Saturation;
pub use sources::{Constant, Ramp, Sinusoidal, Step};
pub use sum::Sum;
pub use zero_order_hold::ZeroOrderHold;

use crate::block::{InputSpec, OutputSpec};
use crate::signal::{Signal, Signals};

/// Name of the single output port most blocks expose.
pub const OUT: &str = "out";
/// Name of the single input port most blocks expose.
pub const IN: &str = "in";

fn single_output(value: Signal) -> Signals {
    let mut out = Signals::new();
    out.insert(OUT.to_string(), value);
    out
}

fn numbered_inputs(n: usize) -> Vec<InputSpec> {
    (1..=n).map(|i| InputSpec::new(format!("in{i}"))).collect()
}

fn out_port() -> Vec<OutputSpec> {
    vec![OutputSpec::new(OUT)]
}
