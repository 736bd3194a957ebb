//! Worker-side plant models.
//!
//! A [`PlantModel`] is the thing an external stepper advances once per
//! request. [`serve`] runs the JSON-lines protocol loop over any reader/writer
//! pair, which is what the `plant_worker` binary does on stdin/stdout.

use std::io::{BufRead, Write};

use super::protocol::{PlantRequest, PlantResponse};
use crate::signal::{Signal, Signals};
use tracing::{debug, warn};

/// One externally stepped plant. It has no clock of its own: it advances
/// exactly one step per call.
pub trait PlantModel: Send {
    fn step(&mut self, inputs: &Signals) -> Result<Signals, String>;

    /// Return to the initial state. Called before every engine run.
    fn reset(&mut self) -> Result<(), String>;
}

/// `x[k+1] = x[k] + dt * gain * u[k]`, output `y = x[k+1]`.
///
/// Reads input `u`, writes output `y`.
#[derive(Debug, Clone)]
pub struct IntegratorPlant {
    pub gain: f64,
    pub dt: f64,
    initial: Option<Signal>,
    x: Option<Signal>,
}

impl IntegratorPlant {
    pub fn new(gain: f64, dt: f64) -> Self {
        Self {
            gain,
            dt,
            initial: None,
            x: None,
        }
    }

    /// Initial state. Without one the state starts at zero, shaped like the
    /// first input.
    pub fn with_state(mut self, x0: impl Into<Signal>) -> Self {
        let x0 = x0.into();
        self.initial = Some(x0.clone());
        self.x = Some(x0);
        self
    }
}

impl PlantModel for IntegratorPlant {
    fn step(&mut self, inputs: &Signals) -> Result<Signals, String> {
        let u = inputs.get("u").ok_or("missing input 'u'")?;
        let x = self.x.take().unwrap_or_else(|| Signal::zeros(u.shape()));
        let k = self.dt * self.gain;
        let next = x
            .zip_with(u, |x, u| x + k * u)
            .ok_or_else(|| format!("input shape {} does not match state {}", u.shape(), x.shape()))?;
        self.x = Some(next.clone());

        let mut out = Signals::new();
        out.insert("y".to_string(), next);
        Ok(out)
    }

    fn reset(&mut self) -> Result<(), String> {
        self.x = self.initial.clone();
        Ok(())
    }
}

/// Serve step and reset requests until `close` or end of input. Returns the
/// number of steps served. Malformed lines get an error reply and do not stop
/// the loop.
pub fn serve<R: BufRead, W: Write>(
    model: &mut dyn PlantModel,
    reader: R,
    mut writer: W,
) -> std::io::Result<u64> {
    let mut steps = 0u64;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let resp = match serde_json::from_str::<PlantRequest>(&line) {
            Ok(PlantRequest::Step { inputs }) => {
                steps += 1;
                debug!(step = steps, "plant step");
                match model.step(&inputs) {
                    Ok(outputs) => PlantResponse::Outputs { outputs },
                    Err(message) => PlantResponse::Error { message },
                }
            }
            Ok(PlantRequest::Reset) => {
                debug!("plant reset");
                match model.reset() {
                    Ok(()) => PlantResponse::Ack,
                    Err(message) => PlantResponse::Error { message },
                }
            }
            Ok(PlantRequest::Close) => break,
            Err(e) => {
                warn!(error = %e, "malformed request");
                PlantResponse::Error {
                    message: format!("malformed request: {e}"),
                }
            }
        };
        let encoded = serde_json::to_string(&resp)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{encoded}")?;
        writer.flush()?;
    }
    Ok(steps)
}
