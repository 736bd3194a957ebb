use std::any::Any;
use std::path::Path;

use super::{OUT, single_output};
use crate::block::{Block, BlockError, InputSpec, OutputSpec, SamplePeriod};
use crate::signal::{Shape, Signal, Signals};

/// Name of the time column read by [`Playback::Timed`].
pub const TIME_COLUMN: &str = "time";

/// How [`FileSource`] walks through its samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Playback {
    /// One sample per activation, zeros after the last one.
    #[default]
    Once,
    /// One sample per activation, wrapping around at the end.
    Repeat,
    /// The last sample whose time is `<= t` (the first sample before that).
    Timed,
}

/// Plays back recorded samples, one column vector per activation.
///
/// Samples come from a comma-separated file with a header row. The selected
/// columns form the output vector, so one column gives a scalar.
pub struct FileSource {
    name: String,
    outputs: Vec<OutputSpec>,
    period: SamplePeriod,
    playback: Playback,
    samples: Vec<Signal>,
    times: Vec<f64>,
    index: usize,
}

impl FileSource {
    /// Samples given in memory. `Timed` playback needs [`FileSource::from_timed`].
    pub fn from_samples(
        name: impl Into<String>,
        samples: Vec<Signal>,
        playback: Playback,
    ) -> Result<Self, BlockError> {
        if playback == Playback::Timed {
            return Err(BlockError::compute("timed playback needs sample times"));
        }
        Self::build(name.into(), samples, Vec::new(), playback)
    }

    /// `(time, sample)` pairs with strictly increasing times.
    pub fn from_timed(
        name: impl Into<String>,
        samples: Vec<(f64, Signal)>,
    ) -> Result<Self, BlockError> {
        let (times, samples): (Vec<f64>, Vec<Signal>) = samples.into_iter().unzip();
        if times.windows(2).any(|w| !(w[1] > w[0])) || times.iter().any(|t| t.is_nan()) {
            return Err(BlockError::compute("sample times must be strictly increasing"));
        }
        Self::build(name.into(), samples, times, Playback::Timed)
    }

    /// Load `columns` from a CSV file. `Timed` playback also reads the
    /// [`TIME_COLUMN`] column.
    pub fn from_csv<S: AsRef<str>>(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        columns: &[S],
        playback: Playback,
    ) -> Result<Self, BlockError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            BlockError::compute(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse_csv(name, &text, columns, playback)
    }

    /// Same as [`FileSource::from_csv`] on text already in memory.
    pub fn parse_csv<S: AsRef<str>>(
        name: impl Into<String>,
        text: &str,
        columns: &[S],
        playback: Playback,
    ) -> Result<Self, BlockError> {
        if columns.is_empty() {
            return Err(BlockError::compute("at least one column must be selected"));
        }
        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty());
        let (_, header) = lines
            .next()
            .ok_or_else(|| BlockError::compute("file is empty"))?;
        let header: Vec<&str> = header.split(',').map(str::trim).collect();
        let position = |col: &str| {
            header.iter().position(|h| *h == col).ok_or_else(|| {
                BlockError::compute(format!(
                    "column '{col}' not found, available columns: {}",
                    header.join(", ")
                ))
            })
        };
        let selected = columns
            .iter()
            .map(|c| position(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let time_at = match playback {
            Playback::Timed => Some(position(TIME_COLUMN)?),
            _ => None,
        };

        let mut rows = Vec::new();
        for (lineno, line) in lines {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            let field = |i: usize| -> Result<f64, BlockError> {
                let raw = fields.get(i).copied().unwrap_or("");
                raw.parse::<f64>().map_err(|_| {
                    BlockError::compute(format!(
                        "line {}: '{}' is not a number in column '{}'",
                        lineno + 1,
                        raw,
                        header[i]
                    ))
                })
            };
            let values = selected
                .iter()
                .map(|&i| field(i))
                .collect::<Result<Vec<_>, _>>()?;
            let t = time_at.map(field).transpose()?;
            rows.push((t.unwrap_or(0.0), Signal::column(values)));
        }

        match playback {
            Playback::Timed => Self::from_timed(name, rows),
            _ => Self::from_samples(name, rows.into_iter().map(|(_, s)| s).collect(), playback),
        }
    }

    fn build(
        name: String,
        samples: Vec<Signal>,
        times: Vec<f64>,
        playback: Playback,
    ) -> Result<Self, BlockError> {
        let shape = samples
            .first()
            .map(Signal::shape)
            .ok_or_else(|| BlockError::compute("no samples"))?;
        if let Some(bad) = samples.iter().find(|s| s.shape() != shape) {
            return Err(BlockError::compute(format!(
                "sample shape {} differs from first sample {shape}",
                bad.shape()
            )));
        }
        Ok(Self {
            name,
            outputs: vec![OutputSpec::new(OUT).with_shape(shape)],
            period: SamplePeriod::Inherit,
            playback,
            samples,
            times,
            index: 0,
        })
    }

    pub fn with_period(mut self, period: SamplePeriod) -> Self {
        self.period = period;
        self
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn shape(&self) -> Shape {
        self.samples.first().map(Signal::shape).unwrap_or(Shape::SCALAR)
    }

    fn current(&self, t: f64) -> Signal {
        let n = self.samples.len();
        let idx = match self.playback {
            Playback::Once if self.index >= n => return Signal::zeros(self.shape()),
            Playback::Once => self.index,
            Playback::Repeat => self.index % n.max(1),
            Playback::Timed => self
                .times
                .partition_point(|&ts| ts <= t)
                .saturating_sub(1),
        };
        self.samples
            .get(idx)
            .cloned()
            .unwrap_or_else(|| Signal::zeros(self.shape()))
    }
}

impl Block for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> &[InputSpec] {
        &[]
    }

    fn outputs(&self) -> &[OutputSpec] {
        &self.outputs
    }

    fn has_state(&self) -> bool {
        self.playback != Playback::Timed
    }

    fn sample_period(&self) -> SamplePeriod {
        self.period
    }

    fn reset(&mut self) -> Result<(), BlockError> {
        self.index = 0;
        Ok(())
    }

    fn compute(&mut self, t: f64, _dt: f64, _inputs: &Signals) -> Result<Signals, BlockError> {
        Ok(single_output(self.current(t)))
    }

    fn update_state(&mut self, _t: f64, _dt: f64, _inputs: &Signals) -> Result<(), BlockError> {
        if self.playback != Playback::Timed {
            self.index = self.index.saturating_add(1);
        }
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
