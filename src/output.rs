//! Destinations for regret values produced by a simulation.

use std::io::Write;
use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};

use crate::error::{BanditError, Result};

/// What `run_many` emits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmitMode {
    /// One regret value per completed cycle.
    #[default]
    Histogram,
    /// The average regret, once, after all cycles.
    Variable,
}

/// Receives regret values, one per emission.
pub trait RegretSink {
    fn emit(&mut self, regret: f64) -> Result<()>;
}

impl RegretSink for Vec<f64> {
    fn emit(&mut self, regret: f64) -> Result<()> {
        self.push(regret);
        Ok(())
    }
}

impl<S: RegretSink + ?Sized> RegretSink for &mut S {
    fn emit(&mut self, regret: f64) -> Result<()> {
        (**self).emit(regret)
    }
}

/// Writes one float per line to any writer.
#[derive(Debug)]
pub struct LineSink<W: Write> {
    writer: W,
}

impl<W: Write> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RegretSink for LineSink<W> {
    fn emit(&mut self, regret: f64) -> Result<()> {
        writeln!(self.writer, "{regret}")?;
        Ok(())
    }
}

/// Forwards emissions to a channel, tagged with the simulation index.
///
/// Lets several worker threads share one consumer while keeping output
/// grouped by simulation rather than by completion order.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    index: usize,
    sender: Sender<(usize, f64)>,
}

impl ChannelSink {
    pub fn new(index: usize, sender: Sender<(usize, f64)>) -> Self {
        Self { index, sender }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl RegretSink for ChannelSink {
    fn emit(&mut self, regret: f64) -> Result<()> {
        self.sender
            .send((self.index, regret))
            .map_err(|_| BanditError::ChannelClosed)
    }
}
