//! Discrete Hidden Markov Model over workflow tasks and quantizer symbols.
//!
//! # Model
//!
//! - Hidden states: workflow task ids (indices into the state-name list)
//! - Observed symbols: quantizer cluster ids (indices into the symbol-name
//!   list)
//! - Parameters: Pi (initial-state), A (state transition), B (emission)
//!
//! Parameters are estimated by frequency counting over labeled
//! (state, symbol) sequences with additive pseudo-count smoothing, then
//! row-normalized. Decoding runs in log space: the batch path is full
//! Viterbi with the standard backward pass; the online path keeps a single
//! delta row and is a greedy online MAP — see [`OnlineDecoder`].
//!
//! Name lists exist only for external I/O; inference is purely by integer
//! index.
//!
//! # Example
//!
//! ```ignore
//! use kinseg_core::hmm::WorkflowHmm;
//!
//! let mut hmm = WorkflowHmm::new(
//!     vec!["approach".into(), "insert".into()],
//!     vec!["0".into(), "1".into(), "2".into()],
//! );
//! hmm.add_pseudo_data(0.1, 0.1, 0.1);
//! hmm.add_estimation_data(&[(0, 0), (0, 1), (1, 2)])?;
//! hmm.estimate_parameters();
//!
//! let states = hmm.decode(&[0, 1, 2, 2])?;
//! assert_eq!(states.len(), 4);
//! ```

use kinseg_math::{argmax, guarded_ln};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by estimation and decoding.
#[derive(Debug, Error)]
pub enum HmmError {
    #[error("state index {index} out of range (states: {states})")]
    StateOutOfRange { index: usize, states: usize },
    #[error("symbol index {index} out of range (symbols: {symbols})")]
    SymbolOutOfRange { index: usize, symbols: usize },
    #[error("parameters are raw counts; call estimate_parameters first")]
    NotEstimated,
    #[error("model has no states")]
    NoStates,
}

/// Discrete first-order HMM with count-based estimation.
///
/// Between [`reset_counts`](Self::reset_counts) and
/// [`estimate_parameters`](Self::estimate_parameters) the Pi/A/B tables
/// hold raw (possibly pseudo-count-seeded) counts; afterwards they hold
/// row-normalized probabilities and the model is ready to decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowHmm {
    state_names: Vec<String>,
    symbol_names: Vec<String>,
    pi: Vec<f64>,
    a: Vec<Vec<f64>>,
    b: Vec<Vec<f64>>,
    estimated: bool,
}

impl WorkflowHmm {
    /// Create a model with zeroed count tables sized by the name lists.
    pub fn new(state_names: Vec<String>, symbol_names: Vec<String>) -> Self {
        let s = state_names.len();
        let k = symbol_names.len();
        Self {
            state_names,
            symbol_names,
            pi: vec![0.0; s],
            a: vec![vec![0.0; s]; s],
            b: vec![vec![0.0; k]; s],
            estimated: false,
        }
    }

    pub fn num_states(&self) -> usize {
        self.state_names.len()
    }

    pub fn num_symbols(&self) -> usize {
        self.symbol_names.len()
    }

    pub fn state_names(&self) -> &[String] {
        &self.state_names
    }

    pub fn state_name(&self, index: usize) -> Option<&str> {
        self.state_names.get(index).map(String::as_str)
    }

    /// Index of a state name; None signals a lookup failure the caller
    /// must check before indexing Pi/A/B.
    pub fn state_index(&self, name: &str) -> Option<usize> {
        self.state_names.iter().position(|n| n == name)
    }

    pub fn symbol_index(&self, name: &str) -> Option<usize> {
        self.symbol_names.iter().position(|n| n == name)
    }

    pub fn pi(&self) -> &[f64] {
        &self.pi
    }

    pub fn transition(&self) -> &[Vec<f64>] {
        &self.a
    }

    pub fn emission(&self) -> &[Vec<f64>] {
        &self.b
    }

    pub fn is_estimated(&self) -> bool {
        self.estimated
    }

    /// Zero all count tables and drop back to accumulation mode.
    pub fn reset_counts(&mut self) {
        for v in self.pi.iter_mut() {
            *v = 0.0;
        }
        for row in self.a.iter_mut() {
            row.fill(0.0);
        }
        for row in self.b.iter_mut() {
            row.fill(0.0);
        }
        self.estimated = false;
    }

    /// Accumulate counts from one labeled sequence: Pi for the first
    /// element, A for every transition, B for every element. Multiple
    /// calls accumulate across procedures.
    pub fn add_estimation_data(&mut self, sequence: &[(usize, usize)]) -> Result<(), HmmError> {
        let s = self.num_states();
        let k = self.num_symbols();
        for &(state, symbol) in sequence {
            if state >= s {
                return Err(HmmError::StateOutOfRange { index: state, states: s });
            }
            if symbol >= k {
                return Err(HmmError::SymbolOutOfRange { index: symbol, symbols: k });
            }
        }
        if let Some(&(first_state, _)) = sequence.first() {
            self.pi[first_state] += 1.0;
        }
        for pair in sequence.windows(2) {
            self.a[pair[0].0][pair[1].0] += 1.0;
        }
        for &(state, symbol) in sequence {
            self.b[state][symbol] += 1.0;
        }
        self.estimated = false;
        Ok(())
    }

    /// Add uniform pseudo-counts scaled per table, before normalization.
    /// Positive scales guarantee no zero probability survives
    /// [`estimate_parameters`](Self::estimate_parameters), which is what
    /// keeps log space free of -inf during decoding.
    pub fn add_pseudo_data(&mut self, pi_scale: f64, a_scale: f64, b_scale: f64) {
        for v in self.pi.iter_mut() {
            *v += pi_scale;
        }
        for row in self.a.iter_mut() {
            for v in row.iter_mut() {
                *v += a_scale;
            }
        }
        for row in self.b.iter_mut() {
            for v in row.iter_mut() {
                *v += b_scale;
            }
        }
        self.estimated = false;
    }

    /// Row-normalize Pi, each row of A, and each row of B into probability
    /// distributions. An all-zero row becomes uniform; with positive
    /// pseudo-counts that branch is unreachable.
    pub fn estimate_parameters(&mut self) {
        kinseg_math::normalize_or_uniform(&mut self.pi);
        for row in self.a.iter_mut() {
            kinseg_math::normalize_or_uniform(row);
        }
        for row in self.b.iter_mut() {
            kinseg_math::normalize_or_uniform(row);
        }
        self.estimated = true;
    }

    /// Batch Viterbi: the most likely state sequence for the symbols.
    ///
    /// Runs in log space over the full T x S delta/psi trellis, then
    /// backtracks with the standard backward pass
    /// `state[t] = psi[t+1][state[t+1]]` from T-2 down to 0.
    pub fn decode(&self, symbols: &[usize]) -> Result<Vec<usize>, HmmError> {
        if !self.estimated {
            return Err(HmmError::NotEstimated);
        }
        let s = self.num_states();
        if s == 0 {
            return Err(HmmError::NoStates);
        }
        if symbols.is_empty() {
            return Ok(Vec::new());
        }
        for &symbol in symbols {
            if symbol >= self.num_symbols() {
                return Err(HmmError::SymbolOutOfRange {
                    index: symbol,
                    symbols: self.num_symbols(),
                });
            }
        }

        let t_len = symbols.len();
        let mut delta = vec![vec![f64::NEG_INFINITY; s]; t_len];
        let mut psi = vec![vec![0usize; s]; t_len];

        for state in 0..s {
            delta[0][state] =
                guarded_ln(self.pi[state]) + guarded_ln(self.b[state][symbols[0]]);
        }
        for t in 1..t_len {
            for state in 0..s {
                let mut best_val = f64::NEG_INFINITY;
                let mut best_prev = 0usize;
                for prev in 0..s {
                    let candidate = delta[t - 1][prev] + guarded_ln(self.a[prev][state]);
                    if candidate > best_val {
                        best_val = candidate;
                        best_prev = prev;
                    }
                }
                delta[t][state] = best_val + guarded_ln(self.b[state][symbols[t]]);
                psi[t][state] = best_prev;
            }
        }

        let mut states = vec![0usize; t_len];
        states[t_len - 1] = argmax(&delta[t_len - 1]).unwrap_or(0);
        for t in (0..t_len - 1).rev() {
            states[t] = psi[t + 1][states[t + 1]];
        }
        Ok(states)
    }

    /// Create an online decoder snapshotting this model's parameters in
    /// log space. Fails until the parameters are estimated.
    pub fn online_decoder(&self) -> Result<OnlineDecoder, HmmError> {
        if !self.estimated {
            return Err(HmmError::NotEstimated);
        }
        if self.num_states() == 0 {
            return Err(HmmError::NoStates);
        }
        Ok(OnlineDecoder {
            log_pi: self.pi.iter().map(|&p| guarded_ln(p)).collect(),
            log_a: self
                .a
                .iter()
                .map(|row| row.iter().map(|&p| guarded_ln(p)).collect())
                .collect(),
            log_b: self
                .b
                .iter()
                .map(|row| row.iter().map(|&p| guarded_ln(p)).collect())
                .collect(),
            delta: None,
        })
    }
}

/// Recursive online Viterbi over a single delta row.
///
/// Each [`step`](Self::step) folds one observed symbol into the row and
/// returns the current arg-max state. This is a greedy online MAP: it
/// never revises previously emitted states, trading the batch path's
/// optimal-sequence guarantee for O(S) memory and O(S^2) time per
/// observation, which is what a bounded-latency real-time loop needs. The
/// emitted sequence may therefore differ from what a full batch decode
/// would assign retroactively.
#[derive(Debug, Clone)]
pub struct OnlineDecoder {
    log_pi: Vec<f64>,
    log_a: Vec<Vec<f64>>,
    log_b: Vec<Vec<f64>>,
    delta: Option<Vec<f64>>,
}

impl OnlineDecoder {
    pub fn num_states(&self) -> usize {
        self.log_pi.len()
    }

    /// Fold in one symbol and return the current best state.
    pub fn step(&mut self, symbol: usize) -> Result<usize, HmmError> {
        let s = self.num_states();
        let k = self.log_b.first().map_or(0, Vec::len);
        if symbol >= k {
            return Err(HmmError::SymbolOutOfRange { index: symbol, symbols: k });
        }

        let next = match &self.delta {
            None => (0..s)
                .map(|state| self.log_pi[state] + self.log_b[state][symbol])
                .collect::<Vec<f64>>(),
            Some(prev) => (0..s)
                .map(|state| {
                    let best = (0..s)
                        .map(|p| prev[p] + self.log_a[p][state])
                        .fold(f64::NEG_INFINITY, f64::max);
                    best + self.log_b[state][symbol]
                })
                .collect(),
        };
        let best = argmax(&next).ok_or(HmmError::NoStates)?;
        self.delta = Some(next);
        Ok(best)
    }

    /// Drop accumulated state; the next step re-seeds from Pi.
    pub fn reset(&mut self) {
        self.delta = None;
    }
}
