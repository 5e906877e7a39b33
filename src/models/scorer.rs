//! ONNX scorer for loan default prediction
//!
//! Wraps the trained classifier as an opaque capability: aligned vector in,
//! class label and default probability out. Handles the two output shapes
//! scikit-learn exports produce: plain probability tensors, and the
//! seq(map(int64, float)) form skl2onnx emits when ZipMap is enabled.

use anyhow::{anyhow, Context, Result};
use ort::session::{Session, SessionOutputs};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, Tensor};
use std::sync::RwLock;
use tracing::debug;

use crate::features::align::AlignedVector;

/// The scoring verdict for one aligned vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class: 0 = repays, 1 = defaults
    pub label: u8,
    /// Probability of the default class, in [0, 1]
    pub probability_of_default: f64,
}

/// The trained classifier behind an ONNX Runtime session.
///
/// The session needs exclusive access to run, so it sits behind a lock; the
/// scorer itself is shared immutably across all concurrent scoring calls.
#[derive(Debug)]
pub struct LoanScorer {
    session: RwLock<Session>,
    input_name: String,
    probability_output: String,
}

impl LoanScorer {
    /// Wrap a loaded session, resolving its input and output names.
    pub fn new(session: Session) -> Self {
        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "float_input".to_string());

        // skl2onnx names the interesting output "output_probability" (or
        // just "probabilities"); the label output is recomputed from the
        // probability instead of being read separately.
        let probability_output = session
            .outputs()
            .iter()
            .find(|o| o.name().contains("prob"))
            .or_else(|| session.outputs().last())
            .map(|o| o.name().to_string())
            .unwrap_or_else(|| "output_probability".to_string());

        Self {
            session: RwLock::new(session),
            input_name,
            probability_output,
        }
    }

    /// Score one aligned vector.
    pub fn predict(&self, features: &AlignedVector) -> Result<Prediction> {
        let probability_of_default = self.predict_proba(features)?;
        Ok(Prediction {
            label: u8::from(probability_of_default >= 0.5),
            probability_of_default,
        })
    }

    /// Probability of the default class for one aligned vector.
    pub fn predict_proba(&self, features: &AlignedVector) -> Result<f64> {
        let shape = vec![1_i64, features.len() as i64];
        let input = Tensor::from_array((shape, features.values().to_vec()))
            .context("Failed to create input tensor")?;

        let mut session = self
            .session
            .write()
            .map_err(|e| anyhow!("Scorer lock poisoned: {}", e))?;
        let outputs = session.run(ort::inputs![&self.input_name => input])?;

        self.extract_probability(&outputs)
    }

    /// Pull the default-class probability out of whichever output shape the
    /// export produced.
    fn extract_probability(&self, outputs: &SessionOutputs) -> Result<f64> {
        if let Some(output) = outputs.get(&self.probability_output) {
            if let Some(probability) = Self::probability_from_value(output)? {
                return Ok(probability);
            }
        }

        // The named output did not yield a probability; try the rest,
        // skipping the label output.
        for (name, output) in outputs.iter() {
            if name == self.probability_output || name.contains("label") {
                continue;
            }
            if let Some(probability) = Self::probability_from_value(&output)? {
                debug!(output = %name, "Probability taken from fallback output");
                return Ok(probability);
            }
        }

        Err(anyhow!("no probability output found in model outputs"))
    }

    fn probability_from_value(output: &ort::value::DynValue) -> Result<Option<f64>> {
        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            return Ok(Some(Self::probability_from_tensor(
                &shape.iter().copied().collect::<Vec<i64>>(),
                data,
            )));
        }

        if DynSequenceValueType::can_downcast(&output.dtype()) {
            return Ok(Some(Self::probability_from_sequence_map(output)?));
        }

        Ok(None)
    }

    /// Tensor form: [batch, 2] class probabilities, or [batch, 1] / scalar
    /// single probability. Class 1 is the default class.
    fn probability_from_tensor(dims: &[i64], data: &[f32]) -> f64 {
        let classes = dims.last().copied().unwrap_or(data.len() as i64) as usize;
        if classes >= 2 && data.len() >= 2 {
            data[1] as f64
        } else {
            data.first().copied().unwrap_or(0.5) as f64
        }
    }

    /// seq(map(int64, float)) form: one map per batch row, class id to
    /// probability.
    fn probability_from_sequence_map(output: &ort::value::DynValue) -> Result<f64> {
        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| anyhow!("Failed to downcast output to sequence: {}", e))?;
        let maps = sequence.try_extract_sequence::<DynMapValueType>()?;
        let map = maps
            .first()
            .ok_or_else(|| anyhow!("empty probability sequence"))?;

        let class_probabilities = map.try_extract_key_values::<i64, f32>()?;

        if let Some((_, probability)) = class_probabilities.iter().find(|(class, _)| *class == 1) {
            return Ok(*probability as f64);
        }
        // Binary model that only reported class 0
        if let Some((_, probability)) = class_probabilities.iter().find(|(class, _)| *class == 0) {
            return Ok(1.0 - *probability as f64);
        }

        Err(anyhow!("no class probability found in map output"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_from_two_class_tensor() {
        let p = LoanScorer::probability_from_tensor(&[1, 2], &[0.3, 0.7]);
        assert!((p - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_probability_from_single_value_tensor() {
        let p = LoanScorer::probability_from_tensor(&[1, 1], &[0.42]);
        assert!((p - 0.42).abs() < 1e-6);
    }

    #[test]
    fn test_label_threshold() {
        assert_eq!(u8::from(0.49_f64 >= 0.5), 0);
        assert_eq!(u8::from(0.5_f64 >= 0.5), 1);
    }
}
