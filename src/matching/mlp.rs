//! Multilayer perceptron scorer.
//!
//! The network maps a flattened view (pixels scaled to `[0, 1]`) through
//! ReLU-activated hidden layers to two logits, `[off-route, on-route]`. The
//! route score is the log-softmax of the on-route logit; the embedding is the
//! activation of the last hidden layer. Weights come from a trained model;
//! training is not part of this crate.

use crate::matching::LearnedScorer;
use crate::util::{HomingError, HomingResult};
use crate::view::PanoramicView;

/// Fully connected layer with row-major `outputs x inputs` weights.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseLayer {
    inputs: usize,
    outputs: usize,
    weights: Vec<f32>,
    bias: Vec<f32>,
}

impl DenseLayer {
    /// Creates a layer; `weights.len()` must be `outputs * inputs`.
    pub fn new(inputs: usize, outputs: usize, weights: Vec<f32>, bias: Vec<f32>) -> HomingResult<Self> {
        if inputs == 0 || outputs == 0 {
            return Err(HomingError::config("dense layer needs non-zero sizes"));
        }
        if weights.len() != inputs * outputs {
            return Err(HomingError::EmbeddingMismatch {
                expected: inputs * outputs,
                got: weights.len(),
            });
        }
        if bias.len() != outputs {
            return Err(HomingError::EmbeddingMismatch {
                expected: outputs,
                got: bias.len(),
            });
        }
        Ok(Self {
            inputs,
            outputs,
            weights,
            bias,
        })
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    fn forward(&self, input: &[f32]) -> Vec<f32> {
        self.weights
            .chunks_exact(self.inputs)
            .zip(&self.bias)
            .map(|(row, &b)| row.iter().zip(input).map(|(&w, &x)| w * x).sum::<f32>() + b)
            .collect()
    }
}

/// Inference-only MLP implementing [`LearnedScorer`].
#[derive(Clone, Debug, PartialEq)]
pub struct Mlp {
    hidden: Vec<DenseLayer>,
    output: DenseLayer,
}

impl Mlp {
    /// Assembles a network; consecutive layer sizes must chain and the output
    /// layer must produce two logits.
    pub fn new(hidden: Vec<DenseLayer>, output: DenseLayer) -> HomingResult<Self> {
        if hidden.is_empty() {
            return Err(HomingError::config("mlp needs at least one hidden layer"));
        }
        for pair in hidden.windows(2) {
            if pair[0].outputs != pair[1].inputs {
                return Err(HomingError::EmbeddingMismatch {
                    expected: pair[0].outputs,
                    got: pair[1].inputs,
                });
            }
        }
        let last = &hidden[hidden.len() - 1];
        if last.outputs != output.inputs {
            return Err(HomingError::EmbeddingMismatch {
                expected: last.outputs,
                got: output.inputs,
            });
        }
        if output.outputs != 2 {
            return Err(HomingError::config(format!(
                "mlp output layer must have 2 logits, got {}",
                output.outputs
            )));
        }
        Ok(Self { hidden, output })
    }

    /// Expected number of input pixels.
    pub fn input_size(&self) -> usize {
        self.hidden[0].inputs
    }

    /// Length of the embedding returned by `embed`.
    pub fn latent_size(&self) -> usize {
        self.output.inputs
    }

    /// Runs the network, returning `(latent, logits)`.
    pub fn forward(&self, view: &PanoramicView) -> HomingResult<(Vec<f32>, Vec<f32>)> {
        if view.len() != self.input_size() {
            return Err(HomingError::EmbeddingMismatch {
                expected: self.input_size(),
                got: view.len(),
            });
        }
        let mut x: Vec<f32> = view.data().iter().map(|&v| f32::from(v) / 255.0).collect();
        for layer in &self.hidden {
            x = layer.forward(&x);
            for v in &mut x {
                *v = v.max(0.0);
            }
        }
        let logits = self.output.forward(&x);
        Ok((x, logits))
    }
}

fn log_softmax(logits: &[f32], idx: usize) -> f32 {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let sum: f32 = logits.iter().map(|&l| (l - max).exp()).sum();
    logits[idx] - max - sum.ln()
}

impl LearnedScorer for Mlp {
    fn score(&self, view: &PanoramicView) -> HomingResult<f32> {
        let (_, logits) = self.forward(view)?;
        Ok(log_softmax(&logits, 1))
    }

    fn embed(&self, view: &PanoramicView) -> HomingResult<Vec<f32>> {
        self.forward(view).map(|(latent, _)| latent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_mlp() -> Mlp {
        let hidden = DenseLayer::new(2, 2, vec![1.0, 0.0, 0.0, 1.0], vec![0.0, 0.0]).unwrap();
        let output = DenseLayer::new(2, 2, vec![1.0, 0.0, 0.0, 1.0], vec![0.0, 0.0]).unwrap();
        Mlp::new(vec![hidden], output).unwrap()
    }

    #[test]
    fn forward_scales_pixels_and_applies_relu() {
        let mlp = identity_mlp();
        let view = PanoramicView::new(vec![255, 0], 2, 1).unwrap();
        let (latent, logits) = mlp.forward(&view).unwrap();
        assert_eq!(latent, vec![1.0, 0.0]);
        assert_eq!(logits, vec![1.0, 0.0]);
    }

    #[test]
    fn score_is_log_probability_of_route_class() {
        let mlp = identity_mlp();
        let view = PanoramicView::new(vec![0, 255], 2, 1).unwrap();
        let expected = 1.0 - (1.0f32.exp() + 1.0).ln();
        assert!((mlp.score(&view).unwrap() - expected).abs() < 1e-6);
        assert!(mlp.score(&view).unwrap() <= 0.0);
    }

    #[test]
    fn rejects_wrong_input_size_and_bad_topology() {
        let mlp = identity_mlp();
        let view = PanoramicView::new(vec![0; 3], 3, 1).unwrap();
        assert_eq!(
            mlp.embed(&view).unwrap_err(),
            HomingError::EmbeddingMismatch {
                expected: 2,
                got: 3
            }
        );
        let hidden = DenseLayer::new(2, 3, vec![0.0; 6], vec![0.0; 3]).unwrap();
        let output = DenseLayer::new(2, 2, vec![0.0; 4], vec![0.0; 2]).unwrap();
        assert!(Mlp::new(vec![hidden], output).is_err());
    }
}
