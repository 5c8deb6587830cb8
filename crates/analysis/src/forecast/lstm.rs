//! Single-layer LSTM regressor trained per request
//!
//! The model maps a window of normalized prices to the next normalized
//! price. It is trained full-batch on every overlapping window of the
//! series and then rolled forward one step at a time, feeding each
//! prediction back in as the newest input.

use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{linear, lstm, AdamW, LSTMConfig, Linear, Optimizer, ParamsAdamW, VarBuilder, VarMap, LSTM, RNN};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use realty_config::ForecastConfig;

use crate::ForecastError;

/// Training hyper-parameters
#[derive(Debug, Clone, PartialEq)]
pub struct LstmParams {
    pub window: usize,
    pub hidden_size: usize,
    pub max_epochs: usize,
    pub patience: usize,
    pub min_delta: f64,
    pub learning_rate: f64,
    /// Seed for weight initialization; `None` uses candle's own init
    pub seed: Option<u64>,
}

impl From<&ForecastConfig> for LstmParams {
    fn from(config: &ForecastConfig) -> Self {
        Self {
            window: config.window,
            hidden_size: config.hidden_size,
            max_epochs: config.max_epochs,
            patience: config.patience,
            min_delta: config.min_delta,
            learning_rate: config.learning_rate,
            seed: config.seed,
        }
    }
}

/// Summary of one training run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSummary {
    pub epochs: usize,
    pub final_loss: f64,
    pub early_stopped: bool,
}

struct SequenceRegressor {
    lstm: LSTM,
    head: Linear,
}

impl SequenceRegressor {
    fn new(hidden_size: usize, vb: VarBuilder) -> candle_core::Result<Self> {
        let lstm = lstm(1, hidden_size, LSTMConfig::default(), vb.pp("lstm"))?;
        let head = linear(hidden_size, 1, vb.pp("head"))?;
        Ok(Self { lstm, head })
    }

    /// (batch, window, 1) → (batch, 1)
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let states = self.lstm.seq(xs)?;
        let last = states
            .last()
            .ok_or_else(|| candle_core::Error::Msg("empty input sequence".to_string()))?;
        self.head.forward(last.h())
    }
}

/// Overlapping (window → next value) training pairs
pub(crate) fn training_windows(series: &[f32], window: usize) -> (Vec<f32>, Vec<f32>) {
    if window == 0 || series.len() <= window {
        return (Vec::new(), Vec::new());
    }
    let count = series.len() - window;
    let mut inputs = Vec::with_capacity(count * window);
    let mut targets = Vec::with_capacity(count);
    for start in 0..count {
        inputs.extend_from_slice(&series[start..start + window]);
        targets.push(series[start + window]);
    }
    (inputs, targets)
}

/// Train on `scaled` and project `steps` values past its end
///
/// Returns the projected values in the same normalized units as the input.
pub(crate) fn fit_and_project(
    scaled: &[f32],
    steps: usize,
    params: &LstmParams,
) -> Result<(Vec<f32>, TrainingSummary), ForecastError> {
    let window = params.window;
    let (inputs, targets) = training_windows(scaled, window);
    if targets.is_empty() {
        return Err(ForecastError::InsufficientData(format!(
            "{} points cannot fill a window of {}",
            scaled.len(),
            window
        )));
    }

    let device = Device::Cpu;
    let count = targets.len();
    let xs = Tensor::from_vec(inputs, (count, window, 1), &device)?;
    let ys = Tensor::from_vec(targets, (count, 1), &device)?;

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
    let model = SequenceRegressor::new(params.hidden_size, vb)?;
    if let Some(seed) = params.seed {
        seed_weights(&varmap, params.hidden_size, seed)?;
    }

    let mut optimizer = AdamW::new(
        varmap.all_vars(),
        ParamsAdamW {
            lr: params.learning_rate,
            weight_decay: 0.0,
            ..Default::default()
        },
    )?;

    let mut best_loss = f64::INFINITY;
    let mut stale_epochs = 0;
    let mut summary = TrainingSummary {
        epochs: 0,
        final_loss: f64::INFINITY,
        early_stopped: false,
    };

    for epoch in 0..params.max_epochs {
        let loss = candle_nn::loss::mse(&model.forward(&xs)?, &ys)?;
        optimizer.backward_step(&loss)?;

        let current = f64::from(loss.to_scalar::<f32>()?);
        if !current.is_finite() {
            return Err(ForecastError::Model(format!("loss diverged at epoch {}", epoch)));
        }
        summary.epochs = epoch + 1;
        summary.final_loss = current;

        if current < best_loss - params.min_delta {
            best_loss = current;
            stale_epochs = 0;
        } else {
            stale_epochs += 1;
        }
        if stale_epochs >= params.patience {
            summary.early_stopped = true;
            break;
        }
    }

    let mut recent: Vec<f32> = scaled[scaled.len() - window..].to_vec();
    let mut projected = Vec::with_capacity(steps);
    for _ in 0..steps {
        let input = Tensor::from_vec(recent.clone(), (1, window, 1), &device)?;
        let next = model
            .forward(&input)?
            .flatten_all()?
            .to_vec1::<f32>()?
            .first()
            .copied()
            .ok_or_else(|| ForecastError::Model("empty model output".to_string()))?;
        if !next.is_finite() {
            return Err(ForecastError::Model("non-finite projection".to_string()));
        }
        projected.push(next);
        recent.remove(0);
        recent.push(next);
    }

    Ok((projected, summary))
}

/// Overwrite every parameter with U(-1/√hidden, 1/√hidden) from a seeded RNG
fn seed_weights(varmap: &VarMap, hidden_size: usize, seed: u64) -> Result<(), ForecastError> {
    let vars = varmap
        .data()
        .lock()
        .map_err(|_| ForecastError::Model("parameter store lock poisoned".to_string()))?;

    // HashMap order is random; sort so the same seed always fills the same tensor
    let mut names: Vec<&String> = vars.keys().collect();
    names.sort();

    let bound = 1.0 / (hidden_size.max(1) as f32).sqrt();
    let mut rng = StdRng::seed_from_u64(seed);
    for name in names {
        let var = &vars[name];
        let values: Vec<f32> = (0..var.elem_count())
            .map(|_| rng.gen_range(-bound..bound))
            .collect();
        var.set(&Tensor::from_vec(values, var.shape().clone(), var.device())?)?;
    }
    Ok(())
}
