//! Demonstration of the duplo meta-estimators on synthetic data
//!
//! - Quantile stacking on a zero-inflated target
//! - Baseline-proportional regression over store groups
//!
//! Run with `RUST_LOG=debug` to see the estimators' log events.

use duplo::estimator::{MeanRegressor, PriorClassifier};
use duplo::{
    BaselineProportionalRegressor, BoxedRegressor, FrameRegressor, QuantileStackedRegressor,
    StackConfig,
};
use ndarray::{Array1, Array2};
use polars::prelude::{Column, DataFrame};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    info!(version = duplo::VERSION, "starting duplo demo");

    println!("==========================================================");
    println!("              Duplo Meta-Estimators - Demo");
    println!("==========================================================\n");

    demo_quantile_stacking()?;
    demo_baseline_proportional()?;

    println!("==========================================================");
    println!("                    Demo Complete!");
    println!("==========================================================");
    Ok(())
}

/// Deterministic zero-inflated sample: roughly 60% zeros, the rest grow with x1
fn zero_inflated_sample(n: usize) -> (Array2<f64>, Array1<f64>) {
    let x = Array2::from_shape_fn((n, 2), |(i, j)| {
        if j == 0 {
            ((i * 7) % 10) as f64 / 10.0
        } else {
            (i % 13) as f64
        }
    });
    let y = x
        .rows()
        .into_iter()
        .map(|row| if row[0] < 0.6 { 0.0 } else { 2.0 + row[1] * 1.5 })
        .collect();
    (x, y)
}

/// Demo 1: Quantile stacking
fn demo_quantile_stacking() -> Result<(), Box<dyn std::error::Error>> {
    println!("----------------------------------------------------------");
    println!("Demo 1: Quantile-Stacked Multi-Regressor");
    println!("----------------------------------------------------------");

    let (x, y) = zero_inflated_sample(200);
    let zeros = y.iter().filter(|&&v| v == 0.0).count();
    println!("Rows: {}, zero targets: {}", y.len(), zeros);

    let auxiliary: Vec<BoxedRegressor<Array2<f64>>> = vec![Box::new(MeanRegressor::new())];
    let mut model = QuantileStackedRegressor::from_parts(
        PriorClassifier::new(),
        auxiliary,
        MeanRegressor::new(),
        StackConfig {
            cuts: vec![0.0, 10.0],
            seed: Some(42),
        },
    );
    model.fit(&x, y.view(), None)?;

    let augmented = model.augment(&x)?;
    println!("Augmented width: {}", augmented.ncols());
    if let Some(layout) = model.layout() {
        for (i, cut) in model.cuts().iter().enumerate() {
            println!(
                "  P(y > {cut:>5.1}) column {} = {:.3}",
                layout.cut_column(i),
                augmented[[0, layout.cut_column(i)]]
            );
        }
    }

    let predictions = model.predict(&x)?;
    println!("First prediction: {:.3}\n", predictions[0]);
    Ok(())
}

/// Demo 2: Baseline-proportional regression
fn demo_baseline_proportional() -> Result<(), Box<dyn std::error::Error>> {
    println!("----------------------------------------------------------");
    println!("Demo 2: Baseline-Proportional Regressor");
    println!("----------------------------------------------------------");

    let stores = ["north", "south", "east"];
    let n = 30;
    let store: Vec<&str> = (0..n).map(|i| stores[i % stores.len()]).collect();
    let promo: Vec<f64> = (0..n).map(|i| (i % 2) as f64).collect();
    let sales: Array1<f64> = (0..n)
        .map(|i| {
            let base = [120.0, 45.0, 300.0][i % stores.len()];
            base * (1.0 + 0.2 * promo[i])
        })
        .collect();

    let df = DataFrame::new(vec![
        Column::new("store".into(), store),
        Column::new("promo".into(), promo),
    ])?;

    let mut model = BaselineProportionalRegressor::new(
        ["store"],
        FrameRegressor::new(MeanRegressor::new(), ["promo"]),
    );
    model.fit(&df, sales.view(), None)?;

    if let Some(table) = model.lookup_table() {
        println!("Baseline table:\n{table}");
    }
    if let Some(default) = model.default_baseline() {
        println!("Default baseline: {default:.2}");
    }

    let predictions = model.predict(&df)?;
    for (i, prediction) in predictions.iter().take(3).enumerate() {
        println!(
            "  {:<6} actual {:>7.2} predicted {:>7.2}",
            stores[i], sales[i], prediction
        );
    }
    println!();
    Ok(())
}
