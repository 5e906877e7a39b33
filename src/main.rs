//! Loan Risk Pipeline - Main Entry Point
//!
//! Loads the trained model and its column catalog once at startup, consumes
//! loan applications from NATS, scores them through the schema-consistent
//! pipeline, and publishes a risk decision per application.

use anyhow::Result;
use chrono::Utc;
use futures::StreamExt;
use loan_risk_pipeline::{
    config::AppConfig,
    consumer::ApplicationConsumer,
    features::ScoringPipeline,
    metrics::{MetricsReporter, PipelineMetrics},
    models::loader::load_artifacts,
    producer::DecisionProducer,
    types::decision::RiskDecision,
    LoanApplication,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("loan_risk_pipeline=info".parse()?),
        )
        .init();

    info!("Starting Loan Risk Pipeline");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");

    // Load the model/catalog pair once, before serving anything. A missing
    // or mismatched artifact aborts startup here.
    let artifacts = load_artifacts(
        &config.artifacts.model_path,
        &config.artifacts.catalog_path,
        config.artifacts.onnx_threads,
    )?;
    let scorer = Arc::new(artifacts.scorer);
    let pipeline = Arc::new(ScoringPipeline::new(artifacts.catalog));
    info!(
        columns = pipeline.catalog().len(),
        "Scoring pipeline bound to column catalog"
    );

    // Initialize metrics
    let metrics = Arc::new(PipelineMetrics::new());

    // Connect to NATS
    let client = async_nats::connect(&config.nats.url).await?;
    info!("Connected to NATS at {}", config.nats.url);

    // Initialize consumer and producer
    let consumer = ApplicationConsumer::new(client.clone(), &config.nats.application_subject);
    let producer = Arc::new(DecisionProducer::new(
        client.clone(),
        &config.nats.decision_subject,
    ));

    let num_workers = config.pipeline.workers;
    info!(
        workers = num_workers,
        applications = %config.nats.application_subject,
        decisions = %config.nats.decision_subject,
        "Starting application scoring loop"
    );

    // Semaphore to limit concurrent processing
    let semaphore = Arc::new(Semaphore::new(num_workers));
    let processed_count = Arc::new(AtomicU64::new(0));

    let config = Arc::new(config);

    // Start metrics reporter (prints summary every 30 seconds)
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 30);
        reporter.start().await;
    });

    // Process applications in parallel
    let mut subscription = consumer.subscribe().await?;

    while let Some(message) = subscription.next().await {
        let permit = semaphore.clone().acquire_owned().await?;

        let pipeline = pipeline.clone();
        let scorer = scorer.clone();
        let producer = producer.clone();
        let metrics = metrics.clone();
        let config = config.clone();
        let processed_count = processed_count.clone();

        tokio::spawn(async move {
            let start_time = Instant::now();

            let application = match serde_json::from_slice::<LoanApplication>(&message.payload) {
                Ok(application) => application,
                Err(e) => {
                    metrics.record_rejected();
                    warn!(error = %e, "Failed to deserialize application");
                    drop(permit);
                    return;
                }
            };
            let app_id = application.application_id.clone();

            // Age derives from wall-clock "now", same semantics the batch
            // feature build uses at extraction time.
            let vector = match pipeline.run_single(&application, Utc::now()) {
                Ok(vector) => vector,
                Err(e) => {
                    metrics.record_rejected();
                    warn!(application_id = %app_id, error = %e, "Rejected malformed application");
                    drop(permit);
                    return;
                }
            };

            match scorer.predict(&vector) {
                Ok(prediction) => {
                    let processing_time = start_time.elapsed();
                    metrics.record_scored(
                        processing_time,
                        prediction.probability_of_default,
                        prediction.label,
                    );

                    let decision = RiskDecision::from_prediction(
                        &prediction,
                        &application,
                        &config.scoring.risk_levels,
                    );
                    metrics.record_decision(&format!("{:?}", decision.risk_level).to_lowercase());

                    if let Err(e) = producer.publish(&decision).await {
                        error!(
                            application_id = %app_id,
                            error = %e,
                            "Failed to publish risk decision"
                        );
                    } else if decision.label == 1 {
                        info!(
                            application_id = %app_id,
                            probability_of_default = decision.probability_of_default,
                            risk_level = ?decision.risk_level,
                            processing_time_us = processing_time.as_micros(),
                            "Default risk flagged"
                        );
                    }

                    let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;
                    if count % 100 == 0 {
                        let throughput = metrics.get_throughput();
                        let processing_stats = metrics.get_processing_stats();
                        info!(
                            processed = count,
                            throughput = format!("{:.1} app/s", throughput),
                            avg_latency_us = processing_stats.mean_us,
                            "Processing milestone"
                        );
                    }
                }
                Err(e) => {
                    error!(
                        application_id = %app_id,
                        error = %e,
                        "Inference failed"
                    );
                }
            }

            drop(permit);
        });
    }

    info!("Pipeline shutting down...");
    metrics.print_summary();

    Ok(())
}
