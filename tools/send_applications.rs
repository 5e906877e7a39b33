//! Test Application Producer
//!
//! Generates and publishes synthetic loan applications to NATS for pipeline
//! testing, including records with unseen categorical levels and records in
//! the batch (birth_date) form.

use chrono::{Datelike, NaiveDate, Utc};
use loan_risk_pipeline::LoanApplication;
use rand::Rng;
use std::time::Duration;
use tracing::{info, warn};

/// Application generator for testing
struct ApplicationGenerator {
    rng: rand::rngs::ThreadRng,
    counter: u64,
}

impl ApplicationGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            counter: 0,
        }
    }

    /// Generate a random application in the live-request shape (direct age)
    fn generate(&mut self) -> LoanApplication {
        self.counter += 1;

        let mut app = LoanApplication::new(
            &format!("app_{:010}", self.counter),
            self.rng.gen_range(500.0..50000.0),
            *self.random_choice(&[12, 24, 36, 48, 60]),
            self.rng.gen_range(18..75),
        );
        app.gender = self
            .random_choice(&["male", "female", "other"])
            .to_string();
        app.job = self
            .random_choice(&["skilled", "unskilled", "management", "self_employed"])
            .to_string();
        app.product_type = self
            .random_choice(&["car", "education", "furniture", "appliances"])
            .to_string();
        app
    }

    /// Generate an application exercising the tolerance paths: novel
    /// category levels and the birth_date form
    fn generate_novel(&mut self) -> LoanApplication {
        let mut app = self.generate();

        app.job = self
            .random_choice(&["astronaut", "alchemist", "beekeeper"])
            .to_string();
        app.product_type = self.random_choice(&["yacht", "zeppelin"]).to_string();

        // Every other novel record arrives in the batch form
        if self.counter % 2 == 0 {
            let birth_year = Utc::now().year() - self.rng.gen_range(18..75);
            app.age = None;
            app.birth_date = NaiveDate::from_ymd_opt(birth_year, 6, 1);
        }

        app
    }

    fn random_choice<'a, T>(&mut self, choices: &'a [T]) -> &'a T {
        &choices[self.rng.gen_range(0..choices.len())]
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("send_applications=info".parse()?),
        )
        .init();

    info!("Starting Test Application Producer");

    let args: Vec<String> = std::env::args().collect();
    let nats_url = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("nats://localhost:4222");
    let subject = args
        .get(2)
        .map(|s| s.as_str())
        .unwrap_or("loan.applications");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(100);
    let novel_rate: f64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0.1);
    let delay_ms: u64 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count = count,
        novel_rate = novel_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!("Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Running in dry-run mode.");
            return run_dry_mode(count, novel_rate, delay_ms).await;
        }
    };

    let mut generator = ApplicationGenerator::new();
    let mut rng = rand::thread_rng();

    info!("Starting to publish {} applications...", count);

    let mut regular_count = 0;
    let mut novel_count = 0;

    for i in 0..count {
        let application = if rng.gen_bool(novel_rate) {
            novel_count += 1;
            generator.generate_novel()
        } else {
            regular_count += 1;
            generator.generate()
        };

        let payload = serde_json::to_vec(&application)?;
        client.publish(subject.to_string(), payload.into()).await?;

        if (i + 1) % 10 == 0 {
            info!(
                "Published {}/{} applications ({} regular, {} novel)",
                i + 1,
                count,
                regular_count,
                novel_count
            );
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!(
        "Completed! Published {} applications ({} regular, {} novel)",
        count, regular_count, novel_count
    );

    Ok(())
}

async fn run_dry_mode(count: u64, novel_rate: f64, delay_ms: u64) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no NATS connection)");

    let mut generator = ApplicationGenerator::new();
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let application = if rng.gen_bool(novel_rate) {
            generator.generate_novel()
        } else {
            generator.generate()
        };

        let json = serde_json::to_string_pretty(&application)?;

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample application {}:\n{}", i + 1, json);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
