//! Basic wall-clock usage: a flaky dependency trips the breaker, the
//! breaker backs off, then recovers once the dependency heals.
//!
//! Run with: `cargo run --example basic`

use std::time::Duration;
use tripswitch::{Breaker, BreakerConfig, State};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Short intervals so the demo finishes quickly.
    let config = BreakerConfig::new()
        .with_threshold(3)
        .with_timeout(2)
        .with_interval(Duration::from_millis(250));

    let mut breaker = Breaker::new(config)?;
    breaker.start()?;

    // Phase 1: the dependency fails; the breaker trips within an interval.
    println!("dependency down, reporting failures...");
    for _ in 0..3 {
        breaker.report_failure().await?;
    }

    let mut states = breaker.subscribe();
    states.changed().await?;
    println!("circuit is now: {}", breaker.state());
    assert_eq!(breaker.state(), State::Open);

    // Phase 2: wait out the open timeout.
    println!("backing off...");
    states.changed().await?;
    println!("circuit is now: {}", breaker.state());
    assert_eq!(breaker.state(), State::HalfOpen);

    // Phase 3: the dependency has recovered; one good probe closes it.
    if breaker.call_permitted() {
        println!("probing the dependency... ok");
        breaker.report_success().await?;
    }
    println!("circuit is now: {}", breaker.state());

    breaker.stop().await?;
    println!("stopped; circuit reads: {}", breaker.state());
    Ok(())
}
