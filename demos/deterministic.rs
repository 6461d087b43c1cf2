//! The full state machine walked through with a manual clock: no sleeps,
//! every interval delivered by hand.
//!
//! Run with: `cargo run --example deterministic`

use tripswitch::{Breaker, BreakerConfig, ManualClock};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = BreakerConfig::new().with_threshold(2).with_timeout(3);
    let mut breaker = Breaker::new(config)?;

    let (clock, ticks) = ManualClock::new();
    breaker.start_with_clock(clock)?;

    println!("start                -> {}", breaker.state());

    breaker.report_failure().await?;
    ticks.advance().await?;
    println!("1 failure + tick     -> {}", breaker.state());

    breaker.report_failure().await?;
    breaker.report_failure().await?;
    ticks.advance().await?;
    println!("2 failures + tick    -> {}", breaker.state());

    breaker.report_failure().await?; // ignored while open
    ticks.advance().await?;
    println!("tick 1 of timeout    -> {}", breaker.state());
    ticks.advance().await?;
    println!("tick 2 of timeout    -> {}", breaker.state());
    ticks.advance().await?;
    println!("tick 3 of timeout    -> {}", breaker.state());

    breaker.report_success().await?;
    println!("successful probe     -> {}", breaker.state());

    println!("metrics: {:?}", breaker.metrics());

    breaker.stop().await?;
    println!("stop                 -> {}", breaker.state());
    Ok(())
}
