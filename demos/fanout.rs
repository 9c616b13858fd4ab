//! Broadcast one logger across two destinations with independent naming.
//!
//! Run with: `cargo run --example fanout`

use std::sync::Arc;

use logweave::attrs::Attr;
use logweave::capture::CaptureSink;
use logweave::context::LogContext;
use logweave::fanout::fanout;
use logweave::handler::Handler;
use logweave::level::Level;
use logweave::logger::Logger;
use logweave::sink::LogSink;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let ops = CaptureSink::new();
    let audit = CaptureSink::new().with_min_level(Level::WARN);

    let ops_handler = Handler::new(Arc::new(ops.clone())).named("ops");
    let audit_handler = Handler::new(Arc::new(audit.clone()))
        .named("audit")
        .with_attrs(vec![Attr::new("channel", "audit")]);

    let logger = Logger::new(Handler::new(fanout([
        Some(Arc::new(ops_handler) as Arc<dyn LogSink>),
        Some(Arc::new(audit_handler) as Arc<dyn LogSink>),
    ])));

    let cx = LogContext::new();
    logger
        .info(&cx, "cache warmed", ["entries".into(), 512.into()])
        .await
        .unwrap();
    logger
        .warn(&cx, "disk usage high", ["pct".into(), 91.into()])
        .await
        .unwrap();

    println!("ops saw:");
    for record in ops.records() {
        println!("  {}", serde_json::to_string(&record).unwrap());
    }
    println!("audit saw (WARN and above only):");
    for record in audit.records() {
        println!("  {}", serde_json::to_string(&record).unwrap());
    }
}
