//! Request-scoped attributes flowing through a context instead of call
//! signatures.
//!
//! Run with: `cargo run --example request_context`

use std::sync::Arc;

use logweave::capture::CaptureSink;
use logweave::context::LogContext;
use logweave::handler::Handler;
use logweave::logger::Logger;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let sink = CaptureSink::new();
    let logger = Logger::new(Handler::new(Arc::new(sink.clone()))).named("api");

    // Attributes added to the context surface in every downstream log call.
    // Prepended ones land at the record's front, outside any group;
    // appended ones land at the end, inside the logger's open group.
    let cx = LogContext::new().prepend(["request_id".into(), "req-42".into()]);

    handle_request(&logger, &cx).await;

    for record in sink.records() {
        println!("{}", serde_json::to_string(&record).unwrap());
    }
}

async fn handle_request(logger: &Logger, cx: &LogContext) {
    let db = logger.named("db").with_group("query");
    let cx = cx.append(["elapsed_ms".into(), 17.into()]);

    db.info(&cx, "select finished", ["rows".into(), 3.into()])
        .await
        .unwrap();
    logger
        .info(&cx, "request complete", ["status".into(), 200.into()])
        .await
        .unwrap();
}
