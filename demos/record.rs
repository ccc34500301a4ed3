use camera_recorder::prelude::*;
use std::sync::Arc;

fn main() {
    let params = SessionParams {
        width: 1280,
        height: 720,
        framerate: 30,
        camera_id: 0,
    };
    let ctx = Arc::new(SessionContext::new());

    // stop after five seconds
    let timer_ctx = Arc::clone(&ctx);
    std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_secs(5));
        timer_ctx.interrupt();
    });

    let report = record(&params, ctx).unwrap();
    println!(
        "captured {}, recorded {}, dropped {}",
        report.captured, report.recorded, report.dropped
    );
}
