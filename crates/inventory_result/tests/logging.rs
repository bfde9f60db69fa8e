// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Verifies the diagnostic events emitted over a result's lifecycle.

use std::io::Write;
use std::sync::Arc;

use inventory_result::testing::FakeInventory;
use inventory_result::{Inventory, ResultCode};
use parking_lot::Mutex;
use tick::Clock;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;

/// Captures formatted log output into a shared buffer.
#[derive(Debug, Clone, Default)]
struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    fn output(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).to_string()
    }

    fn assert_contains(&self, expected: &str) {
        let output = self.output();
        assert!(output.contains(expected), "log output does not contain '{expected}', got:\n{output}");
    }

    fn subscriber(&self) -> impl tracing::Subscriber {
        tracing_subscriber::registry().with(tracing_subscriber::fmt::layer().with_writer(self.clone()).with_ansi(false))
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogCaptureWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}

struct LogCaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Write for LogCaptureWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn lifecycle_events_are_logged() {
    let capture = LogCapture::default();
    let _guard = tracing::subscriber::set_default(capture.subscriber());

    let fake = FakeInventory::new();
    let inventory = Inventory::builder(fake.clone(), Clock::new_frozen()).build();

    let granted = fake.issue();
    fake.complete(granted, 1, Vec::new());
    let granted = inventory.track(granted);

    let denied = fake.issue();
    fake.fail(denied, ResultCode::AccessDenied);
    let denied = inventory.track(denied);

    granted.dispose().expect("dispose succeeds");
    drop(denied);

    capture.assert_contains("materialized inventory result");
    capture.assert_contains("applied inventory result");
    capture.assert_contains("inventory operation failed");
    capture.assert_contains("code=15");
    capture.assert_contains("destroyed inventory result");
}

#[test]
fn missing_records_are_logged() {
    let capture = LogCapture::default();
    let _guard = tracing::subscriber::set_default(capture.subscriber());

    let fake = FakeInventory::new();
    let inventory = Inventory::builder(fake.clone(), Clock::new_frozen()).build();
    let handle = fake.issue();
    fake.complete_without_records(handle, 1);

    let _result = inventory.track(handle);

    capture.assert_contains("inventory operation succeeded without records");
}
