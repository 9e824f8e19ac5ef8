// SPDX-License-Identifier: AGPL-3.0
// S3Link Core - Shared test helpers

#![allow(dead_code)]

use s3link_core::Credentials;

/// Install a test-friendly subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("s3link_core=debug".parse().expect("valid directive")),
        )
        .with_test_writer()
        .try_init();
}

pub fn credentials(bucket: &str) -> Credentials {
    Credentials::new("A".repeat(20), "B".repeat(40), "us-east-1", bucket)
}
