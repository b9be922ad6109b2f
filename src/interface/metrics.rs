//! Prometheus metrics

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and describe the call metrics
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!(
        "telecall_rooms_created_total",
        "Rooms created through the meeting provider"
    );
    describe_counter!(
        "telecall_rooms_joined_total",
        "Rooms joined with a pasted room code"
    );
    describe_counter!(
        "telecall_room_creation_failures_total",
        "Room creation requests that failed"
    );
    describe_counter!("telecall_hangups_total", "Completed hang-up sequences");
    describe_counter!(
        "telecall_backend_failures_total",
        "Backend writes or reads that failed, by operation"
    );
    describe_counter!(
        "telecall_reconnect_attempts_total",
        "Rejoin attempts after a dropped connection"
    );

    Ok(handle)
}

pub fn record_room_created() {
    counter!("telecall_rooms_created_total").increment(1);
}

pub fn record_room_joined() {
    counter!("telecall_rooms_joined_total").increment(1);
}

pub fn record_room_creation_failed() {
    counter!("telecall_room_creation_failures_total").increment(1);
}

pub fn record_hang_up() {
    counter!("telecall_hangups_total").increment(1);
}

/// Record a failed backend operation, tagged with the operation name
pub fn record_backend_failure(operation: &'static str) {
    counter!("telecall_backend_failures_total", "operation" => operation).increment(1);
}

pub fn record_reconnect_attempt() {
    counter!("telecall_reconnect_attempts_total").increment(1);
}
