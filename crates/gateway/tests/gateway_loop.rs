//! End-to-end tests of the consumer loop over in-memory transports

use gateway::{Exit, FaultCause, Gateway};
use std::time::Duration;
use tokio::task::JoinHandle;
use transport::{
    BusIngress, Frame, HostIngress, LoopbackBus, LoopbackHandle, MemoryLink, MemoryLinkHandle,
    Producer, TransportError,
};

const VERSION: &str = "SIM_VER_test";

struct Harness {
    host: HostIngress,
    bus: BusIngress,
    lines: MemoryLinkHandle,
    sent: LoopbackHandle,
    task: JoinHandle<Exit>,
}

fn start() -> Harness {
    let (host, bus, ingress) = transport::ingress(line_buffer::DEFAULT_CAPACITY);
    let (link, lines) = MemoryLink::new();
    let (loopback, sent) = LoopbackBus::new();

    let gateway = Gateway::new(
        loopback,
        link,
        ingress,
        vec![Producer::idle("test")],
        VERSION,
        Duration::ZERO,
    );
    Harness {
        host,
        bus,
        lines,
        sent,
        task: tokio::spawn(gateway.run()),
    }
}

async fn wait_for_lines(lines: &MemoryLinkHandle, count: usize) -> Vec<String> {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let seen = lines.lines();
            if seen.len() >= count {
                return seen;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("timed out waiting for response lines")
}

async fn finish(task: JoinHandle<Exit>) -> Exit {
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("gateway did not exit")
        .expect("gateway task panicked")
}

fn frame(id: u16, payload: &[u8]) -> Frame {
    Frame::new(id, payload).unwrap()
}

#[tokio::test]
async fn test_startup_announces_version_then_init() {
    let harness = start();
    let lines = wait_for_lines(&harness.lines, 2).await;
    assert_eq!(lines, vec!["!VER:SIM_VER_test\n", "!OK:INIT\n"]);
}

#[tokio::test]
async fn test_unknown_command_reports_once() {
    let harness = start();
    harness.host.deliver(b"!XYZ:foo\n").await;
    // A second command orders the output so a duplicate would show up
    harness.host.deliver(b"!VER\n").await;

    let lines = wait_for_lines(&harness.lines, 4).await;
    assert_eq!(
        lines,
        vec![
            "!VER:SIM_VER_test\n",
            "!OK:INIT\n",
            "!ERR:INVALID_CMD\n",
            "!VER:SIM_VER_test\n",
        ]
    );
}

#[tokio::test]
async fn test_split_reads_and_noise() {
    let harness = start();
    harness.host.deliver(b"garbage\n!VE").await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    harness.host.deliver(b"R\n").await;

    let lines = wait_for_lines(&harness.lines, 3).await;
    assert_eq!(lines[2], "!VER:SIM_VER_test\n");
}

#[tokio::test]
async fn test_config_round_trip_drives_classification() {
    let harness = start();
    harness
        .host
        .deliver(b"!CFG:SET:ignition:0x99\n!CFG:GET:ignition\n")
        .await;
    let lines = wait_for_lines(&harness.lines, 4).await;
    assert_eq!(lines[2..], ["!CFG:ignition:0x99\n", "!CFG:ignition:0x99\n"]);

    assert!(harness.bus.deliver(frame(0x036, &[0x02])).await);
    assert!(harness.bus.deliver(frame(0x099, &[0x02])).await);
    let lines = wait_for_lines(&harness.lines, 5).await;
    assert_eq!(lines[4], "!IGN:ON\n");

    harness.host.deliver(b"!VER\n").await;
    let lines = wait_for_lines(&harness.lines, 6).await;
    assert_eq!(lines[5], "!VER:SIM_VER_test\n");
}

#[tokio::test]
async fn test_shared_identifier_and_debounce() {
    let harness = start();
    wait_for_lines(&harness.lines, 2).await;

    for _ in 0..3 {
        assert!(harness.bus.deliver(frame(0x128, &[0x90])).await);
    }
    assert!(harness.bus.deliver(frame(0x165, &[0x01])).await);

    // Park shares 0x128 with illumination and is never decoded from it
    let lines = wait_for_lines(&harness.lines, 4).await;
    assert_eq!(lines[2..], ["!ILL:ON\n", "!KEY:SRC\n"]);

    harness.host.deliver(b"!VER\n").await;
    let lines = wait_for_lines(&harness.lines, 5).await;
    assert_eq!(lines[4], "!VER:SIM_VER_test\n");
}

#[tokio::test]
async fn test_key_transmits_steering_frame() {
    let harness = start();
    harness.host.deliver(b"!KEY:VOL+\n!KEY:HORN\n!VER\n").await;

    let lines = wait_for_lines(&harness.lines, 3).await;
    assert_eq!(lines[2], "!VER:SIM_VER_test\n");
    assert_eq!(harness.sent.sent(), vec![frame(0x165, &[0x02])]);
}

#[tokio::test]
async fn test_reset_request_restarts() {
    let harness = start();
    harness.host.deliver(b"!RST\n").await;

    assert_eq!(
        finish(harness.task).await,
        Exit::Restart(FaultCause::ResetRequested)
    );
    assert_eq!(harness.lines.lines().last().map(String::as_str), Some("!OK:RST\n"));
}

#[tokio::test]
async fn test_transmit_failure_reports_and_restarts_fresh() {
    let harness = start();
    harness.host.deliver(b"!CFG:SET:door:0x300\n").await;
    wait_for_lines(&harness.lines, 3).await;

    harness.sent.fail_transmit(true);
    harness.host.deliver(b"!KEY:SRC\n").await;
    assert_eq!(
        finish(harness.task).await,
        Exit::Restart(FaultCause::TransmitFailed)
    );
    assert_eq!(
        harness.lines.lines().last().map(String::as_str),
        Some("!ERR:CAN_ERROR\n")
    );

    // Next cycle starts from power-on state
    let harness = start();
    harness.host.deliver(b"!CFG:GET:door\n").await;
    let lines = wait_for_lines(&harness.lines, 3).await;
    assert_eq!(
        lines,
        vec!["!VER:SIM_VER_test\n", "!OK:INIT\n", "!CFG:door:0x220\n"]
    );
}

#[tokio::test]
async fn test_producer_failures_restart() {
    let harness = start();
    wait_for_lines(&harness.lines, 2).await;
    harness.bus.fail(TransportError::Bus("vcan0: link down".to_string()));
    assert_eq!(
        finish(harness.task).await,
        Exit::Restart(FaultCause::BusFailed)
    );
    assert_eq!(harness.lines.lines()[2], "!ERR:CAN_ERROR\n");

    let harness = start();
    harness.host.fail(TransportError::Closed("serial port"));
    assert_eq!(
        finish(harness.task).await,
        Exit::Restart(FaultCause::HostLinkFailed)
    );
}

#[tokio::test]
async fn test_host_close_runs_buffered_commands_then_shuts_down() {
    let harness = start();
    harness.host.deliver(b"!VER\n").await;
    harness.host.close();

    assert_eq!(finish(harness.task).await, Exit::Shutdown);
    assert_eq!(
        harness.lines.lines(),
        vec![
            "!VER:SIM_VER_test\n",
            "!OK:INIT\n",
            "!VER:SIM_VER_test\n",
        ]
    );
}

#[tokio::test]
async fn test_line_buffer_overflow_recovers() {
    let harness = start();
    wait_for_lines(&harness.lines, 2).await;

    // A command line that never ends overruns the buffer in one burst
    let mut burst = b"!KEY:".to_vec();
    burst.extend_from_slice(&[b'A'; 200]);
    assert!(harness.host.try_deliver(&burst) > 0);
    tokio::time::sleep(Duration::from_millis(20)).await;
    harness.host.deliver(b"!VER\n").await;

    let lines = wait_for_lines(&harness.lines, 3).await;
    assert_eq!(lines[2], "!VER:SIM_VER_test\n");
    assert!(harness.sent.sent().is_empty());
}

#[tokio::test]
async fn test_overflow_tail_and_sentinels_dropped() {
    let harness = start();
    wait_for_lines(&harness.lines, 2).await;

    let mut burst = b"!KEY:SRC".to_vec();
    burst.extend_from_slice(&b"!RST:".repeat(40));
    assert!(harness.host.try_deliver(&burst) > 0);
    tokio::time::sleep(Duration::from_millis(20)).await;
    // Rest of the lost line, then a fresh command
    harness.host.deliver(b"RST:RST:\n!VER\n").await;

    let lines = wait_for_lines(&harness.lines, 3).await;
    assert_eq!(lines[2], "!VER:SIM_VER_test\n");
    assert!(!harness.task.is_finished());
    assert!(harness.sent.sent().is_empty());
}

#[tokio::test]
async fn test_host_burst_larger_than_buffer_answers_every_command() {
    let harness = start();
    assert_eq!(wait_for_lines(&harness.lines, 2).await.len(), 2);
    harness.lines.take_lines();

    harness.host.deliver(&b"!VER\n".repeat(40)).await;

    let lines = wait_for_lines(&harness.lines, 40).await;
    assert_eq!(lines, vec!["!VER:SIM_VER_test\n"; 40]);
}
