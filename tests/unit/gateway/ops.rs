use super::*;

#[test]
fn progress_messages_rotate_and_report_elapsed_time() {
    let interval = Duration::from_secs(10);
    let first = progress_message(1, interval);
    assert!(first.starts_with("Setting up the scene"));
    assert!(first.ends_with("(10s elapsed)"));
    assert!(progress_message(6, interval).starts_with("Setting up the scene"));
    assert!(progress_message(3, interval).contains("(30s elapsed)"));
}

#[test]
fn poll_policy_follows_config() {
    let cfg = GatewayConfig {
        poll_interval_secs: 7,
        max_poll_attempts: 3,
        ..GatewayConfig::default()
    };
    assert_eq!(
        PollPolicy::from_config(&cfg),
        PollPolicy {
            interval: Duration::from_secs(7),
            max_attempts: 3
        }
    );
}
