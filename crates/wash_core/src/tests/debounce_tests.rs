use tokio::time::sleep;

use super::*;

fn recording() -> (
    Arc<Mutex<Vec<String>>>,
    impl Fn(String) + Send + Sync + 'static,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let action = move |value: String| {
        sink.lock().expect("seen").push(value);
    };
    (seen, action)
}

#[tokio::test(start_paused = true)]
async fn rapid_burst_fires_once_with_the_last_value() {
    let (seen, action) = recording();
    let debouncer = Debouncer::new(Duration::from_millis(500), action);

    for query in ["c", "ca", "car", "car w", "car wash"] {
        debouncer.call(query.to_string());
        sleep(Duration::from_millis(100)).await;
    }
    sleep(Duration::from_millis(600)).await;

    assert_eq!(*seen.lock().expect("seen"), ["car wash"]);
}

#[tokio::test(start_paused = true)]
async fn calls_spaced_past_the_window_each_fire() {
    let (seen, action) = recording();
    let debouncer = Debouncer::new(Duration::from_millis(200), action);

    debouncer.call("first".to_string());
    sleep(Duration::from_millis(300)).await;
    debouncer.call("second".to_string());
    sleep(Duration::from_millis(300)).await;

    assert_eq!(*seen.lock().expect("seen"), ["first", "second"]);
}

#[tokio::test(start_paused = true)]
async fn counts_one_invocation_per_burst() {
    // The side-by-side demo: ten keystrokes, one simulated API call.
    let calls = Arc::new(Mutex::new(0u32));
    let sink = Arc::clone(&calls);
    let debouncer = Debouncer::new(Duration::from_millis(500), move |_query: String| {
        *sink.lock().expect("calls") += 1;
    });

    for i in 0..10 {
        debouncer.call(format!("query {i}"));
        sleep(Duration::from_millis(50)).await;
    }
    sleep(Duration::from_millis(700)).await;

    assert_eq!(*calls.lock().expect("calls"), 1);
}

#[tokio::test(start_paused = true)]
async fn pending_timer_reports_and_clears() {
    let (_seen, action) = recording();
    let debouncer = Debouncer::new(Duration::from_millis(400), action);
    assert!(!debouncer.is_pending());

    debouncer.call("query".to_string());
    assert!(debouncer.is_pending());

    sleep(Duration::from_millis(500)).await;
    assert!(!debouncer.is_pending());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_wrapper_cancels_the_pending_timer() {
    let (seen, action) = recording();
    let debouncer = Debouncer::new(Duration::from_millis(250), action);
    debouncer.call("never".to_string());
    drop(debouncer);

    sleep(Duration::from_millis(1_000)).await;
    assert!(seen.lock().expect("seen").is_empty());
}
