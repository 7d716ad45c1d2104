use super::*;
use crate::events::tests::MockEventEmitter;
use crate::events::GestureEvent;
use crate::gesture::table::{GestureEntry, GestureTable};
use crate::voice_commands::executor::tests::MockAction;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;

const DEBOUNCE: Duration = Duration::from_millis(300);

/// Mock source; clones share state so a test can press the "button"
#[derive(Clone, Default)]
struct MockPulseSource {
    callback: Arc<Mutex<Option<PulseCallback>>>,
    starts: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
    start_error: Option<PulseSourceError>,
    stop_error: Option<PulseSourceError>,
}

impl MockPulseSource {
    /// Deliver one raw edge; false if the source is not started
    fn edge(&self) -> bool {
        match self.callback.lock().unwrap().as_ref() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl PulseSource for MockPulseSource {
    fn start(&mut self, callback: PulseCallback) -> Result<(), PulseSourceError> {
        if let Some(error) = self.start_error.clone() {
            return Err(error);
        }
        let mut slot = self.callback.lock().unwrap();
        if slot.is_some() {
            return Err(PulseSourceError::AlreadyStarted);
        }
        *slot = Some(callback);
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PulseSourceError> {
        self.callback.lock().unwrap().take();
        self.stops.fetch_add(1, Ordering::SeqCst);
        match self.stop_error.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn switch(emitter: Arc<MockEventEmitter>) -> (GestureSwitch, Vec<Arc<MockAction>>) {
    let actions: Vec<Arc<MockAction>> = (0..3)
        .map(|i| Arc::new(MockAction::new_success(&format!("action {}", i))))
        .collect();
    let table = GestureTable::new(
        actions
            .iter()
            .enumerate()
            .map(|(i, action)| GestureEntry {
                keyword: format!("gesture {}", i + 1),
                action: action.clone(),
            })
            .collect(),
    )
    .unwrap();
    let switch = GestureSwitch::new(Handle::current(), table, Duration::from_secs(5), emitter).unwrap();
    (switch, actions)
}

#[tokio::test(start_paused = true)]
async fn test_open_starts_source_and_feeds_switch() {
    let emitter = Arc::new(MockEventEmitter::new());
    let (switch, _) = switch(emitter);
    let source = MockPulseSource::default();

    let listener = PulseListener::open(Box::new(source.clone()), switch, DEBOUNCE).unwrap();

    assert_eq!(source.starts(), 1);
    assert!(source.edge());
    assert_eq!(listener.switch().pending_count(), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_bounces_are_dropped_before_the_switch() {
    let emitter = Arc::new(MockEventEmitter::new());
    let (switch, actions) = switch(emitter.clone());
    let source = MockPulseSource::default();
    let listener = PulseListener::open(Box::new(source.clone()), switch, DEBOUNCE).unwrap();

    // One press with contact bounce
    source.edge();
    source.edge();
    tokio::time::sleep(Duration::from_millis(5)).await;
    source.edge();
    assert_eq!(listener.switch().pending_count(), Some(1));

    // A second, clean press
    tokio::time::sleep(Duration::from_millis(400)).await;
    source.edge();
    assert_eq!(listener.switch().pending_count(), Some(2));

    emitter.wait_for_gestures(1).await;
    assert_eq!(actions[1].count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_drop_stops_source_and_closes_switch() {
    let emitter = Arc::new(MockEventEmitter::new());
    let (switch, actions) = switch(emitter.clone());
    let source = MockPulseSource::default();

    {
        let _listener = PulseListener::open(Box::new(source.clone()), switch.clone(), DEBOUNCE).unwrap();
        source.edge();
    }

    assert_eq!(source.stops(), 1);
    assert!(switch.is_closed());
    assert!(!source.edge());

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(
        emitter.gestures(),
        vec![GestureEvent::SessionDiscarded { count: 1 }]
    );
    assert_eq!(actions[0].count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_explicit_close_releases_once() {
    let emitter = Arc::new(MockEventEmitter::new());
    let (switch, _) = switch(emitter);
    let source = MockPulseSource::default();
    let listener = PulseListener::open(Box::new(source.clone()), switch.clone(), DEBOUNCE).unwrap();

    listener.close().unwrap();

    assert_eq!(source.stops(), 1);
    assert!(switch.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_close_reports_stop_failure_and_still_closes_switch() {
    let emitter = Arc::new(MockEventEmitter::new());
    let (switch, _) = switch(emitter);
    let source = MockPulseSource {
        stop_error: Some(PulseSourceError::Io("pin busy".to_string())),
        ..Default::default()
    };
    let listener = PulseListener::open(Box::new(source.clone()), switch.clone(), DEBOUNCE).unwrap();

    let error = listener.close().unwrap_err();

    assert_eq!(error, PulseSourceError::Io("pin busy".to_string()));
    assert!(switch.is_closed());
    assert_eq!(source.stops(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_start_failure_is_returned() {
    let emitter = Arc::new(MockEventEmitter::new());
    let (switch, _) = switch(emitter);
    let source = MockPulseSource {
        start_error: Some(PulseSourceError::Unavailable("no /dev/gpiomem".to_string())),
        ..Default::default()
    };

    let result = PulseListener::open(Box::new(source.clone()), switch.clone(), DEBOUNCE);

    assert!(matches!(result, Err(PulseSourceError::Unavailable(_))));
    assert_eq!(source.stops(), 0);
    assert!(!switch.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_second_listener_on_started_source_fails() {
    let emitter = Arc::new(MockEventEmitter::new());
    let (switch, _) = switch(emitter);
    let source = MockPulseSource::default();
    let _first = PulseListener::open(Box::new(source.clone()), switch.clone(), DEBOUNCE).unwrap();

    let second = PulseListener::open(Box::new(source.clone()), switch, DEBOUNCE);

    assert!(matches!(second, Err(PulseSourceError::AlreadyStarted)));
}

#[tokio::test(start_paused = true)]
async fn test_release_on_panic() {
    let emitter = Arc::new(MockEventEmitter::new());
    let (switch, _) = switch(emitter);
    let source = MockPulseSource::default();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _listener = PulseListener::open(Box::new(source.clone()), switch.clone(), DEBOUNCE).unwrap();
        panic!("setup failed after the listener was opened");
    }));

    assert!(result.is_err());
    assert_eq!(source.stops(), 1);
    assert!(switch.is_closed());
}
