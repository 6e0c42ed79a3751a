use jiff::{SignedDuration, Timestamp};
use keyhole_core::Clock;
use std::sync::{Arc, Mutex};

/// A clock that only moves when told to.
#[derive(Clone)]
pub(crate) struct TestClock {
    inner: Arc<Mutex<Timestamp>>,
}

impl TestClock {
    pub(crate) fn new(now: Timestamp) -> Self {
        Self {
            inner: Arc::new(Mutex::new(now)),
        }
    }

    pub(crate) fn advance(&self, by: SignedDuration) {
        let mut now = self
            .inner
            .lock()
            .expect("test clock lock should not be poisoned");
        *now = *now + by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> Timestamp {
        *self
            .inner
            .lock()
            .expect("test clock lock should not be poisoned")
    }
}

#[test]
fn test_clock_works() {
    let base = Timestamp::from_second(0).unwrap();
    let clock = TestClock::new(base);
    assert_eq!(clock.now(), base);

    clock.advance(SignedDuration::from_secs(1000));
    assert_eq!(clock.now(), Timestamp::from_second(1000).unwrap());
}
