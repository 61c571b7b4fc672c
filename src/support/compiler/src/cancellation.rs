use derive_more::Display;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
#[display("compilation was cancelled")]
pub struct Cancelled;

#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

#[test]
fn test_cancel_is_shared_between_clones() {
    let token = CancellationToken::new();
    let cloned = token.clone();

    assert_eq!(cloned.check(), Ok(()));
    token.cancel();
    assert_eq!(cloned.check(), Err(Cancelled));
}
