//! Executor-agnostic scheduling helpers

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Upper bound on polls before `wait_until` gives up
pub const MAX_WAIT_POLLS: usize = 10_000;

struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

/// Let every other future in the same `join!` make progress once
pub async fn yield_now() {
    YieldNow { yielded: false }.await;
}

/// Yield until `condition` holds
///
/// Panics after `MAX_WAIT_POLLS` attempts so a broken test fails instead of
/// hanging.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..MAX_WAIT_POLLS {
        if condition() {
            return;
        }
        yield_now().await;
    }
    panic!("condition not reached after {MAX_WAIT_POLLS} polls");
}
