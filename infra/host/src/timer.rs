use futures_util::future::LocalBoxFuture;
use std::rc::Rc;
use std::time::Duration;

/// One-shot timers. Dropping the returned future cancels the timer.
pub trait Timer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

impl<T: Timer + ?Sized> Timer for Rc<T> {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        (**self).sleep(duration)
    }
}

/// Timer backed by the tokio clock (`tokio::time::pause` applies).
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[cfg(not(target_arch = "wasm32"))]
impl Timer for TokioTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        use futures_util::FutureExt;

        tokio::time::sleep(duration).boxed_local()
    }
}
