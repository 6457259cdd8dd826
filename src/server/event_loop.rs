use std::cell::{Ref, RefCell};
use std::rc::Rc;

use libpulse_binding as pulse;
use pulse::mainloop::threaded::Mainloop;
use pulse::operation::{Operation, State as OperationState};

use crate::{Error, Result};

/// The libpulse threaded mainloop: a background thread running all protocol
/// callbacks, plus the lock and condition variable shared with that thread.
///
/// The mainloop is only touched from the caller thread while its lock is
/// held, and from the loop thread inside callbacks, where libpulse already
/// holds the lock.
pub struct EventLoop {
    mainloop: Rc<RefCell<Mainloop>>,
    running: bool,
}

impl EventLoop {
    pub fn new() -> Result<Self> {
        let mainloop = Mainloop::new()
            .ok_or_else(|| Error::connection_internal("could not create mainloop"))?;
        Ok(Self {
            mainloop: Rc::new(RefCell::new(mainloop)),
            running: false,
        })
    }

    /// Borrow the mainloop, for binding a context to it.
    pub(crate) fn mainloop(&self) -> Ref<'_, Mainloop> {
        self.mainloop.borrow()
    }

    /// A handle callbacks use to wake the caller.
    pub fn signaller(&self) -> Signaller {
        Signaller(Rc::clone(&self.mainloop))
    }

    /// Take the lock, then start the loop thread.
    ///
    /// The lock is returned still held, so nothing the loop thread does can
    /// signal before the caller is ready to wait for it.
    pub fn start(&mut self) -> Result<LoopGuard<'_>> {
        self.mainloop.borrow_mut().lock();
        if let Err(err) = self.mainloop.borrow_mut().start() {
            self.mainloop.borrow_mut().unlock();
            return Err(Error::connection(err));
        }
        self.running = true;
        Ok(LoopGuard {
            mainloop: &self.mainloop,
        })
    }

    pub fn lock(&self) -> LoopGuard<'_> {
        self.mainloop.borrow_mut().lock();
        LoopGuard {
            mainloop: &self.mainloop,
        }
    }

    /// Stop and join the loop thread. Must not be called with the lock held.
    pub fn stop(&mut self) {
        if self.running {
            self.mainloop.borrow_mut().stop();
            self.running = false;
        }
    }
}

impl Drop for EventLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Proof the loop lock is held. Unlocks on drop.
pub struct LoopGuard<'a> {
    mainloop: &'a RefCell<Mainloop>,
}

impl LoopGuard<'_> {
    /// Release the lock and block until a callback signals, then retake it.
    ///
    /// Wake-ups can be spurious; always call this in a loop that re-checks
    /// whatever it is waiting for.
    pub fn wait(&self) {
        self.mainloop.borrow_mut().wait();
    }

    /// Wait until `op` is no longer running: it either completed, or the
    /// connection went away and it was cancelled.
    pub fn wait_for<C: ?Sized>(&self, op: &Operation<C>) {
        while op.get_state() == OperationState::Running {
            self.wait();
        }
    }
}

impl Drop for LoopGuard<'_> {
    fn drop(&mut self) {
        self.mainloop.borrow_mut().unlock();
    }
}

/// Wakes the thread blocked in [`LoopGuard::wait`].
///
/// Only for use inside callbacks, which libpulse runs on the loop thread with
/// the lock held.
#[derive(Clone)]
pub struct Signaller(Rc<RefCell<Mainloop>>);

impl Signaller {
    pub fn signal(&self) {
        // the waiting thread holds a borrow for the whole wait, so go
        // around the RefCell. the mainloop lock is what serializes access
        // here, and it is held by libpulse while callbacks run.
        unsafe { (*self.0.as_ptr()).signal(false) };
    }
}
