//! Browser side of API key detection: input and blur events plus one
//! `gloo-timers` timeout per key field.

use gloo_timers::callback::Timeout;
use settings::debounce::{ChangeOutcome, DetectionDebouncer};
use settings::orchestrator::DetectionInputHandler;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

pub fn now() -> Duration {
    Duration::from_millis(web_sys::js_sys::Date::now() as u64)
}

pub struct TimedDetection;

impl DetectionInputHandler for TimedDetection {
    fn attach(&self, debouncer: Rc<RefCell<DetectionDebouncer>>) {
        let input = debouncer.borrow().input().clone();
        let timer: Rc<RefCell<Option<Timeout>>> = Rc::default();

        {
            let debouncer = debouncer.clone();
            let timer = timer.clone();
            input.add_change_listener(Box::new(move || {
                let outcome = debouncer.borrow_mut().handle_change(now());
                // Replacing or taking the timeout drops it, which cancels it
                match outcome {
                    ChangeOutcome::Hidden => {
                        timer.borrow_mut().take();
                    }
                    ChangeOutcome::Scheduled { delay, ticket } => {
                        let debouncer = debouncer.clone();
                        let timeout = Timeout::new(delay.as_millis() as u32, move || {
                            debouncer.borrow_mut().handle_timer(ticket);
                        });
                        *timer.borrow_mut() = Some(timeout);
                    }
                }
            }));
        }

        input.add_blur_listener(Box::new(move || {
            timer.borrow_mut().take();
            debouncer.borrow_mut().handle_blur();
        }));
    }
}
