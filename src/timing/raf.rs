//! `requestAnimationFrame` as a [`StepScheduler`]

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::closure::Closure;
use super::scheduler::StepScheduler;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

pub type FrameClosure = Closure<dyn FnMut(f64)>;

/// Slot for the frame callback, filled once the owner has built it
pub type ClosureSlot = Rc<RefCell<Option<FrameClosure>>>;

/// Id returned by `requestAnimationFrame`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RafHandle(i32);

/// Schedules the closure in its slot for the next repaint
#[derive(Clone)]
pub struct RafScheduler {
    closure: ClosureSlot,
}

impl RafScheduler {
    pub fn new(closure: ClosureSlot) -> Self {
        Self { closure }
    }

    /// Drop the callback. Breaks the reference cycle between the callback and
    /// whatever it captured.
    pub fn release(&self) {
        self.closure.borrow_mut().take();
    }
}

impl StepScheduler for RafScheduler {
    type Handle = RafHandle;

    fn request_step(&mut self) -> RafHandle {
        match self.closure.borrow().as_ref() {
            Some(closure) => RafHandle(request_animation_frame(closure.as_ref().unchecked_ref())),
            None => {
                log::warn!("frame requested before the callback was installed");
                RafHandle(0)
            }
        }
    }

    fn cancel_step(&mut self, handle: RafHandle) {
        if handle.0 != 0 {
            cancel_animation_frame(handle.0);
        }
    }
}

impl std::fmt::Debug for RafScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RafScheduler")
            .field("installed", &self.closure.borrow().is_some())
            .finish()
    }
}
