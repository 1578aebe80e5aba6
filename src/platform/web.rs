//! Browser host
//!
//! Every callback into the session is deferred through `setTimeout`, so the
//! session is never re-entered while it is already borrowed.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventTarget, Window};

use super::{SessionHost, Subscription, TimerId};
use crate::audio::{AudioCues, Cue};
use crate::driver::{FrameId, FrameScheduler};
use crate::hud::HudSnapshot;
use crate::sim::{Discovery, Outcome};

/// Window event fired once a session has completed
pub const COMPLETE_EVENT: &str = "hideandseek:complete";
/// Window event fired when the player quits
pub const EXIT_EVENT: &str = "hideandseek:exit";

const FLASH_CLASS: &str = "flash";
const FLASH_MS: i32 = 300;

/// Something the host wants the app to act on, outside any session borrow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSignal {
    Timer(TimerId),
    Complete,
    Exit,
}

pub type Dispatch = Rc<dyn Fn(HostSignal)>;

fn window() -> Option<Window> {
    web_sys::window()
}

fn document() -> Option<Document> {
    window()?.document()
}

/// Run `f` on a later task. Returns the timeout handle.
fn defer(delay_ms: i32, f: impl FnOnce() + 'static) -> Option<i32> {
    let callback = Closure::once_into_js(f);
    window()?
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay_ms)
        .ok()
}

// === Listeners ===

/// A DOM event listener, removed on detach
pub struct DomListener {
    target: EventTarget,
    kind: &'static str,
    closure: Option<Closure<dyn FnMut(Event)>>,
}

impl DomListener {
    pub fn attach(
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            kind,
            closure: Some(closure),
        })
    }
}

impl Subscription for DomListener {
    fn detach(&mut self) {
        if let Some(closure) = self.closure.take() {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.kind, closure.as_ref().unchecked_ref());
            log::debug!("Detached {} listener", self.kind);
        }
    }
}

impl Drop for DomListener {
    fn drop(&mut self) {
        self.detach();
    }
}

// === Frames ===

/// requestAnimationFrame, calling the same closure every frame
pub struct RafScheduler {
    callback: Closure<dyn FnMut(f64)>,
}

impl RafScheduler {
    pub fn new(on_frame: impl FnMut(f64) + 'static) -> Self {
        Self {
            callback: Closure::<dyn FnMut(f64)>::new(on_frame),
        }
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> Option<FrameId> {
        window()?
            .request_animation_frame(self.callback.as_ref().unchecked_ref())
            .ok()
            .map(FrameId)
    }

    fn cancel_frame(&mut self, id: FrameId) {
        if let Some(w) = window() {
            let _ = w.cancel_animation_frame(id.0);
        }
    }
}

// === Host ===

pub struct WebHost {
    /// Element that takes pointer lock and flashes on discovery
    container: Element,
    dispatch: Dispatch,
    audio: AudioCues,
}

impl WebHost {
    pub fn new(container: Element, dispatch: Dispatch) -> Self {
        Self {
            container,
            dispatch,
            audio: AudioCues::new(),
        }
    }

    fn signal_later(&self, signal: HostSignal) {
        let dispatch = self.dispatch.clone();
        if defer(0, move || dispatch(signal)).is_none() {
            log::error!("Could not defer {:?}", signal);
        }
    }

    fn announce(&self, name: &str) {
        if let (Some(w), Ok(event)) = (window(), Event::new(name)) {
            let _ = w.dispatch_event(&event);
        }
    }

    fn flash(&self) {
        let classes = self.container.class_list();
        let _ = classes.add_1(FLASH_CLASS);
        defer(FLASH_MS, move || {
            let _ = classes.remove_1(FLASH_CLASS);
        });
    }
}

impl SessionHost for WebHost {
    fn request_capture(&mut self) {
        self.audio.resume();
        self.container.request_pointer_lock();
    }

    fn release_capture(&mut self) {
        if let Some(doc) = document() {
            if doc.pointer_lock_element().is_some() {
                doc.exit_pointer_lock();
            }
        }
    }

    fn schedule_timer(&mut self, delay_ms: u32) -> Option<TimerId> {
        // The handle is only known once the timeout exists
        let handle = Rc::new(Cell::new(0));
        let slot = handle.clone();
        let dispatch = self.dispatch.clone();
        let id = defer(delay_ms.min(i32::MAX as u32) as i32, move || {
            dispatch(HostSignal::Timer(TimerId(slot.get())))
        })?;
        handle.set(id);
        Some(TimerId(id))
    }

    fn cancel_timer(&mut self, id: TimerId) {
        if let Some(w) = window() {
            w.clear_timeout_with_handle(id.0);
        }
    }

    fn on_complete(&mut self) {
        self.announce(COMPLETE_EVENT);
        self.signal_later(HostSignal::Complete);
    }

    fn on_exit(&mut self) {
        self.announce(EXIT_EVENT);
        self.signal_later(HostSignal::Exit);
    }

    fn on_discovery(&mut self, _discovery: &Discovery) {
        self.flash();
        self.audio.play(Cue::Discovery);
    }

    fn on_finished(&mut self, outcome: Outcome) {
        self.audio.play(Cue::from(outcome));
    }
}

// === HUD ===

fn set_text(doc: &Document, id: &str, text: &str) {
    if let Some(el) = doc.get_element_by_id(id) {
        if el.text_content().as_deref() != Some(text) {
            el.set_text_content(Some(text));
        }
    }
}

/// Toggle the `hidden` class on an overlay element
pub fn set_visible(doc: &Document, id: &str, visible: bool) {
    if let Some(el) = doc.get_element_by_id(id) {
        let classes = el.class_list();
        let _ = if visible {
            classes.remove_1("hidden")
        } else {
            classes.add_1("hidden")
        };
    }
}

/// Back to the start screen once no session is running
pub fn show_start_screen() {
    let Some(doc) = document() else { return };
    set_visible(&doc, "intro", true);
    set_visible(&doc, "crosshair", false);
    set_visible(&doc, "complete", false);
    set_text(&doc, "hud-message", "");
}

/// Push a snapshot into the overlay elements
pub fn render_hud(hud: &HudSnapshot) {
    let Some(doc) = document() else { return };
    set_text(&doc, "hud-time", &hud.time);
    set_text(&doc, "hud-found", &hud.found);
    set_text(&doc, "hud-message", &hud.message);
    set_visible(&doc, "intro", hud.show_intro);
    set_visible(&doc, "crosshair", hud.show_crosshair);
    set_visible(&doc, "complete", hud.show_complete);
    if let Some(summary) = &hud.summary {
        set_text(&doc, "complete-summary", summary);
    }
}
