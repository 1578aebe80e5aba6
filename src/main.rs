//! Hide and Seek entry point
//!
//! In the browser: wires the page (start/exit buttons, input listeners, frame
//! loop) to a `GameSession`. Natively: plays one headless session on
//! autopilot and reports the outcome.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};
    use wasm_bindgen::prelude::*;
    use web_sys::{Element, Event, KeyboardEvent, MouseEvent};

    use hide_and_seek::driver::LoopDriver;
    use hide_and_seek::platform::web::{
        DomListener, HostSignal, RafScheduler, WebHost, render_hud, show_start_screen,
    };
    use hide_and_seek::surface::Viewport;
    use hide_and_seek::surface::canvas::CanvasProvider;
    use hide_and_seek::{GameSession, SessionConfig};

    const CONTAINER_ID: &str = "game";

    /// A session and the loop driving it
    struct Running {
        session: GameSession,
        driver: LoopDriver<RafScheduler>,
    }

    impl Running {
        fn shut_down(mut self) {
            self.driver.stop();
            self.session.teardown();
        }
    }

    type Slot = Rc<RefCell<Option<Running>>>;

    fn container() -> Option<Element> {
        web_sys::window()?.document()?.get_element_by_id(CONTAINER_ID)
    }

    fn viewport_of(el: &Element) -> Viewport {
        Viewport::new(el.client_width().max(1) as u32, el.client_height().max(1) as u32)
    }

    /// Config comes from `data-config` on the container, if present
    fn read_config(el: &Element) -> SessionConfig {
        match el.get_attribute("data-config") {
            Some(json) => SessionConfig::from_json(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring data-config: {}", e);
                SessionConfig::default()
            }),
            None => SessionConfig::default(),
        }
    }

    fn show_error(text: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("hud-message"))
        {
            el.set_text_content(Some(text));
        }
    }

    /// Host signals always arrive on their own task, never inside a borrow
    fn handle_signal(slot: &Slot, signal: HostSignal) {
        match signal {
            HostSignal::Timer(id) => {
                if let Some(running) = slot.borrow_mut().as_mut() {
                    running.session.fire_timer(id);
                }
            }
            HostSignal::Complete => {
                let running = slot.borrow_mut().take();
                if let Some(mut running) = running {
                    running.session.acknowledge();
                    running.shut_down();
                    log::info!("Session complete");
                }
            }
            HostSignal::Exit => {
                let running = slot.borrow_mut().take();
                if let Some(running) = running {
                    running.shut_down();
                    log::info!("Session exited");
                }
                show_start_screen();
            }
        }
    }

    fn with_session(slot: &Weak<RefCell<Option<Running>>>, f: impl FnOnce(&mut GameSession)) {
        if let Some(slot) = slot.upgrade() {
            if let Some(running) = slot.borrow_mut().as_mut() {
                f(&mut running.session);
            }
        }
    }

    fn start_session(slot: &Slot) {
        if slot.borrow().is_some() {
            log::debug!("Session already running");
            return;
        }
        let Some(el) = container() else {
            log::error!("No #{} element", CONTAINER_ID);
            return;
        };
        let config = read_config(&el);

        let weak = Rc::downgrade(slot);
        let dispatch = {
            let weak = weak.clone();
            Rc::new(move |signal: HostSignal| {
                if let Some(slot) = weak.upgrade() {
                    handle_signal(&slot, signal);
                }
            })
        };
        let host = WebHost::new(el.clone(), dispatch);

        let mut provider = CanvasProvider::new(CONTAINER_ID);
        let mut session =
            match GameSession::start(&config, &mut provider, viewport_of(&el), Box::new(host)) {
                Ok(session) => session,
                Err(e) => {
                    log::error!("Failed to start: {}", e);
                    show_error(&e.to_string());
                    return;
                }
            };

        if let Err(e) = attach_listeners(&mut session, &el, &weak) {
            log::error!("Failed to attach listeners: {:?}", e);
            session.teardown();
            return;
        }
        render_hud(&session.hud());

        let driver = {
            let weak = weak.clone();
            LoopDriver::new(RafScheduler::new(move |now: f64| {
                let Some(slot) = weak.upgrade() else { return };
                let mut guard = slot.borrow_mut();
                if let Some(Running { session, driver }) = guard.as_mut() {
                    if driver.on_frame(now, session) {
                        render_hud(&session.hud());
                    }
                }
            }))
        };

        *slot.borrow_mut() = Some(Running { session, driver });
        if let Some(running) = slot.borrow_mut().as_mut() {
            running.driver.start();
        }
        log::info!("Session ready");
    }

    /// Listeners owned by the session, detached at teardown
    fn attach_listeners(
        session: &mut GameSession,
        el: &Element,
        weak: &Weak<RefCell<Option<Running>>>,
    ) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let w = weak.clone();
        session.attach(Box::new(DomListener::attach(&document, "keydown", move |e: Event| {
            if let Some(key) = e.dyn_ref::<KeyboardEvent>() {
                let code = key.code();
                with_session(&w, |s| s.key_down(&code));
            }
        })?));

        let w = weak.clone();
        session.attach(Box::new(DomListener::attach(&document, "keyup", move |e: Event| {
            if let Some(key) = e.dyn_ref::<KeyboardEvent>() {
                let code = key.code();
                with_session(&w, |s| s.key_up(&code));
            }
        })?));

        let w = weak.clone();
        session.attach(Box::new(DomListener::attach(&document, "mousemove", move |e: Event| {
            if let Some(mouse) = e.dyn_ref::<MouseEvent>() {
                let (dx, dy) = (mouse.movement_x() as f32, mouse.movement_y() as f32);
                with_session(&w, |s| s.look(dx, dy));
            }
        })?));

        let w = weak.clone();
        let target = el.clone();
        session.attach(Box::new(DomListener::attach(
            &document,
            "pointerlockchange",
            move |_e: Event| {
                let locked = web_sys::window()
                    .and_then(|w| w.document())
                    .and_then(|d| d.pointer_lock_element())
                    .is_some_and(|locked| locked == target);
                with_session(&w, |s| {
                    if locked {
                        s.capture_acquired();
                    } else {
                        s.capture_lost();
                    }
                });
            },
        )?));

        session.attach(Box::new(DomListener::attach(
            &document,
            "pointerlockerror",
            |_e: Event| log::error!("Pointer lock refused"),
        )?));

        // Clicking the scene starts or resumes
        let w = weak.clone();
        session.attach(Box::new(DomListener::attach(el, "click", move |_e: Event| {
            with_session(&w, |s| s.request_start());
        })?));

        let w = weak.clone();
        let target = el.clone();
        session.attach(Box::new(DomListener::attach(&window, "resize", move |_e: Event| {
            let viewport = viewport_of(&target);
            with_session(&w, |s| s.resize(viewport));
        })?));

        Ok(())
    }

    /// Start and exit buttons outlive sessions
    fn setup_buttons(slot: &Slot) -> Result<(), JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("no document")?;

        // Start and replay both build a session if needed, then ask for capture
        for id in ["start-btn", "replay-btn"] {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let slot = slot.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                // The container would see this click too
                event.stop_propagation();
                start_session(&slot);
                if let Some(running) = slot.borrow_mut().as_mut() {
                    running.session.request_start();
                }
            });
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("exit-btn") {
            let slot = slot.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.stop_propagation();
                if let Some(running) = slot.borrow_mut().as_mut() {
                    running.session.exit();
                }
            });
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Hide and Seek starting...");

        let slot: Slot = Rc::new(RefCell::new(None));
        setup_buttons(&slot)?;
        start_session(&slot);

        // The page keeps the slot alive for its lifetime
        std::mem::forget(slot);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::cell::Cell;
    use std::rc::Rc;

    use hide_and_seek::platform::{SessionHost, TimerId};
    use hide_and_seek::sim::autopilot;
    use hide_and_seek::sim::{Discovery, GameStatus, Outcome};
    use hide_and_seek::surface::{HeadlessProvider, Viewport};
    use hide_and_seek::{GameSession, SessionConfig};

    const DT: f32 = 1.0 / 60.0;

    /// Records the grace timer so the run can deliver it without waiting
    #[derive(Default)]
    struct HeadlessHost {
        next_timer: i32,
        pending: Rc<Cell<Option<TimerId>>>,
        completed: Rc<Cell<bool>>,
    }

    impl SessionHost for HeadlessHost {
        fn request_capture(&mut self) {}
        fn release_capture(&mut self) {}

        fn schedule_timer(&mut self, delay_ms: u32) -> Option<TimerId> {
            self.next_timer += 1;
            let id = TimerId(self.next_timer);
            log::debug!("Timer {:?} in {} ms", id, delay_ms);
            self.pending.set(Some(id));
            Some(id)
        }

        fn cancel_timer(&mut self, _id: TimerId) {
            self.pending.set(None);
        }

        fn on_complete(&mut self) {
            self.completed.set(true);
        }

        fn on_exit(&mut self) {
            log::info!("Exited");
        }

        fn on_discovery(&mut self, discovery: &Discovery) {
            log::info!("Discovered {}/{}", discovery.found, discovery.total);
        }

        fn on_finished(&mut self, outcome: Outcome) {
            log::info!("Finished: {:?}", outcome);
        }
    }

    /// Frames needed to exhaust `time_limit` seconds, plus one to resolve
    pub fn frame_budget(time_limit: f32) -> u64 {
        ((time_limit / DT).ceil() as u64).saturating_add(1)
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let config = match std::env::args().nth(1) {
            Some(path) => SessionConfig::from_json(&std::fs::read_to_string(path)?)?,
            None => SessionConfig::default(),
        };

        let host = HeadlessHost::default();
        let pending = host.pending.clone();
        let completed = host.completed.clone();

        let mut provider = HeadlessProvider::new();
        let mut session =
            GameSession::start(&config, &mut provider, Viewport::new(1280, 720), Box::new(host))?;
        log::info!("Seed {}", session.seed());

        session.request_start();
        session.capture_acquired();

        for _ in 0..frame_budget(config.time_limit_seconds) {
            if session.status() == GameStatus::Complete {
                break;
            }
            autopilot::drive(session.simulation_mut());
            session.frame(DT);
        }

        if let Some(id) = pending.take() {
            session.fire_timer(id);
        }
        let hud = session.hud();
        log::info!("{}", hud.message);
        if let Some(summary) = hud.summary {
            for line in summary.lines() {
                log::info!("{}", line);
            }
        }
        log::info!("Host notified: {}", completed.get());
        session.acknowledge();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Hide and Seek (native) starting...");
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Entry point is wasm_main via wasm_bindgen(start)
}
