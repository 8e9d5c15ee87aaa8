#![forbid(unsafe_code)]

//! `wasm-bindgen` host.
//!
//! Wraps one [`BackTopController`] per installed button. DOM callbacks only
//! hold a [`Weak`] reference to the [`Host`]; the host itself lives for the
//! page lifetime.
//!
//! Only compiled on `wasm32` targets.

use core::time::Duration;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::{Rc, Weak};

use bttop_core::{
    BackTopConfig, BackTopController, ButtonMarkup, ConfigError, Environment, FocusReleaseError,
    FrameKind, ScrollRequestError, Signal, StyleConfig, TimerId, TimerKind, Visibility,
    WidgetConfig, render_stylesheet,
};
use js_sys::{Function, Reflect};
use tracing::{debug, trace};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlElement, ScrollBehavior,
    ScrollToOptions, Window,
};
use web_time::Instant;

use crate::listeners::{LISTENERS, ListenerTarget};
use crate::stylesheet_id;

// ---------------------------------------------------------------------------
// Errors and diagnostics
// ---------------------------------------------------------------------------

/// Installing the widget failed.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("no global `window`")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("document has no <{0}> element")]
    MissingElement(&'static str),
    #[error("an element with id `{0}` already exists")]
    AlreadyInstalled(String),
    #[error("DOM call failed: {0}")]
    Dom(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<JsValue> for InstallError {
    fn from(value: JsValue) -> Self {
        Self::Dom(describe(&value))
    }
}

fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{value:?}")
}

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "bttop panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("bttop panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn report(err: InstallError) -> JsValue {
    let msg = format!("back-to-top: {err}");
    console_error(&msg);
    JsValue::from_str(&msg)
}

// ---------------------------------------------------------------------------
// DOM environment
// ---------------------------------------------------------------------------

/// [`Environment`] backed by the live page.
struct DomEnvironment {
    window: Window,
    document: Document,
    button: HtmlElement,
    origin: Instant,
    next_timer: u64,
    /// Browser handles of pending timeouts.
    timers: HashMap<TimerId, i32>,
    /// Frame callbacks requested since the last repaint.
    frames: Vec<FrameKind>,
    frame_handle: Option<i32>,
    /// Shared `setTimeout` callback; receives the [`TimerId`] as argument.
    on_timer: Closure<dyn FnMut(JsValue)>,
    /// Shared `requestAnimationFrame` callback.
    on_frame: Closure<dyn FnMut(f64)>,
}

impl DomEnvironment {
    fn blur(element: &HtmlElement) -> Result<(), FocusReleaseError> {
        element
            .blur()
            .map_err(|err| FocusReleaseError(describe(&err)))
    }
}

impl Environment for DomEnvironment {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn scroll_y(&self) -> f64 {
        let y = self.window.scroll_y().unwrap_or(0.0);
        if y != 0.0 && y.is_finite() {
            return y;
        }
        self.document
            .document_element()
            .map_or(0.0, |root| f64::from(root.scroll_top()))
    }

    fn smooth_scroll_to_top(&mut self) -> Result<(), ScrollRequestError> {
        let supported = self
            .document
            .document_element()
            .and_then(|root| root.dyn_into::<HtmlElement>().ok())
            .is_some_and(|root| {
                Reflect::has(&root.style(), &"scrollBehavior".into()).unwrap_or(false)
            });
        if !supported {
            return Err(ScrollRequestError::Unsupported);
        }

        let scroll_to = Reflect::get(&self.window, &"scrollTo".into())
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or(ScrollRequestError::Unsupported)?;
        let options = ScrollToOptions::new();
        options.set_top(0.0);
        options.set_behavior(ScrollBehavior::Smooth);
        scroll_to
            .call1(&self.window, &options)
            .map(|_| ())
            .map_err(|err| ScrollRequestError::Rejected(describe(&err)))
    }

    fn jump_to_top(&mut self) {
        self.window.scroll_to_with_x_and_y(0.0, 0.0);
    }

    fn schedule_timer(&mut self, kind: TimerKind, delay: Duration) -> TimerId {
        self.next_timer += 1;
        let id = TimerId::new(self.next_timer);
        let delay_ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_1(
                self.on_timer.as_ref().unchecked_ref(),
                delay_ms,
                &JsValue::from_f64(id.get() as f64),
            ) {
            Ok(handle) => {
                self.timers.insert(id, handle);
            }
            Err(err) => debug!(%id, ?kind, error = %describe(&err), "setTimeout failed"),
        }
        id
    }

    fn cancel_timer(&mut self, id: TimerId) {
        if let Some(handle) = self.timers.remove(&id) {
            self.window.clear_timeout_with_handle(handle);
        }
    }

    fn request_frame(&mut self, kind: FrameKind) {
        self.frames.push(kind);
        if self.frame_handle.is_some() {
            return;
        }
        match self
            .window
            .request_animation_frame(self.on_frame.as_ref().unchecked_ref())
        {
            Ok(handle) => self.frame_handle = Some(handle),
            Err(err) => debug!(error = %describe(&err), "requestAnimationFrame failed"),
        }
    }

    fn release_focus(&mut self) -> Result<(), FocusReleaseError> {
        let button: &Element = self.button.as_ref();
        if self.document.active_element().as_ref() == Some(button) {
            Self::blur(&self.button)?;
        }
        let Some(active) = self.document.active_element() else {
            return Ok(());
        };
        let body: Option<Element> = self.document.body().map(Into::into);
        if body.as_ref() == Some(&active) {
            return Ok(());
        }
        match active.dyn_into::<HtmlElement>() {
            Ok(other) => Self::blur(&other),
            Err(_) => Ok(()),
        }
    }

    fn apply_visibility(&mut self, visibility: Visibility) {
        let classes = self.button.class_list();
        let (add, remove) = visibility.class_delta();
        for class in remove {
            if let Err(err) = classes.remove_1(class) {
                debug!(class, error = %describe(&err), "classList.remove failed");
            }
        }
        for class in add {
            if let Err(err) = classes.add_1(class) {
                debug!(class, error = %describe(&err), "classList.add failed");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

struct Host {
    controller: RefCell<BackTopController>,
    env: RefCell<DomEnvironment>,
    /// Signals waiting for the controller.
    queue: RefCell<VecDeque<Signal>>,
    listeners: RefCell<Vec<Closure<dyn FnMut(Event)>>>,
}

impl Host {
    fn new(
        window: Window,
        document: Document,
        button: HtmlElement,
        config: BackTopConfig,
    ) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            let timer_host = weak.clone();
            let on_timer = Closure::<dyn FnMut(JsValue)>::new(move |raw: JsValue| {
                let Some(host) = timer_host.upgrade() else {
                    return;
                };
                let Some(raw) = raw.as_f64() else {
                    return;
                };
                let id = TimerId::new(raw as u64);
                if let Ok(mut env) = host.env.try_borrow_mut() {
                    env.timers.remove(&id);
                }
                host.dispatch(Signal::Timer(id));
            });

            let frame_host = weak.clone();
            let on_frame = Closure::<dyn FnMut(f64)>::new(move |_timestamp: f64| {
                let Some(host) = frame_host.upgrade() else {
                    return;
                };
                let due = match host.env.try_borrow_mut() {
                    Ok(mut env) => {
                        env.frame_handle = None;
                        core::mem::take(&mut env.frames)
                    }
                    Err(_) => return,
                };
                for kind in due {
                    host.dispatch(Signal::Frame(kind));
                }
            });

            Self {
                controller: RefCell::new(BackTopController::new(config)),
                env: RefCell::new(DomEnvironment {
                    window,
                    document,
                    button,
                    origin: Instant::now(),
                    next_timer: 0,
                    timers: HashMap::new(),
                    frames: Vec::new(),
                    frame_handle: None,
                    on_timer,
                    on_frame,
                }),
                queue: RefCell::new(VecDeque::new()),
                listeners: RefCell::new(Vec::new()),
            }
        })
    }

    /// Deliver `signal`, plus anything raised while handling it.
    ///
    /// Environment calls can fire DOM events synchronously (`blur()` fires
    /// `blur`). Those land here while the controller is borrowed; they are
    /// queued and drained by the outer call.
    fn dispatch(&self, signal: Signal) {
        self.queue.borrow_mut().push_back(signal);
        let Ok(mut controller) = self.controller.try_borrow_mut() else {
            trace!(?signal, "queued re-entrant signal");
            return;
        };
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(next) = next else {
                break;
            };
            let Ok(mut env) = self.env.try_borrow_mut() else {
                debug!(?next, "environment busy; signal dropped");
                continue;
            };
            controller.handle(next, &mut *env);
        }
    }

    fn attach_listeners(self: &Rc<Self>) -> Result<(), InstallError> {
        let (window, button) = {
            let env = self.env.borrow();
            (env.window.clone(), env.button.clone())
        };
        let mut listeners = self.listeners.borrow_mut();
        for spec in LISTENERS {
            let target: &EventTarget = match spec.target {
                ListenerTarget::Window => window.as_ref(),
                ListenerTarget::Button => button.as_ref(),
            };
            let host = Rc::downgrade(self);
            let signal = spec.signal;
            let callback = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                if let Some(host) = host.upgrade() {
                    host.dispatch(signal);
                }
            });
            let options = AddEventListenerOptions::new();
            options.set_passive(spec.passive);
            target.add_event_listener_with_callback_and_add_event_listener_options(
                spec.event,
                callback.as_ref().unchecked_ref(),
                &options,
            )?;
            listeners.push(callback);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Injection
// ---------------------------------------------------------------------------

fn inject_stylesheet(document: &Document, style: &StyleConfig) -> Result<(), InstallError> {
    let sheet_id = stylesheet_id(&style.element_id);
    if document.get_element_by_id(&sheet_id).is_some() {
        return Ok(());
    }
    let head = document.head().ok_or(InstallError::MissingElement("head"))?;
    let sheet = document.create_element("style")?;
    sheet.set_id(&sheet_id);
    sheet.set_text_content(Some(&render_stylesheet(style)));
    head.append_child(&sheet)?;
    Ok(())
}

fn inject_button(document: &Document, style: &StyleConfig) -> Result<HtmlElement, InstallError> {
    let body = document.body().ok_or(InstallError::MissingElement("body"))?;
    let markup = ButtonMarkup::from_config(style);
    let element = document.create_element("button")?;
    element.set_id(&markup.id);
    element.set_attribute("type", "button")?;
    element.set_attribute("aria-label", &markup.aria_label)?;
    element.set_attribute("title", &markup.title)?;
    element.set_inner_html(&markup.inner_html);
    body.append_child(&element)?;
    element
        .dyn_into::<HtmlElement>()
        .map_err(|_| InstallError::Dom("button is not an HTMLElement".to_owned()))
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Handle to an installed button.
#[wasm_bindgen]
pub struct BackTopHandle {
    host: Rc<Host>,
}

#[wasm_bindgen]
impl BackTopHandle {
    /// `"hidden"`, `"active"` or `"idle"`.
    #[must_use]
    pub fn visibility(&self) -> String {
        self.host
            .controller
            .try_borrow()
            .map(|controller| controller.visibility().as_str())
            .unwrap_or(Visibility::Hidden.as_str())
            .to_owned()
    }

    #[wasm_bindgen(js_name = isAutoScrolling)]
    #[must_use]
    pub fn is_auto_scrolling(&self) -> bool {
        self.host
            .controller
            .try_borrow()
            .is_ok_and(|controller| controller.is_auto_scrolling())
    }

    /// Re-run the visibility evaluation against the current scroll offset.
    pub fn evaluate(&self) {
        self.host.dispatch(Signal::Ready);
    }
}

/// Install with an explicit configuration.
pub fn install_with(config: WidgetConfig) -> Result<BackTopHandle, InstallError> {
    install_panic_hook();
    config.validate()?;
    let WidgetConfig { behavior, style } = config;

    let window = web_sys::window().ok_or(InstallError::NoWindow)?;
    let document = window.document().ok_or(InstallError::NoDocument)?;
    if document.get_element_by_id(&style.element_id).is_some() {
        return Err(InstallError::AlreadyInstalled(style.element_id));
    }
    inject_stylesheet(&document, &style)?;
    let button = inject_button(&document, &style)?;

    let host = Host::new(window, document, button, behavior);
    host.attach_listeners()?;
    host.dispatch(Signal::Ready);
    debug!(id = %style.element_id, "back-to-top installed");

    // Listeners only hold weak references; keep the host for the page lifetime.
    core::mem::forget(Rc::clone(&host));
    Ok(BackTopHandle { host })
}

/// Install with the default configuration.
#[wasm_bindgen(js_name = installBackToTop)]
pub fn install() -> Result<BackTopHandle, JsValue> {
    install_with(WidgetConfig::default()).map_err(report)
}

/// Install with a JSON configuration; missing fields take their defaults.
#[wasm_bindgen(js_name = installBackToTopWithConfig)]
pub fn install_with_config(json: &str) -> Result<BackTopHandle, JsValue> {
    let config = WidgetConfig::from_json_str(json).map_err(|err| report(err.into()))?;
    install_with(config).map_err(report)
}

#[cfg(feature = "autostart")]
#[wasm_bindgen(start)]
pub fn start() {
    install_panic_hook();
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        return;
    };
    if !crate::document_is_loading(&document.ready_state()) {
        let _ = install();
        return;
    }
    let on_ready = Closure::<dyn FnMut()>::once(|| {
        let _ = install();
    });
    let options = AddEventListenerOptions::new();
    options.set_once(true);
    if let Err(err) = document.add_event_listener_with_callback_and_add_event_listener_options(
        "DOMContentLoaded",
        on_ready.as_ref().unchecked_ref(),
        &options,
    ) {
        console_error(&describe(&err));
        return;
    }
    on_ready.forget();
}
