//! Browser glue: DOM surface, localStorage best times, Web Audio output and
//! the frame loop that drives the manager.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AudioContext, AudioContextState, AudioScheduledSourceNode, Document, Element, HtmlElement, MouseEvent,
    OscillatorType, Storage, window,
};

use crate::catalog::{CategoryFilter, Token};
use crate::config::GameConfig;
use crate::error::{GameError, dom_err};
use crate::manager::{Command, ModeManager};
use crate::mode::GameMode;
use crate::surface::{BestTimeStore, Celebration, Handle, Position, Surface, Visual};
use crate::tone::{AudioSink, Cue, Envelope, Ramp, ToneSpec, ToneSynth, Waveform};

pub(crate) fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn element_by_id<T: JsCast>(doc: &Document, id: &str) -> Result<T, GameError> {
    doc.get_element_by_id(id)
        .ok_or_else(|| GameError::Dom(format!("missing #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| GameError::Dom(format!("#{id} has an unexpected element type")))
}

// --- Surface ---

pub struct DomSurface {
    document: Document,
    area: HtmlElement,
    label: Element,
    celebration: HtmlElement,
    next_handle: u32,
    nodes: HashMap<Handle, Element>,
    celebration_until: Option<f64>,
}

impl DomSurface {
    pub fn attach(document: &Document) -> Result<Self, GameError> {
        Ok(Self {
            document: document.clone(),
            area: element_by_id(document, "gameArea")?,
            label: element_by_id(document, "targetEmoji")?,
            celebration: element_by_id(document, "celebration")?,
            next_handle: 1,
            nodes: HashMap::new(),
            celebration_until: None,
        })
    }

    fn create(&self, handle: Handle, token: Token, at: Position, size: f64) -> Result<Element, JsValue> {
        let el = self.document.create_element("div")?;
        el.set_class_name("emoji-token");
        el.set_text_content(Some(token.glyph()));
        el.set_attribute("data-handle", &handle.0.to_string())?;
        el.set_attribute(
            "style",
            &format!(
                "position:absolute; left:{:.0}px; top:{:.0}px; width:{size:.0}px; height:{size:.0}px; \
                 font-size:{:.0}px; line-height:{size:.0}px; text-align:center; cursor:pointer;",
                at.x,
                at.y,
                size * 0.8
            ),
        )?;
        self.area.append_child(&el)?;
        Ok(el)
    }

    /// Hides the celebration overlay once its time is up.
    pub fn settle(&mut self, now_ms: f64) {
        if self.celebration_until.is_some_and(|until| now_ms >= until) {
            self.celebration_until = None;
            if let Err(err) = self.celebration.class_list().remove_1("active") {
                log::warn!("hiding celebration failed: {err:?}");
            }
        }
    }

    fn apply_visual(el: &Element, visual: Visual) -> Result<(), JsValue> {
        let classes = el.class_list();
        match visual {
            Visual::Shake => {
                classes.remove_1("shake")?;
                // Reflow so the animation restarts.
                if let Some(html) = el.dyn_ref::<HtmlElement>() {
                    let _ = html.offset_width();
                }
                classes.add_1("shake")
            }
            Visual::Vanish => classes.add_1("vanish"),
            Visual::Found => classes.add_1("found"),
            Visual::FaceUp => {
                classes.remove_1("face-down")?;
                classes.add_1("flipped")
            }
            Visual::FaceDown => {
                classes.remove_1("flipped")?;
                classes.add_1("face-down")
            }
            Visual::Matched => classes.add_1("matched"),
            Visual::Fade => classes.add_1("fade"),
        }
    }
}

impl Surface for DomSurface {
    fn place_token(&mut self, token: Token, at: Position, size: f64) -> Handle {
        let handle = Handle(self.next_handle);
        self.next_handle += 1;
        match self.create(handle, token, at, size) {
            Ok(el) => {
                self.nodes.insert(handle, el);
            }
            Err(err) => log::warn!("placing {token} failed: {err:?}"),
        }
        handle
    }

    fn remove_token(&mut self, handle: Handle) {
        if let Some(el) = self.nodes.remove(&handle) {
            el.remove();
        }
    }

    fn client_area(&self) -> (f64, f64) {
        (self.area.client_width() as f64, self.area.client_height() as f64)
    }

    fn set_label(&mut self, markup: &str) {
        self.label.set_inner_html(markup);
    }

    fn pulse_celebration(&mut self, celebration: &Celebration) {
        if let Some(message) = &celebration.message {
            let text = self.celebration.query_selector(".celebration-text").ok().flatten();
            match text {
                Some(el) => el.set_text_content(Some(message)),
                None => self.celebration.set_text_content(Some(message)),
            }
        }
        if let Some(color) = celebration.color {
            if let Err(err) = self.celebration.style().set_property("background", color) {
                log::warn!("celebration colour failed: {err:?}");
            }
        }
        if let Err(err) = self.celebration.class_list().add_1("active") {
            log::warn!("showing celebration failed: {err:?}");
        }
        self.celebration_until = Some(performance_now() + celebration.duration_ms);
    }

    fn show_feedback(&mut self, handle: Handle, visual: Visual) {
        if let Some(el) = self.nodes.get(&handle) {
            if let Err(err) = Self::apply_visual(el, visual) {
                log::warn!("{visual:?} on {handle:?} failed: {err:?}");
            }
        }
    }
}

// --- Best times ---

pub struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    pub fn new() -> Self {
        let storage = window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("localStorage unavailable, best times will not persist");
        }
        Self { storage }
    }
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BestTimeStore for LocalStorageStore {
    fn best_time(&self, key: &str) -> Option<u64> {
        let raw = self.storage.as_ref()?.get_item(key).ok().flatten()?;
        raw.trim().parse().ok()
    }

    fn set_best_time(&mut self, key: &str, seconds: u64) {
        if let Some(storage) = &self.storage {
            if let Err(err) = storage.set_item(key, &seconds.to_string()) {
                log::warn!("saving {key} failed: {err:?}");
            }
        }
    }
}

// --- Audio ---

pub struct WebAudioSink {
    context: AudioContext,
}

impl WebAudioSink {
    pub fn new() -> Result<Self, GameError> {
        let context = AudioContext::new().map_err(|e| GameError::AudioUnavailable(format!("{e:?}")))?;
        Ok(Self { context })
    }

    fn schedule(&self, tone: &ToneSpec) -> Result<(), JsValue> {
        let ctx = &self.context;
        let t0 = ctx.current_time() + tone.delay_s;

        let osc = ctx.create_oscillator()?;
        osc.set_type(match tone.waveform {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Square => OscillatorType::Square,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
        });
        let freq = osc.frequency();
        freq.set_value_at_time(tone.start_hz as f32, t0)?;
        for step in tone.sweep {
            let (hz, at) = (step.hz as f32, t0 + step.at_s);
            match step.ramp {
                Ramp::Linear => freq.linear_ramp_to_value_at_time(hz, at)?,
                Ramp::Exponential => freq.exponential_ramp_to_value_at_time(hz, at)?,
            };
        }

        let gain = ctx.create_gain()?;
        match tone.gain {
            Envelope::Flat(level) => {
                gain.gain().set_value_at_time(level, t0)?;
            }
            Envelope::Decay { from, to, ramp, over_s } => {
                let param = gain.gain();
                param.set_value_at_time(from, t0)?;
                match ramp {
                    Ramp::Linear => param.linear_ramp_to_value_at_time(to, t0 + over_s)?,
                    Ramp::Exponential => param.exponential_ramp_to_value_at_time(to, t0 + over_s)?,
                };
            }
        }

        osc.connect_with_audio_node(&gain)?;
        gain.connect_with_audio_node(&ctx.destination())?;
        let source: &AudioScheduledSourceNode = &osc;
        source.start_with_when(t0)?;
        source.stop_with_when(t0 + tone.duration_s)?;
        Ok(())
    }
}

impl AudioSink for WebAudioSink {
    fn play(&mut self, cue: Cue, tones: &[ToneSpec]) {
        for tone in tones {
            if let Err(err) = self.schedule(tone) {
                log::warn!("{} cue failed: {err:?}", cue.name());
                return;
            }
        }
    }

    fn resume(&mut self) {
        if self.context.state() == AudioContextState::Suspended {
            let _ = self.context.resume();
        }
    }
}

// --- Game loop ---

struct Controls {
    start: HtmlElement,
    sound: HtmlElement,
    mode: HtmlElement,
    /// Optional; only shown in challenge mode.
    categories: Option<HtmlElement>,
}

impl Controls {
    fn attach(doc: &Document) -> Result<Self, GameError> {
        Ok(Self {
            start: element_by_id(doc, "startBtn")?,
            sound: element_by_id(doc, "soundToggle")?,
            mode: element_by_id(doc, "modeToggle")?,
            categories: element_by_id(doc, "categorySelector").ok(),
        })
    }

    fn refresh(&self, manager: &WebManager) {
        self.start
            .set_text_content(Some(if manager.is_running() { "Stop 🛑" } else { "Start 🎮" }));
        self.sound
            .set_text_content(Some(if manager.sound_enabled() { "Sound: On 🔊" } else { "Sound: Off 🔇" }));
        self.mode.set_text_content(Some(manager.mode().button_label()));
        if let Some(selector) = &self.categories {
            let style = selector.style();
            let shown = if manager.mode() == GameMode::Challenge {
                style.remove_property("display").map(|_| ())
            } else {
                style.set_property("display", "none")
            };
            if let Err(err) = shown {
                log::warn!("category selector visibility failed: {err:?}");
            }
        }
    }
}

type WebManager = ModeManager<DomSurface, LocalStorageStore>;

struct WebGame {
    manager: WebManager,
    controls: Controls,
}

thread_local! {
    static GAME: RefCell<Option<WebGame>> = const { RefCell::new(None) };
    // Input gathered by DOM listeners, applied on the next frame.
    static INBOX: RefCell<Vec<Command>> = const { RefCell::new(Vec::new()) };
}

pub(crate) fn enqueue(command: Command) {
    INBOX.with(|inbox| inbox.borrow_mut().push(command));
}

fn frame(now_ms: f64) {
    let commands: Vec<Command> = INBOX.with(|inbox| inbox.borrow_mut().drain(..).collect());
    GAME.with(|cell| {
        let mut guard = cell.borrow_mut();
        let Some(game) = guard.as_mut() else {
            return;
        };
        let changed = !commands.is_empty();
        for command in commands {
            if let Err(err) = game.manager.apply(command, now_ms) {
                log::error!("{err}");
            }
        }
        let was_running = game.manager.is_running();
        if let Err(err) = game.manager.tick(now_ms) {
            log::error!("{err}");
        }
        game.manager.surface_mut().settle(now_ms);
        if changed || was_running != game.manager.is_running() {
            game.controls.refresh(&game.manager);
        }
    });
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_frame_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
        frame(performance_now());
        if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let (Some(w), Some(cb)) = (window(), g.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

fn listen(target: &Element, command: Command) -> Result<(), GameError> {
    let closure = Closure::wrap(Box::new(move |_evt: MouseEvent| {
        enqueue(command.clone());
    }) as Box<dyn FnMut(_)>);
    target
        .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
        .map_err(|e| dom_err("click listener", e))?;
    closure.forget();
    Ok(())
}

/// One listener on the play area; tokens are found through `data-handle`.
fn listen_for_tokens(area: &Element) -> Result<(), GameError> {
    let closure = Closure::wrap(Box::new(move |evt: MouseEvent| {
        let handle = evt
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .and_then(|el| el.closest("[data-handle]").ok().flatten())
            .and_then(|el| el.get_attribute("data-handle"))
            .and_then(|raw| raw.parse::<u32>().ok());
        if let Some(id) = handle {
            enqueue(Command::Click(Handle(id)));
        }
    }) as Box<dyn FnMut(_)>);
    area.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
        .map_err(|e| dom_err("play area listener", e))?;
    closure.forget();
    Ok(())
}

/// Buttons inside the selector carry `data-category="all"` or a list such
/// as `data-category="animals,fruits"`.
fn listen_for_categories(selector: &Element) -> Result<(), GameError> {
    let closure = Closure::wrap(Box::new(move |evt: MouseEvent| {
        let raw = evt
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .and_then(|el| el.closest("[data-category]").ok().flatten())
            .and_then(|el| el.get_attribute("data-category"));
        let Some(raw) = raw else {
            return;
        };
        match raw.parse::<CategoryFilter>() {
            Ok(filter) => enqueue(Command::SetCategories(filter)),
            Err(err) => log::warn!("{err}"),
        }
    }) as Box<dyn FnMut(_)>);
    selector
        .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
        .map_err(|e| dom_err("category listener", e))?;
    closure.forget();
    Ok(())
}

pub(crate) fn launch(config: GameConfig) -> Result<(), GameError> {
    let doc = window()
        .and_then(|w| w.document())
        .ok_or_else(|| GameError::Dom("no document".to_string()))?;

    let surface = DomSurface::attach(&doc)?;
    let area: Element = element_by_id(&doc, "gameArea")?;
    let controls = Controls::attach(&doc)?;

    let audio = match WebAudioSink::new() {
        Ok(sink) => ToneSynth::new(Box::new(sink)),
        Err(err) => ToneSynth::unavailable(&err.to_string()),
    };
    let manager = ModeManager::new(config, surface, LocalStorageStore::new(), audio)?;
    controls.refresh(&manager);

    listen_for_tokens(&area)?;
    listen(&controls.start, Command::ToggleRunning)?;
    listen(&controls.sound, Command::ToggleSound)?;
    listen(&controls.mode, Command::NextMode)?;
    if let Some(selector) = &controls.categories {
        listen_for_categories(selector)?;
    }

    GAME.with(|cell| cell.replace(Some(WebGame { manager, controls })));
    start_frame_loop();
    log::info!("emoji match ready");
    Ok(())
}
