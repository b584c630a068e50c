use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::closure::Closure;
use web_sys::HtmlCanvasElement;

pub mod animation;
pub mod config;
pub mod growth;
pub mod logging;
pub mod math;
pub mod particles;
pub mod render;
pub mod simulation;
pub mod timing;

pub use config::{ConfigError, SceneConfig};
pub use simulation::LeafSimulation;

use config::{Environment, HostOverrides};
use render::CanvasPainter;
use timing::{AnimationLoop, RafScheduler};
use timing::raf::ClosureSlot;

/// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    logging::init(log::LevelFilter::Info);
}

/// Everything the frame callback touches
struct SceneState {
    simulation: LeafSimulation,
    frame_loop: AnimationLoop<RafScheduler>,
    painter: Option<CanvasPainter>,
}

impl SceneState {
    /// One `requestAnimationFrame` callback
    fn on_callback(&mut self, timestamp_ms: f64) {
        let SceneState { simulation, frame_loop, painter } = self;
        frame_loop.on_step(|| {
            if simulation.on_frame(timestamp_ms) {
                paint(simulation, painter.as_ref());
            }
        });
    }
}

fn paint(simulation: &LeafSimulation, painter: Option<&CanvasPainter>) {
    if let Some(painter) = painter {
        if let Err(e) = painter.paint(&simulation.snapshot()) {
            log::error!("paint failed: {:?}", e);
        }
    }
}

/// Falling-leaves scene exposed to JavaScript
#[wasm_bindgen]
pub struct AutumnScene {
    state: Rc<RefCell<SceneState>>,
    scheduler: RafScheduler,
    user_agent: Option<String>,
}

#[wasm_bindgen]
impl AutumnScene {
    /// Create a scene. Without a canvas nothing is drawn and the host reads
    /// `snapshot_data()` instead. `config_yaml` overrides the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: Option<HtmlCanvasElement>, config_yaml: Option<String>) -> Result<AutumnScene, JsValue> {
        let config = match config_yaml.as_deref() {
            Some(yaml) => SceneConfig::from_yaml(yaml).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => SceneConfig::default(),
        };

        let environment = browser_environment();
        let user_agent = environment.user_agent.clone();
        let viewport = environment.viewport;

        let mut painter = canvas.map(CanvasPainter::new).transpose()?;
        if let Some(painter) = painter.as_mut() {
            painter.resize(viewport.width(), viewport.height());
        }

        let seed = (js_sys::Math::random() * (1u64 << 53) as f64) as u64;
        let simulation = LeafSimulation::new(config, environment, HostOverrides::default(), seed);

        let slot: ClosureSlot = Rc::new(RefCell::new(None));
        let scheduler = RafScheduler::new(Rc::clone(&slot));
        let state = Rc::new(RefCell::new(SceneState {
            simulation,
            frame_loop: AnimationLoop::new(scheduler.clone()),
            painter,
        }));

        // The callback holds a weak handle so the scene can still be dropped
        let weak = Rc::downgrade(&state);
        let closure = Closure::wrap(Box::new(move |timestamp_ms: f64| {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().on_callback(timestamp_ms);
            }
        }) as Box<dyn FnMut(f64)>);
        *slot.borrow_mut() = Some(closure);

        Ok(Self {
            state,
            scheduler,
            user_agent,
        })
    }

    /// Start the self-rescheduling render loop. A restart after `stop`
    /// resumes with one nominal frame instead of the whole pause.
    #[wasm_bindgen]
    pub fn start(&self) {
        let mut state = self.state.borrow_mut();
        if !state.frame_loop.is_running() {
            state.simulation.reset_clock();
        }
        state.frame_loop.start();
    }

    /// Cancel the pending frame; nothing is scheduled afterwards
    #[wasm_bindgen]
    pub fn stop(&self) {
        self.state.borrow_mut().frame_loop.cancel();
    }

    #[wasm_bindgen]
    pub fn is_running(&self) -> bool {
        self.state.borrow().frame_loop.is_running()
    }

    /// Drive one frame from the host instead of the internal loop.
    /// Returns true if physics stepped.
    #[wasm_bindgen]
    pub fn frame(&self, timestamp_ms: f64) -> bool {
        let mut state = self.state.borrow_mut();
        let stepped = state.simulation.on_frame(timestamp_ms);
        if stepped {
            paint(&state.simulation, state.painter.as_ref());
        }
        stepped
    }

    /// Viewport changed; re-detects the device tier
    #[wasm_bindgen]
    pub fn resize(&self, width: f32, height: f32) {
        let environment = Environment::new(width, height, self.user_agent.clone());
        let viewport = environment.viewport;
        let mut state = self.state.borrow_mut();
        state.simulation.update_environment(environment);
        if let Some(painter) = state.painter.as_mut() {
            painter.resize(viewport.width(), viewport.height());
        }
    }

    #[wasm_bindgen]
    pub fn set_particle_count(&self, count: u32) {
        self.update_overrides(|o| o.particle_count = Some(count as usize));
    }

    /// Step physics on every n-th frame (0 is treated as 1)
    #[wasm_bindgen]
    pub fn set_update_divisor(&self, divisor: u32) {
        self.update_overrides(|o| o.update_divisor = Some(divisor.max(1)));
    }

    #[wasm_bindgen]
    pub fn set_shadow_effects(&self, enabled: bool) {
        self.update_overrides(|o| o.enable_shadow_effects = Some(enabled));
    }

    /// Switch to the calmer spawn rate now instead of waiting
    #[wasm_bindgen]
    pub fn mark_settled(&self) {
        self.state.borrow_mut().simulation.mark_settled();
    }

    /// Visible leaves, 6 floats each: x, y, rotation, scale, opacity, palette index
    #[wasm_bindgen]
    pub fn snapshot_data(&self) -> Vec<f32> {
        self.state.borrow().simulation.snapshot().leaf_data()
    }

    /// Visible branches, 8 floats each: start, control, end, width, level
    #[wasm_bindgen]
    pub fn branch_data(&self) -> Vec<f32> {
        self.state.borrow().simulation.snapshot().branch_data()
    }

    /// Palette as a JSON array, indexed by the palette index in `snapshot_data`
    #[wasm_bindgen]
    pub fn palette_json() -> Result<String, JsValue> {
        particles::palette_json().map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// The full branch skeleton as JSON, ids in pre-order
    #[wasm_bindgen]
    pub fn tree_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.state.borrow().simulation.tree())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen]
    pub fn leaf_count(&self) -> usize {
        self.state.borrow().simulation.leaf_count()
    }

    #[wasm_bindgen]
    pub fn branch_count(&self) -> usize {
        self.state.borrow().simulation.branch_count()
    }

    #[wasm_bindgen]
    pub fn growth_progress(&self) -> f32 {
        self.state.borrow().simulation.growth_progress()
    }

    #[wasm_bindgen]
    pub fn is_settled(&self) -> bool {
        self.state.borrow().simulation.is_settled()
    }

    /// "error", "warn", "info", "debug", "trace" or "off"
    #[wasm_bindgen]
    pub fn set_log_level(level: &str) -> bool {
        logging::set_level(level)
    }
}

impl AutumnScene {
    fn update_overrides(&self, change: impl FnOnce(&mut HostOverrides)) {
        let mut state = self.state.borrow_mut();
        let mut overrides = *state.simulation.overrides();
        change(&mut overrides);
        state.simulation.set_overrides(overrides);
    }
}

impl Drop for AutumnScene {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.frame_loop.cancel();
        }
        self.scheduler.release();
    }
}

/// Viewport and user agent from the current window, or desktop defaults
fn browser_environment() -> Environment {
    let Some(window) = web_sys::window() else {
        log::warn!("no window, assuming a desktop viewport");
        return Environment::default();
    };
    let dimension = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64());
    let defaults = Environment::default().viewport;
    let width = dimension(window.inner_width()).map_or(defaults.width(), |w| w as f32);
    let height = dimension(window.inner_height()).map_or(defaults.height(), |h| h as f32);
    let user_agent = window.navigator().user_agent().ok();
    Environment::new(width, height, user_agent)
}
