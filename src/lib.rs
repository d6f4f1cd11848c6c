// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Railgrid Simulation Suite ("The Yard")

pub mod types;
pub mod simulation;
pub mod allocation;
pub mod conflict;
pub mod commands;
pub mod layout;
pub mod prediction;

pub use commands::CommandError;
pub use simulation::RailSimulation;
pub use types::*;

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl RailSimulation {
    /// Build a simulation from a built-in layout. Out-of-range indexes fall
    /// back to the default layout.
    #[wasm_bindgen(constructor)]
    pub fn new(layout_index: usize) -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let mut layouts = layout::builtin_layouts();
        let index = if layout_index < layouts.len() { layout_index } else { 0 };
        Self::from_layout(layouts.swap_remove(index))
    }

    /// Replace the whole state with a layout descriptor provided as JSON.
    /// Returns false (and logs) when the descriptor does not parse.
    #[wasm_bindgen(js_name = loadLayoutJson)]
    pub fn load_layout_json(&mut self, json: &str) -> bool {
        match layout::Layout::from_json(json) {
            Ok(parsed) => {
                self.load_layout(parsed);
                true
            }
            Err(e) => {
                self.log_event(
                    EventCategory::Error,
                    format!("ERROR: layout descriptor rejected: {e}."),
                );
                false
            }
        }
    }

    /// Advance by `wall_delta` wall-clock seconds and return the serialized
    /// `TickResult` (new time + ordered events).
    pub fn tick(&mut self, wall_delta: f64) -> JsValue {
        let result = self.tick_core(wall_delta);
        serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
    }

    /// Run N ticks of fixed delta without returning per-tick results (fast
    /// batch mode for benchmarking).
    #[wasm_bindgen(js_name = runBatch)]
    pub fn run_batch(&mut self, ticks: u32, wall_delta: f64) {
        for _ in 0..ticks {
            self.tick_core(wall_delta);
        }
    }

    #[wasm_bindgen(js_name = play)]
    pub fn play_js(&mut self) {
        self.play();
    }

    #[wasm_bindgen(js_name = pause)]
    pub fn pause_js(&mut self) {
        self.pause();
    }

    #[wasm_bindgen(js_name = emergencyStop)]
    pub fn emergency_stop_js(&mut self) {
        self.emergency_stop();
    }

    #[wasm_bindgen(js_name = setSpeedMultiplier)]
    pub fn set_speed_multiplier_js(&mut self, multiplier: f64) {
        self.set_speed_multiplier(multiplier);
    }

    #[wasm_bindgen(js_name = reset)]
    pub fn reset_js(&mut self) {
        self.reset();
    }

    #[wasm_bindgen(js_name = loadBuiltin)]
    pub fn load_builtin_js(&mut self, index: usize) -> bool {
        self.load_builtin(index).is_ok()
    }

    /// Returns the new track id, or null on a rejected command.
    #[wasm_bindgen(js_name = addTrack)]
    pub fn add_track_js(&mut self, start: &str, end: &str) -> JsValue {
        match self.add_track(start, end) {
            Ok(id) => JsValue::from_str(&id),
            Err(e) => {
                log(&format!("addTrack rejected: {e}"));
                JsValue::NULL
            }
        }
    }

    #[wasm_bindgen(js_name = addStation)]
    pub fn add_station_js(&mut self, id: &str, name: &str, x: f64, y: f64) -> bool {
        self.add_station(id, name, x, y).is_ok()
    }

    /// Spawn a train. `kind` is one of "Shatabdi" | "Express" | "Freight" |
    /// "Local"; `path` is a JS array of node ids; a non-positive `speed`
    /// selects the per-kind default. Returns the new train id, or null.
    #[wasm_bindgen(js_name = addTrain)]
    pub fn add_train_js(&mut self, name: &str, kind: &str, path: JsValue, speed: f64) -> JsValue {
        let Some(kind) = parse_kind(kind) else {
            log(&format!("addTrain rejected: unknown train kind \"{kind}\""));
            return JsValue::NULL;
        };
        let path: Vec<String> = match serde_wasm_bindgen::from_value(path) {
            Ok(p) => p,
            Err(e) => {
                log(&format!("addTrain rejected: bad path: {e}"));
                return JsValue::NULL;
            }
        };
        let speed = if speed > 0.0 { Some(speed) } else { None };
        match self.add_train(name, kind, path, speed) {
            Ok(id) => JsValue::from_str(&id),
            Err(e) => {
                log(&format!("addTrain rejected: {e}"));
                JsValue::NULL
            }
        }
    }

    #[wasm_bindgen(js_name = removeTrain)]
    pub fn remove_train_js(&mut self, train_id: &str) -> bool {
        self.remove_train(train_id).is_ok()
    }

    #[wasm_bindgen(js_name = getTrains)]
    pub fn get_trains(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.trains).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = getTracks)]
    pub fn get_tracks(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.tracks).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = getNodes)]
    pub fn get_nodes(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.nodes).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = getLog)]
    pub fn get_log(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.log).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = getStats)]
    pub fn get_stats(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.stats()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = getPresetPaths)]
    pub fn get_preset_paths(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.layout.preset_paths).unwrap_or(JsValue::NULL)
    }

    /// Look-ahead delay estimate for one train (see `prediction::predict`).
    pub fn predict(&self, train_id: &str) -> JsValue {
        match prediction::predict(self, train_id) {
            Some(p) => serde_wasm_bindgen::to_value(&p).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running_js(&self) -> bool {
        self.is_running()
    }

    #[wasm_bindgen(js_name = getTime)]
    pub fn get_time(&self) -> f64 {
        self.time()
    }
}

fn parse_kind(kind: &str) -> Option<TrainKind> {
    match kind {
        "Shatabdi" => Some(TrainKind::Shatabdi),
        "Express" => Some(TrainKind::Express),
        "Freight" => Some(TrainKind::Freight),
        "Local" => Some(TrainKind::Local),
        _ => None,
    }
}
