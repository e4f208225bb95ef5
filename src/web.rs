//! Browser binding: drives a `Terminal` from an xterm.js instance.

use crate::config::TerminalConfig;
use crate::safety::DestructiveCommand;
use crate::tasks::Task;
use crate::terminal::{CommandHistoryEntry, SessionObserver, Terminal, TerminalView};
use js_sys::{Function, Reflect};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::console;

#[wasm_bindgen]
extern "C" {
    /// Anything shaped like an xterm.js `Terminal`.
    #[derive(Clone)]
    pub type XtermView;

    #[wasm_bindgen(method, js_name = write)]
    fn js_write(this: &XtermView, data: &str);
    #[wasm_bindgen(method, js_name = clear)]
    fn js_clear(this: &XtermView);
    #[wasm_bindgen(method, js_name = focus)]
    fn js_focus(this: &XtermView);
    #[wasm_bindgen(method, js_name = onData)]
    fn on_data(this: &XtermView, callback: &Function) -> JsValue;
}

struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => console::error_1(&msg),
            Level::Warn => console::warn_1(&msg),
            Level::Info => console::log_1(&msg),
            Level::Debug | Level::Trace => console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Route `log` records to the browser console. Safe to call repeatedly;
/// later calls only adjust the level.
pub fn install_logger(level: LevelFilter) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

pub struct XtermBridge(XtermView);

impl TerminalView for XtermBridge {
    fn write(&mut self, data: &str) {
        self.0.js_write(data);
    }

    fn clear(&mut self) {
        self.0.js_clear();
    }

    fn focus(&mut self) {
        self.0.js_focus();
    }
}

/// Optional JS callbacks, looked up by name on the object passed in.
#[derive(Default)]
pub struct JsObserver {
    task_complete: Option<Function>,
    scenario_complete: Option<Function>,
    command_executed: Option<Function>,
    destructive_command: Option<Function>,
}

fn callback(callbacks: &JsValue, name: &str) -> Option<Function> {
    if callbacks.is_undefined() || callbacks.is_null() {
        return None;
    }
    Reflect::get(callbacks, &JsValue::from_str(name))
        .ok()
        .and_then(|v| v.dyn_into::<Function>().ok())
}

fn to_js<T: serde::Serialize>(value: &T) -> JsValue {
    serde_json::to_string(value)
        .ok()
        .and_then(|json| js_sys::JSON::parse(&json).ok())
        .unwrap_or(JsValue::NULL)
}

fn report_call(name: &str, result: Result<JsValue, JsValue>) {
    if let Err(err) = result {
        log::error!("{} callback threw: {:?}", name, err);
    }
}

impl JsObserver {
    pub fn from_js(callbacks: &JsValue) -> Self {
        JsObserver {
            task_complete: callback(callbacks, "onTaskComplete"),
            scenario_complete: callback(callbacks, "onScenarioComplete"),
            command_executed: callback(callbacks, "onCommandExecuted"),
            destructive_command: callback(callbacks, "onDestructiveCommand"),
        }
    }
}

impl SessionObserver for JsObserver {
    fn on_task_complete(&mut self, index: usize, task: &Task) {
        if let Some(f) = &self.task_complete {
            let result = f.call2(
                &JsValue::NULL,
                &JsValue::from(index as u32),
                &JsValue::from_str(&task.id),
            );
            report_call("onTaskComplete", result);
        }
    }

    fn on_scenario_complete(&mut self) {
        if let Some(f) = &self.scenario_complete {
            report_call("onScenarioComplete", f.call0(&JsValue::NULL));
        }
    }

    fn on_command_executed(&mut self, entry: &CommandHistoryEntry) {
        if let Some(f) = &self.command_executed {
            report_call("onCommandExecuted", f.call1(&JsValue::NULL, &to_js(entry)));
        }
    }

    fn on_destructive_command(&mut self, line: &str, command: &DestructiveCommand) {
        if let Some(f) = &self.destructive_command {
            let result = f.call2(&JsValue::NULL, &JsValue::from_str(line), &to_js(command));
            report_call("onDestructiveCommand", result);
        }
    }
}

type Session = Rc<RefCell<Terminal<XtermBridge, JsObserver>>>;

fn finish(session: &Session) {
    match session.try_borrow_mut() {
        Ok(mut t) => t.finish_scenario(),
        Err(_) => log::warn!("terminal busy, completion banner skipped"),
    }
}

/// Run `finish_scenario` after `ms` on the page's timer.
fn schedule_finale(session: &Session, ms: u32) {
    let target = session.clone();
    let cb = Closure::once_into_js(move || finish(&target));
    let scheduled = web_sys::window().map(|win| {
        win.set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.unchecked_ref(),
            ms as i32,
        )
    });
    if !matches!(scheduled, Some(Ok(_))) {
        finish(session);
    }
}

fn after_input(session: &Session) {
    let delay = session
        .try_borrow_mut()
        .ok()
        .and_then(|mut t| t.take_finale_delay());
    if let Some(ms) = delay {
        schedule_finale(session, ms);
    }
}

#[wasm_bindgen]
pub struct WebTerminal {
    session: Session,
    _on_data: Closure<dyn FnMut(String)>,
}

#[wasm_bindgen]
impl WebTerminal {
    /// Callbacks must not call back into this terminal synchronously.
    #[wasm_bindgen(constructor)]
    pub fn new(term: XtermView, config: &str, callbacks: JsValue) -> Result<WebTerminal, JsValue> {
        let config =
            TerminalConfig::from_json(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        // A bad level is reported by `Terminal::new` below, through this logger.
        install_logger(config.log_level().unwrap_or(LevelFilter::Info));
        let observer = JsObserver::from_js(&callbacks);
        let on_data_target = term.clone();
        let terminal = Terminal::new(&config, XtermBridge(term), observer)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let session: Session = Rc::new(RefCell::new(terminal));
        session.borrow_mut().start();

        let target = session.clone();
        let on_data = Closure::<dyn FnMut(String)>::new(move |data: String| {
            match target.try_borrow_mut() {
                Ok(mut t) => t.feed(&data),
                Err(_) => {
                    log::warn!("input dropped while terminal busy");
                    return;
                }
            }
            after_input(&target);
        });
        on_data_target.on_data(on_data.as_ref().unchecked_ref());

        Ok(WebTerminal {
            session,
            _on_data: on_data,
        })
    }

    /// Run a line headlessly. Returns the history entry as JSON, or `null`
    /// for a blank line.
    pub fn execute(&mut self, line: &str) -> Result<String, JsValue> {
        let entry = self
            .session
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("terminal busy"))?
            .execute(line);
        after_input(&self.session);
        serde_json::to_string(&entry).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn report(&self) -> Result<String, JsValue> {
        let report = self
            .session
            .try_borrow()
            .map_err(|_| JsValue::from_str("terminal busy"))?
            .report();
        serde_json::to_string(&report).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn prompt(&self) -> String {
        self.session
            .try_borrow()
            .map(|t| t.prompt())
            .unwrap_or_default()
    }

    pub fn score(&self) -> u32 {
        self.session
            .try_borrow()
            .map(|t| t.engine().score())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shareable<T: Clone>() {}

    #[test]
    fn test_xterm_handle_is_shareable() {
        shareable::<XtermView>();
    }
}
