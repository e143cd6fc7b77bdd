use std::time::Instant;

use log::debug;

use crate::core::module::Module;
use crate::core::registry::{ModuleRegistry, RegistryError};
use crate::core::result::{execute_isolated, ExecutionOutcome};
use crate::{ConsoleConfig, SinkRef};

pub const HELP: &[(&str, &str)] = &[
    ("help", "Display this help menu"),
    ("show modules", "List all available modules"),
    ("use <module>", "Select a module to use"),
    ("back", "Deselect current module"),
    ("info", "Show module information"),
    ("set <opt> <val>", "Set module option"),
    ("options", "Show module options"),
    ("run/exploit", "Execute the current module"),
    ("search <keyword>", "Search modules by keyword"),
    ("reload", "Reload all modules"),
    ("banner", "Display banner again"),
    ("clear", "Clear screen"),
    ("exit/quit", "Exit the console"),
];

/// One parsed console line. The argument string is everything after the
/// first token, untouched, so each handler tokenizes it itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Show(String),
    Use(String),
    Back,
    Info,
    Set(String),
    Options,
    Run,
    Search(String),
    Reload,
    Exit,
    Banner,
    Clear,
    Unknown(String),
}

impl Command {
    /// Returns `None` for blank lines.
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (head, args) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim_start()),
            None => (line, ""),
        };
        let args = args.to_string();

        let command = match head.to_lowercase().as_str() {
            "help" => Command::Help,
            "show" => Command::Show(args),
            "use" => Command::Use(args),
            "back" => Command::Back,
            "info" => Command::Info,
            "set" => Command::Set(args),
            "options" => Command::Options,
            "run" | "exploit" => Command::Run,
            "search" => Command::Search(args),
            "reload" => Command::Reload,
            "exit" | "quit" => Command::Exit,
            "banner" => Command::Banner,
            "clear" => Command::Clear,
            other => Command::Unknown(other.to_string()),
        };
        Some(command)
    }
}

/// The module currently held by the console.
pub struct Selection {
    pub key: String,
    pub module: Box<dyn Module>,
}

/// Mutable console context: at most one selected module and the lifecycle
/// flag. `running` only ever goes from true to false.
pub struct ConsoleState {
    current: Option<Selection>,
    running: bool,
}

impl ConsoleState {
    fn new() -> Self {
        Self { current: None, running: true }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Interactive command dispatcher.
///
/// Drives the select, configure, validate, run lifecycle against a
/// [`ModuleRegistry`] and reports everything through a sink. Reading input is
/// the caller's job: feed each line to [`Console::execute`] until
/// [`Console::is_running`] turns false.
pub struct Console {
    registry: ModuleRegistry,
    state: ConsoleState,
    config: ConsoleConfig,
    sink: SinkRef,
}

impl Console {
    pub fn new(registry: ModuleRegistry, config: ConsoleConfig, sink: SinkRef) -> Self {
        Self {
            registry,
            state: ConsoleState::new(),
            config,
            sink,
        }
    }

    pub fn state(&self) -> &ConsoleState {
        &self.state
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn current_module(&self) -> Option<&dyn Module> {
        self.state.current.as_ref().map(|s| s.module.as_ref())
    }

    pub fn current_key(&self) -> Option<&str> {
        self.state.current.as_ref().map(|s| s.key.as_str())
    }

    pub fn prompt(&self) -> String {
        match self.current_module() {
            Some(module) => format!("{}({}) > ", self.config.prompt, module.name()),
            None => format!("{} > ", self.config.prompt),
        }
    }

    /// Parses and dispatches one input line. Blank lines are ignored.
    pub fn execute(&mut self, line: &str) {
        if !self.state.running {
            return;
        }
        if let Some(command) = Command::parse(line) {
            self.dispatch(command);
        }
    }

    /// End of input: stop without the farewell path.
    pub fn shutdown(&mut self) {
        if self.state.running {
            debug!("Input exhausted, stopping console");
            self.state.running = false;
            self.sink.on_log("info", "\nExiting...");
        }
    }

    pub fn dispatch(&mut self, command: Command) {
        debug!("Dispatching {:?}", command);
        match command {
            Command::Help => self.sink.on_help(HELP),
            Command::Show(args) => self.cmd_show(&args),
            Command::Use(args) => self.cmd_use(&args),
            Command::Back => self.cmd_back(),
            Command::Info => self.cmd_info(),
            Command::Set(args) => self.cmd_set(&args),
            Command::Options => self.cmd_options(),
            Command::Run => self.cmd_run(),
            Command::Search(args) => self.cmd_search(&args),
            Command::Reload => self.cmd_reload(),
            Command::Exit => self.cmd_exit(),
            Command::Banner => self.sink.on_banner(),
            Command::Clear => self.sink.on_clear(),
            Command::Unknown(name) => {
                self.sink.on_log("error", &format!("Unknown command: {}", name));
            }
        }
    }

    fn no_module(&self) {
        self.sink.on_log("error", "No module selected");
    }

    fn cmd_show(&self, args: &str) {
        if args.trim() != "modules" {
            self.sink.on_log("error", "Usage: show modules");
            return;
        }
        let keys: Vec<String> = self.sorted_keys(|_| true);
        self.sink.on_listing("Available Modules", &keys);
    }

    fn cmd_use(&mut self, args: &str) {
        let path = args.trim();
        if path.is_empty() {
            self.sink.on_log("error", "Usage: use <module_path>");
            return;
        }

        match self.registry.load_module(path) {
            Ok(mut module) => {
                self.apply_option_defaults(module.as_mut());
                if let Some(previous) = self.state.current.take() {
                    debug!("Releasing {}", previous.key);
                }
                self.state.current = Some(Selection {
                    key: path.to_string(),
                    module,
                });
                self.sink.on_log("success", &format!("Loaded module: {}", path));
            }
            Err(RegistryError::UnknownModule(_)) => {
                self.sink.on_log("error", &format!("Module not found: {}", path));
            }
            Err(e @ RegistryError::LoadFailed { .. }) => {
                log::error!("{:#}", e);
                self.sink.on_log("error", &e.to_string());
            }
        }
    }

    fn apply_option_defaults(&self, module: &mut dyn Module) {
        for (name, value) in &self.config.option_defaults {
            if module.options().is_declared(name) {
                module.set_option(name, value);
            }
        }
    }

    fn cmd_back(&mut self) {
        match self.state.current.take() {
            Some(selection) => {
                debug!("Deselected {}", selection.key);
                self.sink.on_log("success", "Deselected module");
            }
            None => self.sink.on_log("warn", "No module selected"),
        }
    }

    fn cmd_info(&self) {
        match self.current_module() {
            Some(module) => self.sink.on_module_info(&module.info()),
            None => self.no_module(),
        }
    }

    fn cmd_set(&mut self, args: &str) {
        let Some(selection) = self.state.current.as_mut() else {
            self.no_module();
            return;
        };

        let (name, value) = match args.trim().split_once(char::is_whitespace) {
            Some((name, value)) if !value.trim().is_empty() => (name, value.trim_start()),
            _ => {
                self.sink.on_log("error", "Usage: set <option> <value>");
                return;
            }
        };

        if selection.module.set_option(name, value) {
            self.sink
                .on_log("success", &format!("{} => {}", name.to_uppercase(), value));
        } else {
            self.sink.on_log("error", &format!("Invalid option: {}", name));
        }
    }

    fn cmd_options(&self) {
        match self.current_module() {
            Some(module) => self.sink.on_options(&module.show_options()),
            None => self.no_module(),
        }
    }

    fn cmd_run(&mut self) {
        let Some(selection) = self.state.current.as_mut() else {
            self.no_module();
            return;
        };

        if let Err(e) = selection.module.validate_options() {
            self.sink.on_log("error", &e.to_string());
            return;
        }

        self.sink.on_log("warn", "Running module...");
        let started = Instant::now();
        let outcome = execute_isolated(selection.module.as_mut());
        debug!("{} finished in {:?}", selection.key, started.elapsed());

        match outcome {
            ExecutionOutcome::Completed(result) => self.sink.on_result(&result),
            ExecutionOutcome::Fault(message) => {
                self.sink.on_log("error", &format!("Error: {}", message));
            }
        }
    }

    fn cmd_search(&self, args: &str) {
        let keyword = args.trim();
        if keyword.is_empty() {
            self.sink.on_log("error", "Usage: search <keyword>");
            return;
        }

        let needle = keyword.to_lowercase();
        let matches = self.sorted_keys(|key| key.to_lowercase().contains(&needle));
        if matches.is_empty() {
            self.sink
                .on_log("warn", &format!("No modules found matching: {}", keyword));
        } else {
            self.sink.on_listing("Matching Modules", &matches);
        }
    }

    /// Module keys accepted by `filter`, in lexicographic order.
    pub fn sorted_keys(&self, filter: impl Fn(&str) -> bool) -> Vec<String> {
        let mut keys: Vec<String> = self
            .registry
            .list_modules()
            .into_keys()
            .filter(|key| filter(key.as_str()))
            .collect();
        keys.sort();
        keys
    }

    /// Rebuilds the registry. The current selection, if any, is kept along
    /// with its configured options.
    fn cmd_reload(&mut self) {
        self.sink.on_log("warn", "Reloading modules...");
        self.registry.reload();
        self.sink.on_log(
            "success",
            &format!("Modules reloaded successfully ({} available)", self.registry.len()),
        );
        if let Some(key) = self.current_key() {
            self.sink
                .on_log("warn", &format!("Keeping current selection: {}", key));
        }
    }

    fn cmd_exit(&mut self) {
        self.state.running = false;
        self.sink.on_log("warn", "Thank you for using kestrel!");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::module::{ModuleInfo, ModuleOptions, OptionRow};
    use crate::core::registry::{LoadLocation, NamespaceSource, UnitEntry};
    use crate::core::result::{ExecutionResult, Finding};
    use crate::ConsoleEventSink;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Log(String, String),
        Listing(String, Vec<String>),
        Info(ModuleInfo),
        Options(Vec<OptionRow>),
        Result(ExecutionResult),
        Help,
        Banner,
        Clear,
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<Event>>,
    }

    impl RecordingSink {
        fn push(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }

        fn take(&self) -> Vec<Event> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    impl ConsoleEventSink for RecordingSink {
        fn on_log(&self, level: &str, message: &str) {
            self.push(Event::Log(level.to_string(), message.to_string()));
        }

        fn on_listing(&self, title: &str, entries: &[String]) {
            self.push(Event::Listing(title.to_string(), entries.to_vec()));
        }

        fn on_module_info(&self, info: &ModuleInfo) {
            self.push(Event::Info(info.clone()));
        }

        fn on_options(&self, rows: &[OptionRow]) {
            self.push(Event::Options(rows.to_vec()));
        }

        fn on_result(&self, result: &ExecutionResult) {
            self.push(Event::Result(result.clone()));
        }

        fn on_help(&self, _commands: &[(&'static str, &'static str)]) {
            self.push(Event::Help);
        }

        fn on_banner(&self) {
            self.push(Event::Banner);
        }

        fn on_clear(&self) {
            self.push(Event::Clear);
        }
    }

    #[derive(Clone, Copy)]
    enum Behavior {
        Succeed,
        Fail,
        Panic,
    }

    /// Test module counting how often `run` is entered.
    struct Stub {
        options: ModuleOptions,
        runs: Arc<AtomicUsize>,
        behavior: Behavior,
    }

    impl Module for Stub {
        fn description(&self) -> &str {
            "stub module"
        }

        fn module_type(&self) -> &str {
            "auxiliary"
        }

        fn options(&self) -> &ModuleOptions {
            &self.options
        }

        fn options_mut(&mut self) -> &mut ModuleOptions {
            &mut self.options
        }

        fn run(&mut self) -> anyhow::Result<ExecutionResult> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Succeed => Ok(ExecutionResult::success("Found 1 open ports")
                    .with_vulnerability(Finding::new("Telnet exposed"))),
                Behavior::Fail => anyhow::bail!("connection reset by peer"),
                Behavior::Panic => panic!("index out of range"),
            }
        }
    }

    struct Harness {
        console: Console,
        sink: Arc<RecordingSink>,
        runs: Arc<AtomicUsize>,
    }

    fn unit(
        name: &str,
        runs: &Arc<AtomicUsize>,
        required: &'static str,
        behavior: Behavior,
    ) -> UnitEntry {
        let runs = Arc::clone(runs);
        UnitEntry::new(
            name,
            LoadLocation::of(format!("test::{}", name), move || Stub {
                options: ModuleOptions::new()
                    .required(required, "", "required target")
                    .optional("TIMEOUT", "10", "timeout"),
                runs: Arc::clone(&runs),
                behavior,
            }),
        )
    }

    fn harness_with(config: ConsoleConfig) -> Harness {
        let runs = Arc::new(AtomicUsize::new(0));
        let registry = ModuleRegistry::with_sources(vec![
            NamespaceSource::fixed(
                "exploit",
                vec![
                    unit("sqli", &runs, "URL", Behavior::Succeed),
                    unit("crash", &runs, "URL", Behavior::Panic),
                    unit("flaky", &runs, "URL", Behavior::Fail),
                ],
            ),
            NamespaceSource::fixed(
                "auxiliary",
                vec![unit("port_scanner", &runs, "TARGET", Behavior::Succeed)],
            ),
        ]);
        let sink = Arc::new(RecordingSink::default());
        let sink_ref: SinkRef = sink.clone();
        Harness {
            console: Console::new(registry, config, sink_ref),
            sink,
            runs,
        }
    }

    fn harness() -> Harness {
        harness_with(ConsoleConfig::default())
    }

    fn log(level: &str, message: &str) -> Event {
        Event::Log(level.to_string(), message.to_string())
    }

    #[test]
    fn test_parse_lowercases_command_and_keeps_argument() {
        assert_eq!(
            Command::parse("SET  payload  a b  c"),
            Some(Command::Set("payload  a b  c".to_string()))
        );
        assert_eq!(Command::parse("Exploit"), Some(Command::Run));
        assert_eq!(Command::parse("quit"), Some(Command::Exit));
        assert_eq!(Command::parse("   "), None);
        assert_eq!(
            Command::parse("frobnicate now"),
            Some(Command::Unknown("frobnicate".to_string()))
        );
    }

    #[test]
    fn test_show_modules_is_lexicographic() {
        let mut h = harness();
        h.console.execute("show modules");
        assert_eq!(
            h.sink.take(),
            vec![Event::Listing(
                "Available Modules".to_string(),
                vec![
                    "auxiliary/port_scanner".to_string(),
                    "exploit/crash".to_string(),
                    "exploit/flaky".to_string(),
                    "exploit/sqli".to_string(),
                ]
            )]
        );
    }

    #[test]
    fn test_show_requires_modules_argument() {
        let mut h = harness();
        h.console.execute("show payloads");
        assert_eq!(h.sink.take(), vec![log("error", "Usage: show modules")]);
    }

    #[test]
    fn test_use_set_run_success() {
        let mut h = harness();
        h.console.execute("use auxiliary/port_scanner");
        assert_eq!(h.console.current_key(), Some("auxiliary/port_scanner"));

        h.console.execute("set target example.com");
        assert_eq!(
            h.console.current_module().unwrap().get_option("TARGET"),
            Some("example.com")
        );

        h.sink.take();
        h.console.execute("run");
        assert_eq!(h.runs.load(Ordering::SeqCst), 1);

        let events = h.sink.take();
        match events.last() {
            Some(Event::Result(result)) => {
                assert!(result.success);
                assert_eq!(result.vulnerabilities[0].kind, "Telnet exposed");
            }
            other => panic!("expected a rendered result, got {:?}", other),
        }
    }

    #[test]
    fn test_run_with_missing_required_option_never_calls_run() {
        let mut h = harness();
        h.console.execute("use exploit/sqli");
        h.sink.take();

        h.console.execute("run");
        assert_eq!(h.runs.load(Ordering::SeqCst), 0);
        assert_eq!(
            h.sink.take(),
            vec![log("error", "Required option 'URL' is not set")]
        );

        h.console.execute("exploit");
        assert_eq!(h.runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_module_panic_is_isolated() {
        let mut h = harness();
        h.console.execute("use exploit/crash");
        h.console.execute("set URL http://example.com");
        h.sink.take();

        h.console.execute("run");
        assert_eq!(h.runs.load(Ordering::SeqCst), 1);
        assert!(h.console.is_running());
        assert_eq!(
            h.sink.take().last(),
            Some(&log("error", "Error: index out of range"))
        );

        h.console.execute("back");
        assert!(h.console.current_module().is_none());
    }

    #[test]
    fn test_module_error_is_isolated() {
        let mut h = harness();
        h.console.execute("use exploit/flaky");
        h.console.execute("set url http://example.com");
        h.sink.take();

        h.console.execute("run");
        assert!(h.console.is_running());
        assert_eq!(
            h.sink.take().last(),
            Some(&log("error", "Error: connection reset by peer"))
        );
    }

    #[test]
    fn test_use_unknown_keeps_previous_selection() {
        let mut h = harness();
        h.console.execute("use exploit/nope");
        assert!(h.console.current_module().is_none());
        assert_eq!(h.sink.take(), vec![log("error", "Module not found: exploit/nope")]);

        h.console.execute("use exploit/sqli");
        h.console.execute("use auxiliary/missing");
        assert_eq!(h.console.current_key(), Some("exploit/sqli"));
    }

    #[test]
    fn test_use_replaces_selection_with_fresh_instance() {
        let mut h = harness();
        h.console.execute("use exploit/sqli");
        h.console.execute("set URL http://a.example");
        h.console.execute("use exploit/sqli");
        assert_eq!(h.console.current_module().unwrap().get_option("URL"), Some(""));
    }

    #[test]
    fn test_use_without_argument_is_usage_error() {
        let mut h = harness();
        h.console.execute("use");
        assert_eq!(h.sink.take(), vec![log("error", "Usage: use <module_path>")]);
    }

    #[test]
    fn test_back_when_idle_is_noop() {
        let mut h = harness();
        h.console.execute("back");
        assert_eq!(h.sink.take(), vec![log("warn", "No module selected")]);
        assert!(h.console.is_running());
    }

    #[test]
    fn test_back_deselects() {
        let mut h = harness();
        h.console.execute("use exploit/sqli");
        h.console.execute("back");
        assert!(h.console.current_module().is_none());
        assert_eq!(h.sink.take().last(), Some(&log("success", "Deselected module")));
    }

    #[test]
    fn test_idle_commands_report_no_module() {
        let mut h = harness();
        for line in ["set URL x", "options", "info", "run", "exploit"] {
            h.console.execute(line);
            assert_eq!(h.sink.take(), vec![log("error", "No module selected")], "{}", line);
        }
        assert_eq!(h.runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_set_value_keeps_spaces() {
        let mut h = harness();
        h.console.execute("use exploit/sqli");
        h.sink.take();
        h.console.execute("set url http://example.com/a b c");
        assert_eq!(
            h.console.current_module().unwrap().get_option("URL"),
            Some("http://example.com/a b c")
        );
        assert_eq!(
            h.sink.take(),
            vec![log("success", "URL => http://example.com/a b c")]
        );
    }

    #[test]
    fn test_set_invalid_option_and_usage() {
        let mut h = harness();
        h.console.execute("use exploit/sqli");
        h.sink.take();

        h.console.execute("set RHOST 10.0.0.1");
        assert_eq!(h.sink.take(), vec![log("error", "Invalid option: RHOST")]);

        h.console.execute("set URL");
        assert_eq!(h.sink.take(), vec![log("error", "Usage: set <option> <value>")]);
    }

    #[test]
    fn test_options_and_info_render_current_module() {
        let mut h = harness();
        h.console.execute("use auxiliary/port_scanner");
        h.sink.take();

        h.console.execute("options");
        match h.sink.take().as_slice() {
            [Event::Options(rows)] => {
                assert_eq!(rows[0].name, "TARGET");
                assert_eq!(rows[0].required, "yes");
                assert_eq!(rows[1].name, "TIMEOUT");
                assert_eq!(rows[1].required, "no");
            }
            other => panic!("unexpected events {:?}", other),
        }

        h.console.execute("info");
        match h.sink.take().as_slice() {
            [Event::Info(info)] => {
                assert_eq!(info.name, "Stub");
                assert_eq!(info.module_type, "auxiliary");
            }
            other => panic!("unexpected events {:?}", other),
        }
    }

    #[test]
    fn test_search_is_case_insensitive_and_sorted() {
        let mut h = harness();
        h.console.execute("search EXPLOIT/");
        assert_eq!(
            h.sink.take(),
            vec![Event::Listing(
                "Matching Modules".to_string(),
                vec![
                    "exploit/crash".to_string(),
                    "exploit/flaky".to_string(),
                    "exploit/sqli".to_string(),
                ]
            )]
        );

        h.console.execute("search Port");
        assert_eq!(
            h.sink.take(),
            vec![Event::Listing(
                "Matching Modules".to_string(),
                vec!["auxiliary/port_scanner".to_string()]
            )]
        );
    }

    #[test]
    fn test_search_empty_is_usage_error() {
        let mut h = harness();
        h.console.execute("search");
        assert_eq!(h.sink.take(), vec![log("error", "Usage: search <keyword>")]);
        h.console.execute("search    ");
        assert_eq!(h.sink.take(), vec![log("error", "Usage: search <keyword>")]);
    }

    #[test]
    fn test_search_without_match() {
        let mut h = harness();
        h.console.execute("search ldap");
        assert_eq!(h.sink.take(), vec![log("warn", "No modules found matching: ldap")]);
    }

    #[test]
    fn test_reload_keeps_selection_and_options() {
        let mut h = harness();
        h.console.execute("use auxiliary/port_scanner");
        h.console.execute("set TARGET 10.0.0.5");
        h.console.execute("reload");

        assert_eq!(h.console.current_key(), Some("auxiliary/port_scanner"));
        assert_eq!(
            h.console.current_module().unwrap().get_option("TARGET"),
            Some("10.0.0.5")
        );
        assert_eq!(h.console.registry().len(), 4);
    }

    #[test]
    fn test_unknown_and_blank_lines() {
        let mut h = harness();
        h.console.execute("use exploit/sqli");
        h.sink.take();

        h.console.execute("");
        h.console.execute("   \t ");
        assert!(h.sink.take().is_empty());

        h.console.execute("hack the planet");
        assert_eq!(h.sink.take(), vec![log("error", "Unknown command: hack")]);
        assert_eq!(h.console.current_key(), Some("exploit/sqli"));
    }

    #[test]
    fn test_exit_stops_console() {
        let mut h = harness();
        h.console.execute("QUIT");
        assert!(!h.console.is_running());

        h.sink.take();
        h.console.execute("help");
        assert!(h.sink.take().is_empty());
    }

    #[test]
    fn test_shutdown_on_end_of_input() {
        let mut h = harness();
        h.console.shutdown();
        assert!(!h.console.state().is_running());
        assert_eq!(h.sink.take(), vec![log("info", "\nExiting...")]);

        h.console.shutdown();
        assert!(h.sink.take().is_empty());
    }

    #[test]
    fn test_cosmetic_commands_reach_sink() {
        let mut h = harness();
        h.console.execute("help");
        h.console.execute("banner");
        h.console.execute("clear");
        assert_eq!(h.sink.take(), vec![Event::Help, Event::Banner, Event::Clear]);
    }

    #[test]
    fn test_prompt_tracks_selection() {
        let mut h = harness();
        assert_eq!(h.console.prompt(), "kestrel > ");
        h.console.execute("use exploit/sqli");
        assert_eq!(h.console.prompt(), "kestrel(Stub) > ");
    }

    #[test]
    fn test_option_defaults_applied_on_use() {
        let mut config = ConsoleConfig::default();
        config.option_defaults.insert("timeout".to_string(), "3".to_string());
        config.option_defaults.insert("PROXY".to_string(), "http://127.0.0.1:8080".to_string());

        let mut h = harness_with(config);
        h.console.execute("use exploit/sqli");

        let module = h.console.current_module().unwrap();
        assert_eq!(module.get_option("TIMEOUT"), Some("3"));
        assert_eq!(module.get_option("PROXY"), None);
    }
}
