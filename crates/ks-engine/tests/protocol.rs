//! Integration tests for the engine protocol and the grep backend.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        mpsc::{self, Receiver},
    },
    thread,
};

use ks_engine::{
    Connection, ConnectionHandler, Controlled, Engine, EngineError, EngineRegistry, GrepEngine,
    GrepSettings, KeyValuePairs, Outcome, StopToken,
};
use ks_query::{Location, LocationList, Query, QueryKind};

/// Records every callback a connection makes.
#[derive(Default)]
struct Collector {
    batches: Vec<LocationList>,
    progress: Vec<(String, usize, usize)>,
    finished: usize,
    aborted: usize,
}

impl Collector {
    fn locations(&self) -> Vec<&Location> {
        self.batches.iter().flatten().collect()
    }
}

impl ConnectionHandler for Collector {
    fn on_data_ready(&mut self, batch: LocationList) {
        assert_eq!(self.finished + self.aborted, 0, "data after terminal");
        self.batches.push(batch);
    }

    fn on_progress(&mut self, text: &str, current: usize, total: usize) {
        assert_eq!(self.finished + self.aborted, 0, "progress after terminal");
        self.progress.push((text.to_string(), current, total));
    }

    fn on_finished(&mut self) {
        self.finished += 1;
    }

    fn on_aborted(&mut self) {
        self.aborted += 1;
    }
}

/// An engine that emits a fixed script once released by the test.
struct ScriptedEngine {
    batches: Vec<LocationList>,
    gate: Mutex<Option<Receiver<()>>>,
    token: Mutex<Option<Arc<StopToken>>>,
}

impl ScriptedEngine {
    fn new(batches: Vec<LocationList>) -> (Self, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let engine = Self {
            batches,
            gate: Mutex::new(Some(rx)),
            token: Mutex::new(None),
        };
        (engine, tx)
    }
}

impl Engine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    fn open(&mut self, _open_string: &str) -> Result<(), EngineError> {
        Ok(())
    }

    fn query(&self, conn: &mut Connection, _query: &Query) -> Result<(), EngineError> {
        let token = Arc::new(StopToken::new());
        let emitter = conn.begin(token.clone())?;
        *self.token.lock().unwrap() = Some(token);

        let gate = self.gate.lock().unwrap().take();
        let batches = self.batches.clone();
        thread::spawn(move || {
            if let Some(gate) = gate {
                gate.recv().ok();
            }
            for batch in batches {
                if !emitter.data(batch) {
                    emitter.abort();
                    return;
                }
            }
            emitter.finish();
        });
        Ok(())
    }

    fn build(&self, _conn: &mut Connection) -> Result<(), EngineError> {
        Err(EngineError::Unsupported {
            engine: "scripted".into(),
            kind: QueryKind::Text,
        })
    }
}

fn loc(file: &str, line: u32) -> Location {
    Location::new(file, line)
}

fn text_query(pattern: &str) -> Query {
    Query::new(QueryKind::Text, pattern)
}

mod protocol {
    use super::*;

    #[test]
    fn batches_arrive_in_order_then_finished() {
        let (engine, release) = ScriptedEngine::new(vec![
            vec![loc("a.c", 1), loc("a.c", 2)],
            vec![loc("b.c", 3)],
        ]);
        let mut conn = Connection::new();
        engine.query(&mut conn, &text_query("x")).unwrap();
        release.send(()).unwrap();

        let mut seen = Collector::default();
        assert_eq!(conn.wait(&mut seen), Some(Outcome::Finished));
        assert_eq!(seen.batches.len(), 2);
        assert_eq!(seen.batches[0][1].line, 2);
        assert_eq!(seen.batches[1][0].file, PathBuf::from("b.c"));
        assert_eq!((seen.finished, seen.aborted), (1, 0));

        // Further pumping delivers nothing.
        assert_eq!(conn.dispatch(&mut seen), Some(Outcome::Finished));
        assert_eq!(seen.batches.len(), 2);
        assert_eq!(seen.finished, 1);
    }

    #[test]
    fn stop_right_after_query_aborts_without_data() {
        let (engine, release) = ScriptedEngine::new(vec![vec![loc("a.c", 1)]]);
        let mut conn = Connection::new();
        engine.query(&mut conn, &text_query("x")).unwrap();

        conn.stop();
        release.send(()).unwrap();

        let mut seen = Collector::default();
        assert_eq!(conn.wait(&mut seen), Some(Outcome::Aborted));
        assert!(seen.batches.is_empty());
        assert_eq!((seen.finished, seen.aborted), (0, 1));
    }

    #[test]
    fn stop_reaches_the_worker() {
        let (engine, release) = ScriptedEngine::new(vec![vec![loc("a.c", 1)]]);
        let mut conn = Connection::new();
        engine.query(&mut conn, &text_query("x")).unwrap();

        conn.stop();
        let token = engine.token.lock().unwrap().clone().unwrap();
        assert!(token.is_stopped());

        release.send(()).unwrap();
        conn.wait(&mut Collector::default());
    }

    #[test]
    fn second_query_on_a_busy_connection_is_rejected() {
        let (engine, release) = ScriptedEngine::new(vec![]);
        let mut conn = Connection::new();
        engine.query(&mut conn, &text_query("x")).unwrap();

        let err = engine.query(&mut conn, &text_query("y")).unwrap_err();
        assert!(matches!(err, EngineError::Busy));

        release.send(()).unwrap();
        assert_eq!(conn.wait(&mut Collector::default()), Some(Outcome::Finished));
    }
}

mod grep {
    use super::*;

    /// A small C source tree.
    fn corpus() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let write = |rel: &str, content: &str| {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        };
        write(
            "src/a.c",
            "#include \"util.h\"\n\nint foo(int x) {\n    return bar(x);\n}\n",
        );
        write("src/b.c", "#include <util.h>\nvoid baz(void) { foo(1); foobar(); }\n");
        write("include/util.h", "int foo(int x);\nint bar(int x);\n");
        write("README", "foo is documented here\n");
        write(".hidden/skip.c", "foo\n");
        dir
    }

    fn open(root: &Path, settings: GrepSettings) -> GrepEngine {
        let mut engine = GrepEngine::with_settings(settings);
        engine.open(&root.display().to_string()).unwrap();
        engine
    }

    fn run(engine: &GrepEngine, query: &Query) -> Collector {
        let mut conn = Connection::new();
        engine.query(&mut conn, query).unwrap();
        let mut seen = Collector::default();
        assert_eq!(conn.wait(&mut seen), Some(Outcome::Finished));
        seen
    }

    fn positions(seen: &Collector, root: &Path) -> Vec<String> {
        seen.locations()
            .iter()
            .map(|l| {
                let rel = l.file.strip_prefix(root).unwrap().display().to_string();
                format!("{rel}:{}", l.line)
            })
            .collect()
    }

    #[test]
    fn text_query_finds_substrings() {
        let dir = corpus();
        let engine = open(dir.path(), GrepSettings::default());
        let seen = run(&engine, &text_query("foo"));

        assert_eq!(
            positions(&seen, dir.path()),
            vec!["README:1", "include/util.h:1", "src/a.c:3", "src/b.c:2"]
        );
        let a = seen.locations()[2];
        assert_eq!(a.column, 5);
        assert_eq!(a.text, "int foo(int x) {");
        assert!(seen.progress.iter().any(|(text, ..)| text == "Searching"));
    }

    #[test]
    fn references_skip_longer_identifiers() {
        let dir = corpus();
        let engine = open(dir.path(), GrepSettings::default());
        let seen = run(&engine, &Query::new(QueryKind::References, "bar"));

        assert_eq!(
            positions(&seen, dir.path()),
            vec!["include/util.h:2", "src/a.c:4"]
        );
    }

    #[test]
    fn file_query_matches_relative_paths() {
        let dir = corpus();
        let engine = open(dir.path(), GrepSettings::default());
        let seen = run(&engine, &Query::new(QueryKind::FindFile, "util"));

        let found = seen.locations();
        assert_eq!(found.len(), 1);
        assert!(!found[0].has_line());
        assert_eq!(found[0].text, Path::new("include").join("util.h").display().to_string());
    }

    #[test]
    fn including_query_finds_directives() {
        let dir = corpus();
        let engine = open(dir.path(), GrepSettings::default());
        let seen = run(&engine, &Query::new(QueryKind::IncludingFiles, "util.h"));

        assert_eq!(positions(&seen, dir.path()), vec!["src/a.c:1", "src/b.c:1"]);
    }

    #[test]
    fn globs_restrict_the_corpus() {
        let dir = corpus();
        let mut engine = GrepEngine::new();
        engine
            .open(&format!("{};*.h", dir.path().display()))
            .unwrap();
        let seen = run(&engine, &text_query("foo"));

        assert_eq!(positions(&seen, dir.path()), vec!["include/util.h:1"]);
    }

    #[test]
    fn batch_size_splits_results() {
        let dir = corpus();
        let engine = open(
            dir.path(),
            GrepSettings {
                batch_size: 1,
                ..GrepSettings::default()
            },
        );
        let seen = run(&engine, &text_query("foo"));

        assert_eq!(seen.batches.len(), 4);
        assert!(seen.batches.iter().all(|b| b.len() == 1));
    }

    #[test]
    fn max_results_caps_the_stream() {
        let dir = corpus();
        let engine = open(
            dir.path(),
            GrepSettings {
                max_results: 2,
                ..GrepSettings::default()
            },
        );
        let seen = run(&engine, &text_query("foo"));

        assert_eq!(seen.locations().len(), 2);
        assert_eq!(seen.finished, 1);
    }

    #[test]
    fn unsupported_kind_does_not_start() {
        let dir = corpus();
        let engine = open(dir.path(), GrepSettings::default());
        let mut conn = Connection::new();

        let err = engine
            .query(&mut conn, &Query::new(QueryKind::Definition, "foo"))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Unsupported {
                kind: QueryKind::Definition,
                ..
            }
        ));
        assert!(!conn.is_running());
        assert_eq!(conn.dispatch(&mut Collector::default()), None);
    }

    #[test]
    fn empty_pattern_does_not_start() {
        let dir = corpus();
        let engine = open(dir.path(), GrepSettings::default());
        let mut conn = Connection::new();

        let err = engine.query(&mut conn, &text_query("  ")).unwrap_err();
        assert!(matches!(err, EngineError::EmptyPattern));
        assert!(!conn.is_running());
    }

    #[test]
    fn open_rejects_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = GrepEngine::new();
        let err = engine
            .open(&dir.path().join("missing").display().to_string())
            .unwrap_err();
        assert!(matches!(err, EngineError::Source(_)));
    }

    #[test]
    fn build_reports_progress_and_caches_files() {
        let dir = corpus();
        let engine = open(dir.path(), GrepSettings::default());

        let mut conn = Connection::new();
        engine.build(&mut conn).unwrap();
        let mut seen = Collector::default();
        assert_eq!(conn.wait(&mut seen), Some(Outcome::Finished));
        assert!(seen.batches.is_empty());
        assert_eq!(
            seen.progress.last(),
            Some(&("Scanning source files".to_string(), 4, 4))
        );

        // Files added after the build are not searched until the next build.
        fs::write(dir.path().join("src/c.c"), "foo\n").unwrap();
        let seen = run(&engine, &text_query("foo"));
        assert_eq!(seen.locations().len(), 4);

        engine.build(&mut conn).unwrap();
        conn.wait(&mut Collector::default());
        let seen = run(&engine, &text_query("foo"));
        assert_eq!(seen.locations().len(), 5);
    }

    #[test]
    fn registry_applies_configuration() {
        let dir = corpus();
        let mut registry = EngineRegistry::new();
        let mut params = KeyValuePairs::new();
        params.insert("batch_size".into(), "1".into());
        registry.configure("grep", params).unwrap();

        let mut engine = registry.create("grep").unwrap();
        engine.open(&dir.path().display().to_string()).unwrap();

        let mut conn = Connection::new();
        engine.query(&mut conn, &text_query("foo")).unwrap();
        let mut seen = Collector::default();
        conn.wait(&mut seen);
        assert_eq!(seen.batches.len(), 4);
    }

    /// A tree of `count` files, each containing one `foo` line.
    fn large_corpus(count: usize) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..count {
            let sub = dir.path().join(format!("d{:02}", i % 40));
            fs::create_dir_all(&sub).unwrap();
            fs::write(sub.join(format!("f{i:05}.c")), "int foo;\n").unwrap();
        }
        dir
    }

    /// Pumps the connection until `ready` holds. Fails if the operation ends
    /// first.
    fn pump_until(conn: &mut Connection, seen: &mut Collector, ready: impl Fn(&Collector) -> bool) {
        while !ready(seen) {
            assert_eq!(conn.dispatch(seen), None, "operation ended before the stop");
            thread::yield_now();
        }
    }

    fn build(engine: &GrepEngine) -> Outcome {
        let mut conn = Connection::new();
        engine.build(&mut conn).unwrap();
        conn.wait(&mut Collector::default()).unwrap()
    }

    #[test]
    fn stopping_a_query_mid_scan_aborts() {
        const FILES: usize = 4000;
        let dir = large_corpus(FILES);
        let engine = open(
            dir.path(),
            GrepSettings {
                batch_size: 1,
                ..GrepSettings::default()
            },
        );

        let mut conn = Connection::new();
        engine.query(&mut conn, &text_query("foo")).unwrap();
        let mut seen = Collector::default();
        pump_until(&mut conn, &mut seen, |s| !s.batches.is_empty());

        conn.stop();
        assert_eq!(conn.wait(&mut seen), Some(Outcome::Aborted));
        assert_eq!((seen.finished, seen.aborted), (0, 1));
        assert!(seen.locations().len() < FILES);
        assert_ne!(
            seen.progress.last().map(|(_, current, _)| *current),
            Some(FILES)
        );
    }

    #[test]
    fn stopped_build_keeps_the_previous_file_list() {
        const FILES: usize = 4000;
        let dir = large_corpus(FILES);
        let manifest = dir.path().join(".ks").join(GrepEngine::MANIFEST_FILENAME);
        let open_string = GrepEngine::open_string(dir.path(), &manifest);
        let mut engine = GrepEngine::new();
        engine.open(&open_string).unwrap();
        assert_eq!(build(&engine), Outcome::Finished);

        fs::write(dir.path().join("late.c"), "int foo;\n").unwrap();
        let mut conn = Connection::new();
        engine.build(&mut conn).unwrap();
        let mut seen = Collector::default();
        pump_until(&mut conn, &mut seen, |s| s.progress.len() > 1);

        conn.stop();
        assert_eq!(conn.wait(&mut seen), Some(Outcome::Aborted));

        // Neither the in-memory list nor the manifest picked up the new file.
        let found = run(&engine, &text_query("foo"));
        assert_eq!(found.locations().len(), FILES);
        let mut reopened = GrepEngine::new();
        reopened.open(&open_string).unwrap();
        let found = run(&reopened, &text_query("foo"));
        assert_eq!(found.locations().len(), FILES);
    }

    #[test]
    fn build_manifest_is_used_after_reopening() {
        let dir = corpus();
        let project = tempfile::tempdir().unwrap();
        let manifest = project.path().join(GrepEngine::MANIFEST_FILENAME);
        let open_string = GrepEngine::open_string(dir.path(), &manifest);

        let mut engine = GrepEngine::new();
        engine.open(&open_string).unwrap();
        assert_eq!(build(&engine), Outcome::Finished);
        assert!(manifest.is_file());
        drop(engine);

        // A new engine searches the built list, not the current tree.
        fs::write(dir.path().join("src/c.c"), "foo\n").unwrap();
        let mut engine = GrepEngine::new();
        engine.open(&open_string).unwrap();
        assert_eq!(run(&engine, &text_query("foo")).locations().len(), 4);

        assert_eq!(build(&engine), Outcome::Finished);
        let mut engine = GrepEngine::new();
        engine.open(&open_string).unwrap();
        assert_eq!(run(&engine, &text_query("foo")).locations().len(), 5);
    }

    #[test]
    fn manifest_of_another_root_is_ignored() {
        let dir = corpus();
        let other = corpus();
        let project = tempfile::tempdir().unwrap();
        let manifest = project.path().join(GrepEngine::MANIFEST_FILENAME);

        let mut engine = GrepEngine::new();
        engine
            .open(&GrepEngine::open_string(other.path(), &manifest))
            .unwrap();
        assert_eq!(build(&engine), Outcome::Finished);

        let mut engine = GrepEngine::new();
        engine
            .open(&GrepEngine::open_string(dir.path(), &manifest))
            .unwrap();
        let seen = run(&engine, &text_query("foo"));
        assert!(
            seen.locations()
                .iter()
                .all(|l| l.file.starts_with(dir.path()))
        );
        assert_eq!(seen.locations().len(), 4);
    }
}
