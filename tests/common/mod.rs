#![allow(dead_code)]

use eso::{Config, EvalError, Interpreter, Object, Output, RunError};
use std::fs;
use std::path::{Path, PathBuf};

pub fn run(source: &str) -> Result<Object, RunError> {
    eso::run(source)
}

pub fn run_ok(source: &str) -> Object {
    match run(source) {
        Ok(value) => value,
        Err(err) => panic!("unexpected error running {:?}: {}", source, err),
    }
}

/// The inspect string of the program result.
pub fn inspect(source: &str) -> String {
    run_ok(source).inspect()
}

pub fn run_err(source: &str) -> RunError {
    match run(source) {
        Ok(value) => panic!("expected {:?} to fail, got {}", source, value.inspect()),
        Err(err) => err,
    }
}

/// Runtime error message without position.
pub fn eval_err(source: &str) -> String {
    match run_err(source) {
        RunError::Eval(EvalError { kind, .. }) => kind.to_string(),
        RunError::Parse(errors) => panic!("expected a runtime error, got parse errors: {:?}", errors),
    }
}

/// Runs with a captured output sink and returns what `print`/`println` wrote.
pub fn run_printed(source: &str) -> String {
    run_printed_with(source, Config::default())
}

pub fn run_printed_with(source: &str, config: Config) -> String {
    let output = Output::buffer();
    let mut interpreter = Interpreter::with_config(config).with_output(output.clone());
    if let Err(err) = interpreter.eval_source(source, "test.eso") {
        panic!("unexpected error running {:?}: {}", source, err);
    }
    output.contents()
}

/// A scratch directory of module files, removed when dropped.
pub struct TempModule {
    dir: PathBuf,
}

impl TempModule {
    pub fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("eso_test_{}_{}", name, std::process::id()));
        fs::create_dir_all(&dir).expect("create temp module dir");
        Self { dir }
    }

    /// Writes `<module>.eso`, treating dots in the name as directories.
    pub fn write(&self, module: &str, source: &str) -> &Self {
        let mut path = self.dir.clone();
        for part in module.split('.') {
            path.push(part);
        }
        path.set_extension("eso");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create module parent dir");
        }
        fs::write(&path, source).expect("write module file");
        self
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> Config {
        Config::default().with_search_path(&self.dir)
    }

    pub fn interpreter(&self) -> Interpreter {
        Interpreter::with_config(self.config())
    }

    pub fn run(&self, source: &str) -> Result<Object, RunError> {
        self.interpreter().eval_source(source, "main.eso")
    }
}

impl Drop for TempModule {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}
