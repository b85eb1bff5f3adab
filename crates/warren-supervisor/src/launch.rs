use std::ffi::OsString;
use std::path::PathBuf;

/// How to invoke the interpreter for a guest program. The supervisor
/// appends the hash-named temp path holding the source as the final
/// argument (spec §4.4: "write the source... spawn the child").
#[derive(Clone, Debug)]
pub struct LaunchSpec {
    pub command: PathBuf,
    pub args: Vec<OsString>,
}

impl LaunchSpec {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }
}
