//! A single ipset invocation
//!
//! A [`Command`] is a reusable descriptor: assign it, execute it through a
//! [`ProcessRunner`], read its output, and let the pool reset it. Its token
//! and output buffers keep their capacity across uses.

use std::path::Path;

use crate::action::Action;
use crate::args::{build_args, ArgBuffer};
use crate::error::{IpsetError, Result};
use crate::options::Options;
use crate::pool::Reset;
use crate::runner::ProcessRunner;
use crate::set_type::SetType;

#[derive(Debug, Default)]
pub struct Command {
    action: Option<Action>,
    name: String,
    named: bool,
    payload: String,
    set_type: Option<SetType>,
    args: ArgBuffer,
    output: Vec<u8>,
}

impl Command {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign every descriptor field, replacing whatever was there
    ///
    /// `payload` is the set type name, entry or second set name, depending
    /// on the action. A `None` name addresses every set.
    pub fn assign(
        &mut self,
        action: Action,
        name: Option<&str>,
        set_type: Option<SetType>,
        payload: &str,
    ) {
        self.action = Some(action);
        self.name.clear();
        self.name.push_str(name.unwrap_or_default());
        self.named = name.is_some();
        self.payload.clear();
        self.payload.push_str(payload);
        self.set_type = set_type;
        self.args.clear();
        self.output.clear();
    }

    pub fn action(&self) -> Option<Action> {
        self.action
    }

    /// Target set, `None` when the command addresses every set
    pub fn name(&self) -> Option<&str> {
        self.named.then_some(self.name.as_str())
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn set_type(&self) -> Option<SetType> {
        self.set_type
    }

    /// Build the argument vector for `opts`
    pub fn build_args(&mut self, opts: &Options) -> Result<&[String]> {
        let action = self.assigned()?;
        let name = self.named.then_some(self.name.as_str());
        build_args(action, name, &self.payload, self.set_type, opts, &mut self.args)?;
        Ok(self.args.as_slice())
    }

    /// Output captured by the last successful list, save or version
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Move the captured output into `buf`, replacing its contents
    pub fn take_output_into(&mut self, buf: &mut Vec<u8>) {
        buf.clear();
        buf.extend_from_slice(&self.output);
        self.output.clear();
    }

    /// Run the command once through `runner`
    ///
    /// A runner error or non-zero exit becomes [`IpsetError::CommandFailed`]
    /// carrying the utility's diagnostic text. Nothing is retried.
    pub fn exec<R: ProcessRunner + ?Sized>(
        &mut self,
        runner: &R,
        program: &Path,
        opts: &Options,
        stdin: Option<&[u8]>,
    ) -> Result<()> {
        let action = self.assigned()?;
        self.build_args(opts)?;
        log::debug!("exec: {} {}", program.display(), self.args);

        let run = runner.run(program, self.args.as_slice(), stdin);
        let out = match run {
            Ok(out) if out.success => out,
            Ok(out) => {
                let diagnostic = String::from_utf8_lossy(&out.output).trim().to_string();
                log::debug!(
                    "ipset {} exited with {:?}: {}",
                    action,
                    out.code,
                    diagnostic
                );
                return Err(self.failure(action, diagnostic));
            }
            Err(e) => {
                log::warn!("failed to run {}: {}", program.display(), e);
                return Err(self.failure(action, e.to_string()));
            }
        };

        self.output.clear();
        if action.returns_output() {
            self.output.extend_from_slice(&out.output);
        }
        Ok(())
    }

    fn assigned(&self) -> Result<Action> {
        self.action
            .ok_or_else(|| IpsetError::InvalidCommand("command has no action assigned".into()))
    }

    fn failure(&self, action: Action, diagnostic: String) -> IpsetError {
        let payload = if action.is_two_args() || action.is_bare() {
            None
        } else {
            Some(self.payload.clone())
        };
        IpsetError::CommandFailed {
            action,
            name: self.name().map(str::to_string),
            payload,
            diagnostic,
        }
    }
}

impl Reset for Command {
    fn reset(&mut self) {
        self.action = None;
        self.name.clear();
        self.named = false;
        self.payload.clear();
        self.set_type = None;
        self.args.clear();
        self.output.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::RunOutput;
    use std::io;
    use std::sync::Mutex;

    /// Replays one canned result and remembers the arguments it saw
    struct OnceRunner {
        result: Mutex<Option<io::Result<RunOutput>>>,
        seen: Mutex<Vec<Vec<String>>>,
    }

    impl OnceRunner {
        fn new(result: io::Result<RunOutput>) -> Self {
            Self {
                result: Mutex::new(Some(result)),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl ProcessRunner for OnceRunner {
        fn run(&self, _: &Path, args: &[String], _: Option<&[u8]>) -> io::Result<RunOutput> {
            self.seen.lock().unwrap().push(args.to_vec());
            self.result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(RunOutput::succeeded("")))
        }
    }

    #[test]
    fn test_unassigned_command_is_rejected() {
        let mut cmd = Command::new();
        let runner = OnceRunner::new(Ok(RunOutput::succeeded("")));
        let err = cmd
            .exec(&runner, Path::new("ipset"), &Options::new(), None)
            .unwrap_err();
        assert!(matches!(err, IpsetError::InvalidCommand(_)));
        assert!(runner.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_list_output_captured() {
        let mut cmd = Command::new();
        cmd.assign(Action::List, Some("blocked"), None, "");
        let runner = OnceRunner::new(Ok(RunOutput::succeeded("Name: blocked\n")));

        cmd.exec(&runner, Path::new("ipset"), &Options::new().with_resolve(true), None)
            .unwrap();
        assert_eq!(cmd.output(), b"Name: blocked\n");
        assert_eq!(runner.seen.lock().unwrap()[0], vec!["list", "blocked", "-resolve"]);
    }

    #[test]
    fn test_add_output_discarded() {
        let mut cmd = Command::new();
        cmd.assign(Action::Add, Some("blocked"), Some(SetType::HashIp), "1.1.1.1");
        let runner = OnceRunner::new(Ok(RunOutput::succeeded("noise")));

        cmd.exec(&runner, Path::new("ipset"), &Options::new(), None).unwrap();
        assert!(cmd.output().is_empty());
    }

    #[test]
    fn test_two_arg_failure_omits_payload() {
        let mut cmd = Command::new();
        cmd.assign(Action::Flush, Some("missing"), None, "");
        let runner = OnceRunner::new(Ok(RunOutput::failed(1, "set does not exist\n")));

        let err = cmd
            .exec(&runner, Path::new("ipset"), &Options::new(), None)
            .unwrap_err();
        assert_eq!(err.to_string(), "ipset: can't flush missing: set does not exist");
    }

    #[test]
    fn test_empty_name_never_reaches_runner() {
        let runner = OnceRunner::new(Ok(RunOutput::succeeded("")));
        for action in [Action::Destroy, Action::Flush, Action::Add] {
            let mut cmd = Command::new();
            cmd.assign(action, Some(""), Some(SetType::HashIp), "1.1.1.1");
            let err = cmd
                .exec(&runner, Path::new("ipset"), &Options::new(), None)
                .unwrap_err();
            assert!(matches!(err, IpsetError::InvalidCommand(_)), "{}", action);
        }
        assert!(runner.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_all_sets_failure_message() {
        let mut cmd = Command::new();
        cmd.assign(Action::Flush, None, None, "");
        let runner = OnceRunner::new(Ok(RunOutput::failed(1, "kernel error")));

        let err = cmd
            .exec(&runner, Path::new("ipset"), &Options::new(), None)
            .unwrap_err();
        assert_eq!(runner.seen.lock().unwrap()[0], vec!["flush"]);
        assert_eq!(err.to_string(), "ipset: can't flush all sets: kernel error");
    }

    #[test]
    fn test_three_arg_failure_includes_entry() {
        let mut cmd = Command::new();
        cmd.assign(Action::Add, Some("blocked"), Some(SetType::HashIp), "1.1.1.1");
        let runner = OnceRunner::new(Ok(RunOutput::failed(1, "already added")));

        let err = cmd
            .exec(&runner, Path::new("ipset"), &Options::new(), None)
            .unwrap_err();
        match err {
            IpsetError::CommandFailed {
                action,
                name,
                payload,
                diagnostic,
            } => {
                assert_eq!(action, Action::Add);
                assert_eq!(name.as_deref(), Some("blocked"));
                assert_eq!(payload.as_deref(), Some("1.1.1.1"));
                assert_eq!(diagnostic, "already added");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_runner_error_is_command_failure() {
        let mut cmd = Command::new();
        cmd.assign(Action::Test, Some("s"), Some(SetType::HashIp), "1.1.1.1");
        let runner = OnceRunner::new(Err(io::Error::new(io::ErrorKind::NotFound, "no such file")));

        let err = cmd
            .exec(&runner, Path::new("ipset"), &Options::new(), None)
            .unwrap_err();
        assert!(err.is_command_failed());
        assert_eq!(err.diagnostic(), Some("no such file"));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut cmd = Command::new();
        cmd.assign(Action::Save, Some("s"), Some(SetType::HashNet), "x");
        let runner = OnceRunner::new(Ok(RunOutput::succeeded("create s hash:net\n")));
        cmd.exec(&runner, Path::new("ipset"), &Options::new(), None).unwrap();

        cmd.reset();
        assert_eq!(cmd.action(), None);
        assert_eq!(cmd.name(), None);
        assert!(cmd.payload().is_empty());
        assert_eq!(cmd.set_type(), None);
        assert!(cmd.output().is_empty());
        assert!(cmd.build_args(&Options::new()).is_err());
    }
}
