use super::{CommandKind, PendingCommand, handler};
use crate::core::error::GchatError;
use crate::session::SessionState;

/// What the event loop should do after a command has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

/// Routes a recognized command to its handler. Every handler shares the
/// same signature; the parameter travels with the command rather than
/// through ambient state.
pub fn dispatch(command: &PendingCommand, state: &mut SessionState) -> Result<Outcome, GchatError> {
    let param = command.param.as_str();
    match command.kind {
        CommandKind::Quit => handler::quit(param, state),
        CommandKind::Help => handler::help(param, state),
        CommandKind::New => handler::new(param, state),
        CommandKind::Safe => handler::safe(param, state),
        CommandKind::Save => handler::save(param, state),
        CommandKind::Load => handler::load(param, state),
        CommandKind::Params => handler::params(param, state),
        CommandKind::Clear => handler::clear(param, state),
        CommandKind::Settings => handler::settings(param, state),
        CommandKind::Export => handler::export(param, state),
        CommandKind::Import => handler::import(param, state),
        CommandKind::Show => handler::show(param, state),
        CommandKind::Api => handler::api(param, state),
        CommandKind::Version => handler::version(param, state),
    }
}
