use std::io;

use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::{
    abor, cdup, cwd, dele, help, list, mkd, mode, noop, pass, quit, retr, rmd, sleep, stor, stru,
    type_, user,
};
use crate::core_network::{pasv, port};
use crate::replies::{send_reply, SharedWriter};
use crate::server::ServerContext;
use crate::session::{AuthPhase, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// Dispatches one parsed command. Verbs that are unknown, or not registered
/// in the session's current phase, get the phase's default reply: 530 before
/// authentication, 502 after.
pub async fn dispatch(
    writer: &SharedWriter,
    ctx: &ServerContext,
    session: &mut Session,
    verb: &str,
    arg: String,
) -> io::Result<ControlFlow> {
    let command = FtpCommand::from_verb(verb).filter(|c| c.available_in(session.phase));
    let Some(command) = command else {
        match session.phase {
            AuthPhase::Authenticated => send_reply(writer, 502, "No such command.").await?,
            _ => send_reply(writer, 530, "Please log in.").await?,
        }
        return Ok(ControlFlow::Continue);
    };

    use FtpCommand::*;
    match command {
        USER => user::handle_user_command(writer, &ctx.authenticator, session, arg).await?,
        PASS => pass::handle_pass_command(writer, &ctx.authenticator, session, arg).await?,
        QUIT => {
            if quit::handle_quit_command(writer, arg).await? {
                return Ok(ControlFlow::Quit);
            }
        }
        NOOP => noop::handle_noop_command(writer, arg).await?,
        HELP => help::handle_help_command(writer, session).await?,
        TYPE => type_::handle_type_command(writer, session, arg).await?,
        MODE => mode::handle_mode_command(writer, session, arg).await?,
        STRU => stru::handle_stru_command(writer, arg).await?,
        PORT => port::handle_port_command(writer, session, arg).await?,
        PASV => pasv::handle_pasv_command(writer, ctx.config.bind_host, session, arg).await?,
        ABOR => abor::handle_abor_command(writer, session, arg).await?,
        LIST => list::handle_list_command(writer, session, arg, false).await?,
        NLST => list::handle_list_command(writer, session, arg, true).await?,
        RETR => retr::handle_retr_command(writer, session, arg).await?,
        STOR => stor::handle_stor_command(writer, session, arg, false).await?,
        APPE => stor::handle_stor_command(writer, session, arg, true).await?,
        CWD => cwd::handle_cwd_command(writer, session, arg).await?,
        CDUP => cdup::handle_cdup_command(writer, session, arg).await?,
        DELE => dele::handle_dele_command(writer, session, arg).await?,
        RMD => rmd::handle_rmd_command(writer, session, arg).await?,
        MKD => mkd::handle_mkd_command(writer, session, arg).await?,
        SLEEP => sleep::handle_sleep_command(writer, session).await?,
    }
    Ok(ControlFlow::Continue)
}
