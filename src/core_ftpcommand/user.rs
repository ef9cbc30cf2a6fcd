use std::io;

use log::info;

use crate::core_auth::Authenticator;
use crate::replies::{send_reply, SharedWriter};
use crate::session::{AuthPhase, Session};

/// Handles the USER command. With authentication disabled, or for the
/// anonymous principal, the session is authenticated immediately; otherwise
/// the session waits for PASS.
pub async fn handle_user_command(
    writer: &SharedWriter,
    authenticator: &Authenticator,
    session: &mut Session,
    arg: String,
) -> io::Result<()> {
    if arg.is_empty() {
        return send_reply(writer, 500, "Expected name of user.").await;
    }
    let anonymous = arg == "anonymous";
    session.username = Some(arg);
    if !authenticator.login_required() || anonymous {
        session.login(None);
        info!("User {:?} logged in", session.username.as_deref());
        return send_reply(writer, 230, "Success.").await;
    }
    session.phase = AuthPhase::NeedPassword;
    send_reply(writer, 331, "Need password.").await
}
