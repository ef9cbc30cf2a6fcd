use std::io;

use log::{info, warn};

use crate::core_auth::{AuthDecision, Authenticator};
use crate::replies::{send_reply, SharedWriter};
use crate::session::Session;

/// Handles the PASS command. Only registered after USER named a principal
/// that needs a password.
pub async fn handle_pass_command(
    writer: &SharedWriter,
    authenticator: &Authenticator,
    session: &mut Session,
    arg: String,
) -> io::Result<()> {
    let username = session.username.clone().unwrap_or_default();
    match authenticator.check_password(&username, &arg) {
        AuthDecision::Granted { uid } => {
            session.login(uid);
            info!("User {:?} logged in (uid {:?})", username, uid);
            send_reply(writer, 230, "Success.").await
        }
        AuthDecision::Denied => {
            warn!("Rejected password for {:?}", username);
            send_reply(writer, 530, "Access denied.").await
        }
    }
}
