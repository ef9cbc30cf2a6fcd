use crate::session::AuthPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FtpCommand {
    USER,
    PASS,
    QUIT,
    NOOP,
    HELP,
    TYPE,
    MODE,
    STRU,
    PORT,
    PASV,
    ABOR,
    LIST,
    NLST,
    RETR,
    STOR,
    APPE,
    CWD,
    CDUP,
    DELE,
    RMD,
    MKD,
    SLEEP,
}

impl FtpCommand {
    pub fn from_verb(verb: &str) -> Option<FtpCommand> {
        match verb {
            "USER" => Some(FtpCommand::USER),
            "PASS" => Some(FtpCommand::PASS),
            "QUIT" => Some(FtpCommand::QUIT),
            "NOOP" => Some(FtpCommand::NOOP),
            "HELP" => Some(FtpCommand::HELP),
            "TYPE" => Some(FtpCommand::TYPE),
            "MODE" => Some(FtpCommand::MODE),
            "STRU" => Some(FtpCommand::STRU),
            "PORT" => Some(FtpCommand::PORT),
            "PASV" => Some(FtpCommand::PASV),
            "ABOR" => Some(FtpCommand::ABOR),
            "LIST" => Some(FtpCommand::LIST),
            "NLST" => Some(FtpCommand::NLST),
            "RETR" => Some(FtpCommand::RETR),
            "STOR" => Some(FtpCommand::STOR),
            "APPE" => Some(FtpCommand::APPE),
            "CWD" => Some(FtpCommand::CWD),
            "CDUP" => Some(FtpCommand::CDUP),
            "DELE" => Some(FtpCommand::DELE),
            "RMD" => Some(FtpCommand::RMD),
            "MKD" => Some(FtpCommand::MKD),
            "SLEEP" => Some(FtpCommand::SLEEP),
            _ => None,
        }
    }

    /// Whether this command is registered in the given authentication phase.
    pub fn available_in(self, phase: AuthPhase) -> bool {
        use FtpCommand::*;
        match phase {
            AuthPhase::PreAuth => matches!(self, USER | HELP | QUIT | NOOP),
            AuthPhase::NeedPassword => matches!(self, USER | HELP | QUIT | NOOP | PASS),
            AuthPhase::Authenticated => !matches!(self, PASS),
        }
    }

    /// Verbs registered in the given phase, for the HELP listing.
    pub fn registered_verbs(phase: AuthPhase) -> &'static [&'static str] {
        match phase {
            AuthPhase::PreAuth => &["HELP", "NOOP", "QUIT", "USER"],
            AuthPhase::NeedPassword => &["HELP", "NOOP", "PASS", "QUIT", "USER"],
            AuthPhase::Authenticated => &[
                "ABOR", "APPE", "CDUP", "CWD", "DELE", "HELP", "LIST", "MKD", "MODE", "NLST",
                "NOOP", "PASV", "PORT", "QUIT", "RETR", "RMD", "SLEEP", "STOR", "STRU", "TYPE",
                "USER",
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbs_resolve_case_sensitively_after_uppercasing() {
        assert_eq!(FtpCommand::from_verb("RETR"), Some(FtpCommand::RETR));
        assert_eq!(FtpCommand::from_verb("retr"), None);
        assert_eq!(FtpCommand::from_verb("NOSUCH"), None);
    }

    #[test]
    fn pre_auth_phase_only_registers_the_universal_set() {
        assert!(FtpCommand::USER.available_in(AuthPhase::PreAuth));
        assert!(FtpCommand::QUIT.available_in(AuthPhase::PreAuth));
        assert!(!FtpCommand::PORT.available_in(AuthPhase::PreAuth));
        assert!(!FtpCommand::PASS.available_in(AuthPhase::PreAuth));
    }

    #[test]
    fn pass_is_only_registered_while_a_password_is_pending() {
        assert!(FtpCommand::PASS.available_in(AuthPhase::NeedPassword));
        assert!(!FtpCommand::PASS.available_in(AuthPhase::Authenticated));
    }

    #[test]
    fn registered_verbs_match_availability() {
        for phase in [
            AuthPhase::PreAuth,
            AuthPhase::NeedPassword,
            AuthPhase::Authenticated,
        ] {
            for verb in FtpCommand::registered_verbs(phase) {
                assert!(FtpCommand::from_verb(verb).unwrap().available_in(phase));
            }
        }
    }
}
