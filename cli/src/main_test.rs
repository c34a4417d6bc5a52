use super::*;
use clap::CommandFactory;

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn parses_register_role_case_insensitively() {
    let cli = Cli::try_parse_from([
        "jobboard",
        "register",
        "--email",
        "a@b.com",
        "--password",
        "secret1",
        "--first-name",
        "Ada",
        "--last-name",
        "Lovelace",
        "--role",
        "Candidate",
    ])
    .unwrap();
    assert!(matches!(cli.command, Command::Register { role: Role::Candidate, .. }));
}

#[test]
fn rejects_unknown_application_status() {
    let err = Cli::try_parse_from(["jobboard", "applications", "set-status", "a1", "hired"]).unwrap_err();
    assert!(err.to_string().contains("unknown application status"));
}

#[test]
fn skills_split_on_commas() {
    let cli = Cli::try_parse_from(["jobboard", "profile", "--skills", "Rust,SQL"]).unwrap();
    let Command::Profile(args) = cli.command else { panic!("expected profile") };
    assert_eq!(args.skills, Some(vec!["Rust".to_owned(), "SQL".to_owned()]));
}

#[test]
fn guard_decisions_map_to_errors() {
    assert!(admit(GuardDecision::Render).is_ok());
    assert!(matches!(admit(GuardDecision::Redirect(Route::Login)), Err(CliError::SignInRequired)));
    assert!(matches!(admit(GuardDecision::Redirect(Route::Home)), Err(CliError::WrongRole)));
}

#[test]
fn auth_forms_refuse_signed_in_users() {
    let user = serde_json::from_value(json!({
        "id": "u1",
        "email": "a@b.com",
        "role": "employer",
        "first_name": "Ada",
        "last_name": "Lovelace"
    }))
    .unwrap();
    let signed_in = SessionState { token: Some("tok".into()), user: Some(user), loading: false };
    assert!(matches!(admit_form(&Route::Login, &signed_in), Err(CliError::AlreadySignedIn)));
    assert!(admit_form(&Route::Register, &SessionState::default()).is_ok());
}
