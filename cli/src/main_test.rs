use authgate::UserId;

use super::*;

fn ana() -> User {
    User { id: UserId::Number(1), first_name: "Ana".to_owned(), last_name: String::new(), email: String::new() }
}

// =============================================================================
// argument parsing
// =============================================================================

#[test]
fn signup_args_default_confirmation_to_password() {
    let cli = Cli::try_parse_from([
        "authgate",
        "--session-file",
        "/tmp/s.json",
        "signup",
        "--first-name",
        "Ana",
        "--last-name",
        "Souza",
        "--email",
        "ana@example.com",
        "--password",
        "hunter22",
        "--accept-terms",
    ])
    .unwrap();
    let Command::Signup(args) = cli.command else {
        panic!("expected signup");
    };
    let form = SignupForm::from(args);
    assert_eq!(form.password_confirmation, "hunter22");
    assert!(form.terms);
    assert!(form.validate().is_ok());
}

#[test]
fn open_takes_positional_path() {
    let cli = Cli::try_parse_from(["authgate", "open", "/login"]).unwrap();
    assert!(matches!(cli.command, Command::Open { path } if path == "/login"));
}

// =============================================================================
// session path
// =============================================================================

#[test]
fn explicit_session_path_wins() {
    let path = resolve_session_path(Some(PathBuf::from("/tmp/explicit.json"))).unwrap();
    assert_eq!(path, PathBuf::from("/tmp/explicit.json"));
}

#[test]
fn default_session_path_is_under_authgate_dir() {
    if let Some(path) = default_session_path() {
        assert!(path.ends_with("authgate/session.json"));
    }
}

// =============================================================================
// describe_decision
// =============================================================================

#[test]
fn describe_home_render_greets_user() {
    let state = AuthState { user: Some(ana()), is_initializing: false };
    let text = describe_decision(RouteDecision::Render(Route::Home), &state);
    assert_eq!(text, "render / (Hello, Ana)");
}

#[test]
fn describe_redirect_names_target() {
    let state = AuthState { user: None, is_initializing: false };
    let decision = guard(Route::Home, &state);
    assert_eq!(describe_decision(decision, &state), "redirect /login");
}

#[test]
fn describe_not_found() {
    let state = AuthState::default();
    assert_eq!(describe_decision(RouteDecision::Render(Route::NotFound), &state), "render not found");
}
