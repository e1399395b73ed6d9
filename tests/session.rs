use std::{io::Cursor, time::Duration};

use plumb::{config::ShellConfig, input::InputReader, session::Session};

fn session() -> Session {
    Session::new(&ShellConfig::default(), false)
}

async fn run_line(session: &mut Session, line: &str) -> String {
    let mut out = Vec::new();
    session.execute_line(line, &mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn blank_line_does_nothing() {
    let mut session = session();
    assert_eq!(run_line(&mut session, "   ").await, "");
    assert!(session.state().history.is_empty());
}

#[tokio::test]
async fn pipeline_output_is_printed() {
    let mut session = session();
    let out = run_line(&mut session, "echo hello | tr a-z A-Z < /dev/null").await;
    assert_eq!(out, "HELLO\n");
    assert_eq!(session.state().history.last(), Some("echo hello | tr a-z A-Z < /dev/null"));
}

#[tokio::test]
async fn unknown_command_is_reported() {
    let mut session = session();
    let out = run_line(&mut session, "nonexistentcommand123 --flag").await;
    assert_eq!(out, "plumb: command not found: nonexistentcommand123\n");
}

#[tokio::test]
async fn syntax_errors_are_reported() {
    let mut session = session();
    let out = run_line(&mut session, "echo a || echo b").await;
    assert_eq!(out, "plumb: syntax error: empty command in pipeline\n");

    let out = run_line(&mut session, "echo a >").await;
    assert_eq!(out, "plumb: syntax error: expected a path after `>`\n");
}

#[tokio::test]
async fn stage_failures_are_reported() {
    let mut session = session();
    let out = run_line(&mut session, "true < /dev/null").await;
    assert_eq!(out, "");

    let out = run_line(&mut session, "ls /definitely/not/here < /dev/null").await;
    assert!(out.starts_with("Error in command ls: "), "{out}");

    let out = run_line(&mut session, "false < /dev/null").await;
    assert_eq!(out, "false: exit status: 1\n");
}

#[tokio::test]
async fn output_redirection_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt");
    let mut session = session();

    let line = format!("echo hello > {} < /dev/null", path.display());
    assert_eq!(run_line(&mut session, &line).await, "");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
}

#[tokio::test]
async fn input_redirection_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("in.txt");
    std::fs::write(&path, "b\na\n").unwrap();
    let mut session = session();

    let out = run_line(&mut session, &format!("sort < {}", path.display())).await;
    assert_eq!(out, "a\nb\n");

    let out = run_line(&mut session, "cat < /no/such/file").await;
    assert!(out.starts_with("plumb: /no/such/file: "), "{out}");
}

#[tokio::test]
async fn builtins_cannot_be_piped() {
    let mut session = session();
    let out = run_line(&mut session, "pwd | cat").await;
    assert_eq!(out, "pwd: built-in commands cannot be piped\n");
}

#[tokio::test]
async fn builtin_output_can_be_redirected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("whoami.txt");
    let mut session = session();

    let out = run_line(&mut session, &format!("whoami > {}", path.display())).await;
    assert_eq!(out, "");
    assert!(!std::fs::read_to_string(&path).unwrap().trim().is_empty());
}

#[tokio::test]
async fn aliases_expand_before_parsing() {
    let mut session = session();
    let out = run_line(&mut session, "aliases -s shout tr a-z A-Z").await;
    assert_eq!(out, "Added alias: shout='tr a-z A-Z'\n");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("in.txt");
    std::fs::write(&path, "quiet\n").unwrap();

    let out = run_line(&mut session, &format!("shout < {}", path.display())).await;
    assert_eq!(out, "QUIET\n");
}

#[tokio::test]
async fn aliases_come_from_config() {
    let mut config = ShellConfig::default();
    config.aliases.insert("hi".into(), "echo hi".into());
    let mut session = Session::new(&config, false);

    assert_eq!(run_line(&mut session, "hi < /dev/null").await, "hi\n");
}

#[tokio::test]
async fn history_lists_previous_lines() {
    let mut session = session();
    run_line(&mut session, "aliases").await;
    let out = run_line(&mut session, "history").await;
    assert_eq!(out, "   1  aliases\n   2  history\n");
}

#[tokio::test]
async fn background_job_reports_done_on_a_later_line() {
    let mut session = session();
    let out = run_line(&mut session, "sleep 0.2 &").await;
    assert!(out.starts_with('[') && out.ends_with("] Running in background\n"), "{out}");
    let id = out[1..out.find(']').unwrap()].to_owned();

    let jobs = run_line(&mut session, "jobs").await;
    assert!(jobs.contains("sleep 0.2"), "{jobs}");

    tokio::time::sleep(Duration::from_millis(800)).await;

    let out = run_line(&mut session, "pwd").await;
    assert!(out.starts_with(&format!("[{id}] Done\n")), "{out}");
    assert!(session.state().jobs.is_empty());
}

#[tokio::test]
async fn blank_line_still_reports_finished_jobs() {
    let mut session = session();
    let out = run_line(&mut session, "sleep 0.1 &").await;
    let id = out[1..out.find(']').unwrap()].to_owned();

    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(run_line(&mut session, "").await, format!("[{id}] Done\n"));
    assert!(session.state().jobs.is_empty());
    assert_eq!(session.state().history.len(), 1);
}

#[tokio::test]
async fn reader_closing_early_is_not_reported() {
    let mut session = session();
    let out = run_line(&mut session, "yes | head -n1 < /dev/null").await;
    assert_eq!(out, "y\n");
}

#[tokio::test]
async fn run_stops_at_exit_and_kills_jobs() {
    let mut session = session();
    let mut input = InputReader::spawn_with(|| {
        Cursor::new(b"sleep 30 &\nexit\necho never\n".to_vec())
    });
    let mut out = Vec::new();

    session.run(&mut input, &mut out).await.unwrap();

    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("Running in background"), "{out}");
    assert!(!out.contains("never"));
    assert!(session.state().jobs.is_empty());
    assert!(session.state().should_exit);
}

#[tokio::test]
async fn run_stops_at_end_of_input() {
    let mut session = session();
    let mut input = InputReader::spawn_with(|| Cursor::new(b"\n\npwd\n".to_vec()));
    let mut out = Vec::new();

    session.run(&mut input, &mut out).await.unwrap();

    let cwd = std::env::current_dir().unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), format!("{}\n", cwd.display()));
    assert!(!session.state().should_exit);
}
