use chrono::NaiveDate;
use rstest::rstest;

use almanac_app::{AppConfig, AppError, Session};

fn session_with(config: &str) -> Session {
    let _ = env_logger::builder().is_test(true).try_init();
    let config: AppConfig = toml::from_str(config).unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    Session::new(&config, today).unwrap()
}

fn run(session: &mut Session, script: &str) -> (String, usize) {
    let mut out = Vec::new();
    let failures = session.run(script.as_bytes(), &mut out, false).unwrap();
    (String::from_utf8(out).unwrap(), failures)
}

fn lines(session: &mut Session, line: &str) -> Vec<String> {
    session.run_line(line).unwrap()
}

const WEEK: &str = "\
# a week of planning
task add Work
task add #1 Report
task add #1 Email
schedule 2024-03-04 09:00-09:15 #1 Standup
plan add Q1
plan link #5 #4
task status #2 done 2024-03-04
";

#[test]
fn week_script_builds_tree_and_calendar() {
    let mut session = session_with("");
    let (out, failures) = run(&mut session, WEEK);
    assert_eq!(failures, 0, "{out}");
    assert_eq!(
        lines(&mut session, "tree"),
        [
            "#0 [ ] Tasks (50%)",
            "  #1 [ ] Work (50%) scheduled: #4",
            "    #2 [x] Report (100%)",
            "    #3 [ ] Email (0%)",
        ]
    );
    assert_eq!(
        lines(&mut session, "calendar"),
        ["2024-03-04", "  #4 09:00-09:15 Standup -> task #1 [plan #5]"]
    );
}

#[test]
fn undo_and_redo_whole_script() {
    let mut session = session_with("");
    run(&mut session, WEEK);
    let before = lines(&mut session, "tree");
    let undone = lines(&mut session, "undo 100");
    assert_eq!(undone.len(), 7);
    assert_eq!(lines(&mut session, "tree"), ["#0 [ ] Tasks (0%)"]);
    assert_eq!(lines(&mut session, "calendar"), ["(calendar is empty)"]);

    lines(&mut session, "redo 7");
    assert_eq!(lines(&mut session, "tree"), before);
}

#[test]
fn drag_is_one_step() {
    let mut session = session_with("");
    run(&mut session, "schedule 2024-03-04 23:00-23:30 Walk\n");
    let out = lines(&mut session, "drag #1 15 30 45");
    assert_eq!(out.last().unwrap(), "#1 now at 2024-03-05 00:30-01:00");
    assert_eq!(lines(&mut session, "calendar"), ["2024-03-05", "  #1 00:30-01:00 Walk"]);

    assert_eq!(lines(&mut session, "undo"), ["undone: Drag 'Walk'"]);
    assert_eq!(lines(&mut session, "calendar"), ["2024-03-04", "  #1 23:00-23:30 Walk"]);
}

#[test]
fn repeat_then_clear_frees_the_original() {
    let mut session = session_with("");
    run(&mut session, "schedule 2024-03-04 09:00-09:15 Standup\n");
    let out = lines(&mut session, "repeat #1 7");
    assert_eq!(out.last().unwrap(), "created #2");
    assert_eq!(
        lines(&mut session, "calendar"),
        ["2024-03-04", "  #2 09:00-09:15 Standup (every 7 days)"]
    );
    assert_eq!(lines(&mut session, "clear"), ["history cleared, 1 entities freed"]);
    assert!(matches!(
        session.run_line("undo"),
        Err(AppError::NothingTo("undo"))
    ));
}

#[rstest]
#[case("max_undo = 2", 2)]
#[case("max_undo = 10", 3)]
fn max_undo_from_config(#[case] edit_log: &str, #[case] expected: usize) {
    let mut session = session_with(&format!("[edit_log]\n{edit_log}"));
    run(&mut session, "task add A\ntask add B\ntask add C\n");
    assert_eq!(session.log().undo_count(), expected);
}

#[test]
fn failed_commands_do_not_touch_history() {
    let mut session = session_with("");
    let (out, failures) = run(&mut session, "task add A\ntask rm #0\ntask mv #1 #1\ntask rm #9\n");
    assert_eq!(failures, 3, "{out}");
    assert!(out.contains("the root task cannot be removed or moved"), "{out}");
    assert!(out.contains("no active entity #9"), "{out}");
    assert_eq!(session.log().undo_count(), 1);
}
