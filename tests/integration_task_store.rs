use clap::Parser as _;

use todos::cli::{self, Cli};
use todos::config::{Config, UiConfig};
use todos::task::{Action, Repository, Task, TaskManager, parse};

#[test]
fn parsed_commands_survive_a_restart() {
    let td = tempfile::tempdir().expect("tempdir");
    let path = td.path().join("tasks.json");

    let mut manager = TaskManager::open(Repository::new(path.clone())).expect("open");
    for cmd in ["+ task one", "+ task two", "+ task three", "x 2"] {
        let action = parse(cmd).expect("parse").expect("known command");
        manager.execute(action);
    }
    manager.execute(Action::Delete { number: 1 });
    manager.save().expect("save");

    let reopened = TaskManager::open(Repository::new(path)).expect("reopen");
    assert_eq!(
        reopened.tasks(),
        &[
            Task::new(1, "task two", true),
            Task::new(2, "task three", false)
        ]
    );
    assert_eq!(reopened.to_string(), "1 [x] task two\n2 [ ] task three");
}

#[test]
fn scripted_session_persists_on_eof() {
    let td = tempfile::tempdir().expect("tempdir");
    let path = td.path().join("tasks.json");

    let mut manager = TaskManager::open(Repository::new(path.clone())).expect("open");
    let mut out = Vec::new();
    cli::session::run(
        &mut manager,
        "+ water plants\n+ pay rent\no 9\nx 1\n".as_bytes(),
        &mut out,
        &UiConfig::default(),
    )
    .expect("session");

    let loaded = Repository::new(path).load().expect("load");
    assert_eq!(
        loaded,
        vec![
            Task::new(1, "water plants", true),
            Task::new(2, "pay rent", false)
        ]
    );
}

#[test]
fn one_shot_subcommands_use_the_store_override() {
    let td = tempfile::tempdir().expect("tempdir");
    let path = td.path().join("store").join("tasks.json");
    let store = path.to_string_lossy().to_string();
    let store = store.as_str();
    // A config whose store.path must never be used while --store is given.
    let mut cfg = Config::default();
    cfg.store.path = td.path().join("unused.json").to_string_lossy().to_string();

    for args in [
        vec!["todos", "--store", store, "add", "first"],
        vec!["todos", "--store", store, "add", "second", "task"],
        vec!["todos", "--store", store, "done", "2"],
        vec!["todos", "--store", store, "rm", "1"],
    ] {
        let cli = Cli::try_parse_from(args).expect("args");
        cli::run_with_config(cli, &cfg).expect("run");
    }

    let loaded = Repository::new(path).load().expect("load");
    assert_eq!(loaded, vec![Task::new(1, "second task", true)]);
    assert!(!td.path().join("unused.json").exists());
}

#[test]
fn corrupt_store_fails_to_open() {
    let td = tempfile::tempdir().expect("tempdir");
    let path = td.path().join("tasks.json");
    std::fs::write(&path, "{ definitely not a task list").expect("write");

    assert!(TaskManager::open(Repository::new(path)).is_err());
}
