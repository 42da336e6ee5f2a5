use std::path::Path;

use predicates::prelude::*;

mod backend_stub;

use backend_stub::{BackendStub, Reply, avatar_json};

const AVATAR: &str = "/api/ai/generate-single-avatar";
const DIARY: &str = "/api/ai/generate-avatar-diary";

fn liquidbooks(dir: &Path, stub: &BackendStub) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("liquidbooks");
    cmd.current_dir(dir)
        .arg("--data-dir")
        .arg(dir.join("data"))
        .args(["--backend-url", &stub.base_url, "--retry-delay-ms", "1"]);
    cmd
}

fn overloaded() -> Reply {
    Reply::status(503, serde_json::json!({ "detail": "model overloaded" }))
}

#[test]
fn avatar_retries_then_unlocks_the_diary() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let dir = temp.path();
    let stub = BackendStub::spawn();
    stub.reply(AVATAR, overloaded())
        .reply(AVATAR, overloaded())
        .reply(
            AVATAR,
            Reply::json(serde_json::json!({ "success": true, "avatar": avatar_json() })),
        );
    stub.reply(
        DIARY,
        Reply::json(serde_json::json!({ "success": true, "diary_entry": "Day one. Nothing works." })),
    );

    liquidbooks(dir, &stub)
        .args(["research", "avatar"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unanswered questionnaire items"));
    assert_eq!(stub.total_hits(), 0);

    liquidbooks(dir, &stub)
        .args(["research", "answer", "--sample"])
        .assert()
        .success()
        .stdout(predicate::str::contains("6/6 questions answered"));

    liquidbooks(dir, &stub)
        .args(["research", "diary"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "diary generation requires the Problem-Aware avatar",
        ));
    assert_eq!(stub.hits(DIARY), 0);

    liquidbooks(dir, &stub)
        .args(["research", "avatar"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stuck Sam"));
    let requests = stub.requests(AVATAR);
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].body["stage"], "problem_aware");
    let prompt = requests[0].body["prompt"].as_str().unwrap_or_default();
    assert!(prompt.contains("AI-Powered Marketing"));
    assert!(!prompt.contains("[OFFER]"));

    liquidbooks(dir, &stub)
        .args(["research", "diary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("saved 3 of 3 diary entries"));
    assert_eq!(stub.hits(DIARY), 3);

    liquidbooks(dir, &stub)
        .args(["research", "export", "diary", "--out", "diary.md"])
        .assert()
        .success();
    let exported = std::fs::read_to_string(dir.join("diary.md"))?;
    assert!(exported.starts_with("# Customer Journey Diary"));
    assert!(exported.contains("Day one. Nothing works."));

    liquidbooks(dir, &stub)
        .args(["research", "export", "brand", "--out", "brand.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("generate it first"));

    liquidbooks(dir, &stub)
        .args(["research", "marketing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires the brand identity"));

    liquidbooks(dir, &stub)
        .args(["research", "reset"])
        .assert()
        .success();
    liquidbooks(dir, &stub)
        .args(["research", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("avatar: -"))
        .stdout(predicate::str::contains("(unanswered)").not());
    Ok(())
}

#[test]
fn avatar_gives_up_after_three_attempts() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let dir = temp.path();
    let stub = BackendStub::spawn();
    stub.reply(AVATAR, overloaded());

    liquidbooks(dir, &stub)
        .args(["research", "answer", "--sample"])
        .assert()
        .success();
    liquidbooks(dir, &stub)
        .args(["research", "avatar"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("after 3 attempt(s)"))
        .stderr(predicate::str::contains("model overloaded"));
    assert_eq!(stub.hits(AVATAR), 3);
    Ok(())
}

#[test]
fn unknown_question_is_rejected() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let stub = BackendStub::spawn();
    liquidbooks(temp.path(), &stub)
        .args(["research", "answer", "budget", "$5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown question: budget"));
    Ok(())
}
