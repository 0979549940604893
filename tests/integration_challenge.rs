//! Integration tests for challenge and tutorial compilation.
//!
//! These run the whole pipeline in memory: manifest resolution against a
//! stubbed base environment, page rendering, and front matter assembly.

mod common;

use common::prelude::*;
use labpress::error::Error;

#[test]
fn test_challenge_front_matter() {
    let fixture = ContentFixture::new()
        .with_manifest(manifests::CHALLENGE)
        .with_file("index.md", "# {{ manifest.title }}\n");

    let output = fixture.generate("dev").unwrap();
    let (front, body) = split_page(&page(&output, "index.md"));

    assert_eq!(front["kind"], "challenge");
    assert_eq!(front["title"], "DEV: Fix the web server");
    assert_eq!(front["difficulty"], "easy");
    assert_eq!(body, "# DEV: Fix the web server\n");

    let machine = &front["playground"]["machines"][0];
    assert_eq!(machine["name"], "ubuntu-01");
    assert_eq!(machine["resources"]["cpuCount"], 2);
    assert_eq!(machine["users"][1]["name"], "laborant");
    assert_eq!(machine["startupFiles"][0]["path"], "/etc/hostname");
    assert_eq!(machine["startupFiles"][0]["content"], "web");

    let task = &front["tasks"]["verify_nginx"];
    assert_eq!(task["machine"], "ubuntu-01");
    assert_eq!(task["user"], "root");
    assert_eq!(task["needs"][0], "init_network");
}

#[test]
fn test_live_channel_has_no_prefix() {
    let fixture = ContentFixture::new().with_manifest(manifests::CHALLENGE);

    let output = fixture.generate("live").unwrap();
    let (front, _) = split_page(&page(&output, "index.md"));

    assert_eq!(front["title"], "Fix the web server");
}

#[test]
fn test_solution_and_static_files() {
    let fixture = ContentFixture::new()
        .with_manifest(manifests::CHALLENGE)
        .with_file("index.md", "Task")
        .with_file("solution.md", r#"{% include "answer.md" %}"#)
        .with_file("templates/answer.md", "Restart nginx.")
        .with_file("static/topology.svg", "<svg/>");

    let output = fixture.generate("dev").unwrap();

    assert_eq!(page(&output, "solution.md"), "Restart nginx.");
    assert_eq!(page(&output, "__static__/topology.svg"), "<svg/>");
    assert!(!output.exists("answer.md"));
}

#[test]
fn test_pinned_drive_image() {
    let fixture = ContentFixture::new().with_manifest(
        r#"
kind: tutorial
title: Containers
playground:
  name: ubuntu
  machines:
    - name: ubuntu-01
      drives:
        - source: oci://ghcr.io/acme/rootfs:__CHANNEL__
          mount: /
"#,
    );

    let output = fixture.generate("dev").unwrap();
    let (front, _) = split_page(&page(&output, "index.md"));

    let source = front["playground"]["machines"][0]["drives"][0]["source"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(source, format!("oci://ghcr.io/acme/rootfs:dev@{}", DIGEST));
    assert!(front.get("difficulty").is_none());
}

#[test]
fn test_startup_file_from_content_tree() {
    let fixture = ContentFixture::new()
        .with_manifest(
            r#"
kind: tutorial
title: Files
playground:
  name: ubuntu
  machines:
    - name: ubuntu-01
      startupFiles:
        - path: /etc/motd
          fromFile: files/motd
"#,
        )
        .with_file("files/motd", "Welcome!\n");

    let output = fixture.generate("dev").unwrap();
    let (front, _) = split_page(&page(&output, "index.md"));

    let file = &front["playground"]["machines"][0]["startupFiles"][0];
    assert_eq!(file["path"], "/etc/motd");
    assert_eq!(file["content"], "Welcome!\n");
    assert!(file.get("fromFile").is_none());
}

#[test]
fn test_multi_user_tasks_fan_out() {
    let fixture = ContentFixture::new().with_manifest(
        r#"
kind: tutorial
title: Users
playground:
  name: ubuntu
tasks:
  setup:
    machine: ubuntu-01
    user: [root, laborant]
    run: "true"
  verify:
    machine: ubuntu-01
    user: laborant
    needs: [setup]
    run: "true"
"#,
    );

    let output = fixture.generate("dev").unwrap();
    let (front, _) = split_page(&page(&output, "index.md"));

    let tasks = &front["tasks"];
    assert!(tasks.get("setup_root").is_some());
    assert!(tasks.get("setup_laborant").is_some());
    assert_eq!(tasks["verify"]["needs"][0], "setup_laborant");
}

#[test]
fn test_unknown_dependency_has_hint() {
    let fixture = ContentFixture::new().with_manifest(
        r#"
kind: challenge
title: Broken
playground:
  name: ubuntu
tasks:
  verify:
    machine: ubuntu-01
    user: root
    needs: [init_netwrok]
    run: "true"
"#,
    );

    let err = fixture.generate("dev").unwrap_err();

    match &err {
        Error::UnknownDependency { hint, .. } => {
            assert_eq!(hint.as_deref(), Some("Did you mean 'init_network'?"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(err.to_string().contains("init_netwrok"));
}

#[test]
fn test_beta_notice() {
    let fixture = ContentFixture::new()
        .with_manifest(manifests::CHALLENGE)
        .with_file("index.md", "Body");

    let output = fixture.generate("beta").unwrap();
    let (front, body) = split_page(&page(&output, "index.md"));

    assert_eq!(front["title"], "BETA: Fix the web server");
    assert!(body.starts_with("::remark-box\n"));
    assert!(body.ends_with("Body"));
}

#[test]
fn test_channel_name_becomes_name() {
    let fixture = ContentFixture::new().with_manifest(
        r#"
kind: tutorial
title: Channels
channels:
  dev:
    name: channels-dev
  live:
    name: channels
"#,
    );

    let output = fixture.generate("dev").unwrap();
    let (front, _) = split_page(&page(&output, "index.md"));
    assert_eq!(front["name"], "channels-dev");

    let err = fixture.generate("staging").unwrap_err();
    assert!(matches!(err, Error::MissingChannel { .. }));
}

#[test]
fn test_content_bundle_task() {
    let fixture = ContentFixture::new()
        .with_manifest(manifests::CHALLENGE)
        .with_file("dist/__static__/challenge.tar.gz", "bundle");

    let output = fixture.generate("dev").unwrap();
    let (front, _) = split_page(&page(&output, "index.md"));

    let task = &front["tasks"]["init_content_files"];
    assert_eq!(task["init"], true);
    assert_eq!(task["machine"], "ubuntu-01");
    assert_eq!(task["user"], "root");
    assert!(task["run"]
        .as_str()
        .unwrap()
        .contains("/__static__/challenge.tar.gz"));
}
