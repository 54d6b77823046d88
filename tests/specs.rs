// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-level integration tests: drive the dispatch path end to
//! end (pipeline, queue, workers, sinks) against a recording fake sink,
//! plus the CLI surface.

use std::sync::Arc;
use std::time::Duration;
use warble_config::{Ini, Settings};
use warble_core::Envelope;
use warble_engine::{
    HandlerTable, HookRegistry, JobQueue, Pipeline, ServiceRegistry, SinkFactories, Templates,
    WorkerContext, WorkerPool,
};
use warble_sinks::{FakeSink, Publisher};

struct Router {
    sink: FakeSink,
    pipeline: Pipeline,
    queue: JobQueue,
    pool: WorkerPool,
}

fn router(ini_text: &str) -> Router {
    let sink = FakeSink::new();
    let mut factories = SinkFactories::new();
    let instance = sink.clone();
    factories.register("fake", move |_ctx, _config| Ok(Box::new(instance.clone())));

    let ini = Ini::parse(ini_text).expect("test ini parses");
    let settings = Settings::from_ini(&ini, "warble").expect("test settings parse");
    let registry = Arc::new(
        ServiceRegistry::build(&ini, &settings.launch, &factories, &Publisher::disconnected())
            .expect("services load"),
    );
    let table = Arc::new(
        HandlerTable::build(&ini, &registry, &HookRegistry::new()).expect("handlers compile"),
    );

    let queue = JobQueue::new(settings.queue_size);
    let pool = WorkerPool::spawn(
        settings.num_workers,
        queue.receiver(),
        WorkerContext {
            registry: registry.clone(),
            table: table.clone(),
            templates: Arc::new(Templates::disabled()),
            deadline: Duration::from_secs(10),
        },
    );
    let pipeline = Pipeline::new(registry, table, queue.clone(), settings.skip_retained);

    Router { sink, pipeline, queue, pool }
}

impl Router {
    async fn drain(self) -> FakeSink {
        self.queue.close();
        self.pool.join().await;
        self.sink
    }
}

// =============================================================================
// end-to-end dispatch scenarios
// =============================================================================

#[tokio::test]
async fn retained_messages_are_skipped_when_configured() {
    let rt = router(
        "[defaults]\nlaunch = log\nskipretained = True\n\n\
         [config:log]\nmodule = fake\ntargets = {'info': ['info']}\n\n\
         [sensors/temp]\ntargets = log:info\n",
    );
    rt.pipeline.on_message(Envelope::new("sensors/temp", "21", true)).await;
    let sink = rt.drain().await;
    assert!(sink.deliveries().is_empty());
}

#[tokio::test]
async fn json_keys_interpolate_into_format() {
    let rt = router(
        "[defaults]\nlaunch = log\n\n\
         [config:log]\nmodule = fake\ntargets = {'info': ['info']}\n\n\
         [room/+]\ntargets = log:info\nformat = {room}:{value}\n",
    );
    rt.pipeline
        .on_message(Envelope::new("room/kitchen", r#"{"room":"kitchen","value":21}"#, false))
        .await;
    let sink = rt.drain().await;
    assert_eq!(sink.messages(), vec!["kitchen:21"]);
}

#[tokio::test]
async fn topic_keyed_targets_pick_most_specific_filter() {
    let ini = "\
[defaults]
launch = log

[config:log]
module = fake
targets = {'x': ['x'], 'y': ['y'], 'z': ['z']}

[a/#]
targets = {
    'a/+/c': 'log:x',
    'a/b/c': 'log:y',
    'a/#': 'log:z'
    }
";
    // `a/b/d` misses the two deeper filters but still lands on the
    // `a/#` catch-all; only a topic outside `a/...` dispatches nothing
    for (topic, expected) in [
        ("a/b/c", Some("y")),
        ("a/b/d", Some("z")),
        ("a/e/c", Some("x")),
        ("a/b", Some("z")),
        ("b/b/d", None),
    ] {
        let rt = router(ini);
        rt.pipeline.on_message(Envelope::new(topic, "payload", false)).await;
        let sink = rt.drain().await;
        let targets: Vec<String> =
            sink.deliveries().iter().map(|d| d.target.clone()).collect();
        match expected {
            Some(target) => assert_eq!(targets, vec![target], "topic {topic}"),
            None => assert!(targets.is_empty(), "topic {topic} should not dispatch"),
        }
    }
}

#[tokio::test]
async fn bare_service_target_fans_out_to_every_key() {
    let rt = router(
        "[defaults]\nlaunch = log\n\n\
         [config:log]\nmodule = fake\ntargets = {'info': ['info'], 'warn': ['warn']}\n\n\
         [t]\ntargets = log\n",
    );
    rt.pipeline.on_message(Envelope::new("t", "x", false)).await;
    let sink = rt.drain().await;
    assert_eq!(sink.deliveries().len(), 2);
}

#[tokio::test]
async fn single_worker_preserves_delivery_order() {
    let rt = router(
        "[defaults]\nlaunch = log\nnum_workers = 1\n\n\
         [config:log]\nmodule = fake\ntargets = {'info': ['info']}\n\n\
         [seq/#]\ntargets = log:info\n",
    );
    let payloads: Vec<String> = (0..20).map(|n| format!("m{n}")).collect();
    for payload in &payloads {
        rt.pipeline.on_message(Envelope::new("seq/a", payload.as_str(), false)).await;
    }
    let sink = rt.drain().await;
    assert_eq!(sink.messages(), payloads);
}

#[tokio::test]
async fn queue_drains_fully_on_shutdown() {
    let rt = router(
        "[defaults]\nlaunch = log\n\n\
         [config:log]\nmodule = fake\ntargets = {'info': ['info']}\n\n\
         [burst/#]\ntargets = log:info\n",
    );
    for n in 0..50 {
        rt.pipeline.on_message(Envelope::new("burst/x", n.to_string(), false)).await;
    }
    let sink = rt.drain().await;
    assert_eq!(sink.deliveries().len(), 50);
}

// =============================================================================
// CLI surface
// =============================================================================

#[test]
fn make_config_emits_a_loadable_sample() {
    let output = assert_cmd::Command::cargo_bin("warble")
        .expect("binary builds")
        .arg("make-config")
        .assert()
        .success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).expect("utf-8 output");

    let ini = Ini::parse(&stdout).expect("sample config parses");
    assert!(Settings::from_ini(&ini, "warble").is_ok());
}

#[test]
fn make_hooks_emits_source() {
    let output = assert_cmd::Command::cargo_bin("warble")
        .expect("binary builds")
        .arg("make-hooks")
        .assert()
        .success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).expect("utf-8 output");
    assert!(stdout.contains("HookRegistry"));
}

#[test]
fn version_flag_prints_version() {
    let output = assert_cmd::Command::cargo_bin("warble")
        .expect("binary builds")
        .arg("--version")
        .assert()
        .success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).expect("utf-8 output");
    assert!(stdout.contains("warble"));
}

#[test]
fn missing_config_exits_with_code_2() {
    assert_cmd::Command::cargo_bin("warble")
        .expect("binary builds")
        .arg("--config")
        .arg("/definitely/not/here.ini")
        .assert()
        .code(2);
}
